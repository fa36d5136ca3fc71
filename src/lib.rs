//! netquality
//!
//! Continuous, low-cost estimation of a host's internet connection quality.
//! Not a bandwidth meter: the output is a coarse, stable classification
//! suitable for adapting application behavior (warning banners, degraded
//! modes).
//!
//! Two independent estimators feed one combined value:
//! - signal-based: locally reported connectivity metadata, no traffic
//! - probe-based: timed TCP connects against one fixed host
//!
//! A periodic monitor re-evaluates both on a schedule, reacts immediately to
//! connectivity-change notifications and fires callbacks only on transitions.

pub mod combine;
pub mod config;
pub mod monitor;
pub mod probe;
pub mod profile;
pub mod service;
pub mod signal;
pub mod speed;

pub use combine::combine;
pub use config::MonitorConfig;
pub use monitor::{CallbackSlots, MonitorPhase, PeriodicMonitor};
pub use probe::{SocketConnector, SpeedProber, TcpConnector};
pub use profile::{ConnectivityProfile, ProfileSource, StaticProfileSource};
pub use service::NetQualityService;
pub use speed::SpeedClass;
