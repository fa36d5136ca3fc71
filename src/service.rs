//! Net Quality Service
//!
//! Public facade over the classification engine: on-demand availability and
//! speed checks, callback registration, and lifecycle of the background
//! monitor. All operations answer with a classification or a boolean, never
//! an error value; absence of connectivity is `NoInternet` and a busy probe
//! is `Unknown`.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::monitor::{
    AvailabilityCallback, CallbackSlots, MonitorPhase, PeriodicMonitor, StrengthCallback,
};
use crate::probe::{SocketConnector, SpeedProber, TcpConnector};
use crate::profile::ProfileSource;
use crate::signal;
use crate::speed::SpeedClass;

/// Facade over signal classification, socket probing and the periodic
/// monitor.
///
/// The on-demand socket check and the background monitor share one prober,
/// so its single-flight guard covers both: a probe started by either side
/// makes the other observe `Unknown` until it finishes.
pub struct NetQualityService {
    config: MonitorConfig,
    source: Arc<dyn ProfileSource>,
    prober: Arc<SpeedProber>,
    callbacks: Arc<RwLock<CallbackSlots>>,
    change_tx: mpsc::Sender<()>,
    change_rx: Option<mpsc::Receiver<()>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    monitor_task: Option<JoinHandle<()>>,
    monitor_phase: Option<Arc<RwLock<MonitorPhase>>>,
}

impl NetQualityService {
    /// Build a service with an explicit connector (tests inject scripted
    /// latencies here).
    pub fn with_connector(
        config: MonitorConfig,
        source: Arc<dyn ProfileSource>,
        connector: Arc<dyn SocketConnector>,
    ) -> Self {
        let prober = Arc::new(SpeedProber::new(
            connector,
            config.probe_host.clone(),
            config.probe_port,
            config.attempt_timeout,
        ));
        let (change_tx, change_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            source,
            prober,
            callbacks: Arc::new(RwLock::new(CallbackSlots::default())),
            change_tx,
            change_rx: Some(change_rx),
            shutdown_tx,
            shutdown_rx,
            monitor_task: None,
            monitor_phase: None,
        }
    }

    /// Build a service probing over real TCP.
    pub fn new(config: MonitorConfig, source: Arc<dyn ProfileSource>) -> Self {
        Self::with_connector(config, source, Arc::new(TcpConnector))
    }

    /// Sender the embedder wires the platform's connectivity-change event
    /// into. Every message wakes the monitor for an immediate re-check.
    pub fn change_notifier(&self) -> mpsc::Sender<()> {
        self.change_tx.clone()
    }

    /// Spawn the background monitor. A no-op when continuous checking is
    /// disabled in the config or the monitor is already running.
    pub fn start(&mut self) {
        if !self.config.continuous_check {
            info!("continuous checking disabled, monitor not started");
            return;
        }
        let Some(change_rx) = self.change_rx.take() else {
            warn!("monitor already started");
            return;
        };

        let monitor = PeriodicMonitor::new(
            self.source.clone(),
            self.prober.clone(),
            self.callbacks.clone(),
            change_rx,
            self.shutdown_rx.clone(),
            self.config.check_interval,
        );
        self.monitor_phase = Some(monitor.phase_handle());
        self.monitor_task = Some(tokio::spawn(monitor.run()));
    }

    /// Stop the background monitor and wait for it to finish.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.monitor_task.take() {
            let _ = task.await;
        }
    }

    /// Current monitor phase, `None` before `start`.
    pub fn monitor_phase(&self) -> Option<MonitorPhase> {
        self.monitor_phase.as_ref().map(|phase| *phase.read())
    }

    /// One connectivity-profile check, no probing.
    pub fn is_internet_available(&self) -> bool {
        self.source
            .current_profile()
            .map(|p| p.has_internet_access())
            .unwrap_or(false)
    }

    /// On-demand signal-based classification.
    pub fn check_speed_by_signal(&self) -> SpeedClass {
        match self.source.current_profile() {
            Some(profile) => signal::classify(&profile),
            None => SpeedClass::NoInternet,
        }
    }

    /// On-demand probe-based classification. Shares the monitor's
    /// single-flight guard; returns `Unknown` while a probe is in flight.
    pub async fn check_speed_by_socket(&self) -> SpeedClass {
        match self.source.current_profile() {
            Some(profile) => self.prober.probe(profile.medium).await,
            None => {
                debug!("no connection profile, skipping socket probe");
                SpeedClass::NoInternet
            }
        }
    }

    /// Register the availability-changed callback. Replaces any previous
    /// registration.
    pub fn on_availability_changed(&self, callback: AvailabilityCallback) {
        self.callbacks.write().availability = Some(callback);
    }

    /// Register the strength-changed callback. Replaces any previous
    /// registration.
    pub fn on_strength_changed(&self, callback: StrengthCallback) {
        self.callbacks.write().strength = Some(callback);
    }
}
