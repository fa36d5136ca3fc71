//! Connectivity Profile
//!
//! Snapshot of the connectivity metadata the platform reports for the active
//! link, plus the abstract source it is fetched from. The platform-specific
//! source (OS network stack bindings) lives outside this crate; tests and the
//! standalone binary use [`StaticProfileSource`].

use serde::{Deserialize, Serialize};

/// Network connectivity level of the active profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityLevel {
    /// No connectivity at all
    None,
    /// Local network only, no internet route
    LocalAccess,
    /// Internet reachable but constrained (captive portal, limited plan)
    Constrained,
    /// Full internet access
    Internet,
}

/// Domain (enterprise network) connectivity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainConnectivity {
    /// Not joined to a domain network
    None,
    /// Domain detected but not authenticated against it
    Unauthenticated,
    /// Authenticated against the domain
    Authenticated,
}

/// Billing model of the active connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostType {
    Unknown,
    Unrestricted,
    Fixed,
    Variable,
}

/// Physical/link category of the active connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMedium {
    Wired,
    Wifi,
    Mobile,
}

/// Mobile access technology generation. Affects achievable throughput
/// independently of signal bars; only meaningful for [`LinkMedium::Mobile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTechnology {
    /// Mobile radio reports no data class
    None,
    /// 2G-equivalent (GPRS, EDGE)
    Gen2,
    /// 3G-equivalent (UMTS, HSPA, EVDO)
    Gen3,
    /// 4G-equivalent (LTE and later)
    Gen4,
    /// Carrier-specific class, no generation mapping
    Custom,
}

/// Signal-bar scale ceilings per medium.
///
/// Wifi reports a four-level scale, mobile a five-level scale. Wired links
/// have no signal concept.
pub const WIFI_BARS_MAX: u8 = 4;
pub const MOBILE_BARS_MAX: u8 = 5;

/// Immutable snapshot of the active connection's metadata.
///
/// Captured once per evaluation cycle; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityProfile {
    /// Connectivity level of the active profile
    pub connectivity: ConnectivityLevel,
    /// Domain connectivity level
    pub domain: DomainConnectivity,
    /// Billing model
    pub cost: CostType,
    /// Roaming on a foreign network
    pub roaming: bool,
    /// Data allowance exhausted
    pub over_data_limit: bool,
    /// Link medium
    pub medium: LinkMedium,
    /// Signal bars on the medium-specific scale (ignored for wired)
    pub signal_bars: u8,
    /// Mobile access technology (ignored for wired/wifi)
    pub access_technology: AccessTechnology,
}

impl ConnectivityProfile {
    /// Unmetered wired link with full internet access. Baseline for tests and
    /// the standalone monitor binary.
    pub fn wired_unrestricted() -> Self {
        Self {
            connectivity: ConnectivityLevel::Internet,
            domain: DomainConnectivity::None,
            cost: CostType::Unrestricted,
            roaming: false,
            over_data_limit: false,
            medium: LinkMedium::Wired,
            signal_bars: 0,
            access_technology: AccessTechnology::None,
        }
    }

    /// True when the profile reports a usable internet route.
    pub fn has_internet_access(&self) -> bool {
        self.connectivity == ConnectivityLevel::Internet
    }
}

/// Source of connectivity metadata.
///
/// `current_profile` returning `None` means there is no active connection
/// profile at all. Change notifications are delivered out of band through the
/// channel handed to the monitor at construction, not through this trait.
pub trait ProfileSource: Send + Sync {
    fn current_profile(&self) -> Option<ConnectivityProfile>;
}

/// Fixed-profile source for tests and environments without platform metadata.
#[derive(Debug, Clone)]
pub struct StaticProfileSource {
    profile: Option<ConnectivityProfile>,
}

impl StaticProfileSource {
    pub fn new(profile: ConnectivityProfile) -> Self {
        Self { profile: Some(profile) }
    }

    /// Source that reports no connection profile at all.
    pub fn offline() -> Self {
        Self { profile: None }
    }
}

impl ProfileSource for StaticProfileSource {
    fn current_profile(&self) -> Option<ConnectivityProfile> {
        self.profile.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source() {
        let source = StaticProfileSource::new(ConnectivityProfile::wired_unrestricted());
        let profile = source.current_profile().unwrap();
        assert!(profile.has_internet_access());
        assert_eq!(profile.medium, LinkMedium::Wired);

        assert!(StaticProfileSource::offline().current_profile().is_none());
    }
}
