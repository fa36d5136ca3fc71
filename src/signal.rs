//! Signal-Based Classification
//!
//! Pure classifier mapping a connectivity profile snapshot to a speed class
//! using only locally reported metadata (no network traffic). Layered
//! heuristics, evaluated in order:
//!
//! 1. Connectivity level gate (none / local-only short-circuit)
//! 2. Domain authentication gate
//! 3. Baseline from connectivity level
//! 4. Cost / roaming / data-limit adjustment
//! 5. Medium-specific signal-bar refinement
//! 6. Mobile access-technology override

use crate::profile::{
    AccessTechnology, ConnectivityLevel, ConnectivityProfile, CostType, DomainConnectivity,
    LinkMedium, MOBILE_BARS_MAX, WIFI_BARS_MAX,
};
use crate::speed::SpeedClass;

/// Classify connection quality from profile metadata alone.
///
/// Pure and deterministic: identical profiles always yield the identical
/// classification. Returns `Unknown` when roaming or an exhausted data
/// allowance makes the metadata untrustworthy; callers must treat that as
/// "cannot determine", not as a failure.
pub fn classify(profile: &ConnectivityProfile) -> SpeedClass {
    // No internet route at all
    let mut tentative = match profile.connectivity {
        ConnectivityLevel::None | ConnectivityLevel::LocalAccess => return SpeedClass::NoInternet,
        ConnectivityLevel::Constrained => SpeedClass::Average,
        ConnectivityLevel::Internet => SpeedClass::VeryGood,
    };

    // A domain network that refuses authentication blocks traffic outright
    if profile.domain == DomainConnectivity::Unauthenticated {
        return SpeedClass::NoInternet;
    }

    // Cost adjustment
    if profile.roaming || profile.over_data_limit {
        return SpeedClass::Unknown;
    }
    match profile.cost {
        // Unmetered link: raise to the best class
        CostType::Unknown | CostType::Unrestricted => tentative = SpeedClass::VeryGood,
        // Metered link: cap at average, a constrained baseline stays put
        CostType::Fixed | CostType::Variable => {
            if tentative.rank() > SpeedClass::Average.rank() {
                tentative = SpeedClass::Average;
            }
        }
    }

    // Signal-bar refinement on the medium-specific scale. Wired links carry
    // no signal concept and keep the cost-derived value.
    match profile.medium {
        LinkMedium::Wired => {}
        LinkMedium::Wifi => {
            tentative = match profile.signal_bars {
                bars if bars >= WIFI_BARS_MAX => tentative,
                3 => SpeedClass::Average,
                2 => SpeedClass::Slow,
                _ => SpeedClass::VeryPoor,
            };
        }
        LinkMedium::Mobile => {
            tentative = match profile.signal_bars {
                bars if bars >= MOBILE_BARS_MAX => tentative,
                4 => SpeedClass::VeryGood,
                3 => SpeedClass::Average,
                2 => SpeedClass::Slow,
                _ => SpeedClass::VeryPoor,
            };
            tentative = apply_access_technology(tentative, profile.access_technology);
        }
    }

    tentative
}

/// Mobile access-technology override. The radio generation caps or promotes
/// the bar-derived value: 2G saturates at `Slow` regardless of bars, 3G/4G
/// promote only an already-usable link, a missing data class means no route.
fn apply_access_technology(tentative: SpeedClass, tech: AccessTechnology) -> SpeedClass {
    match tech {
        AccessTechnology::Gen2 => SpeedClass::Slow,
        AccessTechnology::Gen3 | AccessTechnology::Gen4 => {
            if tentative.rank() >= SpeedClass::Slow.rank() {
                SpeedClass::VeryGood
            } else {
                SpeedClass::Slow
            }
        }
        AccessTechnology::None => SpeedClass::NoInternet,
        AccessTechnology::Custom => tentative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wifi_profile(bars: u8) -> ConnectivityProfile {
        ConnectivityProfile {
            connectivity: ConnectivityLevel::Internet,
            domain: DomainConnectivity::None,
            cost: CostType::Unrestricted,
            roaming: false,
            over_data_limit: false,
            medium: LinkMedium::Wifi,
            signal_bars: bars,
            access_technology: AccessTechnology::None,
        }
    }

    fn mobile_profile(bars: u8, tech: AccessTechnology) -> ConnectivityProfile {
        ConnectivityProfile {
            medium: LinkMedium::Mobile,
            signal_bars: bars,
            access_technology: tech,
            ..wifi_profile(0)
        }
    }

    #[test]
    fn test_no_connectivity_dominates() {
        let mut profile = wifi_profile(4);
        profile.connectivity = ConnectivityLevel::None;
        assert_eq!(classify(&profile), SpeedClass::NoInternet);

        profile.connectivity = ConnectivityLevel::LocalAccess;
        assert_eq!(classify(&profile), SpeedClass::NoInternet);
    }

    #[test]
    fn test_unauthenticated_domain_blocks() {
        let mut profile = wifi_profile(4);
        profile.domain = DomainConnectivity::Unauthenticated;
        assert_eq!(classify(&profile), SpeedClass::NoInternet);
    }

    #[test]
    fn test_roaming_and_data_limit_yield_unknown() {
        let mut profile = wifi_profile(4);
        profile.cost = CostType::Variable;
        profile.roaming = true;
        assert_eq!(classify(&profile), SpeedClass::Unknown);

        profile.roaming = false;
        profile.over_data_limit = true;
        assert_eq!(classify(&profile), SpeedClass::Unknown);
    }

    #[test]
    fn test_metered_cost_caps_at_average() {
        let mut profile = ConnectivityProfile::wired_unrestricted();
        profile.cost = CostType::Fixed;
        assert_eq!(classify(&profile), SpeedClass::Average);

        profile.cost = CostType::Variable;
        assert_eq!(classify(&profile), SpeedClass::Average);
    }

    #[test]
    fn test_wifi_signal_tiers() {
        assert_eq!(classify(&wifi_profile(4)), SpeedClass::VeryGood);
        assert_eq!(classify(&wifi_profile(3)), SpeedClass::Average);
        assert_eq!(classify(&wifi_profile(2)), SpeedClass::Slow);
        assert_eq!(classify(&wifi_profile(1)), SpeedClass::VeryPoor);
        assert_eq!(classify(&wifi_profile(0)), SpeedClass::VeryPoor);
    }

    #[test]
    fn test_wifi_strong_signal_keeps_cost_derived_value() {
        let mut profile = wifi_profile(4);
        profile.cost = CostType::Fixed;
        assert_eq!(classify(&profile), SpeedClass::Average);
    }

    #[test]
    fn test_mobile_signal_tiers() {
        let custom = AccessTechnology::Custom; // leaves bar-derived value untouched
        assert_eq!(classify(&mobile_profile(5, custom)), SpeedClass::VeryGood);
        assert_eq!(classify(&mobile_profile(4, custom)), SpeedClass::VeryGood);
        assert_eq!(classify(&mobile_profile(3, custom)), SpeedClass::Average);
        assert_eq!(classify(&mobile_profile(2, custom)), SpeedClass::Slow);
        assert_eq!(classify(&mobile_profile(1, custom)), SpeedClass::VeryPoor);
    }

    #[test]
    fn test_access_technology_overrides() {
        assert_eq!(
            classify(&mobile_profile(5, AccessTechnology::Gen2)),
            SpeedClass::Slow
        );
        // 4G promotes a usable link
        assert_eq!(
            classify(&mobile_profile(3, AccessTechnology::Gen4)),
            SpeedClass::VeryGood
        );
        // but not one already below Slow
        assert_eq!(
            classify(&mobile_profile(1, AccessTechnology::Gen3)),
            SpeedClass::Slow
        );
        assert_eq!(
            classify(&mobile_profile(5, AccessTechnology::None)),
            SpeedClass::NoInternet
        );
    }

    #[test]
    fn test_wired_skips_signal_refinement() {
        let profile = ConnectivityProfile::wired_unrestricted();
        assert_eq!(classify(&profile), SpeedClass::VeryGood);
    }

    #[test]
    fn test_deterministic() {
        let profile = wifi_profile(3);
        let first = classify(&profile);
        for _ in 0..100 {
            assert_eq!(classify(&profile), first);
        }
    }
}
