//! Speed Classification
//!
//! Coarse connection quality vocabulary shared by the signal classifier, the
//! socket prober and the combiner. `Unknown` is a sentinel ("not yet
//! determined / probe busy / ambiguous cost state") and is excluded from
//! ordering comparisons; change callbacks never observe it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse internet speed classification, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedClass {
    /// No usable route to the internet
    NoInternet,
    /// Barely usable connection
    VeryPoor,
    /// Noticeably degraded connection
    Slow,
    /// Usable but unremarkable connection
    Average,
    /// Healthy connection
    VeryGood,
    /// Not yet determined (probe in flight, or roaming/data-limit ambiguity)
    Unknown,
}

impl SpeedClass {
    /// Position on the quality scale. `None` for the `Unknown` sentinel.
    pub fn rank(self) -> Option<u8> {
        match self {
            SpeedClass::NoInternet => Some(0),
            SpeedClass::VeryPoor => Some(1),
            SpeedClass::Slow => Some(2),
            SpeedClass::Average => Some(3),
            SpeedClass::VeryGood => Some(4),
            SpeedClass::Unknown => None,
        }
    }

    /// True for every value except the `Unknown` sentinel.
    pub fn is_determined(self) -> bool {
        !matches!(self, SpeedClass::Unknown)
    }
}

impl PartialOrd for SpeedClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpeedClass::NoInternet => "no-internet",
            SpeedClass::VeryPoor => "very-poor",
            SpeedClass::Slow => "slow",
            SpeedClass::Average => "average",
            SpeedClass::VeryGood => "very-good",
            SpeedClass::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(SpeedClass::NoInternet < SpeedClass::VeryPoor);
        assert!(SpeedClass::VeryPoor < SpeedClass::Slow);
        assert!(SpeedClass::Slow < SpeedClass::Average);
        assert!(SpeedClass::Average < SpeedClass::VeryGood);
    }

    #[test]
    fn test_unknown_excluded_from_ordering() {
        assert_eq!(SpeedClass::Unknown.partial_cmp(&SpeedClass::Slow), None);
        assert_eq!(SpeedClass::VeryGood.partial_cmp(&SpeedClass::Unknown), None);
        assert_eq!(SpeedClass::Unknown.partial_cmp(&SpeedClass::Unknown), None);
        assert!(!SpeedClass::Unknown.is_determined());
    }
}
