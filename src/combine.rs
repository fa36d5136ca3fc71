//! Classification Combination
//!
//! Merges the signal-based and probe-based classifications into the final
//! value. The signal axis is primary; the probe axis refines within it. The
//! table is fixed policy, not a numeric average.

use crate::speed::SpeedClass;

/// Combine a signal-based and a probe-based classification.
///
/// Total over the 5x5 grid of determined values. An `Unknown` on either axis
/// is treated conservatively as `VeryPoor`: the caller could not establish
/// quality, so the merged value must not claim a healthy link. The output is
/// never `Unknown`.
pub fn combine(by_signal: SpeedClass, by_probe: SpeedClass) -> SpeedClass {
    use SpeedClass::*;

    if by_signal == Unknown || by_probe == Unknown {
        return VeryPoor;
    }

    match by_signal {
        VeryGood => match by_probe {
            VeryGood | Average => VeryGood,
            Slow | VeryPoor => Slow,
            _ => VeryPoor,
        },
        Average => match by_probe {
            VeryGood | Average => Average,
            Slow => Slow,
            _ => VeryPoor,
        },
        Slow => match by_probe {
            VeryGood | Average => Average,
            Slow => Slow,
            _ => VeryPoor,
        },
        VeryPoor => match by_probe {
            VeryGood | Average | Slow => Slow,
            _ => VeryPoor,
        },
        NoInternet => match by_probe {
            VeryGood | Average | Slow => VeryPoor,
            _ => NoInternet,
        },
        Unknown => unreachable!("unknown handled above"),
    }
}
