//! Monitor Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the periodic speed monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Host probed for round-trip timing
    pub probe_host: String,

    /// Probe port (plain TCP connect)
    pub probe_port: u16,

    /// Delay between periodic evaluations
    #[serde(with = "duration_serde")]
    pub check_interval: Duration,

    /// Timeout for one connect attempt
    #[serde(with = "duration_serde")]
    pub attempt_timeout: Duration,

    /// Run the periodic background check. When false, only the on-demand
    /// facade methods are usable.
    pub continuous_check: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_host: "bing.com".into(),
            probe_port: 80,
            check_interval: Duration::from_secs(30),
            attempt_timeout: Duration::from_millis(1000),
            continuous_check: true,
        }
    }
}

// Serde helper for Duration (using milliseconds for simplicity)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
