//! Socket Probe Classification
//!
//! Measures connection quality by timing short-lived TCP connects to a fixed
//! probe host and mapping the average round-trip time onto the speed scale.
//! Probing is single-flight: while one probe runs, every other caller gets
//! `Unknown` immediately instead of queuing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::profile::LinkMedium;
use crate::speed::SpeedClass;

/// Per-attempt connect timeout.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Retry budget for wired links.
const WIRED_RETRY_BUDGET: u32 = 4;
/// Retry budget for wifi/mobile links.
const WIRELESS_RETRY_BUDGET: u32 = 2;

/// Probe attempt failure, consumed inside the prober and never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connect attempt timed out")]
    Timeout,
    #[error("connect attempt failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens a transient, low-latency connection and reports the measured
/// round-trip time. Abstracted so tests can supply scripted latencies.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    async fn connect(&self, host: &str, port: u16, timeout: Duration)
        -> Result<Duration, ProbeError>;
}

/// Real TCP connector. No-delay, non-keepalive; the connection is dropped as
/// soon as the handshake time has been taken.
#[derive(Debug, Default)]
pub struct TcpConnector;

#[async_trait]
impl SocketConnector for TcpConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        attempt_timeout: Duration,
    ) -> Result<Duration, ProbeError> {
        let start = Instant::now();
        let stream = timeout(attempt_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ProbeError::Timeout)??;
        let round_trip = start.elapsed();
        stream.set_nodelay(true)?;
        drop(stream);
        Ok(round_trip)
    }
}

/// Accumulated result of one probe run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeOutcome {
    /// Attempts actually made
    pub attempts: u32,
    /// Attempts that connected within the timeout
    pub successes: u32,
    /// Sum of measured round-trip times (seconds) across successes
    pub accumulated_round_trip: f64,
}

impl ProbeOutcome {
    /// Mean round-trip time in seconds, zero when nothing succeeded.
    pub fn average_round_trip(&self) -> f64 {
        if self.successes == 0 {
            0.0
        } else {
            self.accumulated_round_trip / self.successes as f64
        }
    }
}

/// Map an average round-trip time (seconds) onto the speed scale.
///
/// The two adjoining very-good bands are deliberate; the boundary constants
/// are load-bearing and must not be merged or rounded.
pub fn classify_round_trip(average_secs: f64) -> SpeedClass {
    if average_secs <= 0.0 {
        return SpeedClass::NoInternet;
    }
    if average_secs <= 0.0014 {
        return SpeedClass::VeryGood;
    }
    if average_secs < 0.14 {
        return SpeedClass::VeryGood;
    }
    if average_secs < 0.90 {
        return SpeedClass::Average;
    }
    if average_secs <= 1.5 {
        return SpeedClass::Slow;
    }
    SpeedClass::VeryPoor
}

/// Single-flight socket prober against one fixed host.
///
/// The in-flight flag is scoped to the prober instance, so independent
/// probers (e.g. in tests) never interfere with each other.
pub struct SpeedProber {
    connector: Arc<dyn SocketConnector>,
    host: String,
    port: u16,
    attempt_timeout: Duration,
    in_flight: AtomicBool,
}

impl SpeedProber {
    pub fn new(
        connector: Arc<dyn SocketConnector>,
        host: impl Into<String>,
        port: u16,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            host: host.into(),
            port,
            attempt_timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Probe host this prober targets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run a timed probe and classify the result.
    ///
    /// Returns `Unknown` without probing when another probe is already in
    /// flight. A failed attempt consumes its iteration and additionally
    /// shrinks the remaining budget, so repeated failures give up early.
    pub async fn probe(&self, medium: LinkMedium) -> SpeedClass {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("probe already in flight, reporting unknown");
            return SpeedClass::Unknown;
        }
        let _guard = InFlightReset(&self.in_flight);

        let outcome = self.run_attempts(medium).await;
        if outcome.successes == 0 {
            warn!(
                host = %self.host,
                attempts = outcome.attempts,
                "no probe attempt succeeded"
            );
            return SpeedClass::NoInternet;
        }

        let average = outcome.average_round_trip();
        let class = classify_round_trip(average);
        debug!(
            host = %self.host,
            attempts = outcome.attempts,
            successes = outcome.successes,
            avg_rtt_secs = average,
            %class,
            "probe complete"
        );
        class
    }

    async fn run_attempts(&self, medium: LinkMedium) -> ProbeOutcome {
        let mut budget = match medium {
            LinkMedium::Wired => WIRED_RETRY_BUDGET,
            LinkMedium::Wifi | LinkMedium::Mobile => WIRELESS_RETRY_BUDGET,
        };

        let mut outcome = ProbeOutcome::default();
        while outcome.attempts < budget {
            outcome.attempts += 1;
            match self
                .connector
                .connect(&self.host, self.port, self.attempt_timeout)
                .await
            {
                Ok(round_trip) => {
                    outcome.successes += 1;
                    outcome.accumulated_round_trip += round_trip.as_secs_f64();
                }
                Err(err) => {
                    debug!(host = %self.host, "probe attempt failed: {err}");
                    budget = budget.saturating_sub(1);
                }
            }
        }
        outcome
    }
}

// Releases the single-flight guard even if the probe future is dropped
// mid-attempt.
struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    /// Scripted connector: pops one result per attempt, repeats the last,
    /// and counts how many attempts were made.
    struct ScriptedConnector {
        script: Mutex<Vec<Result<Duration, ()>>>,
        attempts: std::sync::atomic::AtomicU32,
    }

    impl ScriptedConnector {
        fn new(script: Vec<Result<Duration, ()>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                attempts: std::sync::atomic::AtomicU32::new(0),
            })
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SocketConnector for ScriptedConnector {
        async fn connect(
            &self,
            _host: &str,
            _port: u16,
            _timeout: Duration,
        ) -> Result<Duration, ProbeError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock();
            let next = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0]
            };
            next.map_err(|_| ProbeError::Timeout)
        }
    }

    fn prober(connector: Arc<dyn SocketConnector>) -> SpeedProber {
        SpeedProber::new(connector, "probe.example.com", 80, ATTEMPT_TIMEOUT)
    }

    #[test]
    fn test_round_trip_thresholds() {
        assert_eq!(classify_round_trip(0.0013), SpeedClass::VeryGood);
        assert_eq!(classify_round_trip(0.1), SpeedClass::VeryGood);
        assert_eq!(classify_round_trip(0.14), SpeedClass::Average);
        assert_eq!(classify_round_trip(0.5), SpeedClass::Average);
        assert_eq!(classify_round_trip(0.90), SpeedClass::Slow);
        assert_eq!(classify_round_trip(1.0), SpeedClass::Slow);
        assert_eq!(classify_round_trip(1.5), SpeedClass::Slow);
        assert_eq!(classify_round_trip(2.0), SpeedClass::VeryPoor);
        assert_eq!(classify_round_trip(0.0), SpeedClass::NoInternet);
        assert_eq!(classify_round_trip(-1.0), SpeedClass::NoInternet);
    }

    #[test]
    fn test_outcome_average_guards_zero_successes() {
        let outcome = ProbeOutcome::default();
        assert_eq!(outcome.average_round_trip(), 0.0);
    }

    #[tokio::test]
    async fn test_all_attempts_fail_reports_no_internet() {
        let connector = ScriptedConnector::new(vec![Err(())]);
        let prober = prober(connector);
        assert_eq!(prober.probe(LinkMedium::Wired).await, SpeedClass::NoInternet);
    }

    #[tokio::test]
    async fn test_successful_probe_classifies_average() {
        let connector = ScriptedConnector::new(vec![Ok(Duration::from_millis(500))]);
        let prober = prober(connector);
        assert_eq!(prober.probe(LinkMedium::Wifi).await, SpeedClass::Average);
    }

    #[tokio::test]
    async fn test_failures_shrink_remaining_budget() {
        // Wired budget 4: two failures cut it to 2, so only 2 attempts run.
        let connector = ScriptedConnector::new(vec![Err(()), Err(())]);
        let prober = prober(connector.clone());
        assert_eq!(prober.probe(LinkMedium::Wired).await, SpeedClass::NoInternet);
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test]
    async fn test_mixed_attempts_average_over_successes_only() {
        // Wired budget 4: one failure (budget -> 3), then successes at 100ms.
        let connector = ScriptedConnector::new(vec![
            Err(()),
            Ok(Duration::from_millis(100)),
            Ok(Duration::from_millis(100)),
        ]);
        let prober = prober(connector);
        // avg = 0.1s, inside the very-good band
        assert_eq!(prober.probe(LinkMedium::Wired).await, SpeedClass::VeryGood);
    }

    #[tokio::test]
    async fn test_single_flight_short_circuits_to_unknown() {
        // Blocks the first attempt until released, answers instantly after.
        struct BlockingConnector {
            release: Notify,
            blocked_once: AtomicBool,
        }

        #[async_trait]
        impl SocketConnector for BlockingConnector {
            async fn connect(
                &self,
                _host: &str,
                _port: u16,
                _timeout: Duration,
            ) -> Result<Duration, ProbeError> {
                if !self.blocked_once.swap(true, Ordering::SeqCst) {
                    self.release.notified().await;
                }
                Ok(Duration::from_millis(1))
            }
        }

        let connector = Arc::new(BlockingConnector {
            release: Notify::new(),
            blocked_once: AtomicBool::new(false),
        });
        let prober = Arc::new(SpeedProber::new(
            connector.clone(),
            "probe.example.com",
            80,
            ATTEMPT_TIMEOUT,
        ));

        let running = {
            let prober = prober.clone();
            tokio::spawn(async move { prober.probe(LinkMedium::Wifi).await })
        };
        // Let the spawned probe reach its blocked first attempt
        while !connector.blocked_once.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        // Concurrent callers observe busy, they never queue
        assert_eq!(prober.probe(LinkMedium::Wifi).await, SpeedClass::Unknown);
        assert_eq!(prober.probe(LinkMedium::Wired).await, SpeedClass::Unknown);

        connector.release.notify_one();
        let result = running.await.unwrap();
        assert_eq!(result, SpeedClass::VeryGood);

        // Guard released, probing works again
        assert_eq!(prober.probe(LinkMedium::Wifi).await, SpeedClass::VeryGood);
    }
}
