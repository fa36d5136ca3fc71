//! Periodic Speed Monitor
//!
//! Recurring evaluation loop: each cycle fetches the connectivity profile,
//! runs the signal classifier and the socket prober, combines the two and
//! fires the strength callback only when the combined value changed. A
//! connectivity-change notification wakes the loop immediately; when there is
//! no connectivity and nobody listens for strength changes the loop parks
//! until the next notification.
//!
//! The loop is an explicit `tokio::select!` over the tick timer, the change
//! channel and the shutdown signal. It never reschedules itself recursively.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::combine::combine;
use crate::probe::SpeedProber;
use crate::profile::{ConnectivityLevel, ProfileSource};
use crate::signal;
use crate::speed::SpeedClass;

/// Lifecycle phase of the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    /// Not started
    Idle,
    /// Waiting for the next tick or a change notification
    Scheduled,
    /// Running the classifiers
    Evaluating,
    /// Parked: no connectivity and no strength listener
    Stopped,
}

/// Callback invoked with the fresh availability on every change notification.
pub type AvailabilityCallback = Box<dyn Fn(bool) + Send + Sync>;

/// Callback invoked with the combined classification on transitions only.
pub type StrengthCallback = Box<dyn Fn(SpeedClass) + Send + Sync>;

/// Single-slot callback registrations, shared between the facade and the
/// monitor loop. Re-registering replaces the previous callback.
#[derive(Default)]
pub struct CallbackSlots {
    pub availability: Option<AvailabilityCallback>,
    pub strength: Option<StrengthCallback>,
}

/// Periodic connection-quality monitor.
///
/// Owns the schedule and the previous-classification state; nothing outside
/// the loop task mutates either.
pub struct PeriodicMonitor {
    source: Arc<dyn ProfileSource>,
    prober: Arc<SpeedProber>,
    callbacks: Arc<RwLock<CallbackSlots>>,
    change_rx: Option<mpsc::Receiver<()>>,
    shutdown_rx: watch::Receiver<bool>,
    interval: Duration,
    previous: SpeedClass,
    phase: Arc<RwLock<MonitorPhase>>,
}

impl PeriodicMonitor {
    pub fn new(
        source: Arc<dyn ProfileSource>,
        prober: Arc<SpeedProber>,
        callbacks: Arc<RwLock<CallbackSlots>>,
        change_rx: mpsc::Receiver<()>,
        shutdown_rx: watch::Receiver<bool>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            prober,
            callbacks,
            change_rx: Some(change_rx),
            shutdown_rx,
            interval,
            previous: SpeedClass::Unknown,
            phase: Arc::new(RwLock::new(MonitorPhase::Idle)),
        }
    }

    /// Shared handle onto the loop phase, for observers and tests.
    pub fn phase_handle(&self) -> Arc<RwLock<MonitorPhase>> {
        self.phase.clone()
    }

    /// Drive the monitor until shutdown. Consumes the monitor; run it on its
    /// own task.
    pub async fn run(mut self) {
        info!(interval = ?self.interval, "starting periodic speed monitor");
        self.set_phase(MonitorPhase::Scheduled);

        loop {
            let parked = *self.phase.read() == MonitorPhase::Stopped;
            let woken_by_change = tokio::select! {
                _ = sleep(self.interval), if !parked => false,
                changed = Self::next_change(&mut self.change_rx) => {
                    if !changed {
                        if parked {
                            // Nothing can ever wake a parked monitor again
                            warn!("change channel closed while monitor is parked");
                            self.wait_for_shutdown().await;
                            break;
                        }
                        // A closed channel is not a wake; keep the cadence
                        continue;
                    }
                    true
                }
                _ = self.shutdown_rx.changed() => break,
            };
            if *self.shutdown_rx.borrow() {
                break;
            }

            if woken_by_change {
                self.handle_change_notification();
            }
            self.run_cycle().await;
        }

        info!("periodic speed monitor shut down");
    }

    /// Await the next change notification. Once the channel closes this
    /// pends forever so the select falls through to the other branches.
    async fn next_change(change_rx: &mut Option<mpsc::Receiver<()>>) -> bool {
        match change_rx {
            Some(rx) => match rx.recv().await {
                Some(()) => true,
                None => {
                    *change_rx = None;
                    false
                }
            },
            None => std::future::pending().await,
        }
    }

    async fn wait_for_shutdown(&mut self) {
        while !*self.shutdown_rx.borrow() {
            if self.shutdown_rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// React to an external connectivity change: report the fresh
    /// availability and un-park the loop when connectivity returned.
    fn handle_change_notification(&mut self) {
        let available = self.availability();
        info!(available, "connectivity change notification");
        self.deliver_availability(available);

        if available && *self.phase.read() == MonitorPhase::Stopped {
            self.set_phase(MonitorPhase::Scheduled);
        }
    }

    /// One evaluation cycle. Never lets a bad cycle take the loop down.
    async fn run_cycle(&mut self) {
        self.set_phase(MonitorPhase::Evaluating);

        let profile = self.source.current_profile();
        let available = profile
            .as_ref()
            .map(|p| p.has_internet_access())
            .unwrap_or(false);

        if !available && self.callbacks.read().strength.is_none() {
            debug!("no connectivity and no strength listener, parking monitor");
            self.set_phase(MonitorPhase::Stopped);
            return;
        }

        let current = match profile {
            // Any routable profile gets the full evaluation, constrained
            // connectivity included. The classifiers decide what it means.
            Some(ref p)
                if !matches!(
                    p.connectivity,
                    ConnectivityLevel::None | ConnectivityLevel::LocalAccess
                ) =>
            {
                let by_signal = signal::classify(p);
                let by_probe = self.prober.probe(p.medium).await;
                let combined = combine(by_signal, by_probe);
                debug!(%by_signal, %by_probe, %combined, "evaluation cycle");
                combined
            }
            // No profile or no route: forced classification, no probe traffic
            _ => SpeedClass::NoInternet,
        };

        if current != self.previous {
            info!(previous = %self.previous, %current, "speed classification changed");
            self.previous = current;
            self.deliver_strength(current);
        }

        self.set_phase(MonitorPhase::Scheduled);
    }

    fn availability(&self) -> bool {
        self.source
            .current_profile()
            .map(|p| p.has_internet_access())
            .unwrap_or(false)
    }

    fn deliver_availability(&self, available: bool) {
        let slots = self.callbacks.read();
        if let Some(cb) = slots.availability.as_ref() {
            if catch_unwind(AssertUnwindSafe(|| cb(available))).is_err() {
                warn!("availability callback panicked");
            }
        }
    }

    fn deliver_strength(&self, class: SpeedClass) {
        debug_assert!(class.is_determined());
        let slots = self.callbacks.read();
        if let Some(cb) = slots.strength.as_ref() {
            if catch_unwind(AssertUnwindSafe(|| cb(class))).is_err() {
                warn!(%class, "strength callback panicked");
            }
        }
    }

    fn set_phase(&self, phase: MonitorPhase) {
        *self.phase.write() = phase;
    }
}
