//! One monitor: probe, decide, notify, persist.

use tokio::sync::{Mutex, watch};

use crate::notify::Notifier;
use crate::probe::{Probe, ProbeError, ProbeResult};
use crate::state::BaselineStore;
use crate::time::{Clock, SystemClock};

use super::{Action, ChangeEvent, Message, Messages, Resource, decide};

/// Where a monitor currently is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    /// No cycle running.
    Idle,
    /// Waiting for the probe.
    Probing,
    /// Comparing against the baseline.
    Deciding,
    /// Sending the change notification.
    Notifying,
    /// Writing the new baseline.
    Persisting,
    /// Sending an undetectable, unreachable or internal-error alert.
    AlertingFailure,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The value matched the baseline.
    Unchanged,
    /// A change was notified and the baseline updated.
    Changed(ChangeEvent),
    /// No value could be determined; the baseline was left alone.
    Undetectable,
    /// The tunnel agent could not be reached.
    Unreachable,
    /// An unexpected failure was caught and reported.
    InternalError(String),
    /// Another cycle was already running, so this one did nothing.
    Skipped,
}

impl CycleOutcome {
    /// Returns true if the cycle ended in an alert rather than a decision.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Undetectable | Self::Unreachable | Self::InternalError(_)
        )
    }
}

/// Runs monitoring cycles for one resource.
///
/// At most one cycle runs at a time: a cycle started while another is in
/// flight returns [`CycleOutcome::Skipped`] immediately. A cycle never
/// fails; every failure is turned into a notification and a log line.
///
/// # Type Parameters
///
/// * `P` - The [`Probe`] discovering the current value
/// * `S` - The [`BaselineStore`] owned by this monitor
/// * `N` - The [`Notifier`] receiving alerts
/// * `C` - The [`Clock`] for failure timestamps (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct Monitor<P, S, N, C = SystemClock> {
    probe: P,
    store: S,
    notifier: N,
    clock: C,
    messages: Messages,
    in_flight: Mutex<()>,
    state: watch::Sender<CycleState>,
}

impl<P, S, N> Monitor<P, S, N, SystemClock> {
    /// Creates a monitor using the system clock.
    #[must_use]
    pub fn new(probe: P, store: S, notifier: N, messages: Messages) -> Self {
        Self::with_clock(probe, store, notifier, messages, SystemClock)
    }
}

impl<P, S, N, C> Monitor<P, S, N, C> {
    /// Creates a monitor with a custom clock.
    #[must_use]
    pub fn with_clock(probe: P, store: S, notifier: N, messages: Messages, clock: C) -> Self {
        let (state, _) = watch::channel(CycleState::Idle);
        Self {
            probe,
            store,
            notifier,
            clock,
            messages,
            in_flight: Mutex::new(()),
            state,
        }
    }

    /// The resource this monitor watches.
    #[must_use]
    pub const fn resource(&self) -> Resource {
        self.messages.resource()
    }

    /// The current cycle state.
    #[must_use]
    pub fn state(&self) -> CycleState {
        *self.state.borrow()
    }

    /// Subscribes to cycle state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    /// Returns the probe.
    pub const fn probe(&self) -> &P {
        &self.probe
    }

    /// Returns the baseline store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn enter(&self, state: CycleState) {
        tracing::debug!(resource = %self.resource(), "{state:?}");
        self.state.send_replace(state);
    }
}

impl<P, S, N, C> Monitor<P, S, N, C>
where
    P: Probe,
    S: BaselineStore,
    N: Notifier,
    C: Clock,
{
    /// Runs one cycle to completion, or returns
    /// [`CycleOutcome::Skipped`] if one is already running.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!(resource = %self.resource(), "Cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        };

        let outcome = self.cycle().await;
        self.enter(CycleState::Idle);
        outcome
    }

    /// Reports an unexpected failure that happened outside a normal cycle.
    pub async fn alert_internal_error(&self, message: &str) {
        tracing::error!(resource = %self.resource(), "Monitor internal error: {message}");
        self.enter(CycleState::AlertingFailure);
        let alert = self.messages.internal_error(message, self.clock.now());
        self.send(&alert).await;
        self.enter(CycleState::Idle);
    }

    async fn cycle(&self) -> CycleOutcome {
        self.enter(CycleState::Probing);
        let probed = self.probe.probe().await;

        self.enter(CycleState::Deciding);
        // An unreadable baseline counts as none, so the next write replaces it.
        let baseline = self.store.read().unwrap_or_else(|e| {
            tracing::warn!(resource = %self.resource(), "Ignoring unreadable baseline: {e}");
            String::new()
        });

        let (result, probe_error) = match probed {
            Ok(result) => (Some(result), None),
            Err(e) if e.is_undetectable() => (None, Some(e)),
            Err(e) if e.is_unreachable() => return self.unreachable(&e).await,
            Err(e) => return self.internal_error(&e.to_string()).await,
        };

        let value = result.as_ref().map(|r| r.value.as_str());
        match decide(&baseline, value, self.observed_at(result.as_ref())) {
            Action::NoOp => {
                tracing::info!(resource = %self.resource(), "No change: {baseline}");
                CycleOutcome::Unchanged
            }
            Action::RecordAndNotify(event) => self.record(event, result.as_ref()).await,
            Action::AlertUndetectable => {
                let error = probe_error.unwrap_or(ProbeError::AllProbesExhausted { attempts: 0 });
                self.undetectable(&error).await
            }
        }
    }

    fn observed_at(&self, result: Option<&ProbeResult>) -> std::time::SystemTime {
        result.map_or_else(|| self.clock.now(), |r| r.observed_at)
    }

    async fn record(&self, event: ChangeEvent, probe: Option<&ProbeResult>) -> CycleOutcome {
        tracing::info!(
            resource = %self.resource(),
            "Change detected: {} -> {}",
            if event.previous.is_empty() { "(none)" } else { &event.previous },
            event.current
        );

        self.enter(CycleState::Notifying);
        self.send(&self.messages.changed(&event, probe)).await;

        self.enter(CycleState::Persisting);
        match self.store.write(&event.current).await {
            Ok(()) => tracing::info!(resource = %self.resource(), "Baseline updated to {}", event.current),
            Err(e) => tracing::error!(
                resource = %self.resource(),
                "Failed to persist baseline {}: {e}; the next cycle may report a spurious change",
                event.current
            ),
        }

        CycleOutcome::Changed(event)
    }

    async fn undetectable(&self, error: &ProbeError) -> CycleOutcome {
        tracing::warn!(resource = %self.resource(), "Value undetectable: {error}");
        self.enter(CycleState::AlertingFailure);
        self.send(&self.messages.undetectable(error, self.clock.now()))
            .await;
        CycleOutcome::Undetectable
    }

    async fn unreachable(&self, error: &ProbeError) -> CycleOutcome {
        tracing::error!(resource = %self.resource(), "{error}");
        self.enter(CycleState::AlertingFailure);
        self.send(&self.messages.unreachable(error, self.clock.now()))
            .await;
        CycleOutcome::Unreachable
    }

    async fn internal_error(&self, message: &str) -> CycleOutcome {
        tracing::error!(resource = %self.resource(), "Cycle failed: {message}");
        self.enter(CycleState::AlertingFailure);
        self.send(&self.messages.internal_error(message, self.clock.now()))
            .await;
        CycleOutcome::InternalError(message.to_string())
    }

    async fn send(&self, message: &Message) {
        if let Err(e) = self.notifier.notify(&message.subject, &message.body).await {
            tracing::error!(resource = %self.resource(), "Failed to send notification: {e}");
        }
    }
}
