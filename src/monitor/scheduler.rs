//! Fixed-interval trigger for monitoring cycles.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

use crate::notify::Notifier;
use crate::probe::Probe;
use crate::state::BaselineStore;
use crate::time::Clock;

use super::{CycleOutcome, Monitor, Resource};

/// Something the scheduler can drive.
pub trait CycleRunner: Send + Sync + 'static {
    /// The resource being monitored, for logs.
    fn resource(&self) -> Resource;

    /// Runs one cycle.
    fn run_cycle(&self) -> impl Future<Output = CycleOutcome> + Send;

    /// Reports a failure the cycle could not report itself.
    fn alert_internal_error(&self, message: &str) -> impl Future<Output = ()> + Send;
}

impl<P, S, N, C> CycleRunner for Monitor<P, S, N, C>
where
    P: Probe + 'static,
    S: BaselineStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    fn resource(&self) -> Resource {
        Self::resource(self)
    }

    async fn run_cycle(&self) -> CycleOutcome {
        Self::run_cycle(self).await
    }

    async fn alert_internal_error(&self, message: &str) {
        Self::alert_internal_error(self, message).await;
    }
}

/// Invokes a runner once immediately and then every `interval`.
///
/// Each cycle runs in its own task and is awaited before the next tick is
/// considered, so cycles never overlap. Ticks that fall due while a cycle
/// is running are skipped, not queued. A panicking cycle is reported
/// through [`CycleRunner::alert_internal_error`] and scheduling continues.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler with the given interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns the interval between cycles.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until `shutdown` completes.
    ///
    /// A cycle already running when `shutdown` fires is allowed to finish.
    pub async fn run<R, F>(&self, runner: Arc<R>, shutdown: F)
    where
        R: CycleRunner,
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = IntervalStream::new(interval);

        tracing::info!(
            resource = %runner.resource(),
            "Scheduling cycles every {}s",
            self.interval.as_secs()
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::debug!(resource = %runner.resource(), "Scheduler stopping");
                    break;
                }

                tick = ticks.next() => {
                    if tick.is_none() {
                        break;
                    }
                    Self::tick(&runner).await;
                }
            }
        }
    }

    /// Runs a single cycle in its own task.
    ///
    /// Returns `None` if the cycle panicked; the panic has been reported.
    pub async fn tick<R: CycleRunner>(runner: &Arc<R>) -> Option<CycleOutcome> {
        let task = {
            let runner = Arc::clone(runner);
            tokio::spawn(async move { runner.run_cycle().await })
        };

        match task.await {
            Ok(outcome) => {
                tracing::debug!(resource = %runner.resource(), "Cycle finished: {outcome:?}");
                Some(outcome)
            }
            Err(e) => {
                let message = if e.is_panic() {
                    format!("cycle panicked: {}", panic_message(&*e.into_panic()))
                } else {
                    "cycle task was cancelled".to_string()
                };
                runner.alert_internal_error(&message).await;
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
