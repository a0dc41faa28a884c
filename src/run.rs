//! Application execution logic.
//!
//! Wires the validated configuration into monitors and drives them for the
//! `run`, `check` and `status` commands.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use ipwatch::config::{NotifySettings, ValidatedConfig};
use ipwatch::monitor::{CycleOutcome, CycleRunner, Messages, Monitor, Resource, Scheduler};
use ipwatch::network::filter::{FilterChain, FilteredFetcher};
use ipwatch::network::platform::SystemFetcher;
use ipwatch::network::{AddressFetcher, Category, Classification};
use ipwatch::notify::{HttpWebhook, LogNotifier, Notifier, NotifyError};
use ipwatch::probe::{IdentityProbe, LocalInterfaceProbe, RemoteLookupChain, TunnelProbe};
use ipwatch::state::{BaselineStore, FileBaselineStore, StateError};
use ipwatch::time::{Clock, SystemClock, format_rfc3339};
use ipwatch::transport::{HttpClient, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

type AppClient = Arc<ReqwestClient>;
type AppFetcher = FilteredFetcher<SystemFetcher, FilterChain>;
type AppIdentityProbe = IdentityProbe<AppFetcher, AppClient>;
type IdentityMonitor = Monitor<AppIdentityProbe, FileBaselineStore, AppNotifier>;
type TunnelMonitor = Monitor<TunnelProbe<AppClient>, FileBaselineStore, AppNotifier>;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// A command that notifies was started without a webhook URL.
    #[error("No webhook URL configured; set notify.url or pass --dry-run")]
    MissingWebhookUrl,

    /// The address monitor is disabled but `status` needs it.
    #[error("The identity monitor is disabled; status has nothing to report")]
    IdentityDisabled,

    /// Failed to read a baseline for the status report.
    #[error("Failed to read baseline: {0}")]
    Baseline(#[source] StateError),

    /// Failed to serialize the status report.
    #[error("Failed to encode status report: {0}")]
    Report(#[from] serde_json::Error),

    /// At least one cycle of `check` ended in an alert.
    #[error("{failed} of {total} monitor cycle(s) failed")]
    CheckFailed {
        /// Cycles that ended in an alert or panicked
        failed: usize,
        /// Cycles run
        total: usize,
    },
}

/// The notifier used by every monitor of one process.
///
/// One enum instead of a trait object, since [`Notifier`] returns
/// `impl Future` and is not object safe.
#[derive(Debug)]
pub enum AppNotifier {
    /// Deliver to the configured webhook.
    Webhook(HttpWebhook<AppClient>),
    /// Log instead of sending (`--dry-run`).
    DryRun(LogNotifier),
}

impl Notifier for AppNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        match self {
            Self::Webhook(webhook) => webhook.notify(subject, body).await,
            Self::DryRun(log) => log.notify(subject, body).await,
        }
    }
}

/// Creates the notifier for one monitor.
///
/// # Errors
///
/// Returns [`RunError::MissingWebhookUrl`] if no URL is configured outside
/// dry-run mode.
pub fn create_notifier(
    settings: &NotifySettings,
    dry_run: bool,
    resource: Resource,
    client: &AppClient,
) -> Result<AppNotifier, RunError> {
    if dry_run {
        return Ok(AppNotifier::DryRun(LogNotifier::new(resource.label())));
    }

    let url = settings.url.clone().ok_or(RunError::MissingWebhookUrl)?;
    let mut webhook = HttpWebhook::new(Arc::clone(client), url)
        .with_method(settings.method.clone())
        .with_headers(settings.headers.clone())
        .with_resource(resource.label())
        .with_retry_policy(settings.retry_policy.clone());

    if let Some(ref template) = settings.body_template {
        webhook = webhook.with_body_template(template);
    }

    Ok(AppNotifier::Webhook(webhook))
}

/// The monitors enabled by the configuration, with their intervals.
struct Monitors {
    identity: Option<(Arc<IdentityMonitor>, Duration)>,
    tunnel: Option<(Arc<TunnelMonitor>, Duration)>,
}

impl Monitors {
    fn build(config: ValidatedConfig) -> Result<Self, RunError> {
        let client: AppClient = Arc::new(ReqwestClient::new());
        let dry_run = config.dry_run;

        let identity = if config.identity.enabled {
            let settings = config.identity;
            let monitor = Monitor::new(
                identity_probe(&client, settings.filter, settings.lookups, settings.lookup_timeout),
                FileBaselineStore::new(settings.state_file),
                create_notifier(&config.notify, dry_run, Resource::Identity, &client)?,
                Messages::identity(),
            );
            Some((Arc::new(monitor), settings.interval))
        } else {
            None
        };

        let tunnel = if config.tunnel.enabled {
            let settings = config.tunnel;
            let monitor = Monitor::new(
                TunnelProbe::new(Arc::clone(&client), settings.api_url, settings.timeout),
                FileBaselineStore::new(settings.state_file),
                create_notifier(&config.notify, dry_run, Resource::Tunnel, &client)?,
                Messages::tunnel(settings.link_suffix),
            );
            Some((Arc::new(monitor), settings.interval))
        } else {
            None
        };

        Ok(Self { identity, tunnel })
    }
}

fn identity_probe(
    client: &AppClient,
    filter: FilterChain,
    lookups: Vec<url::Url>,
    timeout: Duration,
) -> AppIdentityProbe {
    IdentityProbe::new(
        LocalInterfaceProbe::new(FilteredFetcher::new(SystemFetcher::new(), filter)),
        RemoteLookupChain::new(Arc::clone(client), lookups, timeout),
    )
}

/// Runs every enabled monitor until a shutdown signal arrives.
///
/// Each monitor gets its own [`Scheduler`] task; the first cycle runs
/// immediately. A cycle in progress at shutdown is allowed to finish.
///
/// # Errors
///
/// Returns an error if a notifier cannot be built.
///
/// # Coverage Note
///
/// Excluded from coverage because it waits for OS signals.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    if config.dry_run {
        tracing::info!("Dry-run mode enabled - notifications will be logged but not sent");
    }

    let monitors = Monitors::build(config)?;
    let (stop, stopped) = watch::channel(false);

    let mut tasks = Vec::new();
    if let Some((monitor, interval)) = monitors.identity {
        tracing::info!(
            "Identity baseline: {}",
            monitor.store().path().display()
        );
        tasks.push(spawn_scheduler(monitor, interval, stopped.clone()));
    }
    if let Some((monitor, interval)) = monitors.tunnel {
        tracing::info!(
            "Tunnel baseline: {}, agent: {}",
            monitor.store().path().display(),
            monitor.probe().endpoint()
        );
        tasks.push(spawn_scheduler(monitor, interval, stopped));
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");
    stop.send_replace(true);

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!("Scheduler task failed: {e}");
        }
    }

    Ok(())
}

fn spawn_scheduler<R: CycleRunner>(
    runner: Arc<R>,
    interval: Duration,
    mut stopped: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let shutdown = async move {
            // A dropped sender also means stop.
            let _ = stopped.wait_for(|stop| *stop).await;
        };
        Scheduler::new(interval).run(runner, shutdown).await;
    })
}

/// Runs one cycle of every enabled monitor and returns.
///
/// # Errors
///
/// Returns [`RunError::CheckFailed`] if any cycle ended in an alert, or an
/// error if a notifier cannot be built.
pub async fn check(config: ValidatedConfig) -> Result<(), RunError> {
    let monitors = Monitors::build(config)?;
    let mut outcomes = Vec::new();

    if let Some((monitor, _)) = monitors.identity {
        outcomes.push((Resource::Identity, Scheduler::tick(&monitor).await));
    }
    if let Some((monitor, _)) = monitors.tunnel {
        outcomes.push((Resource::Tunnel, Scheduler::tick(&monitor).await));
    }

    summarize_check(&outcomes)
}

/// Logs each outcome of `check` and fails if any cycle failed.
fn summarize_check(outcomes: &[(Resource, Option<CycleOutcome>)]) -> Result<(), RunError> {
    let mut failed = 0;

    for (resource, outcome) in outcomes {
        match outcome {
            Some(CycleOutcome::Changed(event)) => {
                tracing::info!(%resource, "Changed: {} -> {}", event.previous, event.current);
            }
            Some(outcome) if outcome.is_failure() => {
                tracing::warn!(%resource, "Check failed: {outcome:?}");
                failed += 1;
            }
            Some(outcome) => tracing::info!(%resource, "{outcome:?}"),
            None => {
                tracing::warn!(%resource, "Check panicked");
                failed += 1;
            }
        }
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(RunError::CheckFailed {
            failed,
            total: outcomes.len(),
        })
    }
}

/// One interface in the status report.
#[derive(Debug, Serialize)]
pub struct InterfaceStatus {
    /// Interface name
    pub name: String,
    /// Every IPv4 address on it with its category
    pub addresses: Vec<AddressStatus>,
}

/// One address in the status report.
#[derive(Debug, Serialize)]
pub struct AddressStatus {
    /// Dotted-quad address
    pub address: String,
    /// Its category
    pub category: Category,
}

/// The JSON document printed by `status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Address chosen from the local interfaces, if any
    pub local_address: Option<String>,
    /// Interface carrying `local_address`
    pub local_interface: Option<String>,
    /// Address reported by the first answering lookup endpoint
    pub remote_address: Option<String>,
    /// Endpoint that answered
    pub remote_endpoint: Option<String>,
    /// The value a cycle would compare, local first
    pub current: Option<String>,
    /// Classification of `current`
    pub classification: Option<Classification>,
    /// Saved baseline (`None` when absent)
    pub baseline: Option<String>,
    /// When the baseline was last written
    pub baseline_saved_at: Option<String>,
    /// Whether a cycle would report a change
    pub is_changed: bool,
    /// When this report was produced
    pub checked_at: String,
    /// Per-interface summary after filtering
    pub interfaces: Vec<InterfaceStatus>,
}

/// Builds the status report without writing anything.
///
/// # Errors
///
/// Returns [`RunError::Baseline`] if the baseline exists but cannot be read.
pub async fn build_status<F, H, S, C>(
    local: &LocalInterfaceProbe<F>,
    remote: &RemoteLookupChain<H>,
    store: &S,
    clock: &C,
) -> Result<StatusReport, RunError>
where
    F: AddressFetcher,
    H: HttpClient,
    S: BaselineStore,
    C: Clock,
{
    let adapters = match local.fetcher().fetch() {
        Ok(adapters) => adapters,
        Err(e) => {
            tracing::warn!("Local interface scan failed: {e}");
            Vec::new()
        }
    };
    let local_match = LocalInterfaceProbe::<F>::select(&adapters);
    let remote_match = remote.lookup().await;
    let baseline = store.load().map_err(RunError::Baseline)?;

    let local_address = local_match.as_ref().map(|m| m.address.to_string());
    let remote_address = remote_match.as_ref().map(|m| m.address.clone());
    let current = local_address.clone().or_else(|| remote_address.clone());

    let is_changed = match &current {
        Some(value) => baseline.as_ref().is_none_or(|b| b.value != *value),
        None => false,
    };

    let interfaces = adapters
        .iter()
        .map(|adapter| InterfaceStatus {
            name: adapter.name.clone(),
            addresses: adapter
                .ipv4_addresses
                .iter()
                .map(|addr| AddressStatus {
                    address: addr.to_string(),
                    category: Category::of(*addr),
                })
                .collect(),
        })
        .collect();

    Ok(StatusReport {
        local_interface: local_match.map(|m| m.interface),
        local_address,
        remote_endpoint: remote_match.map(|m| m.endpoint.to_string()),
        remote_address,
        classification: current.as_deref().map(Classification::of),
        current,
        baseline_saved_at: baseline
            .as_ref()
            .and_then(|b| b.persisted_at)
            .map(format_rfc3339),
        baseline: baseline.map(|b| b.value),
        is_changed,
        checked_at: format_rfc3339(clock.now()),
        interfaces,
    })
}

/// Prints the identity status report as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if the identity monitor is disabled, the baseline
/// cannot be read or the report cannot be encoded.
pub async fn status(config: ValidatedConfig) -> Result<(), RunError> {
    if !config.identity.enabled {
        return Err(RunError::IdentityDisabled);
    }

    let client: AppClient = Arc::new(ReqwestClient::new());
    let settings = config.identity;
    let probe = identity_probe(
        &client,
        settings.filter,
        settings.lookups,
        settings.lookup_timeout,
    );
    let store = FileBaselineStore::new(settings.state_file);

    let report = build_status(probe.local(), probe.remote(), &store, &SystemClock).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is never observed.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
