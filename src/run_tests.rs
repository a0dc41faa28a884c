//! Tests for the run module.

use std::time::SystemTime;

use super::*;

use ipwatch::config::Cli;
use ipwatch::monitor::ChangeEvent;
use ipwatch::network::{AdapterSnapshot, StaticFetcher};
use ipwatch::state::MemoryBaselineStore;
use ipwatch::time::FixedClock;
use ipwatch::transport::{HttpError, HttpRequest, HttpResponse};

fn config(args: &[&str]) -> ValidatedConfig {
    let mut full = vec!["ipwatch"];
    full.extend_from_slice(args);
    ValidatedConfig::from_raw(&Cli::parse_from_iter(full), None).unwrap()
}

fn client() -> AppClient {
    Arc::new(ReqwestClient::new())
}

mod run_error {
    use super::*;

    #[test]
    fn check_failed_counts() {
        let error = RunError::CheckFailed {
            failed: 1,
            total: 2,
        };
        assert_eq!(error.to_string(), "1 of 2 monitor cycle(s) failed");
    }

    #[test]
    fn missing_url_mentions_dry_run() {
        assert!(RunError::MissingWebhookUrl.to_string().contains("--dry-run"));
    }

    #[test]
    fn baseline_displays_source() {
        let error = RunError::Baseline(StateError::Read(std::io::Error::other("disk gone")));
        assert!(error.to_string().contains("disk gone"));
    }
}

mod create_notifier {
    use super::*;

    #[test]
    fn dry_run_logs_only() {
        let config = config(&["--dry-run"]);
        let notifier =
            create_notifier(&config.notify, true, Resource::Identity, &client()).unwrap();

        assert!(matches!(notifier, AppNotifier::DryRun(_)));
    }

    #[test]
    fn webhook_carries_settings() {
        let config = config(&[
            "--url",
            "https://hooks.example.com/ip",
            "--method",
            "PUT",
            "--retry-max",
            "5",
        ]);
        let notifier =
            create_notifier(&config.notify, false, Resource::Tunnel, &client()).unwrap();

        let AppNotifier::Webhook(webhook) = notifier else {
            panic!("expected a webhook notifier");
        };
        assert_eq!(webhook.url().as_str(), "https://hooks.example.com/ip");
        assert_eq!(webhook.method(), &http::Method::PUT);
        assert_eq!(webhook.resource(), "tunnel");
        assert_eq!(webhook.retry_policy().max_attempts, 5);
    }

    #[test]
    fn missing_url_outside_dry_run() {
        // `status` accepts a config without a URL.
        let config = config(&["status"]);
        let result = create_notifier(&config.notify, false, Resource::Identity, &client());

        assert!(matches!(result, Err(RunError::MissingWebhookUrl)));
    }

    #[tokio::test]
    async fn dry_run_notify_succeeds() {
        let notifier = AppNotifier::DryRun(LogNotifier::new("identity"));
        assert!(notifier.notify("subject", "body").await.is_ok());
    }
}

mod monitors {
    use super::*;

    #[test]
    fn builds_only_enabled_monitors() {
        let monitors = Monitors::build(config(&["--dry-run"])).unwrap();

        assert!(monitors.identity.is_some());
        assert!(monitors.tunnel.is_none());
    }

    #[test]
    fn carries_intervals_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let tunnel_state = dir.path().join("tunnel.txt");
        let monitors = Monitors::build(config(&[
            "--dry-run",
            "--tunnel",
            "--no-identity",
            "--tunnel-interval",
            "90",
            "--tunnel-state",
            tunnel_state.to_str().unwrap(),
        ]))
        .unwrap();

        let (monitor, interval) = monitors.tunnel.unwrap();
        assert!(monitors.identity.is_none());
        assert_eq!(interval, Duration::from_secs(90));
        assert_eq!(monitor.store().path(), tunnel_state.as_path());
        assert_eq!(monitor.resource(), Resource::Tunnel);
    }
}

mod summarize_check {
    use super::*;

    #[test]
    fn all_quiet_is_ok() {
        let outcomes = [
            (Resource::Identity, Some(CycleOutcome::Unchanged)),
            (Resource::Tunnel, Some(CycleOutcome::Skipped)),
        ];
        assert!(summarize_check(&outcomes).is_ok());
    }

    #[test]
    fn change_is_not_a_failure() {
        let event = ChangeEvent::new("", "203.0.113.9", SystemTime::UNIX_EPOCH);
        let outcomes = [(Resource::Identity, Some(CycleOutcome::Changed(event)))];

        assert!(summarize_check(&outcomes).is_ok());
    }

    #[test]
    fn alerts_and_panics_count_as_failures() {
        let outcomes = [
            (Resource::Identity, Some(CycleOutcome::Undetectable)),
            (Resource::Tunnel, None),
            (Resource::Tunnel, Some(CycleOutcome::Unchanged)),
        ];

        assert!(matches!(
            summarize_check(&outcomes),
            Err(RunError::CheckFailed {
                failed: 2,
                total: 3
            })
        ));
    }
}

mod status {
    use super::*;

    /// Answers every request with the same body, or fails to connect.
    struct FixedReply(Option<&'static str>);

    impl HttpClient for FixedReply {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            match self.0 {
                Some(body) => Ok(HttpResponse::ok(body)),
                None => Err(HttpError::Connection("refused".into())),
            }
        }
    }

    fn adapter(name: &str, ips: &[&str]) -> AdapterSnapshot {
        AdapterSnapshot::new(name, ips.iter().map(|ip| ip.parse().unwrap()).collect())
    }

    fn local(adapters: Vec<AdapterSnapshot>) -> LocalInterfaceProbe<StaticFetcher> {
        LocalInterfaceProbe::new(StaticFetcher::new(adapters))
    }

    fn remote(reply: Option<&'static str>) -> RemoteLookupChain<FixedReply> {
        RemoteLookupChain::new(
            FixedReply(reply),
            vec![url::Url::parse("https://lookup.example/ip").unwrap()],
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn local_address_wins_and_differs_from_baseline() {
        let store = MemoryBaselineStore::with_value("198.51.100.1");
        let report = build_status(
            &local(vec![adapter("lo", &["127.0.0.1"]), adapter("eth0", &["203.0.113.9"])]),
            &remote(Some("198.51.100.7\n")),
            &store,
            &FixedClock::at_unix(1_700_000_000),
        )
        .await
        .unwrap();

        assert_eq!(report.local_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(report.local_interface.as_deref(), Some("eth0"));
        assert_eq!(report.remote_address.as_deref(), Some("198.51.100.7"));
        assert_eq!(report.current.as_deref(), Some("203.0.113.9"));
        assert_eq!(report.baseline.as_deref(), Some("198.51.100.1"));
        assert!(report.baseline_saved_at.is_some());
        assert!(report.is_changed);
        assert_eq!(report.checked_at, "2023-11-14T22:13:20Z");
        assert_eq!(
            report.classification.map(|c| c.category),
            Some(Category::Public)
        );
    }

    #[tokio::test]
    async fn falls_back_to_remote_address() {
        let store = MemoryBaselineStore::with_value("198.51.100.7");
        let report = build_status(
            &local(vec![]),
            &remote(Some("198.51.100.7")),
            &store,
            &FixedClock::at_unix(0),
        )
        .await
        .unwrap();

        assert!(report.local_address.is_none());
        assert_eq!(report.current.as_deref(), Some("198.51.100.7"));
        assert_eq!(
            report.remote_endpoint.as_deref(),
            Some("https://lookup.example/ip")
        );
        assert!(!report.is_changed);
    }

    #[tokio::test]
    async fn nothing_detected_is_not_a_change() {
        let store = MemoryBaselineStore::with_value("198.51.100.7");
        let report = build_status(&local(vec![]), &remote(None), &store, &FixedClock::at_unix(0))
            .await
            .unwrap();

        assert!(report.current.is_none());
        assert!(report.classification.is_none());
        assert!(!report.is_changed);
    }

    #[tokio::test]
    async fn first_observation_is_a_change() {
        let store = MemoryBaselineStore::new();
        let report = build_status(
            &local(vec![adapter("eth0", &["192.168.1.20"])]),
            &remote(None),
            &store,
            &FixedClock::at_unix(0),
        )
        .await
        .unwrap();

        assert!(report.baseline.is_none());
        assert!(report.is_changed);
        assert_eq!(
            report.classification.map(|c| c.is_private),
            Some(true)
        );
    }

    #[tokio::test]
    async fn status_never_writes_the_baseline() {
        let store = MemoryBaselineStore::new();
        build_status(
            &local(vec![adapter("eth0", &["203.0.113.9"])]),
            &remote(None),
            &store,
            &FixedClock::at_unix(0),
        )
        .await
        .unwrap();

        assert_eq!(store.writes(), 0);
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn interfaces_list_every_address_with_category() {
        let store = MemoryBaselineStore::new();
        let report = build_status(
            &local(vec![
                adapter("lo", &["127.0.0.1"]),
                adapter("eth0", &["10.0.0.5", "169.254.1.1"]),
            ]),
            &remote(None),
            &store,
            &FixedClock::at_unix(0),
        )
        .await
        .unwrap();

        assert_eq!(report.interfaces.len(), 2);
        assert_eq!(report.interfaces[0].addresses[0].category, Category::Loopback);
        assert_eq!(report.interfaces[1].addresses.len(), 2);
        assert_eq!(report.interfaces[1].addresses[0].category, Category::Private);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["interfaces"][0]["addresses"][0]["category"], "loopback");
        assert_eq!(json["current"], "10.0.0.5");
    }
}
