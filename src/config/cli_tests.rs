//! Tests for CLI argument parsing.

use std::path::PathBuf;

use super::cli::{Cli, Command};

mod parsing {
    use super::*;

    #[test]
    fn no_arguments_means_run() {
        let cli = Cli::parse_from_iter(["ipwatch"]);

        assert!(cli.command.is_none());
        assert_eq!(cli.command(), Command::Run);
        assert!(cli.sends_notifications());
    }

    #[test]
    fn parse_http_options() {
        let cli = Cli::parse_from_iter([
            "ipwatch",
            "--url",
            "https://example.com",
            "--method",
            "PUT",
            "--header",
            "X-Api-Key=secret",
            "--header",
            "Content-Type: application/json",
            "--bearer",
            "token123",
            "--body-template",
            r#"{"text":"{{subject}}"}"#,
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://example.com"));
        assert_eq!(cli.method.as_deref(), Some("PUT"));
        assert_eq!(
            cli.headers,
            ["X-Api-Key=secret", "Content-Type: application/json"]
        );
        assert_eq!(cli.bearer.as_deref(), Some("token123"));
        assert_eq!(cli.body_template.as_deref(), Some(r#"{"text":"{{subject}}"}"#));
    }

    #[test]
    fn parse_identity_options() {
        let cli = Cli::parse_from_iter([
            "ipwatch",
            "--interval",
            "600",
            "--lookup-timeout",
            "3",
            "--lookup",
            "https://a.example",
            "--lookup",
            "https://b.example",
            "--identity-state",
            "/tmp/ip.txt",
            "--include-interface",
            "^eth",
            "--exclude-interface",
            "^docker",
        ]);

        assert_eq!(cli.interval, Some(600));
        assert_eq!(cli.lookup_timeout, Some(3));
        assert_eq!(cli.lookups, ["https://a.example", "https://b.example"]);
        assert_eq!(cli.identity_state, Some(PathBuf::from("/tmp/ip.txt")));
        assert_eq!(cli.include_interfaces, ["^eth"]);
        assert_eq!(cli.exclude_interfaces, ["^docker"]);
        assert!(!cli.no_identity);
    }

    #[test]
    fn parse_tunnel_options() {
        let cli = Cli::parse_from_iter([
            "ipwatch",
            "--tunnel",
            "--tunnel-api",
            "http://127.0.0.1:4041/api/tunnels",
            "--tunnel-interval",
            "60",
            "--tunnel-state",
            "/tmp/tunnel.txt",
            "--link-suffix",
            "/upload",
            "--no-identity",
        ]);

        assert!(cli.tunnel);
        assert!(cli.no_identity);
        assert_eq!(
            cli.tunnel_api.as_deref(),
            Some("http://127.0.0.1:4041/api/tunnels")
        );
        assert_eq!(cli.tunnel_interval, Some(60));
        assert_eq!(cli.tunnel_state, Some(PathBuf::from("/tmp/tunnel.txt")));
        assert_eq!(cli.link_suffix.as_deref(), Some("/upload"));
    }

    #[test]
    fn parse_retry_and_flags() {
        let cli = Cli::parse_from_iter([
            "ipwatch",
            "--retry-max",
            "5",
            "--retry-delay",
            "2",
            "--dry-run",
            "-v",
        ]);

        assert_eq!(cli.retry_max, Some(5));
        assert_eq!(cli.retry_delay, Some(2));
        assert!(cli.dry_run);
        assert!(cli.verbose);
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn check_sends_notifications() {
        let cli = Cli::parse_from_iter(["ipwatch", "check"]);

        assert_eq!(cli.command(), Command::Check);
        assert!(cli.sends_notifications());
    }

    #[test]
    fn status_does_not_notify() {
        let cli = Cli::parse_from_iter(["ipwatch", "status"]);

        assert_eq!(cli.command(), Command::Status);
        assert!(!cli.sends_notifications());
    }

    #[test]
    fn init_uses_default_output() {
        let cli = Cli::parse_from_iter(["ipwatch", "init"]);

        assert_eq!(
            cli.command(),
            Command::Init {
                output: PathBuf::from("ipwatch.toml")
            }
        );
        assert!(!cli.sends_notifications());
    }

    #[test]
    fn init_custom_output() {
        let cli = Cli::parse_from_iter(["ipwatch", "init", "-o", "custom.toml"]);

        assert_eq!(
            cli.command(),
            Command::Init {
                output: PathBuf::from("custom.toml")
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from_iter([
            "ipwatch",
            "check",
            "--config",
            "ipwatch.toml",
            "--dry-run",
            "--verbose",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("ipwatch.toml")));
        assert!(cli.dry_run);
        assert!(cli.verbose);
    }
}
