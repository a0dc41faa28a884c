//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.notify.url.is_none());
        assert!(config.identity.enabled.is_none());
        assert!(config.identity.lookup.is_none());
        assert!(config.tunnel.enabled.is_none());
        assert!(config.retry.max_attempts.is_none());
    }

    #[test]
    fn parse_notify_section() {
        let config = TomlConfig::parse(
            r#"
            [notify]
            url = "https://hooks.example.com/x"
            method = "PUT"
            bearer = "secret"
            body_template = '{"text": "{{subject}}"}'

            [notify.headers]
            X-Custom = "value"
        "#,
        )
        .unwrap();

        let notify = &config.notify;
        assert_eq!(notify.url.as_deref(), Some("https://hooks.example.com/x"));
        assert_eq!(notify.method.as_deref(), Some("PUT"));
        assert_eq!(notify.bearer.as_deref(), Some("secret"));
        assert_eq!(notify.body_template.as_deref(), Some(r#"{"text": "{{subject}}"}"#));
        assert_eq!(notify.headers.get("X-Custom").map(String::as_str), Some("value"));
    }

    #[test]
    fn parse_identity_section() {
        let config = TomlConfig::parse(
            r#"
            [identity]
            enabled = true
            interval = 900
            state_file = "~/ip.txt"
            lookup_timeout = 5
            lookup = ["https://a.example", "https://b.example"]
            include_interfaces = ["^eth"]
            exclude_interfaces = ["^docker", "^veth"]
        "#,
        )
        .unwrap();

        let identity = &config.identity;
        assert_eq!(identity.enabled, Some(true));
        assert_eq!(identity.interval, Some(900));
        assert_eq!(identity.state_file.as_deref(), Some("~/ip.txt"));
        assert_eq!(identity.lookup_timeout, Some(5));
        assert_eq!(identity.lookup.as_ref().map(Vec::len), Some(2));
        assert_eq!(identity.include_interfaces, ["^eth"]);
        assert_eq!(identity.exclude_interfaces.len(), 2);
    }

    #[test]
    fn parse_tunnel_section() {
        let config = TomlConfig::parse(
            r#"
            [tunnel]
            enabled = true
            api_url = "http://127.0.0.1:4040/api/tunnels"
            interval = 3600
            timeout = 3
            state_file = "/var/lib/ipwatch/tunnel.txt"
            link_suffix = "/upload"
        "#,
        )
        .unwrap();

        let tunnel = &config.tunnel;
        assert_eq!(tunnel.enabled, Some(true));
        assert_eq!(tunnel.interval, Some(3600));
        assert_eq!(tunnel.timeout, Some(3));
        assert_eq!(tunnel.link_suffix.as_deref(), Some("/upload"));
    }

    #[test]
    fn parse_retry_section() {
        let config = TomlConfig::parse(
            r"
            [retry]
            max_attempts = 5
            initial_delay = 2
            max_delay = 120
            multiplier = 1.5
        ",
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, Some(5));
        assert_eq!(config.retry.initial_delay, Some(2));
        assert_eq!(config.retry.max_delay, Some(120));
        assert_eq!(config.retry.multiplier, Some(1.5));
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        assert!(TomlConfig::parse("[webhook]\nurl = \"x\"").is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(TomlConfig::parse("[identity]\npoll_interval = 60").is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(TomlConfig::parse("[identity]\ninterval = \"soon\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TomlConfig::load(std::path::Path::new("/nonexistent/ipwatch.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ipwatch.toml"));
    }
}

mod template {
    use super::*;

    #[test]
    fn default_template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.identity.interval, Some(1800));
        assert!(config.notify.url.is_none());
    }

    #[test]
    fn default_template_documents_every_section() {
        let template = default_config_template();

        for section in ["[notify]", "[identity]", "[tunnel]", "[retry]"] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
