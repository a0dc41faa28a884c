//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use handlebars::Handlebars;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use url::Url;

use crate::network::filter::{FilterChain, NameRegexFilter};
use crate::notify::RetryPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{IdentitySection, TomlConfig, TunnelSection};

/// Where and how notifications are delivered.
#[derive(Debug)]
pub struct NotifySettings {
    /// Webhook URL. `None` only in dry-run mode or for commands that never
    /// notify.
    pub url: Option<Url>,
    /// HTTP method for webhook requests
    pub method: Method,
    /// HTTP headers for webhook requests
    pub headers: HeaderMap,
    /// Handlebars body template (optional)
    pub body_template: Option<String>,
    /// Retry policy for failed deliveries
    pub retry_policy: RetryPolicy,
}

/// Settings of the address monitor.
#[derive(Debug)]
pub struct IdentitySettings {
    /// Whether the monitor runs
    pub enabled: bool,
    /// Time between cycles
    pub interval: Duration,
    /// Baseline file
    pub state_file: PathBuf,
    /// Per-endpoint timeout
    pub lookup_timeout: Duration,
    /// Remote lookup endpoints in priority order
    pub lookups: Vec<Url>,
    /// Interface name filter applied before the local scan
    pub filter: FilterChain,
}

/// Settings of the tunnel monitor.
#[derive(Debug)]
pub struct TunnelSettings {
    /// Whether the monitor runs
    pub enabled: bool,
    /// Introspection endpoint
    pub api_url: Url,
    /// Time between cycles
    pub interval: Duration,
    /// Introspection call timeout
    pub timeout: Duration,
    /// Baseline file
    pub state_file: PathBuf,
    /// Appended to URLs in notifications
    pub link_suffix: String,
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Notification delivery
    pub notify: NotifySettings,
    /// Address monitor
    pub identity: IdentitySettings,
    /// Tunnel monitor
    pub tunnel: TunnelSettings,
    /// Dry-run mode (log notifications without sending them)
    pub dry_run: bool,
    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self
            .notify
            .url
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);

        write!(
            f,
            "Config {{ url: {url}, method: {}, retry: {}x/{}s, dry_run: {}",
            self.notify.method,
            self.notify.retry_policy.max_attempts,
            self.notify.retry_policy.initial_delay.as_secs(),
            self.dry_run,
        )?;

        if self.identity.enabled {
            write!(
                f,
                ", identity: every {}s, {} lookup(s), {} filter(s), state: {}",
                self.identity.interval.as_secs(),
                self.identity.lookups.len(),
                self.identity.filter.len(),
                self.identity.state_file.display(),
            )?;
        }

        if self.tunnel.enabled {
            write!(
                f,
                ", tunnel: every {}s via {}, state: {}",
                self.tunnel.interval.as_secs(),
                self.tunnel.api_url,
                self.tunnel.state_file.display(),
            )?;
        }

        f.write_str(" }")
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The webhook URL is missing for a command that notifies (unless dry-run)
    /// - Any URL, regex, header, method or template is invalid
    /// - A duration is zero
    /// - Both monitors are disabled for a command that runs them
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let default_toml = TomlConfig::default();
        let toml = toml.unwrap_or(&default_toml);

        let notify = Self::resolve_notify(cli, toml)?;
        let identity = Self::resolve_identity(cli, &toml.identity)?;
        let tunnel = Self::resolve_tunnel(cli, &toml.tunnel)?;

        if cli.sends_notifications() && !identity.enabled && !tunnel.enabled {
            return Err(ConfigError::NothingToMonitor);
        }

        Ok(Self {
            notify,
            identity,
            tunnel,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = cli.config.as_deref().map(TomlConfig::load).transpose()?;
        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_notify(cli: &Cli, toml: &TomlConfig) -> Result<NotifySettings, ConfigError> {
        let url = match cli.url.as_deref().or(toml.notify.url.as_deref()) {
            Some(url) => Some(parse_url(field::URL, url)?),
            None if cli.sends_notifications() && !cli.dry_run => {
                return Err(ConfigError::missing(
                    field::URL,
                    "Use --url, set notify.url in the config file, or pass --dry-run",
                ));
            }
            None => None,
        };

        Ok(NotifySettings {
            url,
            method: resolve_method(cli, toml)?,
            headers: resolve_headers(cli, toml)?,
            body_template: resolve_body_template(cli, toml)?,
            retry_policy: build_retry_policy(cli, toml)?,
        })
    }

    fn resolve_identity(
        cli: &Cli,
        section: &IdentitySection,
    ) -> Result<IdentitySettings, ConfigError> {
        let enabled = !cli.no_identity && section.enabled.unwrap_or(true);

        let interval = positive_secs(
            "identity.interval",
            cli.interval
                .or(section.interval)
                .unwrap_or(defaults::IDENTITY_INTERVAL_SECS),
        )?;

        let lookup_timeout = positive_secs(
            "identity.lookup_timeout",
            cli.lookup_timeout
                .or(section.lookup_timeout)
                .unwrap_or(defaults::LOOKUP_TIMEOUT_SECS),
        )?;

        // CLI endpoints replace the TOML list entirely.
        let sources: Vec<&str> = if !cli.lookups.is_empty() {
            cli.lookups.iter().map(String::as_str).collect()
        } else if let Some(list) = &section.lookup {
            list.iter().map(String::as_str).collect()
        } else {
            defaults::LOOKUP_ENDPOINTS.to_vec()
        };
        let lookups = sources
            .into_iter()
            .map(|u| parse_url(field::LOOKUP, u))
            .collect::<Result<Vec<_>, _>>()?;

        if enabled && lookups.is_empty() {
            return Err(ConfigError::NoLookupEndpoints);
        }

        let state_file = cli
            .identity_state
            .clone()
            .or_else(|| section.state_file.as_deref().map(PathBuf::from))
            .map_or_else(defaults::identity_state_file, |p| expand_tilde(&p));

        Ok(IdentitySettings {
            enabled,
            interval,
            state_file,
            lookup_timeout,
            lookups,
            filter: build_filter(cli, section)?,
        })
    }

    fn resolve_tunnel(cli: &Cli, section: &TunnelSection) -> Result<TunnelSettings, ConfigError> {
        let enabled = cli.tunnel || section.enabled.unwrap_or(false);

        let api_url = parse_url(
            field::TUNNEL_API,
            cli.tunnel_api
                .as_deref()
                .or(section.api_url.as_deref())
                .unwrap_or(defaults::TUNNEL_API_URL),
        )?;

        let interval = positive_secs(
            "tunnel.interval",
            cli.tunnel_interval
                .or(section.interval)
                .unwrap_or(defaults::TUNNEL_INTERVAL_SECS),
        )?;

        let timeout = positive_secs(
            "tunnel.timeout",
            section.timeout.unwrap_or(defaults::TUNNEL_TIMEOUT_SECS),
        )?;

        let state_file = cli
            .tunnel_state
            .clone()
            .or_else(|| section.state_file.as_deref().map(PathBuf::from))
            .map_or_else(defaults::tunnel_state_file, |p| expand_tilde(&p));

        let link_suffix = cli
            .link_suffix
            .clone()
            .or_else(|| section.link_suffix.clone())
            .unwrap_or_default();

        Ok(TunnelSettings {
            enabled,
            api_url,
            interval,
            timeout,
            state_file,
            link_suffix,
        })
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn resolve_method(cli: &Cli, toml: &TomlConfig) -> Result<Method, ConfigError> {
    // Priority: CLI explicit > TOML > default
    let method_str = cli
        .method
        .as_deref()
        .or(toml.notify.method.as_deref())
        .unwrap_or(defaults::METHOD);

    method_str
        .parse::<Method>()
        .map_err(|_| ConfigError::InvalidMethod(method_str.to_string()))
}

fn resolve_headers(cli: &Cli, toml: &TomlConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &toml.notify.headers {
        headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
    }

    // CLI headers override TOML headers of the same name.
    for header_str in &cli.headers {
        let (name, value) = parse_header_string(header_str)?;
        headers.insert(parse_header_name(&name)?, parse_header_value(&name, &value)?);
    }

    let bearer = cli.bearer.as_deref().or(toml.notify.bearer.as_deref());
    if let Some(token) = bearer {
        let header_value = parse_header_value("Authorization", &format!("Bearer {token}"))?;
        headers.insert(AUTHORIZATION, header_value);
    }

    Ok(headers)
}

fn resolve_body_template(cli: &Cli, toml: &TomlConfig) -> Result<Option<String>, ConfigError> {
    let template = cli
        .body_template
        .clone()
        .or_else(|| toml.notify.body_template.clone());

    if let Some(ref tmpl) = template {
        // Syntax check only: render against an empty context.
        Handlebars::new()
            .render_template(tmpl, &serde_json::json!({}))
            .map_err(|e| ConfigError::InvalidTemplate {
                reason: e.to_string(),
            })?;
    }

    Ok(template)
}

fn build_filter(cli: &Cli, section: &IdentitySection) -> Result<FilterChain, ConfigError> {
    // CLI patterns replace TOML patterns, include and exclude independently.
    let includes = if cli.include_interfaces.is_empty() {
        &section.include_interfaces
    } else {
        &cli.include_interfaces
    };
    let excludes = if cli.exclude_interfaces.is_empty() {
        &section.exclude_interfaces
    } else {
        &cli.exclude_interfaces
    };

    let mut chain = FilterChain::new();
    for pattern in includes {
        chain = chain.include(regex_filter(pattern)?);
    }
    for pattern in excludes {
        chain = chain.exclude(regex_filter(pattern)?);
    }

    Ok(chain)
}

fn build_retry_policy(cli: &Cli, toml: &TomlConfig) -> Result<RetryPolicy, ConfigError> {
    let retry = &toml.retry;

    // Priority: CLI explicit > TOML > default
    let max_attempts = cli
        .retry_max
        .or(retry.max_attempts)
        .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

    let initial_delay_secs = cli
        .retry_delay
        .or(retry.initial_delay)
        .unwrap_or(defaults::RETRY_INITIAL_DELAY_SECS);

    let max_delay_secs = retry.max_delay.unwrap_or(defaults::RETRY_MAX_DELAY_SECS);
    let multiplier = retry.multiplier.unwrap_or(defaults::RETRY_MULTIPLIER);

    if max_attempts == 0 {
        return Err(ConfigError::InvalidRetry(
            "max_attempts must be greater than 0".to_string(),
        ));
    }

    if initial_delay_secs == 0 {
        return Err(ConfigError::InvalidRetry(
            "initial_delay must be greater than 0".to_string(),
        ));
    }

    if multiplier <= 0.0 || !multiplier.is_finite() {
        return Err(ConfigError::InvalidRetry(
            "multiplier must be a positive finite number".to_string(),
        ));
    }

    if max_delay_secs < initial_delay_secs {
        return Err(ConfigError::InvalidRetry(format!(
            "max_delay ({max_delay_secs}s) must be >= initial_delay ({initial_delay_secs}s)"
        )));
    }

    Ok(RetryPolicy::new()
        .with_max_attempts(max_attempts)
        .with_initial_delay(Duration::from_secs(initial_delay_secs))
        .with_max_delay(Duration::from_secs(max_delay_secs))
        .with_multiplier(multiplier))
}

fn positive_secs(field: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_url(field: &'static str, url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            field,
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(parsed)
}

fn regex_filter(pattern: &str) -> Result<NameRegexFilter, ConfigError> {
    NameRegexFilter::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source: e,
    })
}

/// Expands a leading `~/` to the home directory.
pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // Try "Key=Value" format first
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    // Try "Key: Value" format
    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::InvalidHeader {
        value: s.to_string(),
    })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
