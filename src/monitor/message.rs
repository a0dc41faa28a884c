//! Plain-text notification messages for each cycle outcome.

use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

use super::ChangeEvent;
use crate::network::Category;
use crate::probe::{ProbeError, ProbeResult};
use crate::time::format_rfc3339;

/// The kind of resource a monitor watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// The machine's IPv4 address.
    Identity,
    /// The public URL of the secure tunnel.
    Tunnel,
}

impl Resource {
    /// Short label used in logs and webhook payloads.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Tunnel => "tunnel",
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Identity => "IP address",
            Self::Tunnel => "tunnel URL",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// One-line subject.
    pub subject: String,
    /// Multi-line plain-text body.
    pub body: String,
}

impl Message {
    fn new(subject: impl Into<String>, lines: &[String]) -> Self {
        Self {
            subject: subject.into(),
            body: lines.join("\n"),
        }
    }
}

/// Renders the messages of one monitor.
#[derive(Debug, Clone)]
pub struct Messages {
    resource: Resource,
    link_suffix: String,
}

impl Messages {
    /// Messages for the address monitor.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            resource: Resource::Identity,
            link_suffix: String::new(),
        }
    }

    /// Messages for the tunnel monitor. `link_suffix` is appended to every
    /// URL shown.
    #[must_use]
    pub fn tunnel(link_suffix: impl Into<String>) -> Self {
        Self {
            resource: Resource::Tunnel,
            link_suffix: link_suffix.into(),
        }
    }

    /// The resource these messages describe.
    #[must_use]
    pub const fn resource(&self) -> Resource {
        self.resource
    }

    /// A value changed (or was seen for the first time).
    #[must_use]
    pub fn changed(&self, event: &ChangeEvent, probe: Option<&ProbeResult>) -> Message {
        match self.resource {
            Resource::Identity => Self::identity_changed(event, probe),
            Resource::Tunnel => self.tunnel_changed(event),
        }
    }

    fn identity_changed(event: &ChangeEvent, probe: Option<&ProbeResult>) -> Message {
        let category = event.classification.category;
        let hint = if category == Category::Public {
            "A public address change means the internet connection itself changed."
        } else {
            "Check the network settings and update anything that depends on this address."
        };
        let method = probe.map_or_else(
            || "unknown".to_string(),
            |p| format!("{} ({})", p.source, p.source_detail),
        );

        Message::new(
            format!("{category} IP address changed: {}", event.current),
            &[
                "The IP address has changed.".to_string(),
                String::new(),
                format!("Previous: {}", or_none(&event.previous)),
                format!("Current: {}", event.current),
                format!("Category: {category}"),
                format!("Detected at: {}", format_rfc3339(event.detected_at)),
                String::new(),
                hint.to_string(),
                String::new(),
                format!("Detection method: {method}"),
            ],
        )
    }

    fn tunnel_changed(&self, event: &ChangeEvent) -> Message {
        let previous = if event.is_first_observation() {
            "none".to_string()
        } else {
            self.link(&event.previous)
        };
        let current = self.link(&event.current);

        Message::new(
            format!("New tunnel URL: {current}"),
            &[
                format!("Tunnel URL changed: {previous} -> {current}"),
                format!("Detected at: {}", format_rfc3339(event.detected_at)),
            ],
        )
    }

    /// No value could be determined.
    #[must_use]
    pub fn undetectable(&self, error: &ProbeError, at: SystemTime) -> Message {
        let time = format!("Time: {}", format_rfc3339(at));
        match self.resource {
            Resource::Identity => Message::new(
                "Could not determine IP address",
                &[
                    "The IP address could not be determined.".to_string(),
                    String::new(),
                    "Please check the network connection:".to_string(),
                    "- modem/router connection".to_string(),
                    "- network adapter status".to_string(),
                    "- internet connectivity".to_string(),
                    String::new(),
                    format!("Reason: {error}"),
                    time,
                ],
            ),
            Resource::Tunnel => Message::new(
                "No secure tunnel open",
                &[
                    "The tunnel agent is running but reports no https tunnel.".to_string(),
                    String::new(),
                    format!("Reason: {error}"),
                    time,
                ],
            ),
        }
    }

    /// The introspection endpoint itself could not be reached.
    #[must_use]
    pub fn unreachable(&self, error: &ProbeError, at: SystemTime) -> Message {
        Message::new(
            format!("{} source unreachable", capitalize(self.resource.noun())),
            &[
                format!("Could not reach the {} source.", self.resource.noun()),
                String::new(),
                format!("Reason: {error}"),
                format!("Time: {}", format_rfc3339(at)),
                String::new(),
                "The agent may be down.".to_string(),
            ],
        )
    }

    /// Something unexpected went wrong inside the cycle.
    #[must_use]
    pub fn internal_error(&self, message: &str, at: SystemTime) -> Message {
        Message::new(
            format!("{} monitor internal error", capitalize(self.resource.noun())),
            &[
                format!("An error occurred while monitoring the {}.", self.resource.noun()),
                String::new(),
                format!("Error: {message}"),
                format!("Time: {}", format_rfc3339(at)),
                String::new(),
                "Please check the system.".to_string(),
            ],
        )
    }

    fn link(&self, url: &str) -> String {
        format!("{url}{}", self.link_suffix)
    }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "none" } else { value }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeSource;

    const AT: u64 = 1_700_000_000;

    fn at() -> SystemTime {
        SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(AT)
    }

    #[test]
    fn identity_change_lists_details() {
        let event = ChangeEvent::new("203.0.113.1", "203.0.113.9", at());
        let probe = ProbeResult::new(
            "203.0.113.9",
            ProbeSource::RemoteLookup,
            "https://api.ipify.org/",
            at(),
        );

        let message = Messages::identity().changed(&event, Some(&probe));

        assert_eq!(message.subject, "Public IP address changed: 203.0.113.9");
        assert!(message.body.contains("Previous: 203.0.113.1"));
        assert!(message.body.contains("Current: 203.0.113.9"));
        assert!(message.body.contains("Category: Public"));
        assert!(message.body.contains("Detected at: 2023-11-14T22:13:20Z"));
        assert!(message.body.contains("internet connection itself changed"));
        assert!(
            message
                .body
                .contains("Detection method: external lookup service (https://api.ipify.org/)")
        );
    }

    #[test]
    fn first_identity_observation_shows_none() {
        let event = ChangeEvent::new("", "192.168.1.100", at());
        let probe = ProbeResult::new("192.168.1.100", ProbeSource::LocalInterface, "eth0", at());

        let message = Messages::identity().changed(&event, Some(&probe));

        assert_eq!(message.subject, "Private IP address changed: 192.168.1.100");
        assert!(message.body.contains("Previous: none"));
        assert!(message.body.contains("Check the network settings"));
        assert!(message.body.contains("network interface (eth0)"));
    }

    #[test]
    fn tunnel_change_appends_suffix() {
        let event = ChangeEvent::new("https://old.example", "https://new.example", at());

        let message = Messages::tunnel("/upload").changed(&event, None);

        assert_eq!(message.subject, "New tunnel URL: https://new.example/upload");
        assert!(
            message
                .body
                .contains("https://old.example/upload -> https://new.example/upload")
        );
    }

    #[test]
    fn first_tunnel_observation_has_no_previous_link() {
        let event = ChangeEvent::new("", "https://new.example", at());

        let message = Messages::tunnel("/upload").changed(&event, None);

        assert!(message.body.starts_with("Tunnel URL changed: none -> "));
    }

    #[test]
    fn identity_undetectable_has_checklist() {
        let error = ProbeError::AllProbesExhausted { attempts: 4 };

        let message = Messages::identity().undetectable(&error, at());

        assert_eq!(message.subject, "Could not determine IP address");
        assert!(message.body.contains("- modem/router connection"));
        assert!(message.body.contains("Time: 2023-11-14T22:13:20Z"));
    }

    #[test]
    fn tunnel_unreachable_names_endpoint() {
        let error = ProbeError::IntrospectionUnreachable {
            endpoint: "http://127.0.0.1:4040/api/tunnels".to_string(),
            reason: "refused".to_string(),
        };

        let message = Messages::tunnel("").unreachable(&error, at());

        assert_eq!(message.subject, "Tunnel URL source unreachable");
        assert!(message.body.contains("http://127.0.0.1:4040/api/tunnels"));
    }

    #[test]
    fn internal_error_carries_message() {
        let message = Messages::identity().internal_error("disk on fire", at());

        assert_eq!(message.subject, "IP address monitor internal error");
        assert!(message.body.contains("Error: disk on fire"));
    }

    #[test]
    fn resource_labels() {
        assert_eq!(Resource::Identity.to_string(), "identity");
        assert_eq!(Resource::Tunnel.label(), "tunnel");
    }
}
