//! Change detection: comparing a probed value against the baseline.

use std::time::SystemTime;

use crate::network::Classification;

/// A detected change in a monitored value. Exists only to drive one
/// notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The baseline before the change; empty on first observation.
    pub previous: String,
    /// The newly probed value.
    pub current: String,
    /// Classification of `current`. Tunnel URLs classify as invalid.
    pub classification: Classification,
    /// When the probe observed `current`.
    pub detected_at: SystemTime,
}

impl ChangeEvent {
    /// Creates a change event, classifying `current`.
    #[must_use]
    pub fn new(
        previous: impl Into<String>,
        current: impl Into<String>,
        detected_at: SystemTime,
    ) -> Self {
        let current = current.into();
        Self {
            previous: previous.into(),
            classification: Classification::of(&current),
            current,
            detected_at,
        }
    }

    /// Returns true if there was no baseline to compare against.
    #[must_use]
    pub fn is_first_observation(&self) -> bool {
        self.previous.is_empty()
    }
}

/// What a cycle should do after probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The value matches the baseline.
    NoOp,
    /// The value differs from the baseline (or there is none yet).
    RecordAndNotify(ChangeEvent),
    /// No value could be determined. The baseline must not be touched.
    AlertUndetectable,
}

/// Decides the action for a probed value.
///
/// `probed` is `None` when every probe strategy failed. Comparison is exact
/// string equality; callers pass validated, canonical values.
///
/// ```
/// use std::time::SystemTime;
/// use ipwatch::monitor::{Action, decide};
///
/// let now = SystemTime::now();
/// assert_eq!(decide("203.0.113.9", Some("203.0.113.9"), now), Action::NoOp);
/// assert_eq!(decide("203.0.113.9", None, now), Action::AlertUndetectable);
/// assert!(matches!(
///     decide("", Some("203.0.113.9"), now),
///     Action::RecordAndNotify(e) if e.is_first_observation()
/// ));
/// ```
#[must_use]
pub fn decide(baseline: &str, probed: Option<&str>, at: SystemTime) -> Action {
    match probed {
        None => Action::AlertUndetectable,
        Some(value) if value == baseline => Action::NoOp,
        Some(value) => Action::RecordAndNotify(ChangeEvent::new(baseline, value, at)),
    }
}
