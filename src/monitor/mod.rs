//! Monitor layer: turning probes into notifications.
//!
//! This module provides:
//! - Change detection ([`decide`], [`Action`], [`ChangeEvent`])
//! - Notification text ([`Messages`], [`Message`], [`Resource`])
//! - The per-resource cycle state machine ([`Monitor`], [`CycleState`], [`CycleOutcome`])
//! - Fixed-interval triggering ([`Scheduler`], [`CycleRunner`])

mod change;
mod message;
mod orchestrator;
mod scheduler;


pub use change::{Action, ChangeEvent, decide};
pub use message::{Message, Messages, Resource};
pub use orchestrator::{CycleOutcome, CycleState, Monitor};
pub use scheduler::{CycleRunner, Scheduler};
