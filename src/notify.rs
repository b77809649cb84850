//! User-visible notifications and confirmations.
//!
//! Editors and the uploader report every write outcome through a
//! [`Notifier`], exactly once per operation. Destructive operations ask a
//! [`Confirm`] first. The CLI implements both on the terminal
//! (see [`crate::output`]); tests record them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Yes/no gate in front of destructive operations.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Drops notifications. For callers that report outcomes themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _notification: Notification) {}
}

/// Confirms everything (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Capitalize the first letter of a noun for a sentence start.
pub(crate) fn sentence_case(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
