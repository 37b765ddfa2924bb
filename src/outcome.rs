//! The universal return of every validation step.
//!
//! Validation never panics and never allocates an error chain: a failed step is
//! a single human-readable message, and composition passes it outward as-is.
use std::fmt;

use serde_json::Value;

/// Result of a validation step.
pub type Outcome<T> = Result<T, Invalid>;

/// A validation failure. Carries exactly one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalid {
    message: String,
}

impl Invalid {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// `expected <what>, got <input>`
    pub fn expected(what: &str, input: Option<&Value>) -> Self {
        Self::new(format!("expected {what}, got {}", describe(input)))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Invalid {}

/// Render an input slot for a failure message: compact JSON, or `undefined`
/// for an absent value.
pub fn describe(input: Option<&Value>) -> String {
    match input {
        None => "undefined".to_string(),
        Some(value) => value.to_string(),
    }
}
