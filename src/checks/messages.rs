// SPDX-License-Identifier: MIT
//! Leveled diagnostic messages returned by health checks.
//!
//! A check reports zero or more [`CheckMessage`]s. Each message carries a
//! numeric severity (the constants below), optional remediation text, an
//! optional subject, and an optional stable id used for silencing.

use std::fmt;

/// Severity of a debugging finding.
pub const DEBUG: u8 = 10;
/// Severity of an informational finding.
pub const INFO: u8 = 20;
/// Severity of a finding that degrades the service but leaves it usable.
pub const WARNING: u8 = 30;
/// Severity of a finding that makes a dependency unusable.
pub const ERROR: u8 = 40;
/// Severity of a finding that makes the whole service unusable.
pub const CRITICAL: u8 = 50;

/// Map a numeric severity to its lowercase status label.
///
/// Total over all inputs: `0` maps to `"ok"`, the five defined severities map
/// to their names, and everything else maps to `"unknown"`.
pub fn level_to_text(level: u8) -> &'static str {
    match level {
        0 => "ok",
        DEBUG => "debug",
        INFO => "info",
        WARNING => "warning",
        ERROR => "error",
        CRITICAL => "critical",
        _ => "unknown",
    }
}

/// One diagnostic finding from a health check.
///
/// Construct one with the per-severity constructors and refine it with the
/// builder setters:
///
/// ```rust
/// use dockerflow::checks::CheckMessage;
///
/// let msg = CheckMessage::error("could not connect to the database")
///     .with_id("myapp.health.E001")
///     .with_hint("is the DATABASE_URL reachable from this pod?");
/// ```
///
/// Messages are plain values: construction never fails and level values are
/// accepted as-is, including ones outside the defined severities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    text: String,
    level: u8,
    hint: Option<String>,
    subject: Option<String>,
    id: Option<String>,
}

impl CheckMessage {
    /// Create a message with an explicit severity.
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
            hint: None,
            subject: None,
            id: None,
        }
    }

    /// Create a [`DEBUG`]-level message.
    pub fn debug(text: impl Into<String>) -> Self {
        Self::new(text, DEBUG)
    }

    /// Create an [`INFO`]-level message.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, INFO)
    }

    /// Create a [`WARNING`]-level message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, WARNING)
    }

    /// Create an [`ERROR`]-level message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, ERROR)
    }

    /// Create a [`CRITICAL`]-level message.
    pub fn critical(text: impl Into<String>) -> Self {
        Self::new(text, CRITICAL)
    }

    /// Override the severity, including values outside the defined constants.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Attach remediation text.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach a free-form reference to the object the message concerns
    /// (e.g. a connection name).
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attach a short stable identifier (e.g. `"myapp.health.E001"`), used
    /// for silencing and as the key in heartbeat detail payloads.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The human-readable message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The numeric severity.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// The remediation hint, if any.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// The subject reference, if any.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The stable identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `true` if the severity is at or above `threshold`.
    ///
    /// Callers wanting the conventional cutoff pass [`ERROR`].
    pub fn is_serious(&self, threshold: u8) -> bool {
        self.level >= threshold
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self.subject.as_deref().unwrap_or("?");
        write!(f, "{subject}: ")?;
        if let Some(id) = &self.id {
            write!(f, "({id}) ")?;
        }
        write!(f, "{}", self.text)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        Ok(())
    }
}
