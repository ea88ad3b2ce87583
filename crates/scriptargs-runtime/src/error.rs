//! Argument errors and the precedence policy between them
//!
//! A reader holds at most one [`ArgError`]. When a second failure happens,
//! [`ArgError::merge`] decides which one is reported:
//! - type error vs type error: the incoming one wins when its position is
//!   earlier than or equal to the recorded one (left-most argument wins)
//! - custom and arity errors are only recorded when nothing is recorded yet
//! - a recorded custom or arity error is never displaced
//!
//! The "got ..." half of a type error message describes the slot that failed.
//! It is computed on first request only, never on the read path.

use crate::registry::CastRegistry;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;

/// Error category, the leading part of a full error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    BadArgument,
    BadUsage,
    MemoryAllocation,
    Other(String),
}

impl ErrorCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCategory::BadArgument => "Bad argument",
            ErrorCategory::BadUsage => "Bad usage",
            ErrorCategory::MemoryAllocation => "Memory allocation",
            ErrorCategory::Other(name) => name,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorCategory {
    fn from(name: &str) -> Self {
        match name {
            "Bad argument" => ErrorCategory::BadArgument,
            "Bad usage" => ErrorCategory::BadUsage,
            "Memory allocation" => ErrorCategory::MemoryAllocation,
            other => ErrorCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for ErrorCategory {
    fn from(name: String) -> Self {
        ErrorCategory::from(name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Slot's dynamic type did not satisfy the requested read
    Type { expected: String },
    /// Message raised by the calling code (or a value-domain check)
    Custom { message: String },
    /// Unread trailing arguments
    Arity { expected: usize, got: usize },
}

/// Description of the value found at the failing position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub type_name: String,
    /// Text form; only numbers and strings have one
    pub value: Option<String>,
}

impl Observed {
    /// Describe a frame slot. Handles are named by their registered class tag.
    pub fn describe(slot: Option<&Value>, registry: &CastRegistry) -> Self {
        match slot {
            None => Observed {
                type_name: "none".to_string(),
                value: None,
            },
            Some(Value::LightUserData(handle) | Value::UserData(handle)) => Observed {
                type_name: registry.class_name_of(handle).to_string(),
                value: None,
            },
            Some(value) => Observed {
                type_name: value.type_name().to_string(),
                value: value.to_text(),
            },
        }
    }
}

/// The single error a reader reports
#[derive(Debug, Clone)]
pub struct ArgError {
    position: usize,
    kind: ErrorKind,
    category: ErrorCategory,
    observed: OnceCell<Observed>,
}

impl ArgError {
    pub fn type_mismatch(expected: impl Into<String>, position: usize) -> Self {
        Self::new(
            ErrorKind::Type {
                expected: expected.into(),
            },
            ErrorCategory::BadArgument,
            position,
        )
    }

    /// Custom error; `position` is the cursor position when it was raised
    pub fn custom(message: impl Into<String>, category: ErrorCategory, position: usize) -> Self {
        Self::new(
            ErrorKind::Custom {
                message: message.into(),
            },
            category,
            position,
        )
    }

    /// `expected` arguments were read, the frame held `got`
    pub fn arity(expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::Arity { expected, got },
            ErrorCategory::BadUsage,
            expected + 1,
        )
    }

    fn new(kind: ErrorKind, category: ErrorCategory, position: usize) -> Self {
        ArgError {
            position,
            kind,
            category,
            observed: OnceCell::new(),
        }
    }

    /// Combine the recorded error with a new failure
    pub fn merge(current: Option<ArgError>, incoming: ArgError) -> ArgError {
        match current {
            Some(current) if !current.yields_to(&incoming) => current,
            _ => incoming,
        }
    }

    fn yields_to(&self, incoming: &ArgError) -> bool {
        match (&self.kind, &incoming.kind) {
            (ErrorKind::Type { .. }, ErrorKind::Type { .. }) => incoming.position <= self.position,
            _ => false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn category(&self) -> &ErrorCategory {
        &self.category
    }

    pub fn expected_type(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Type { expected } => Some(expected),
            _ => None,
        }
    }

    pub fn custom_message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Custom { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::Type { .. })
    }

    /// Observed value, if it has been resolved
    pub fn observed(&self) -> Option<&Observed> {
        self.observed.get()
    }

    /// Resolve the observed value once; later calls return the first result
    pub fn resolve_observed(&self, describe: impl FnOnce() -> Observed) -> &Observed {
        self.observed.get_or_init(describe)
    }

    /// Message without the category prefix
    pub fn message(&self) -> String {
        match &self.kind {
            ErrorKind::Type { expected } => {
                let mut message = format!("Expected {} at argument {}", expected, self.position);
                if let Some(observed) = self.observed.get() {
                    message.push_str(", got ");
                    message.push_str(&observed.type_name);
                    if let Some(value) = &observed.value {
                        message.push_str(&format!(" '{}'", value));
                    }
                }
                message
            }
            ErrorKind::Custom { message } => message.clone(),
            ErrorKind::Arity { expected, got } => {
                format!("Too many arguments: expected {}, got {}", expected, got)
            }
        }
    }

    /// `<category> @ '<function>' [<message>]`
    pub fn full_message(&self, function_name: &str) -> String {
        format!("{} @ '{}' [{}]", self.category, function_name, self.message())
    }

    pub fn report(&self) -> ErrorReport {
        let observed = self.observed.get();
        ErrorReport {
            category: self.category.to_string(),
            position: self.position,
            expected: self.expected_type().map(str::to_string),
            got_type: observed.map(|o| o.type_name.clone()),
            got_value: observed.and_then(|o| o.value.clone()),
            message: self.message(),
        }
    }
}

impl PartialEq for ArgError {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.kind == other.kind && self.category == other.category
    }
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ArgError {}

/// Serializable snapshot of an argument error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub category: String,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub got_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub got_value: Option<String>,
    pub message: String,
}

impl ErrorReport {
    /// Format as pretty JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
