//! Argument reader
//!
//! A short-lived cursor over one call frame. A native function creates one
//! reader, issues one read per declared parameter, checks
//! [`ArgReader::has_errors`] once and either proceeds or returns the failure
//! signal.
//!
//! Every read is total: it returns a value (a fallback of 0, `false`, `""`
//! or `None` on failure) and advances the cursor by exactly one slot, so the
//! reads after a failed one stay aligned with their parameters. Failures are
//! accumulated, never raised.
//!
//! ```
//! use scriptargs_runtime::{ArgReader, Frame, Value};
//!
//! let frame = Frame::new(vec![Value::Number(42.0)]);
//! let mut reader = ArgReader::new(&frame);
//! let count: u32 = reader.read_number();
//! let label = reader.read_string_or("x");
//!
//! assert!(!reader.has_errors());
//! assert_eq!((count, label.as_str()), (42, "x"));
//! ```

mod boolean;
mod number;
mod table;
mod text;
mod user_data;

pub use number::ArgNumber;

use crate::arguments::{ArgumentContainer, Arguments};
use crate::error::{ArgError, ErrorCategory, Observed};
use crate::frame::{CallFrame, Frame};
use crate::registry::{self, CastRegistry, UserData};
use crate::value::{SlotType, Value};
use scriptargs_config::{NumericStringPolicy, ReaderConfig, SignPolicy};
use std::sync::Arc;

const LOG_TARGET: &str = "scriptargs::reader";

pub struct ArgReader<'a, F: CallFrame + ?Sized = Frame> {
    frame: &'a F,
    registry: &'a CastRegistry,
    config: ReaderConfig,
    index: usize,
    error: Option<ArgError>,
    warning: Option<String>,
}

impl<'a, F: CallFrame + ?Sized> ArgReader<'a, F> {
    /// Reader bound to the process-wide cast registry
    pub fn new(frame: &'a F) -> Self {
        Self::with_registry(frame, registry::global())
    }

    pub fn with_registry(frame: &'a F, registry: &'a CastRegistry) -> Self {
        ArgReader {
            frame,
            registry,
            config: ReaderConfig::default(),
            index: 1,
            error: None,
            warning: None,
        }
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// 1-based position of the next slot to read
    pub fn position(&self) -> usize {
        self.index
    }

    /// Number of supplied arguments not yet read
    pub fn remaining(&self) -> usize {
        (self.frame.len() + 1).saturating_sub(self.index)
    }

    pub fn skip(&mut self, count: usize) {
        self.index = self.index.saturating_add(count);
    }

    fn current(&self) -> Option<&'a Value> {
        let frame: &'a F = self.frame;
        frame.slot(self.index)
    }

    /// Record a type error at the current slot and step past it
    fn fail(&mut self, expected: &str) {
        self.set_type_error(expected);
        self.index += 1;
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    pub fn next_type(&self) -> SlotType {
        self.peek_type(0)
    }

    pub fn peek_type(&self, offset: usize) -> SlotType {
        self.frame.slot_type(self.index.saturating_add(offset))
    }

    pub fn next_is_none(&self) -> bool {
        self.next_type().is_none()
    }

    pub fn next_is_nil(&self) -> bool {
        self.next_type().is_nil()
    }

    pub fn next_is_bool(&self) -> bool {
        self.next_type().is_bool()
    }

    /// Either handle representation
    pub fn next_is_user_data(&self) -> bool {
        self.next_type().is_user_data()
    }

    pub fn next_is_light_user_data(&self) -> bool {
        self.next_type().is_light_user_data()
    }

    pub fn next_is_number(&self) -> bool {
        self.next_type().is_number()
    }

    pub fn next_is_string(&self) -> bool {
        self.next_type().is_string()
    }

    pub fn next_is_table(&self) -> bool {
        self.next_type().is_table()
    }

    pub fn next_is_function(&self) -> bool {
        self.next_type().is_function()
    }

    pub fn next_could_be_number(&self) -> bool {
        self.next_type().could_be_number()
    }

    pub fn next_could_be_string(&self) -> bool {
        self.next_type().could_be_string()
    }

    // ------------------------------------------------------------------
    // Conditional reads: on a mismatch the default is returned and the
    // cursor stays put.
    // ------------------------------------------------------------------

    pub fn read_if_next_is_bool(&mut self, default: bool) -> bool {
        if self.next_is_bool() {
            self.read_bool_or(default)
        } else {
            default
        }
    }

    pub fn read_if_next_is_user_data<T: UserData>(&mut self, default: Option<Arc<T>>) -> Option<Arc<T>> {
        if self.next_is_user_data() {
            self.read_user_data_or(default)
        } else {
            default
        }
    }

    pub fn read_if_next_is_number<T: ArgNumber>(&mut self, default: T) -> T {
        if self.next_is_number() {
            self.read_number_or(default)
        } else {
            default
        }
    }

    pub fn read_if_next_is_string(&mut self, default: &str) -> String {
        if self.next_is_string() {
            self.read_string_or(default)
        } else {
            default.to_string()
        }
    }

    pub fn read_if_next_could_be_number<T: ArgNumber>(&mut self, default: T) -> T {
        if self.next_could_be_number() {
            self.read_number_or(default)
        } else {
            default
        }
    }

    pub fn read_if_next_could_be_string(&mut self, default: &str) -> String {
        if self.next_could_be_string() {
            self.read_string_or(default)
        } else {
            default.to_string()
        }
    }

    // ------------------------------------------------------------------
    // Generic value passthrough
    // ------------------------------------------------------------------

    /// Hand every remaining value to `container`
    pub fn read_arguments<C: ArgumentContainer>(&mut self, container: &mut C) {
        let consumed = container.read_from(self.frame, self.index);
        self.index += consumed;
    }

    /// Raw copy of the next value; an absent slot is an error
    pub fn read_argument(&mut self) -> Value {
        self.read_argument_with::<Arguments>()
    }

    /// Next value as produced by `C::read_single`; `None` is an error
    pub fn read_argument_with<C: ArgumentContainer>(&mut self) -> Value {
        match C::read_single(self.frame, self.index) {
            Some(value) => {
                self.index += 1;
                value
            }
            None => {
                self.fail("argument");
                Value::Nil
            }
        }
    }

    // ------------------------------------------------------------------
    // Error policy
    // ------------------------------------------------------------------

    /// Type error at the current position
    pub fn set_type_error(&mut self, expected: impl Into<String>) {
        let position = self.index;
        self.set_type_error_at(expected, position);
    }

    pub fn set_type_error_at(&mut self, expected: impl Into<String>, position: usize) {
        self.record(ArgError::type_mismatch(expected, position));
    }

    /// Custom "Bad usage" error
    pub fn set_custom_error(&mut self, reason: impl Into<String>) {
        self.set_custom_error_with(reason, ErrorCategory::BadUsage);
    }

    pub fn set_custom_error_with(&mut self, reason: impl Into<String>, category: impl Into<ErrorCategory>) {
        let position = self.index;
        self.record(ArgError::custom(reason, category.into(), position));
    }

    /// Queue a warning; a later warning replaces it
    pub fn set_custom_warning(&mut self, message: impl Into<String>) {
        self.warning = Some(message.into());
    }

    fn record(&mut self, incoming: ArgError) {
        tracing::debug!(
            target: LOG_TARGET,
            position = incoming.position(),
            kind = ?incoming.kind(),
            "argument error"
        );
        self.error = Some(ArgError::merge(self.error.take(), incoming));
    }

    /// Final check, with trailing-argument checking taken from the config
    pub fn has_errors(&mut self) -> bool {
        let check_trailing = self.config.check_trailing;
        self.has_errors_checked(check_trailing)
    }

    /// Final check. Without an error, a queued warning is logged and cleared.
    ///
    /// With `check_trailing`, unread arguments at the cursor are an error
    /// on their own.
    pub fn has_errors_checked(&mut self, check_trailing: bool) -> bool {
        if check_trailing && !self.next_is_none() {
            let expected = self.index.saturating_sub(1);
            let got = self.frame.len();
            self.record(ArgError::arity(expected, got));
            return true;
        }

        if self.error.is_none() {
            if let Some(warning) = self.warning.take() {
                tracing::warn!(target: LOG_TARGET, "{}", warning);
            }
        }

        self.error.is_some()
    }

    /// Recorded error, if any. The observed value is not resolved here.
    pub fn error(&self) -> Option<&ArgError> {
        self.error.as_ref()
    }

    pub fn pending_warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Message for the recorded error, resolving the observed value
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        self.resolve(error);
        Some(error.message())
    }

    /// `<category> @ '<function>' [<message>]`
    pub fn full_error_message(&self, function_name: &str) -> Option<String> {
        let error = self.error.as_ref()?;
        self.resolve(error);
        Some(error.full_message(function_name))
    }

    /// Take the recorded error with its observed value resolved
    pub fn into_error(self) -> Option<ArgError> {
        if let Some(error) = &self.error {
            self.resolve(error);
        }
        self.error
    }

    fn resolve(&self, error: &ArgError) {
        if error.is_type_mismatch() {
            error.resolve_observed(|| Observed::describe(self.frame.slot(error.position()), self.registry));
        }
    }

    /// Non-convertible numeric string, per the configured policy
    fn report_numeric_string(&mut self, position: usize) {
        const MESSAGE: &str = "Expected number, got non-convertible string";
        match self.config.numeric_strings {
            NumericStringPolicy::Warn => self.set_custom_warning(format!(
                "{}. This warning may be an error in future versions.",
                MESSAGE
            )),
            NumericStringPolicy::Error => {
                self.record(ArgError::custom(MESSAGE, ErrorCategory::BadArgument, position))
            }
        }
    }

    /// Negative value for an unsigned target, per the configured policy
    fn report_negative_unsigned(&mut self, position: usize) {
        const MESSAGE: &str = "Expected positive value, got negative";
        match self.config.negative_unsigned {
            SignPolicy::Warn => self.set_custom_warning(format!(
                "{}. This warning may be an error in future versions.",
                MESSAGE
            )),
            SignPolicy::Error => {
                self.record(ArgError::custom(MESSAGE, ErrorCategory::BadArgument, position))
            }
            SignPolicy::Ignore => {}
        }
    }
}
