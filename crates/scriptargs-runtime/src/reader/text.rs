//! String reads

use super::ArgReader;
use crate::error::{ArgError, ErrorCategory};
use crate::frame::CallFrame;
use crate::value::{number_to_text, Value};

/// Stringify overrides may return values that override again; stop here
const MAX_TOSTRING_DEPTH: usize = 16;

impl<'a, F: CallFrame + ?Sized> ArgReader<'a, F> {
    /// Required string; numbers are accepted in their text form
    pub fn read_string(&mut self) -> String {
        self.read_string_with(None)
    }

    /// String with a default for absent or nil slots
    pub fn read_string_or(&mut self, default: &str) -> String {
        self.read_string_with(Some(default))
    }

    fn read_string_with(&mut self, default: Option<&str>) -> String {
        let position = self.index;

        match (self.current(), default) {
            (Some(Value::String(text)), _) => {
                self.index += 1;
                self.copy_text(text, position)
            }
            (Some(Value::Number(n)), _) => {
                self.index += 1;
                let text = number_to_text(*n);
                self.copy_text(&text, position)
            }
            (None | Some(Value::Nil), Some(default)) => {
                self.index += 1;
                self.copy_text(default, position)
            }
            _ => {
                self.fail("string");
                String::new()
            }
        }
    }

    /// Copy with fallible reservation; failure is a "Memory allocation" error
    fn copy_text(&mut self, text: &str, position: usize) -> String {
        self.copy_text_reserving(text, text.len(), position)
    }

    fn copy_text_reserving(&mut self, text: &str, capacity: usize, position: usize) -> String {
        let mut out = String::new();
        if out.try_reserve_exact(capacity).is_err() {
            self.record(ArgError::custom(
                "out of memory",
                ErrorCategory::MemoryAllocation,
                position,
            ));
            return out;
        }
        out.push_str(text);
        out
    }

    /// Any value as text, for formatting and debug output.
    ///
    /// A stringify override on the value wins. Only an absent slot fails.
    pub fn read_any_string(&mut self) -> String {
        let position = self.index;
        let slot = self.current();
        let hook = self.frame.tostring_hook(position);
        self.index += 1;

        match (slot, hook) {
            (Some(value), Some(hook)) => any_to_string(&hook(value), 1),
            (Some(value), None) => any_to_string(value, MAX_TOSTRING_DEPTH),
            (None, _) => {
                self.set_type_error_at("non-none", position);
                String::new()
            }
        }
    }
}

fn any_to_string(value: &Value, depth: usize) -> String {
    if depth < MAX_TOSTRING_DEPTH {
        if let Some(hook) = value.tostring_hook() {
            return any_to_string(&hook(value), depth + 1);
        }
    }

    match value {
        Value::Number(n) => number_to_text(*n),
        Value::String(s) => s.as_ref().clone(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Nil => "nil".to_string(),
        other => format!("{}: {}", other.type_name(), other.address()),
    }
}
