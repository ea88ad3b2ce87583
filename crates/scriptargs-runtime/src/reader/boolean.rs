//! Boolean reads. Numbers and strings are never coerced.

use super::ArgReader;
use crate::frame::CallFrame;
use crate::value::Value;

impl<'a, F: CallFrame + ?Sized> ArgReader<'a, F> {
    pub fn read_bool(&mut self) -> bool {
        self.read_bool_with(None)
    }

    /// Boolean with a default for absent or nil slots
    pub fn read_bool_or(&mut self, default: bool) -> bool {
        self.read_bool_with(Some(default))
    }

    fn read_bool_with(&mut self, default: Option<bool>) -> bool {
        match (self.current(), default) {
            (Some(Value::Bool(b)), _) => {
                self.index += 1;
                *b
            }
            (None | Some(Value::Nil), Some(default)) => {
                self.index += 1;
                default
            }
            _ => {
                self.fail("bool");
                false
            }
        }
    }
}
