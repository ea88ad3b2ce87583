//! Opaque handle reads

use super::ArgReader;
use crate::frame::CallFrame;
use crate::registry::UserData;
use crate::value::Value;
use std::sync::Arc;

impl<'a, F: CallFrame + ?Sized> ArgReader<'a, F> {
    /// Required handle: anything but a handle the registry accepts for `T`
    /// is an error naming `T`'s class tag
    pub fn read_user_data<T: UserData>(&mut self) -> Option<Arc<T>> {
        self.read_user_data_with(None)
    }

    /// Optional handle: absent or nil slots yield `default`, which may itself
    /// be `None`. Wrong types are still errors.
    pub fn read_user_data_or<T: UserData>(&mut self, default: Option<Arc<T>>) -> Option<Arc<T>> {
        self.read_user_data_with(Some(default))
    }

    fn read_user_data_with<T: UserData>(&mut self, default: Option<Option<Arc<T>>>) -> Option<Arc<T>> {
        match (self.current(), default) {
            (Some(Value::LightUserData(handle) | Value::UserData(handle)), _) => {
                if let Some(typed) = self.registry.cast::<T>(handle) {
                    self.index += 1;
                    return Some(typed);
                }
            }
            (None | Some(Value::Nil), Some(default)) => {
                self.index += 1;
                return default;
            }
            _ => {}
        }

        self.fail(T::CLASS_NAME);
        None
    }
}
