//! Conversion from Rust values to script values
//!
//! The return direction of a native call. Arguments go through
//! [`ArgReader`](crate::ArgReader) instead, which has its own coercion rules.
//!
//! # Examples
//!
//! ```
//! use scriptargs_runtime::convert::ToValue;
//! use scriptargs_runtime::Value;
//!
//! assert_eq!(42u32.to_value(), Value::Number(42.0));
//! assert_eq!(Some("ok").to_value(), Value::string("ok"));
//! assert_eq!(None::<bool>.to_value(), Value::Nil);
//! ```

use crate::value::{Handle, Value, ValueTable};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for converting Rust types to script `Value`
pub trait ToValue {
    fn to_value(self) -> Value;
}

macro_rules! impl_to_value_number {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(self) -> Value {
                    Value::Number(self as f64)
                }
            }
        )*
    };
}

impl_to_value_number!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::String(Arc::new(self))
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::string(self)
    }
}

impl ToValue for &String {
    fn to_value(self) -> Value {
        Value::String(Arc::new(self.clone()))
    }
}

impl ToValue for () {
    fn to_value(self) -> Value {
        Value::Nil
    }
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for ValueTable {
    fn to_value(self) -> Value {
        Value::Table(self)
    }
}

/// Handles go back to scripts as full user data
impl ToValue for Handle {
    fn to_value(self) -> Value {
        Value::UserData(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Nil,
        }
    }
}

/// 1-based sequence table
impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(self) -> Value {
        Value::Table(ValueTable::from_sequence(self.into_iter().map(ToValue::to_value)))
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(self) -> Value {
        Value::Table(
            self.into_iter()
                .map(|(key, value)| (Value::String(Arc::new(key)), value.to_value()))
                .collect(),
        )
    }
}
