//! Numeric reads

use super::ArgReader;
use crate::error::{ArgError, ErrorCategory};
use crate::frame::CallFrame;
use crate::value::Value;

/// Native numeric types the reader can produce
pub trait ArgNumber: Copy + Default {
    /// Unsigned targets get the sign check
    const UNSIGNED: bool;

    /// Saturating `as` conversion
    fn from_number(n: f64) -> Self;

    /// Conversion used when no default was given; unsigned targets narrow
    /// through `i64` so negative inputs wrap instead of clamping to zero
    fn from_number_wrapping(n: f64) -> Self {
        Self::from_number(n)
    }
}

macro_rules! impl_arg_number_signed {
    ($($t:ty),*) => {
        $(
            impl ArgNumber for $t {
                const UNSIGNED: bool = false;

                fn from_number(n: f64) -> Self {
                    n as $t
                }
            }
        )*
    };
}

macro_rules! impl_arg_number_unsigned {
    ($($t:ty),*) => {
        $(
            impl ArgNumber for $t {
                const UNSIGNED: bool = true;

                fn from_number(n: f64) -> Self {
                    n as $t
                }

                fn from_number_wrapping(n: f64) -> Self {
                    (n as i64) as $t
                }
            }
        )*
    };
}

impl_arg_number_signed!(i8, i16, i32, i64, isize, f32, f64);
impl_arg_number_unsigned!(u8, u16, u32, u64, usize);

impl<'a, F: CallFrame + ?Sized> ArgReader<'a, F> {
    /// Required number; strings that parse as numbers are accepted
    pub fn read_number<T: ArgNumber>(&mut self) -> T {
        self.read_number_with(None, true)
    }

    /// Number with a default for absent or nil slots
    pub fn read_number_or<T: ArgNumber>(&mut self, default: T) -> T {
        self.read_number_with(Some(default), true)
    }

    /// Required number without the negative-to-unsigned check
    pub fn read_number_unchecked<T: ArgNumber>(&mut self) -> T {
        self.read_number_with(None, false)
    }

    pub fn read_number_with<T: ArgNumber>(&mut self, default: Option<T>, check_sign: bool) -> T {
        let position = self.index;
        let slot = self.current();

        if let Some(value @ (Value::Number(_) | Value::String(_))) = slot {
            self.index += 1;

            let number = match value.to_number() {
                Some(number) => number,
                None => {
                    self.report_numeric_string(position);
                    0.0
                }
            };

            if number.is_nan() {
                self.record(ArgError::custom(
                    "Expected number, got NaN",
                    ErrorCategory::BadArgument,
                    position,
                ));
                return T::default();
            }

            if T::UNSIGNED && check_sign && number < -f64::from(f32::EPSILON) {
                self.report_negative_unsigned(position);
            }

            return match default {
                None => T::from_number_wrapping(number),
                Some(_) => T::from_number(number),
            };
        }

        if let (None | Some(Value::Nil), Some(default)) = (slot, default) {
            self.index += 1;
            return default;
        }

        self.fail("number");
        T::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::registry::CastRegistry;
    use scriptargs_config::{NumericStringPolicy, ReaderConfig, SignPolicy};

    fn read_one<T: ArgNumber>(value: Value) -> (T, bool, Option<String>) {
        let frame = Frame::new(vec![value]);
        let registry = CastRegistry::default();
        let mut reader = ArgReader::with_registry(&frame, &registry);
        let n = reader.read_number::<T>();
        let warning = reader.pending_warning().map(str::to_string);
        (n, reader.has_errors(), warning)
    }

    #[test]
    fn test_number_slot() {
        assert_eq!(read_one::<f64>(Value::Number(2.5)), (2.5, false, None));
        assert_eq!(read_one::<i32>(Value::Number(-7.9)), (-7, false, None));
    }

    #[test]
    fn test_numeric_string_accepted_silently() {
        assert_eq!(read_one::<u16>(Value::string(" 12 ")), (12, false, None));
    }

    #[test]
    fn test_unparseable_string_warns() {
        let (n, failed, warning) = read_one::<f32>(Value::string("abc"));
        assert_eq!(n, 0.0);
        assert!(!failed);
        assert_eq!(
            warning.as_deref(),
            Some("Expected number, got non-convertible string. This warning may be an error in future versions.")
        );
    }

    #[test]
    fn test_nan_is_error() {
        let frame = Frame::new(vec![Value::Number(f64::NAN)]);
        let registry = CastRegistry::default();
        let mut reader = ArgReader::with_registry(&frame, &registry);

        assert_eq!(reader.read_number_or::<f64>(5.0), 0.0);
        assert!(reader.has_errors());
        assert_eq!(
            reader.full_error_message("f").as_deref(),
            Some("Bad argument @ 'f' [Expected number, got NaN]")
        );
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_negative_unsigned_warns_and_wraps() {
        let (n, failed, warning) = read_one::<u32>(Value::Number(-1.0));
        assert_eq!(n, u32::MAX);
        assert!(!failed);
        assert!(warning.unwrap().starts_with("Expected positive value, got negative"));
    }

    #[test]
    fn test_tiny_negative_not_flagged() {
        let (n, _, warning) = read_one::<u8>(Value::Number(-1e-9));
        assert_eq!(n, 0);
        assert_eq!(warning, None);
    }

    #[test]
    fn test_negative_unsigned_with_default_saturates() {
        let frame = Frame::new(vec![Value::Number(-3.0)]);
        let registry = CastRegistry::default();
        let mut reader = ArgReader::with_registry(&frame, &registry);

        assert_eq!(reader.read_number_or::<u32>(9), 0);
        assert!(reader.pending_warning().is_some());
    }

    #[test]
    fn test_unchecked_skips_sign_warning() {
        let frame = Frame::new(vec![Value::Number(-3.0)]);
        let registry = CastRegistry::default();
        let mut reader = ArgReader::with_registry(&frame, &registry);

        assert_eq!(reader.read_number_unchecked::<u64>(), (-3i64) as u64);
        assert_eq!(reader.pending_warning(), None);
    }

    #[test]
    fn test_default_for_nil_and_absent() {
        let frame = Frame::new(vec![Value::Nil]);
        let registry = CastRegistry::default();
        let mut reader = ArgReader::with_registry(&frame, &registry);

        assert_eq!(reader.read_number_or(3i32), 3);
        assert_eq!(reader.read_number_or(4.5f64), 4.5);
        assert!(!reader.has_errors());
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_wrong_type_is_error() {
        let (n, failed, _) = read_one::<i64>(Value::Bool(true));
        assert_eq!(n, 0);
        assert!(failed);
    }

    #[test]
    fn test_strict_policies_turn_warnings_into_errors() {
        let frame = Frame::new(vec![Value::string("x"), Value::Number(-1.0)]);
        let registry = CastRegistry::default();
        let config = ReaderConfig {
            numeric_strings: NumericStringPolicy::Error,
            ..ReaderConfig::default()
        };
        let mut reader = ArgReader::with_registry(&frame, &registry).with_config(config);
        let _: f64 = reader.read_number();

        assert!(reader.has_errors());
        assert_eq!(
            reader.error_message().as_deref(),
            Some("Expected number, got non-convertible string")
        );

        let config = ReaderConfig {
            negative_unsigned: SignPolicy::Ignore,
            ..ReaderConfig::default()
        };
        let mut reader = ArgReader::with_registry(&frame, &registry).with_config(config);
        reader.skip(1);
        let _: u8 = reader.read_number();
        assert_eq!(reader.pending_warning(), None);
    }
}
