//! Scriptargs Runtime - Argument marshalling for native functions
//!
//! This library lets statically typed native functions be called from a
//! dynamically typed scripting host:
//! - Value model and call frames
//! - Typed, error-accumulating argument reader
//! - Opaque handle cast registry
//! - Native function table and return value conversion

/// Scriptargs runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod arguments;
pub mod convert;
pub mod error;
pub mod frame;
pub mod native;
pub mod reader;
pub mod registry;
pub mod value;

// Re-export commonly used types
pub use arguments::{ArgumentContainer, Arguments};
pub use convert::ToValue;
pub use error::{ArgError, ErrorCategory, ErrorKind, ErrorReport, Observed};
pub use frame::{CallFrame, Frame};
pub use native::{failure, nothing, BuildError, CallError, FunctionTable, NativeFn, NativeFunction, NativeFunctionBuilder};
pub use reader::{ArgNumber, ArgReader};
pub use registry::{CastRegistry, CastRegistryBuilder, RegistryError, UserData};
pub use scriptargs_config::ReaderConfig;
pub use value::{Handle, Metatable, SlotType, ToStringHook, Value, ValueTable};
