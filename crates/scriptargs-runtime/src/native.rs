//! Native function registration and builder
//!
//! Native functions receive the call frame directly and return the values to
//! hand back to the script. By convention a function that rejects its
//! arguments returns a single `false` (see [`failure`]).
//!
//! # Examples
//!
//! ```rust
//! use scriptargs_runtime::native::{failure, FunctionTable, NativeFunctionBuilder};
//! use scriptargs_runtime::{ArgReader, Value};
//!
//! let add = NativeFunctionBuilder::new("add")
//!     .with_arity(2)
//!     .with_implementation(|frame| {
//!         let mut reader = ArgReader::new(frame);
//!         let a: f64 = reader.read_number();
//!         let b: f64 = reader.read_number_or(0.0);
//!         if reader.has_errors() {
//!             return failure();
//!         }
//!         vec![Value::Number(a + b)]
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut table = FunctionTable::new();
//! table.register(add);
//! let result = table.call("add", vec![Value::Number(1.0), Value::Number(2.0)]).unwrap();
//! assert_eq!(result, vec![Value::Number(3.0)]);
//! ```

use crate::frame::{CallFrame, Frame};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Callable native function
pub type NativeFn = Arc<dyn Fn(&Frame) -> Vec<Value> + Send + Sync>;

/// Type alias for native function implementation
type NativeFnImpl = Box<dyn Fn(&Frame) -> Vec<Value> + Send + Sync>;

/// The uniform failure signal: a single `false`
pub fn failure() -> Vec<Value> {
    vec![Value::Bool(false)]
}

/// No return values
pub fn nothing() -> Vec<Value> {
    Vec::new()
}

/// Named native function
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    func: NativeFn,
}

impl NativeFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, frame: &Frame) -> Vec<Value> {
        (self.func)(frame)
    }

    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

/// Builder for constructing native functions with arity validation
///
/// Supports fixed-arity functions (at most `n` arguments; missing trailing
/// arguments are left to the reader's defaults) and variadic functions.
pub struct NativeFunctionBuilder {
    name: String,
    arity: Option<usize>,
    is_variadic: bool,
    implementation: Option<NativeFnImpl>,
}

impl NativeFunctionBuilder {
    /// Create a new native function builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: None,
            is_variadic: false,
            implementation: None,
        }
    }

    /// Set the function's arity (number of declared parameters)
    ///
    /// Frames with more arguments than this are rejected with the failure
    /// signal before the implementation runs.
    ///
    /// Cannot be combined with `variadic()`.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self.is_variadic = false;
        self
    }

    /// Mark this function as variadic (accepts any number of arguments)
    ///
    /// Cannot be combined with `with_arity()`.
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self.arity = None;
        self
    }

    /// Set the function implementation
    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&Frame) -> Vec<Value> + Send + Sync + 'static,
    {
        self.implementation = Some(Box::new(implementation));
        self
    }

    /// Build the native function
    ///
    /// # Returns
    ///
    /// * `Ok(NativeFunction)` - Function ready to register
    /// * `Err(BuildError)` - If implementation was not provided
    pub fn build(self) -> Result<NativeFunction, BuildError> {
        let implementation = self
            .implementation
            .ok_or_else(|| BuildError::MissingImplementation(self.name.clone()))?;

        let name: Arc<str> = Arc::from(self.name);

        let func: NativeFn = if let Some(expected_arity) = self.arity {
            let fn_name = Arc::clone(&name);
            Arc::new(move |frame: &Frame| {
                if frame.len() > expected_arity {
                    tracing::warn!(
                        target: "scriptargs::native",
                        "Function '{}' expects {} argument{}, got {}",
                        fn_name,
                        expected_arity,
                        if expected_arity == 1 { "" } else { "s" },
                        frame.len()
                    );
                    return failure();
                }

                implementation(frame)
            })
        } else {
            Arc::new(move |frame: &Frame| implementation(frame))
        };

        Ok(NativeFunction { name, func })
    }
}

/// Errors that can occur when building a native function
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No implementation was provided
    #[error("Native function '{0}' missing implementation")]
    MissingImplementation(String),
}

/// Errors from calling through a [`FunctionTable`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
}

/// Names a module exposes to scripts
#[derive(Clone, Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, NativeFunction>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the function's own name, returning any function it replaced
    pub fn register(&mut self, function: NativeFunction) -> Option<NativeFunction> {
        tracing::debug!(target: "scriptargs::native", name = function.name(), "registering function");
        self.functions.insert(function.name().to_string(), function)
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn call(&self, name: &str, args: impl Into<Frame>) -> Result<Vec<Value>, CallError> {
        let function = self
            .get(name)
            .ok_or_else(|| CallError::UnknownFunction(name.to_string()))?;
        Ok(function.call(&args.into()))
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.functions.keys()).finish()
    }
}
