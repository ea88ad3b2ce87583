//! Scriptargs Configuration System
//!
//! Provides configuration for host modules built on the argument reader:
//! - Module metadata (name, author, version)
//! - Reader policies (lenient numeric strings, unsigned sign checks, trailing arguments)
//! - Configuration discovery and environment overrides
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Module config (./scriptargs.toml, searched upwards)
//! 3. Environment variables (SCRIPTARGS_*)
//!
//! # Example
//!
//! ```no_run
//! use scriptargs_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{}", config.module_name());
//! ```

pub mod loader;
pub mod module;
pub mod reader;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the configuration file looked up by [`ConfigLoader`]
pub const CONFIG_FILE_NAME: &str = "scriptargs.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader};
pub use module::{ModuleConfig, ModuleSection};
pub use reader::{NumericStringPolicy, ReaderConfig, SignPolicy};
