//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::module::ModuleConfig;
use crate::reader::{NumericStringPolicy, ReaderConfig, SignPolicy};
use crate::{ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Module name used when no `[module]` section is configured
pub const DEFAULT_MODULE_NAME: &str = "scriptargs";

/// Module version used when no version is configured
pub const DEFAULT_MODULE_VERSION: &str = "1.0";

/// Configuration loader
///
/// Loads configuration and merges it with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Module config (scriptargs.toml) - overrides defaults
/// 3. Environment variables (SCRIPTARGS_*) - overrides the file
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip environment overrides (used by tests and embedders)
    ignore_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Module configuration as read from disk
    pub module: ModuleConfig,

    /// Effective reader configuration (file + environment)
    pub reader: ReaderConfig,

    /// Directory where scriptargs.toml was found
    pub config_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Do not apply SCRIPTARGS_* environment overrides
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find scriptargs.toml. A missing file is
    /// not an error: defaults are used.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (config_root, module) = self.find_module_config(start_dir)?;
        let reader = self.apply_env_overrides(module.reader())?;

        Ok(Config {
            module,
            reader,
            config_root,
        })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let module = ModuleConfig::load_from_file(config_path)?;
        let reader = self.apply_env_overrides(module.reader())?;
        let config_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            module,
            reader,
            config_root,
        })
    }

    /// Find module configuration by walking up directory tree
    fn find_module_config(&self, start_dir: &Path) -> ConfigResult<(Option<PathBuf>, ModuleConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let module = ModuleConfig::load_from_file(&config_path)?;
                return Ok((Some(current), module));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ModuleConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to the reader config
    ///
    /// Recognised variables:
    /// - SCRIPTARGS_NUMERIC_STRINGS=warn|error
    /// - SCRIPTARGS_NEGATIVE_UNSIGNED=warn|error|ignore
    /// - SCRIPTARGS_CHECK_TRAILING=true|false
    fn apply_env_overrides(&self, mut reader: ReaderConfig) -> ConfigResult<ReaderConfig> {
        if self.ignore_env {
            return Ok(reader);
        }

        if let Ok(value) = env::var("SCRIPTARGS_NUMERIC_STRINGS") {
            reader.numeric_strings = value.parse::<NumericStringPolicy>()?;
        }

        if let Ok(value) = env::var("SCRIPTARGS_NEGATIVE_UNSIGNED") {
            reader.negative_unsigned = value.parse::<SignPolicy>()?;
        }

        if let Ok(value) = env::var("SCRIPTARGS_CHECK_TRAILING") {
            reader.check_trailing = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        Ok(reader)
    }
}

impl Config {
    /// Get the effective module name (config > default)
    pub fn module_name(&self) -> &str {
        self.module.module_name().unwrap_or(DEFAULT_MODULE_NAME)
    }

    /// Get the module author, empty when unset
    pub fn module_author(&self) -> &str {
        self.module
            .module
            .as_ref()
            .and_then(|m| m.author.as_deref())
            .unwrap_or("")
    }

    /// Get the effective module version (config > default)
    pub fn module_version(&self) -> &str {
        self.module
            .module
            .as_ref()
            .and_then(|m| m.version.as_deref())
            .unwrap_or(DEFAULT_MODULE_VERSION)
    }

    /// Get the directory holding scriptargs.toml
    pub fn config_root(&self) -> Option<&Path> {
        self.config_root.as_deref()
    }

    /// Check if a configuration file was found
    pub fn has_file(&self) -> bool {
        self.config_root.is_some()
    }
}
