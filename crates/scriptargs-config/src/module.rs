//! Module Configuration (scriptargs.toml)
//!
//! Handles module-level configuration stored in `scriptargs.toml`.

use crate::reader::ReaderConfig;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Module configuration from scriptargs.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Module metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleSection>,

    /// Argument reader policies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reader: Option<ReaderConfig>,
}

/// Module metadata reported to the host when the module is initialised
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleSection {
    /// Module name
    pub name: String,

    /// Module author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Module version (e.g. "1.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Hosts copy module info into fixed-size buffers of this many bytes
pub const MAX_INFO_LENGTH: usize = 128;

impl ModuleConfig {
    /// Load module configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the module configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(module) = &self.module {
            validate_info_field("module.name", &module.name)?;
            if let Some(author) = &module.author {
                validate_info_field("module.author", author)?;
            }
            if let Some(version) = &module.version {
                if !is_valid_version(version) {
                    return Err(ConfigError::InvalidValue {
                        field: "module.version".to_string(),
                        reason: format!("expected dotted numeric version, got '{}'", version),
                    });
                }
            }
        }
        Ok(())
    }

    /// Get the module name
    pub fn module_name(&self) -> Option<&str> {
        self.module.as_ref().map(|m| m.name.as_str())
    }

    /// Get the reader configuration, falling back to defaults
    pub fn reader(&self) -> ReaderConfig {
        self.reader.unwrap_or_default()
    }
}

fn validate_info_field(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if value.len() >= MAX_INFO_LENGTH {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be shorter than {} bytes", MAX_INFO_LENGTH),
        });
    }
    Ok(())
}

fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
