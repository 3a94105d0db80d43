//! Configuration file loading and directory validation
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Steps 1 and 2 belong to the service's clap parser. This module owns the
//! TOML file and the input/output directory checks that every run performs
//! before the session is created.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory under the platform config dir that holds `config.toml`
pub const CONFIG_DIR_NAME: &str = "svgb";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent values fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Upper bound for a single asset read or write, in milliseconds
    #[serde(default)]
    pub io_timeout_ms: Option<u64>,

    /// Open the UI in the default browser on startup
    #[serde(default)]
    pub open_browser: Option<bool>,

    /// Output filename rules
    #[serde(default)]
    pub naming: NamingConfig,
}

/// `[naming]` table of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Asset extension including the dot (`.svg`)
    #[serde(default)]
    pub extension: Option<String>,

    /// Substrings removed from source names, applied in order
    #[serde(default)]
    pub noise_tokens: Option<Vec<String>>,

    /// Prefix of every output filename
    #[serde(default)]
    pub prefix: Option<String>,

    /// Suffix appended to the stem in alternate (outline) mode
    #[serde(default)]
    pub alternate_suffix: Option<String>,
}

impl NamingConfig {
    /// Reject values that would make normalization ambiguous
    pub fn validate(&self) -> Result<()> {
        if let Some(ext) = &self.extension {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(Error::InvalidInput(format!(
                    "naming.extension must start with '.' and name a suffix, got {:?}",
                    ext
                )));
            }
            if ext.contains(['/', '\\']) {
                return Err(Error::InvalidInput(format!(
                    "naming.extension must not contain path separators, got {:?}",
                    ext
                )));
            }
        }

        if let Some(tokens) = &self.noise_tokens {
            if tokens.iter().any(|t| t.is_empty()) {
                return Err(Error::InvalidInput(
                    "naming.noise_tokens must not contain empty strings".to_string(),
                ));
            }
        }

        if let Some(prefix) = &self.prefix {
            if prefix.contains(['/', '\\']) {
                return Err(Error::InvalidInput(format!(
                    "naming.prefix must not contain path separators, got {:?}",
                    prefix
                )));
            }
        }

        Ok(())
    }
}

/// Default location of the configuration file for this platform
///
/// `~/.config/svgb/config.toml` on Linux, the equivalent per-user config
/// directory elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Parse TOML configuration content
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
    config.naming.validate()?;
    Ok(config)
}

/// Load the TOML configuration
///
/// An explicitly requested file must exist. When no path is given, the
/// platform default is used if present; a missing default file is not an
/// error and yields an empty configuration.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No configuration file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;

    info!("Loaded configuration from {}", path.display());
    parse_toml_config(&content)
}

/// Validated input/output directory pair
///
/// Both paths are absolute and canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Directories {
    /// Check the input directory and create the output directory
    ///
    /// Fails when the input does not exist, is not a directory, or resolves
    /// to the same location as the output.
    pub fn prepare(input: &Path, output: &Path) -> Result<Self> {
        let input_abs = match input.canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::Config(format!(
                    "Input directory does not exist: {}",
                    input.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if !input_abs.is_dir() {
            return Err(Error::Config(format!(
                "Path is not a directory: {}",
                input_abs.display()
            )));
        }

        std::fs::create_dir_all(output).map_err(|e| {
            Error::Config(format!(
                "Cannot create output directory {}: {}",
                output.display(),
                e
            ))
        })?;
        let output_abs = output.canonicalize()?;

        if output_abs == input_abs {
            return Err(Error::Config(
                "The SVG directory and the output directory cannot be the same.".to_string(),
            ));
        }

        Ok(Self {
            input: input_abs,
            output: output_abs,
        })
    }
}
