//! Configuration management for schema checks
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (apispec.toml)
//! - Environment variables (APISPEC__*)
//!
//! ## Example config file (apispec.toml):
//! ```toml
//! [spec]
//! path = "./openapi.yml"
//!
//! [validation]
//! validate_formats = true
//! honor_nullable = true
//!
//! [report]
//! separator = ", "
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Where the API description lives
    #[serde(default)]
    pub spec: SpecConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Failure report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Spec document location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Default spec file, used when none is given explicitly
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Validation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Check `format` on strings and numbers (unknown formats always pass)
    #[serde(default = "default_true")]
    pub validate_formats: bool,

    /// Let `nullable: true` (and `x-nullable`) admit null
    #[serde(default = "default_true")]
    pub honor_nullable: bool,
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Separator used when joining reasons into one line
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    ", ".to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_formats: true,
            honor_nullable: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

impl CheckConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["apispec.toml", ".apispec.toml", "config/apispec.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "apispec", "apispec") {
            let xdg_config = config_dir.config_dir().join("apispec.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // APISPEC__VALIDATION__VALIDATE_FORMATS=false
        builder = builder.add_source(
            Environment::with_prefix("APISPEC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
