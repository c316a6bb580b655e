use std::fs;
use std::path::{Path, PathBuf};

use recu_printer::{Encoding, EncodingPolicy, PrintError, PrintResult, PrinterWidth};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Process configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON settings file
    pub config_file: PathBuf,
    /// Log level or filter directive
    pub log_level: String,
    /// Directory for daily log files
    pub log_dir: Option<String>,
    /// Overrides `force_ascii` from the settings file
    pub force_ascii: Option<bool>,
    /// Overrides `allow_encoding_override` from the settings file
    pub allow_override: Option<bool>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            config_file: std::env::var("RECU_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("printer_config.json")),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: std::env::var("LOG_DIR").ok(),
            force_ascii: std::env::var("RECU_FORCE_ASCII")
                .ok()
                .and_then(|v| parse_flag(&v)),
            allow_override: std::env::var("RECU_ALLOW_OVERRIDE")
                .ok()
                .and_then(|v| parse_flag(&v)),
        }
    }
}

/// "1/true/yes/on" and "0/false/no/off", case-insensitive
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Persisted printer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_printer_name: Option<String>,
    pub default_printer_width: PrinterWidth,
    pub force_ascii: bool,
    pub narrow_encoding: String,
    pub standard_encoding: String,
    pub allow_encoding_override: bool,
    pub narrow_patterns: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let policy = EncodingPolicy::default();
        Self {
            default_printer_name: None,
            default_printer_width: PrinterWidth::default(),
            force_ascii: policy.force_ascii,
            narrow_encoding: policy.narrow_encoding.to_string(),
            standard_encoding: policy.standard_encoding.to_string(),
            allow_encoding_override: policy.allow_override,
            narrow_patterns: policy.narrow_patterns,
        }
    }
}

impl Settings {
    /// Load the settings file; a missing file gives the defaults
    pub fn load(path: &Path) -> PrintResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)
            .map_err(|e| PrintError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Apply environment overrides
    pub fn with_overrides(mut self, config: &Config) -> Self {
        if let Some(force_ascii) = config.force_ascii {
            self.force_ascii = force_ascii;
        }
        if let Some(allow) = config.allow_override {
            self.allow_encoding_override = allow;
        }
        self
    }

    /// Build the immutable encoding policy these settings describe
    pub fn policy(&self) -> PrintResult<EncodingPolicy> {
        let parse = |field: &str, name: &str| -> PrintResult<Encoding> {
            name.parse()
                .map_err(|e| PrintError::InvalidConfig(format!("{}: {}", field, e)))
        };

        Ok(EncodingPolicy {
            force_ascii: self.force_ascii,
            narrow_encoding: parse("narrow_encoding", &self.narrow_encoding)?,
            standard_encoding: parse("standard_encoding", &self.standard_encoding)?,
            allow_override: self.allow_encoding_override,
            narrow_patterns: self.narrow_patterns.clone(),
        })
    }
}
