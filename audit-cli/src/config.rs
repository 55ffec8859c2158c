//! Tool configuration
//!
//! Loaded from an optional TOML file; every field has a default so the tool
//! runs with no configuration at all. The default location is
//! `<config dir>/audit-cli/config.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Header names the audit looks for in the input workbooks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderNames {
    /// Key column present in both files
    pub serial: String,
    /// Source column in the previous file
    pub end_meter: String,
    /// Destination column in the current file
    pub start_meter: String,
    /// Transient helper column inserted during matching
    pub helper: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            serial: "Serial Number".to_string(),
            end_meter: "End Meter".to_string(),
            start_meter: "B/W Start Meter".to_string(),
            helper: "Nashua Serial Number".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory all artifacts are written to; created on startup if absent
    pub log_dir: PathBuf,
    /// Worksheet name the current file keeps its data on
    pub current_sheet: String,
    pub headers: HeaderNames,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            current_sheet: "DATA".to_string(),
            headers: HeaderNames::default(),
        }
    }
}

impl AuditConfig {
    /// Load configuration. An explicitly given path must exist; the default
    /// path is used only when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AuditConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Default config file location, if the platform exposes a config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("audit-cli").join("config.toml"))
}
