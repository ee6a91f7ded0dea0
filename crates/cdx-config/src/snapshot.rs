//! Configuration snapshots for output provenance.
//!
//! A snapshot captures the settings in force when a command ran, so that a
//! reported interval can be traced back to the confidence level and file
//! that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigSource, SettingsPath};
use crate::settings::Settings;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the settings file content.
    #[serde(default)]
    pub settings_hash: Option<String>,

    /// Path the settings were loaded from.
    #[serde(default)]
    pub settings_path: Option<String>,

    /// Source of the settings.
    pub settings_source: String,

    /// Hash identifying the effective configuration.
    pub combined_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub conf_level: f64,
    pub precision: usize,
    pub accept_percentages: bool,
}

impl ConfigSnapshot {
    /// Create a new snapshot from loaded settings.
    pub fn new(settings: &Settings, path: &SettingsPath, content: Option<&str>) -> Self {
        let settings_hash = content.map(hash_content);
        let combined_hash = hash_content(settings_hash.as_deref().unwrap_or("defaults"));

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            settings_hash,
            settings_path: path.path.as_ref().map(|p| p.display().to_string()),
            settings_source: path.source.to_string(),
            combined_hash,
            summary: ConfigSummary::from(settings),
        }
    }

    /// Create a snapshot with only defaults (no settings file loaded).
    pub fn defaults_only() -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            settings_hash: None,
            settings_path: None,
            settings_source: ConfigSource::BuiltinDefault.to_string(),
            combined_hash: hash_content("defaults"),
            summary: ConfigSummary::from(&Settings::default()),
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.combined_hash == other.combined_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.combined_hash[..12.min(self.combined_hash.len())]
    }
}

impl From<&Settings> for ConfigSummary {
    fn from(settings: &Settings) -> Self {
        ConfigSummary {
            conf_level: settings.estimation.conf_level,
            precision: settings.output.precision,
            accept_percentages: settings.input.accept_percentages,
        }
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
