//! Typed representation of settings.json.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Default confidence level for bridging intervals.
pub const DEFAULT_CONF_LEVEL: f64 = 0.95;

/// Default number of decimals in human-facing output.
pub const DEFAULT_PRECISION: usize = 4;

/// Root settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub estimation: EstimationSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub input: InputSettings,
}

/// Estimator defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationSettings {
    /// Confidence level used when a request does not carry its own.
    #[serde(default = "default_conf_level")]
    pub conf_level: f64,
}

/// Rendering options for md, summary and prose output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_precision")]
    pub precision: usize,
}

/// Input parsing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    /// Accept probabilities written as percentages ("90%").
    #[serde(default = "default_true")]
    pub accept_percentages: bool,
}

fn default_conf_level() -> f64 {
    DEFAULT_CONF_LEVEL
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            estimation: EstimationSettings::default(),
            output: OutputSettings::default(),
            input: InputSettings::default(),
        }
    }
}

impl Default for EstimationSettings {
    fn default() -> Self {
        EstimationSettings {
            conf_level: DEFAULT_CONF_LEVEL,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        InputSettings {
            accept_percentages: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse settings from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let json = r#"{
            "schema_version": "1.0.0",
            "description": "trial team defaults",
            "estimation": { "conf_level": 0.9 },
            "output": { "precision": 6 },
            "input": { "accept_percentages": false }
        }"#;

        let settings = Settings::from_str(json).unwrap();
        assert_eq!(settings.description.as_deref(), Some("trial team defaults"));
        assert_eq!(settings.estimation.conf_level, 0.9);
        assert_eq!(settings.output.precision, 6);
        assert!(!settings.input.accept_percentages);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings = Settings::from_str(r#"{"schema_version": "1.0.0"}"#).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let settings =
            Settings::from_str(r#"{"schema_version": "1.0.0", "estimation": {}}"#).unwrap();
        assert_eq!(settings.estimation.conf_level, DEFAULT_CONF_LEVEL);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Settings::from_str("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn test_missing_schema_version_is_parse_error() {
        let err = Settings::from_str(r#"{"estimation": {"conf_level": 0.9}}"#).unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
