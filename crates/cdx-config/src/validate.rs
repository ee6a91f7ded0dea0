//! Settings validation errors and semantic validation.

use thiserror::Error;

use crate::settings::Settings;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest precision that still distinguishes adjacent f64 values.
pub const MAX_PRECISION: usize = 17;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate settings semantically.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    if settings.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: settings.schema_version.clone(),
        });
    }

    let conf_level = settings.estimation.conf_level;
    if !(conf_level > 0.0 && conf_level < 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "estimation.conf_level".to_string(),
            message: format!("Must be in (0, 1), got {}", conf_level),
        });
    }

    if settings.output.precision > MAX_PRECISION {
        return Err(ValidationError::InvalidValue {
            field: "output.precision".to_string(),
            message: format!(
                "Must be at most {}, got {}",
                MAX_PRECISION, settings.output.precision
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_version_mismatch() {
        let mut settings = Settings::default();
        settings.schema_version = "2.0.0".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn test_conf_level_bounds() {
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let mut settings = Settings::default();
            settings.estimation.conf_level = bad;
            let err = validate_settings(&settings).unwrap_err();
            match err {
                ValidationError::InvalidValue { field, .. } => {
                    assert_eq!(field, "estimation.conf_level")
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        let mut settings = Settings::default();
        settings.estimation.conf_level = 0.99;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_precision_limit() {
        let mut settings = Settings::default();
        settings.output.precision = MAX_PRECISION;
        assert!(validate_settings(&settings).is_ok());

        settings.output.precision = MAX_PRECISION + 1;
        assert!(matches!(
            validate_settings(&settings),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
