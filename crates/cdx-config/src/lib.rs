//! cdx-bridge configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for settings.json
//! - Settings resolution (CLI → env → XDG → system → defaults)
//! - Schema and semantic validation
//! - Config snapshots for the output envelope

pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use resolve::{resolve_settings, ConfigSource, SettingsPath};
pub use settings::Settings;
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_settings, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// A resolved, parsed and validated settings file together with its snapshot.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub path: SettingsPath,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, read, parse and validate settings in one step.
///
/// When no file is found anywhere in the resolution chain, built-in defaults
/// are returned with a defaults-only snapshot.
pub fn load_settings(cli_path: Option<&std::path::Path>) -> ValidationResult<LoadedSettings> {
    let path = resolve_settings(cli_path);

    if let Some(requested) = cli_path {
        if path.source != ConfigSource::CliArgument {
            return Err(ValidationError::IoError(format!(
                "Settings file not found: {}",
                requested.display()
            )));
        }
    }

    let Some(file) = path.path.as_ref() else {
        return Ok(LoadedSettings {
            settings: Settings::default(),
            snapshot: ConfigSnapshot::defaults_only(),
            path,
        });
    };

    let content = std::fs::read_to_string(file).map_err(|e| {
        ValidationError::IoError(format!("Failed to read {}: {}", file.display(), e))
    })?;
    let settings = Settings::from_str(&content)?;
    validate_settings(&settings)?;
    let snapshot = ConfigSnapshot::new(&settings, &path, Some(&content));

    Ok(LoadedSettings {
        settings,
        path,
        snapshot,
    })
}
