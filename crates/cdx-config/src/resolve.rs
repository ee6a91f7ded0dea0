//! Settings resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → system path → defaults.

use std::path::{Path, PathBuf};

/// Discovered settings file path.
#[derive(Debug, Clone, Default)]
pub struct SettingsPath {
    /// Path to settings.json (or None if not found).
    pub path: Option<PathBuf>,

    /// Where the file was found (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/cdx-bridge/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_SETTINGS_PATH: &str = "CDX_BRIDGE_SETTINGS";
pub const ENV_CONFIG_DIR: &str = "CDX_BRIDGE_CONFIG_DIR";

/// Standard settings file name.
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Application name for XDG directories.
const APP_NAME: &str = "cdx-bridge";

/// Resolve the settings path using the standard resolution order.
///
/// 1. Explicit CLI path (if it exists)
/// 2. CDX_BRIDGE_SETTINGS environment variable
/// 3. CDX_BRIDGE_CONFIG_DIR environment variable + settings.json
/// 4. XDG config directory (~/.config/cdx-bridge/)
/// 5. System config (/etc/cdx-bridge/)
/// 6. Built-in defaults (None)
pub fn resolve_settings(cli_path: Option<&Path>) -> SettingsPath {
    let mut source = ConfigSource::default();
    let path = resolve_single_config(cli_path, ENV_SETTINGS_PATH, SETTINGS_FILENAME, &mut source);
    SettingsPath { path, source }
}

fn resolve_single_config(
    cli_path: Option<&Path>,
    env_var: &str,
    filename: &str,
    source: &mut ConfigSource,
) -> Option<PathBuf> {
    // 1. CLI argument
    if let Some(path) = cli_path {
        if path.exists() {
            *source = ConfigSource::CliArgument;
            return Some(path.to_path_buf());
        }
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(env_var) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(filename);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(filename);
        if path.exists() {
            *source = ConfigSource::XdgConfig;
            return Some(path);
        }
    }

    // 5. System config
    let system_path = system_config_dir().join(filename);
    if system_path.exists() {
        *source = ConfigSource::SystemConfig;
        return Some(system_path);
    }

    *source = ConfigSource::BuiltinDefault;
    None
}

/// Get the XDG config directory for cdx-bridge.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_wins_when_present() {
        let dir = std::env::temp_dir();
        let resolved = resolve_settings(Some(&dir));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path.as_deref(), Some(dir.as_path()));
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/cdx-bridge"));
    }
}
