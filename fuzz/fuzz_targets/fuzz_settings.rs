//! Fuzz target for settings.json parsing and validation.
//!
//! Tests that settings parsing, validation and snapshotting handle arbitrary
//! input without panicking.

#![no_main]

use cdx_config::{validate_settings, ConfigSnapshot, Settings, SettingsPath};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(settings) = Settings::from_str(text) else {
        return;
    };
    if validate_settings(&settings).is_ok() {
        let snapshot = ConfigSnapshot::new(&settings, &SettingsPath::default(), Some(text));
        assert_eq!(snapshot.short_id().len(), 12);
    }
});
