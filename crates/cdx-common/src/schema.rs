//! Output schema versioning.

/// Version of the JSON envelope emitted by cdx-core commands and tools.
///
/// Bump the minor version for additive fields, the major version when a
/// field changes meaning or disappears.
pub const SCHEMA_VERSION: &str = "1.0.0";
