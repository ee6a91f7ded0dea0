//! Exit codes for the cdx-core CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-9: Operational outcomes
//! - 10-19: Caller errors (fix the input, settings or tool call)
//! - 20-29: Failures the caller cannot fix by editing a single value

use cdx_common::Error;

/// Exit codes for cdx-core operations.
///
/// These codes are a stable contract for automation. Changes require
/// a major version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-9)
    // ========================================================================
    /// Every requested estimate was produced
    Clean = 0,

    /// Batch run where some scenarios failed
    PartialFail = 3,

    // ========================================================================
    // Caller Errors (10-19)
    // ========================================================================
    /// Invalid command-line arguments
    ArgsError = 10,

    /// Estimator input outside its domain
    InvalidParameter = 11,

    /// Settings file missing, unreadable or invalid
    ConfigError = 12,

    /// Unknown tool or malformed tool arguments
    ToolError = 13,

    // ========================================================================
    // Failures (20-29)
    // ========================================================================
    /// Valid inputs produced an invalid intermediate
    ComputationError = 20,

    /// I/O error
    IoError = 21,

    /// Internal error (bug - please report)
    InternalError = 22,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is a caller error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Check if this exit code indicates any error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::PartialFail => "ERR_PARTIAL",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InvalidParameter => "ERR_INVALID_PARAMETER",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ToolError => "ERR_TOOL",
            ExitCode::ComputationError => "ERR_COMPUTATION",
            ExitCode::IoError => "ERR_IO",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidParameter { .. } => ExitCode::InvalidParameter,
            Error::Computation(_) => ExitCode::ComputationError,
            Error::Config(_) | Error::InvalidSettings(_) => ExitCode::ConfigError,
            Error::UnknownTool { .. } | Error::InvalidToolArguments(_) => ExitCode::ToolError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::ArgsError,
        }
    }
}

impl ExitCode {
    /// Map a stable error code (as carried by a structured error) back to an exit code.
    pub fn from_error_code(code: u32) -> Self {
        match code {
            10 | 11 => ExitCode::ConfigError,
            30 => ExitCode::InvalidParameter,
            31 => ExitCode::ComputationError,
            40 | 41 => ExitCode::ToolError,
            60 => ExitCode::IoError,
            61 => ExitCode::ArgsError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
