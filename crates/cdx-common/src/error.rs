//! Error types for cdx-bridge.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification (bad input vs. numerical failure vs. config)
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//! - Suggested actions for agents
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Invalid Parameter
//!   Reason: invalid parameter ppa=1.5: must lie in (0, 1]
//!   Fix: Check the value against its documented domain. Percentages such as 90% mean 0.9.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 30,
//!   "category": "input",
//!   "message": "invalid parameter ppa=1.5: must lie in (0, 1]",
//!   "recoverable": true,
//!   "suggested_action": "fix_input",
//!   "context": { "parameter": "ppa", "value": 1.5 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for cdx-bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Out-of-domain estimator inputs.
    Input,
    /// Valid inputs whose combination produced an invalid intermediate.
    Numerical,
    /// Settings file errors.
    Config,
    /// Tool lookup and argument binding errors.
    Tool,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Tool => write!(f, "tool"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for agents to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Correct the offending input and call again.
    FixInput,
    /// Run the settings check command.
    RunCheck,
    /// Reset settings to defaults.
    ResetConfig,
    /// List the available tools and their schemas.
    ListTools,
    /// Retry the operation.
    Retry,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::ListTools => write!(f, "list_tools"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for cdx-bridge.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid settings file: {0}")]
    InvalidSettings(String),

    // Estimation errors (30-39)
    #[error("invalid parameter {name}={value}: {constraint}")]
    InvalidParameter {
        name: String,
        value: f64,
        constraint: String,
    },

    #[error("computation error: {0}")]
    Computation(String),

    // Tool errors (40-49)
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an out-of-domain input.
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: f64,
        constraint: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            value,
            constraint: constraint.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Estimation errors
    /// - 40-49: Tool errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidSettings(_) => 11,
            Error::InvalidParameter { .. } => 30,
            Error::Computation(_) => 31,
            Error::UnknownTool { .. } => 40,
            Error::InvalidToolArguments(_) => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidSettings(_) => ErrorCategory::Config,
            Error::InvalidParameter { .. } => ErrorCategory::Input,
            Error::Computation(_) => ErrorCategory::Numerical,
            Error::UnknownTool { .. } | Error::InvalidToolArguments(_) => ErrorCategory::Tool,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Estimation is deterministic, so retrying identical input never helps;
    /// recoverable here means "different input or settings can succeed".
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidSettings(_) => true,
            Error::InvalidParameter { .. } => true,
            Error::Computation(_) => false,
            Error::UnknownTool { .. } => true,
            Error::InvalidToolArguments(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for agents.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidSettings(_) => SuggestedAction::ResetConfig,
            Error::InvalidParameter { .. } => SuggestedAction::FixInput,
            Error::Computation(_) => SuggestedAction::ManualIntervention,
            Error::UnknownTool { .. } => SuggestedAction::ListTools,
            Error::InvalidToolArguments(_) => SuggestedAction::ListTools,
            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::FixInput,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'cdx-core check' to see which settings file was resolved and why it failed."
            }
            Error::InvalidSettings(_) => {
                "Fix the reported field in settings.json, or delete the file to fall back to built-in defaults."
            }
            Error::InvalidParameter { .. } => {
                "Check the value against its documented domain. Percentages such as 90% mean 0.9."
            }
            Error::Computation(_) => {
                "The inputs are individually valid but produced an invalid intermediate. Review the combination of values."
            }
            Error::UnknownTool { .. } => {
                "Run 'cdx-core tools list' to see the available tool names."
            }
            Error::InvalidToolArguments(_) => {
                "Run 'cdx-core tools list' and match the arguments to the tool's input schema."
            }
            Error::Io(_) => "Check that the file exists and is readable, then retry.",
            Error::Json(_) => "Invalid JSON input. Check syntax with 'jq .' and retry.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidSettings(_) => "Invalid Settings",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::Computation(_) => "Computation Error",
            Error::UnknownTool { .. } => "Unknown Tool",
            Error::InvalidToolArguments(_) => "Invalid Tool Arguments",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for agents.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., parameter name and value).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidParameter { name, value, .. } => {
                context.insert("parameter".to_string(), serde_json::json!(name));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::UnknownTool { name } => {
                context.insert("tool".to_string(), serde_json::json!(name));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }
}

/// Result of a batch of estimations that may partially succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult<T> {
    /// Successfully completed items.
    pub succeeded: Vec<T>,

    /// Failed items with their errors.
    pub failed: Vec<BatchError>,

    /// Summary statistics.
    pub summary: BatchSummary,
}

/// A single error in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Index or identifier of the failed item.
    pub item_id: String,

    /// The structured error.
    pub error: StructuredError,
}

/// Summary of batch results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub all_succeeded: bool,
    pub any_succeeded: bool,
}

impl<T> BatchResult<T> {
    /// Create a new batch result from succeeded and failed items.
    pub fn new(succeeded: Vec<T>, failed: Vec<BatchError>) -> Self {
        let succeeded_count = succeeded.len();
        let failed_count = failed.len();

        BatchResult {
            succeeded,
            failed,
            summary: BatchSummary {
                total: succeeded_count + failed_count,
                succeeded: succeeded_count,
                failed: failed_count,
                all_succeeded: failed_count == 0,
                any_succeeded: succeeded_count > 0,
            },
        }
    }

    /// Add a failure to the batch result.
    pub fn add_failure(&mut self, item_id: impl Into<String>, error: &Error) {
        self.failed.push(BatchError {
            item_id: item_id.into(),
            error: StructuredError::from(error),
        });
        self.summary.failed += 1;
        self.summary.total += 1;
        self.summary.all_succeeded = false;
    }

    /// Add a success to the batch result.
    pub fn add_success(&mut self, item: T) {
        self.succeeded.push(item);
        self.summary.succeeded += 1;
        self.summary.total += 1;
        self.summary.any_succeeded = true;
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

/// Format a batch result for human-readable output.
pub fn format_batch_human<T: std::fmt::Display>(result: &BatchResult<T>, use_color: bool) -> String {
    let (green, red, reset) = if use_color {
        ("\x1b[32m", "\x1b[31m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut output = String::new();

    if result.summary.all_succeeded {
        output.push_str(&format!(
            "{green}✓{reset} All {} scenarios estimated\n",
            result.summary.total,
            green = green,
            reset = reset
        ));
    } else if result.summary.any_succeeded {
        output.push_str(&format!(
            "Partial success: {} of {} scenarios estimated\n",
            result.summary.succeeded, result.summary.total
        ));
    } else {
        output.push_str(&format!(
            "{red}✗{reset} All {} scenarios failed\n",
            result.summary.total,
            red = red,
            reset = reset
        ));
    }

    if !result.succeeded.is_empty() {
        output.push('\n');
        for item in &result.succeeded {
            output.push_str(&format!("  {}\n", item));
        }
    }

    if !result.failed.is_empty() {
        output.push_str("\nErrors:\n");
        for batch_err in &result.failed {
            output.push_str(&format!(
                "  {red}✗{reset} {}: {}\n",
                batch_err.item_id,
                batch_err.error.message,
                red = red,
                reset = reset
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(Error::invalid_parameter("ppa", 1.5, "must lie in (0, 1]").code(), 30);
        assert_eq!(Error::Computation("negative variance".into()).code(), 31);
        assert_eq!(Error::UnknownTool { name: "x".into() }.code(), 40);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::invalid_parameter("npa", -0.1, "must lie in [0, 1]").category(),
            ErrorCategory::Input
        );
        assert_eq!(
            Error::Computation("nan".into()).category(),
            ErrorCategory::Numerical
        );
        assert_eq!(
            Error::InvalidSettings("bad".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::InvalidToolArguments("missing field".into()).category(),
            ErrorCategory::Tool
        );
    }

    #[test]
    fn invalid_parameter_and_computation_are_distinguishable() {
        let input = Error::invalid_parameter("prevalence", 0.0, "must lie in (0, 1]");
        let numeric = Error::Computation("variance is NaN".into());
        assert_ne!(input.code(), numeric.code());
        assert_ne!(input.category(), numeric.category());
        assert!(input.is_recoverable());
        assert!(!numeric.is_recoverable());
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = Error::invalid_parameter("ppa", 1.5, "must lie in (0, 1]");
        assert_eq!(err.to_string(), "invalid parameter ppa=1.5: must lie in (0, 1]");
    }

    #[test]
    fn test_suggested_action() {
        assert_eq!(
            Error::invalid_parameter("c", 2.0, "must lie in [0, 1]").suggested_action(),
            SuggestedAction::FixInput
        );
        assert_eq!(
            Error::UnknownTool { name: "nope".into() }.suggested_action(),
            SuggestedAction::ListTools
        );
        assert_eq!(
            Error::InvalidSettings("test".into()).suggested_action(),
            SuggestedAction::ResetConfig
        );
    }

    #[test]
    fn test_structured_error_from_invalid_parameter() {
        let err = Error::invalid_parameter("ppa", 0.0, "must lie in (0, 1]");
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 30);
        assert_eq!(structured.category, ErrorCategory::Input);
        assert!(structured.recoverable);
        assert_eq!(structured.suggested_action, SuggestedAction::FixInput);
        assert_eq!(
            structured.context.get("parameter"),
            Some(&serde_json::json!("ppa"))
        );
        assert_eq!(structured.context.get("value"), Some(&serde_json::json!(0.0)));
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::Computation("variance is negative".into());
        let json = serde_json::to_string(&StructuredError::from(&err)).unwrap();

        assert!(json.contains(r#""code":31"#));
        assert!(json.contains(r#""category":"numerical""#));
        assert!(json.contains(r#""recoverable":false"#));
        assert!(json.contains(r#""suggested_action":"manual_intervention""#));
    }

    #[test]
    fn test_structured_error_with_context() {
        let err = Error::UnknownTool { name: "cdx_x".into() };
        let structured = StructuredError::from(&err).with_context("available", ["cdx_ppv"]);
        assert_eq!(structured.context.get("tool"), Some(&serde_json::json!("cdx_x")));
        assert_eq!(
            structured.context.get("available"),
            Some(&serde_json::json!(["cdx_ppv"]))
        );
    }

    #[test]
    fn test_batch_result() {
        let mut batch: BatchResult<String> = BatchResult::default();

        batch.add_success("scenario-1".to_string());
        batch.add_success("scenario-2".to_string());
        batch.add_failure("scenario-3", &Error::invalid_parameter("npa", 1.2, "must lie in [0, 1]"));

        assert_eq!(batch.summary.total, 3);
        assert_eq!(batch.summary.succeeded, 2);
        assert_eq!(batch.summary.failed, 1);
        assert!(!batch.summary.all_succeeded);
        assert!(batch.summary.any_succeeded);
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::invalid_parameter("ppa", 1.5, "must lie in (0, 1]");
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Invalid Parameter"));
        assert!(formatted.contains("invalid parameter ppa=1.5"));
        assert!(formatted.contains("90% mean 0.9"));
    }

    #[test]
    fn test_format_batch_human_partial() {
        let mut batch: BatchResult<String> = BatchResult::default();
        batch.add_success("a: 0.45".to_string());
        batch.add_failure("b", &Error::Computation("bad".into()));

        let out = format_batch_human(&batch, false);
        assert!(out.contains("Partial success: 1 of 2"));
        assert!(out.contains("a: 0.45"));
        assert!(out.contains("b: computation error: bad"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Input.to_string(), "input");
        assert_eq!(ErrorCategory::Numerical.to_string(), "numerical");
    }

    #[test]
    fn test_suggested_action_display() {
        assert_eq!(SuggestedAction::FixInput.to_string(), "fix_input");
        assert_eq!(SuggestedAction::ListTools.to_string(), "list_tools");
    }
}
