//! Output rendering for cdx-core commands.
//!
//! Every command result implements [`Report`], which gives it a Markdown,
//! one-line summary and prose rendering. JSON output wraps the serialized
//! result in a common envelope:
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "run_id": "run-3f2a9c1d0b7e",
//!   "generated_at": "2026-01-01T00:00:00+00:00",
//!   "command": "bridging",
//!   "status": "ok",
//!   "settings": { "id": "5a1c...", "source": "builtin default" },
//!   "result": { ... }
//! }
//! ```
//!
//! Payloads go to stdout. Human-readable errors go to stderr; JSON errors use
//! the same envelope on stdout with `status: "error"`.

use cdx_common::{
    format_batch_human, format_error_human, BatchResult, Error, OutputFormat, StructuredError,
    SCHEMA_VERSION,
};
use cdx_config::{ConfigSnapshot, Settings};
use serde::Serialize;

use crate::batch::ScenarioEstimate;
use crate::estimate::{BridgingEstimate, PpvEstimate};
use crate::tools::{NormalizedQuery, ToolContent, ToolDefinition, TOOL_NAMES};

/// Overall status reported in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Partial,
    Error,
}

/// Text renderings of a command result.
pub trait Report: Serialize {
    fn markdown(&self, precision: usize) -> String;
    fn summary(&self, precision: usize) -> String;
    fn prose(&self, precision: usize) -> String;

    fn status(&self) -> Status {
        Status::Ok
    }
}

/// Everything needed to render one command's output.
#[derive(Debug, Clone)]
pub struct OutputContext<'a> {
    pub format: OutputFormat,
    pub run_id: &'a str,
    pub command: &'a str,
    pub snapshot: &'a ConfigSnapshot,
    pub precision: usize,
    pub use_color: bool,
}

impl OutputContext<'_> {
    /// Wrap a serialized payload in the JSON envelope.
    pub fn envelope(&self, status: Status, key: &str, payload: serde_json::Value) -> serde_json::Value {
        let mut envelope = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": self.run_id,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "command": self.command,
            "status": status,
            "settings": {
                "id": self.snapshot.short_id(),
                "source": self.snapshot.settings_source,
            },
        });
        envelope[key] = payload;
        envelope
    }

    /// Render a result in the configured format. `None` means print nothing.
    pub fn render<T: Report>(&self, report: &T) -> Option<String> {
        match self.format {
            OutputFormat::Json => {
                let payload = serde_json::to_value(report).unwrap_or_else(|e| {
                    serde_json::json!({ "error": "serialization_failed", "detail": e.to_string() })
                });
                Some(to_pretty(&self.envelope(report.status(), "result", payload)))
            }
            OutputFormat::Md => Some(report.markdown(self.precision)),
            OutputFormat::Summary => Some(report.summary(self.precision)),
            OutputFormat::Prose => Some(report.prose(self.precision)),
            OutputFormat::Exitcode => None,
        }
    }

    /// Render an error in the configured format.
    pub fn render_error(&self, err: &Error) -> Option<String> {
        match self.format {
            OutputFormat::Json => {
                let mut structured = StructuredError::from(err);
                if let Error::UnknownTool { .. } = err {
                    structured = structured.with_context("available", TOOL_NAMES);
                }
                let structured = serde_json::to_value(structured)
                    .unwrap_or_else(|_| serde_json::json!({ "code": err.code() }));
                Some(to_pretty(&self.envelope(Status::Error, "error", structured)))
            }
            OutputFormat::Exitcode => None,
            _ => Some(format_error_human(err, self.use_color)),
        }
    }

    /// Print a result to stdout.
    pub fn emit<T: Report>(&self, report: &T) {
        if let Some(text) = self.render(report) {
            println!("{}", text.trim_end());
        }
    }

    /// Print an error: JSON to stdout, everything else to stderr.
    pub fn emit_error(&self, err: &Error) {
        let Some(text) = self.render_error(err) else {
            return;
        };
        if self.format == OutputFormat::Json {
            println!("{}", text);
        } else {
            eprintln!("{}", text);
        }
    }
}

fn to_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| r#"{"error":"serialization_failed"}"#.to_string())
}

fn fixed(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

/// A confidence level as a percentage, without float noise (0.95 -> "95").
fn percent(level: f64) -> String {
    format!("{}", (level * 1e4).round() / 1e2)
}

fn md_table(header: [&str; 2], rows: &[(&str, String)]) -> String {
    let mut out = format!("| {} | {} |\n|---|---|\n", header[0], header[1]);
    for (name, value) in rows {
        out.push_str(&format!("| {} | {} |\n", name, value));
    }
    out
}

impl Report for PpvEstimate {
    fn markdown(&self, precision: usize) -> String {
        format!(
            "# Positive predictive value\n\n{}",
            md_table(
                ["Quantity", "Value"],
                &[
                    ("PPV", fixed(self.ppv_estimate, precision)),
                    ("Variance", fixed(self.ppv_variance, precision + 2)),
                    ("Std. error", fixed(self.ppv_variance.sqrt(), precision)),
                ],
            )
        )
    }

    fn summary(&self, precision: usize) -> String {
        format!(
            "ppv={} var={}",
            fixed(self.ppv_estimate, precision),
            fixed(self.ppv_variance, precision + 2)
        )
    }

    fn prose(&self, precision: usize) -> String {
        format!(
            "The positive predictive value of the local diagnostic is {}, with a delta-method \
             standard error of {}.",
            fixed(self.ppv_estimate, precision),
            fixed(self.ppv_variance.sqrt(), precision)
        )
    }
}

impl Report for BridgingEstimate {
    fn markdown(&self, precision: usize) -> String {
        let mut rows = vec![
            ("Efficacy", fixed(self.efficacy_estimate, precision)),
            (
                "Confidence interval",
                format!(
                    "[{}, {}]",
                    fixed(self.ci_lower, precision),
                    fixed(self.ci_upper, precision)
                ),
            ),
            ("Confidence level", format!("{}%", percent(self.conf_level))),
            ("Variance", fixed(self.efficacy_variance, precision + 2)),
            ("z", fixed(self.z, precision)),
        ];
        if let Some(ppv) = &self.ppv {
            rows.push(("PPV", fixed(ppv.ppv_estimate, precision)));
            rows.push(("PPV variance", fixed(ppv.ppv_variance, precision + 2)));
        }
        format!("# Bridging efficacy\n\n{}", md_table(["Quantity", "Value"], &rows))
    }

    fn summary(&self, precision: usize) -> String {
        format!(
            "efficacy={} ci=[{}, {}] level={}%",
            fixed(self.efficacy_estimate, precision),
            fixed(self.ci_lower, precision),
            fixed(self.ci_upper, precision),
            percent(self.conf_level)
        )
    }

    fn prose(&self, precision: usize) -> String {
        let headline = format!(
            "The estimated efficacy in the diagnostic-positive population is {}, with a {}% \
             confidence interval from {} to {}.",
            fixed(self.efficacy_estimate, precision),
            percent(self.conf_level),
            fixed(self.ci_lower, precision),
            fixed(self.ci_upper, precision)
        );
        match &self.ppv {
            Some(ppv) => format!(
                "{} This accounts for a positive predictive value of {}.",
                headline,
                fixed(ppv.ppv_estimate, precision)
            ),
            None => format!(
                "{} The diagnostic has perfect negative agreement, so the trial effect carries over unchanged.",
                headline
            ),
        }
    }
}

impl Report for BatchResult<ScenarioEstimate> {
    fn markdown(&self, precision: usize) -> String {
        let mut out = format!(
            "# Batch results\n\n{} of {} scenarios estimated\n\n",
            self.summary.succeeded, self.summary.total
        );
        if !self.succeeded.is_empty() {
            out.push_str("| Scenario | Efficacy | Lower | Upper | Level |\n|---|---|---|---|---|\n");
            for item in &self.succeeded {
                let e = &item.estimate;
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {}% |\n",
                    item.id,
                    fixed(e.efficacy_estimate, precision),
                    fixed(e.ci_lower, precision),
                    fixed(e.ci_upper, precision),
                    percent(e.conf_level)
                ));
            }
        }
        if !self.failed.is_empty() {
            out.push_str("\n## Failures\n\n");
            for failure in &self.failed {
                out.push_str(&format!(
                    "- `{}` (code {}): {}\n",
                    failure.item_id, failure.error.code, failure.error.message
                ));
            }
        }
        out
    }

    fn summary(&self, _precision: usize) -> String {
        format!(
            "batch: {} total, {} estimated, {} failed",
            self.summary.total, self.summary.succeeded, self.summary.failed
        )
    }

    fn prose(&self, _precision: usize) -> String {
        format_batch_human(self, false)
    }

    fn status(&self) -> Status {
        if self.summary.all_succeeded {
            Status::Ok
        } else if self.summary.any_succeeded {
            Status::Partial
        } else {
            Status::Error
        }
    }
}

impl Report for NormalizedQuery {
    fn markdown(&self, _precision: usize) -> String {
        format!("# Normalized query\n\n> {}\n", self.query)
    }

    fn summary(&self, _precision: usize) -> String {
        self.query.clone()
    }

    fn prose(&self, _precision: usize) -> String {
        self.query.clone()
    }
}

/// Tools advertised to an agent front-end.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCatalog {
    pub tools: Vec<ToolDefinition>,
}

impl Report for ToolCatalog {
    fn markdown(&self, _precision: usize) -> String {
        let rows: Vec<(&str, String)> = self
            .tools
            .iter()
            .map(|t| (t.name.as_str(), t.description.clone()))
            .collect();
        format!("# Tools\n\n{}", md_table(["Name", "Description"], &rows))
    }

    fn summary(&self, _precision: usize) -> String {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        format!("{} tools: {}", names.len(), names.join(", "))
    }

    fn prose(&self, _precision: usize) -> String {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        format!("Available tools are {}.", names.join(", "))
    }
}

/// Content returned by a single tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallOutput {
    pub tool: String,
    pub content: Vec<ToolContent>,
}

impl ToolCallOutput {
    fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Report for ToolCallOutput {
    fn markdown(&self, _precision: usize) -> String {
        format!("# {}\n\n```json\n{}\n```\n", self.tool, self.joined_text())
    }

    fn summary(&self, _precision: usize) -> String {
        let compact: Vec<String> = self
            .content
            .iter()
            .map(|c| {
                serde_json::from_str::<serde_json::Value>(&c.text)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| c.text.clone())
            })
            .collect();
        format!("{}: {}", self.tool, compact.join(" "))
    }

    fn prose(&self, _precision: usize) -> String {
        self.joined_text()
    }
}

/// Result of `check`: the validated settings and their snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub valid: bool,
    pub settings: Settings,
    pub snapshot: ConfigSnapshot,
}

impl Report for CheckReport {
    fn markdown(&self, _precision: usize) -> String {
        let s = &self.snapshot;
        format!(
            "# Settings check\n\n{}",
            md_table(
                ["Field", "Value"],
                &[
                    ("Source", s.settings_source.clone()),
                    ("Path", s.settings_path.clone().unwrap_or_else(|| "-".to_string())),
                    ("Snapshot", s.short_id().to_string()),
                    ("Confidence level", format!("{}%", percent(s.summary.conf_level))),
                    ("Precision", s.summary.precision.to_string()),
                    ("Accept percentages", s.summary.accept_percentages.to_string()),
                ],
            )
        )
    }

    fn summary(&self, _precision: usize) -> String {
        format!(
            "settings ok: {} ({})",
            self.snapshot.settings_source,
            self.snapshot.short_id()
        )
    }

    fn prose(&self, _precision: usize) -> String {
        format!(
            "Settings from {} are valid; intervals default to {}% confidence.",
            self.snapshot.settings_source,
            percent(self.snapshot.summary.conf_level)
        )
    }
}

/// Build metadata for `version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub cdx_core_version: &'static str,
    pub rust_version: &'static str,
    pub schema_version: &'static str,
    pub config_schema_version: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        VersionInfo {
            cdx_core_version: env!("CARGO_PKG_VERSION"),
            rust_version: env!("CARGO_PKG_RUST_VERSION"),
            schema_version: SCHEMA_VERSION,
            config_schema_version: cdx_config::CONFIG_SCHEMA_VERSION,
        }
    }
}

impl Report for VersionInfo {
    fn markdown(&self, _precision: usize) -> String {
        format!(
            "cdx-core {}\nschema version: {}\n",
            self.cdx_core_version, self.schema_version
        )
    }

    fn summary(&self, _precision: usize) -> String {
        format!("cdx-core {}", self.cdx_core_version)
    }

    fn prose(&self, precision: usize) -> String {
        self.summary(precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{estimate_bridging, BridgingInput, DiagnosticAccuracy};

    fn bridging(npa: f64) -> BridgingEstimate {
        estimate_bridging(&BridgingInput {
            accuracy: DiagnosticAccuracy {
                ppa: 0.95,
                npa,
                prevalence: 0.3,
                n1: 100,
                n0: 100,
            },
            c: 0.5,
            delta1: 0.5,
            var_delta1: 0.01,
            conf_level: None,
        })
        .unwrap()
    }

    fn context<'a>(format: OutputFormat, snapshot: &'a ConfigSnapshot) -> OutputContext<'a> {
        OutputContext {
            format,
            run_id: "run-000000000000",
            command: "bridging",
            snapshot,
            precision: 4,
            use_color: false,
        }
    }

    #[test]
    fn json_envelope_carries_provenance() {
        let snapshot = ConfigSnapshot::defaults_only();
        let out = context(OutputFormat::Json, &snapshot)
            .render(&bridging(0.9))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["run_id"], "run-000000000000");
        assert_eq!(value["command"], "bridging");
        assert_eq!(value["status"], "ok");
        assert_eq!(value["settings"]["id"], snapshot.short_id());
        assert_eq!(value["result"]["efficacy_estimate"], 0.45070422535211263);
        assert!(value["result"]["ppv"].is_object());
    }

    #[test]
    fn summary_and_prose_respect_precision() {
        let estimate = bridging(0.9);
        assert_eq!(
            estimate.summary(2),
            "efficacy=0.45 ci=[0.29, 0.62] level=95%"
        );
        let prose = estimate.prose(3);
        assert!(prose.contains("0.451"));
        assert!(prose.contains("95% confidence interval from 0.286 to 0.615"));
        assert!(prose.contains("positive predictive value of 0.803"));
    }

    #[test]
    fn perfect_npa_prose_mentions_no_adjustment() {
        let prose = bridging(1.0).prose(4);
        assert!(prose.contains("perfect negative agreement"));
    }

    #[test]
    fn markdown_has_table() {
        let md = bridging(0.9).markdown(4);
        assert!(md.starts_with("# Bridging efficacy"));
        assert!(md.contains("| Efficacy | 0.4507 |"));
        assert!(md.contains("| PPV | 0.8028 |"));
    }

    #[test]
    fn exitcode_format_is_silent() {
        let snapshot = ConfigSnapshot::defaults_only();
        let ctx = context(OutputFormat::Exitcode, &snapshot);
        assert!(ctx.render(&bridging(0.9)).is_none());
        assert!(ctx.render_error(&Error::Computation("x".into())).is_none());
    }

    #[test]
    fn json_error_uses_envelope() {
        let snapshot = ConfigSnapshot::defaults_only();
        let err = Error::invalid_parameter("ppa", 0.0, "must lie in (0, 1]");
        let out = context(OutputFormat::Json, &snapshot)
            .render_error(&err)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], 30);
        assert_eq!(value["error"]["context"]["parameter"], "ppa");
        assert!(value["error"]["context"].get("available").is_none());
    }

    #[test]
    fn unknown_tool_error_lists_available_tools() {
        let snapshot = ConfigSnapshot::defaults_only();
        let err = Error::UnknownTool {
            name: "get_weather".into(),
        };
        let out = context(OutputFormat::Json, &snapshot)
            .render_error(&err)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"]["context"]["tool"], "get_weather");
        assert_eq!(
            value["error"]["context"]["available"],
            serde_json::json!(["cdx_ppv", "cdx_bridging", "cdx_normalize_query"])
        );
    }

    #[test]
    fn human_error_has_fix_line() {
        let snapshot = ConfigSnapshot::defaults_only();
        let err = Error::Computation("negative variance".into());
        let out = context(OutputFormat::Summary, &snapshot)
            .render_error(&err)
            .unwrap();
        assert!(out.contains("Reason: "));
        assert!(out.contains("Fix:"));
    }

    #[test]
    fn batch_status_tracks_failures() {
        let mut batch: BatchResult<ScenarioEstimate> = BatchResult::default();
        assert_eq!(batch.status(), Status::Ok);
        batch.add_failure("a", &Error::Computation("x".into()));
        assert_eq!(batch.status(), Status::Error);
        batch.add_success(ScenarioEstimate {
            id: "b".into(),
            estimate: bridging(1.0),
        });
        assert_eq!(batch.status(), Status::Partial);
        assert_eq!(batch.summary(4), "batch: 2 total, 1 estimated, 1 failed");
        assert!(batch.markdown(4).contains("- `a` (code 31)"));
    }

    #[test]
    fn percent_drops_float_noise() {
        assert_eq!(percent(0.95), "95");
        assert_eq!(percent(0.975), "97.5");
        assert_eq!(percent(0.9), "90");
    }
}
