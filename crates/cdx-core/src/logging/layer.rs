//! Custom tracing layer for JSONL output.
//!
//! This layer produces machine-parseable JSONL logs on stderr while
//! keeping stdout clean for command payloads.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::LogEvent;

/// Correlation fields lifted to the top level of each JSONL record.
#[derive(Debug, Clone, Default)]
struct Correlation {
    run_id: Option<String>,
    stage: Option<String>,
}

impl Correlation {
    fn absorb(&mut self, field: &Field, value: String) -> bool {
        match field.name() {
            "run_id" => self.run_id = Some(value),
            "stage" => self.stage = Some(value),
            _ => return false,
        }
        true
    }

    fn fill_from(&mut self, outer: &Correlation) {
        if self.run_id.is_none() {
            self.run_id.clone_from(&outer.run_id);
        }
        if self.stage.is_none() {
            self.stage.clone_from(&outer.stage);
        }
    }
}

/// A visitor that extracts field values from tracing events.
struct JsonFieldVisitor {
    correlation: Correlation,
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
}

impl JsonFieldVisitor {
    fn new() -> Self {
        JsonFieldVisitor {
            correlation: Correlation::default(),
            fields: serde_json::Map::new(),
            message: None,
        }
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else if !self.correlation.absorb(field, value.to_string()) {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(s);
        } else if !self.correlation.absorb(field, s.clone()) {
            self.insert(field, serde_json::Value::String(s));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // JSON has no NaN or infinity; keep them visible as strings.
        let json = serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string()));
        self.insert(field, json);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::Bool(value));
    }
}

/// A visitor for extracting span-level correlation.
#[derive(Default)]
struct SpanVisitor(Correlation);

impl Visit for SpanVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.absorb(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.absorb(field, format!("{:?}", value));
    }
}

/// JSONL tracing layer that outputs to stderr.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    /// Create a new JSONL layer writing to stderr.
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    /// Create a new JSONL layer with a custom writer.
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = SpanVisitor::default();
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.0);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = JsonFieldVisitor::new();
        event.record(&mut visitor);

        // Event fields win; spans fill the gaps, innermost first.
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(outer) = span.extensions().get::<Correlation>() {
                    visitor.correlation.fill_from(outer);
                }
            }
        }

        let mut record = LogEvent::new(
            (*event.metadata().level()).into(),
            event.metadata().target(),
        );
        record.run_id = visitor.correlation.run_id;
        record.stage = visitor.correlation.stage;
        record.message = visitor.message;
        record.fields = visitor.fields;

        let json = record.to_jsonl();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", json);
        }
    }
}
