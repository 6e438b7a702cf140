//! JSONL layer.
//!
//! One object per event: `ts`, `level`, `service`, `pid`, `target`, `msg`,
//! then the event's fields under `fields` (sorted by name) and the source
//! location. In [`ObservabilityMode::ProdMetadataOnly`] only identifier,
//! counter and status fields are kept.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::ObservabilityMode;

/// One serialized log line.
#[derive(Debug, Serialize)]
pub struct LogLine<'a> {
    pub ts: String,
    pub level: &'static str,
    pub service: &'a str,
    pub pid: u32,
    pub target: &'a str,
    pub msg: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<&'static str, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Collects `message` separately from the other fields.
#[derive(Default)]
struct Collector {
    msg: String,
    fields: BTreeMap<&'static str, Value>,
}

impl Collector {
    fn text(&mut self, field: &Field, text: String) {
        if field.name() == "message" {
            self.msg = text;
        } else {
            self.fields.insert(field.name(), Value::String(text));
        }
    }
}

impl Visit for Collector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.text(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.text(field, value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.text(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name(), Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON number form.
        let value = serde_json::Number::from_f64(value)
            .map_or_else(|| Value::String(value.to_string()), Value::Number);
        self.fields.insert(field.name(), value);
    }
}

/// Whether a field survives production mode.
///
/// Chat content, post bodies and credentials never match; ids, counts and
/// outcome fields do.
fn is_metadata_field(name: &str) -> bool {
    name.ends_with("_id")
        || name.ends_with("_count")
        || matches!(
            name,
            "status" | "error" | "state" | "event" | "action" | "has_more" | "score_delta"
        )
}

/// Layer writing one [`LogLine`] per event to `make_writer`.
pub struct JsonLayer<W> {
    service: String,
    mode: ObservabilityMode,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service: impl Into<String>, mode: ObservabilityMode, make_writer: W) -> Self {
        Self {
            service: service.into(),
            mode,
            pid: std::process::id(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut collected = Collector::default();
        event.record(&mut collected);
        if self.mode == ObservabilityMode::ProdMetadataOnly {
            collected.fields.retain(|name, _| is_metadata_field(name));
        }

        let meta = event.metadata();
        let span = ctx.event_span(event);
        let line = LogLine {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: meta.level().as_str(),
            service: &self.service,
            pid: self.pid,
            target: meta.target(),
            msg: collected.msg,
            fields: collected.fields,
            span: span.as_ref().map(|span| span.name()),
            file: meta.file(),
            line: meta.line(),
        };

        let Ok(mut json) = serde_json::to_vec(&line) else {
            return;
        };
        json.push(b'\n');
        let _ = self.make_writer.make_writer().write_all(&json);
    }
}
