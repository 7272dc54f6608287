// SPDX-License-Identifier: MIT
//! MozLog-format JSON event formatting for `tracing`.
//!
//! Emits one JSON object per event, following the MozLog 2.0 application
//! logging standard consumed by heka-based log aggregation:
//!
//! ```json
//! {"Timestamp": 1706745600000000000, "Type": "request.summary",
//!  "Logger": "myapp", "Hostname": "web-1", "EnvVersion": "2.0",
//!  "Severity": 6, "Pid": 1, "Fields": {"path": "/__heartbeat__", ...}}
//! ```
//!
//! Install it on the fmt subscriber:
//!
//! ```rust
//! use dockerflow::logging::MozLogFormatter;
//!
//! let _ = tracing_subscriber::fmt()
//!     .event_format(MozLogFormatter::new("myapp"))
//!     .try_init();
//! ```

use std::fmt;

use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const LOGGING_FORMAT_VERSION: &str = "2.0";

/// Syslog severity for a tracing level. CRITICAL has no tracing equivalent;
/// anything below DEBUG maps to the syslog debug level.
fn syslog_severity(level: &Level) -> u8 {
    if *level == Level::ERROR {
        3
    } else if *level == Level::WARN {
        4
    } else if *level == Level::INFO {
        6
    } else {
        7
    }
}

/// Event formatter producing MozLog 2.0 JSON lines.
pub struct MozLogFormatter {
    logger_name: String,
    hostname: String,
    pid: u32,
}

impl MozLogFormatter {
    /// Create a formatter advertising `logger_name` in the `Logger` field.
    ///
    /// The hostname is taken from `$HOSTNAME` (set by container runtimes),
    /// falling back to `localhost`.
    pub fn new(logger_name: impl Into<String>) -> Self {
        Self {
            logger_name: logger_name.into(),
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("localhost")),
            pid: std::process::id(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for MozLogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        // The event message lands under "msg", unless it is empty or already
        // a JSON blob (events carrying only structured fields stay that way).
        if let Some(message) = visitor.message {
            if !message.is_empty() && !is_value_jsonlike(&message) {
                fields.insert("msg".to_string(), Value::String(message));
            }
        }

        let record = json!({
            "Timestamp": chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            "Type": metadata.target(),
            "Logger": self.logger_name,
            "Hostname": self.hostname,
            "EnvVersion": LOGGING_FORMAT_VERSION,
            "Severity": syslog_severity(metadata.level()),
            "Pid": self.pid,
            "Fields": fields,
        });

        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

/// Returns `true` if the value looks like a JSON object. Use only on strings.
fn is_value_jsonlike(value: &str) -> bool {
    value.starts_with('{') && value.ends_with('}')
}

/// Collects event fields into a JSON map, holding the message aside.
#[derive(Default)]
struct FieldVisitor {
    fields: Map<String, Value>,
    message: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields
            .insert(field.name().to_string(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(rendered));
        }
    }
}

/// Install a global subscriber that writes MozLog lines to stdout, filtered
/// by `RUST_LOG`.
///
/// Fails if a global subscriber is already set.
pub fn try_init(
    logger_name: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .event_format(MozLogFormatter::new(logger_name))
        .try_init()
}
