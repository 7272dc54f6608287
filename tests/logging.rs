// SPDX-License-Identifier: MIT
//! MozLog formatter output: envelope fields, severity mapping, message
//! handling.

use std::io;
use std::sync::{Arc, Mutex};

use dockerflow::logging::MozLogFormatter;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatter output in memory.
#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` under a MozLog subscriber and return the emitted JSON lines.
fn captured_lines(f: impl FnOnce()) -> Vec<serde_json::Value> {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .event_format(MozLogFormatter::new("test-service"))
        .with_writer(writer.clone())
        .finish();
    with_default(subscriber, f);

    let bytes = writer.0.lock().unwrap().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn events_carry_the_mozlog_envelope() {
    let lines = captured_lines(|| {
        tracing::info!(target: "request.summary", path = "/__heartbeat__", code = 200u64, "done");
    });

    assert_eq!(lines.len(), 1);
    let record = &lines[0];
    assert!(record["Timestamp"].as_i64().unwrap() > 0);
    assert_eq!(record["Type"], "request.summary");
    assert_eq!(record["Logger"], "test-service");
    assert!(record["Hostname"].is_string());
    assert_eq!(record["EnvVersion"], "2.0");
    assert_eq!(record["Severity"], 6);
    assert!(record["Pid"].as_u64().unwrap() > 0);
    assert_eq!(record["Fields"]["path"], "/__heartbeat__");
    assert_eq!(record["Fields"]["code"], 200);
    assert_eq!(record["Fields"]["msg"], "done");
}

#[test]
fn severity_follows_the_event_level() {
    let lines = captured_lines(|| {
        tracing::error!(target: "sev", "boom");
        tracing::warn!(target: "sev", "careful");
        tracing::debug!(target: "sev", "noise");
    });

    let severities: Vec<i64> = lines
        .iter()
        .map(|record| record["Severity"].as_i64().unwrap())
        .collect();
    assert_eq!(severities, vec![3, 4, 7]);
}

#[test]
fn field_only_events_have_no_msg() {
    let lines = captured_lines(|| {
        tracing::info!(target: "fields", agent = "curl/8.0", t = 12u64);
    });

    let fields = &lines[0]["Fields"];
    assert_eq!(fields["agent"], "curl/8.0");
    assert_eq!(fields["t"], 12);
    assert!(fields.get("msg").is_none());
}

#[test]
fn jsonlike_messages_are_not_duplicated_into_msg() {
    let lines = captured_lines(|| {
        tracing::info!(target: "blob", "{}", r#"{"already": "json"}"#);
    });

    assert!(lines[0]["Fields"].get("msg").is_none());
}
