//! Integration tests for crawl logging through tracing

use energy_symbol_crawler::crawler::events::{CrawlEvent, EventSink, TracingSink};
use energy_symbol_crawler::identifier::SymbolIdentifier;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn capture_json(filter: &str, events: &[CrawlEvent]) -> Vec<serde_json::Value> {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        for event in events {
            TracingSink.emit(event);
        }
    });

    captured
        .lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn attempt() -> CrawlEvent {
    CrawlEvent::Attempt {
        counter: 3,
        load_type: "Base".to_string(),
        identifier: SymbolIdentifier::from_raw("DAP00PFBEXD000103"),
    }
}

#[test]
fn test_attempt_line_carries_structured_fields() {
    let lines = capture_json("energy_symbol_crawler=info", &[attempt()]);
    assert_eq!(lines.len(), 1);

    let line = &lines[0];
    assert_eq!(line["level"], "INFO");
    assert_eq!(line["fields"]["message"], "3,Base,DAP00PFBEXD000103");
    assert_eq!(line["fields"]["counter"], 3);
    assert_eq!(line["fields"]["load_type"], "Base");
    assert_eq!(line["fields"]["identifier"], "DAP00PFBEXD000103");
}

#[test]
fn test_failure_line_carries_request_and_response() {
    let failed = CrawlEvent::FetchFailed {
        counter: 7,
        load_type: "Peak".to_string(),
        identifier: SymbolIdentifier::from_raw("DAP00PFPEXD000101"),
        request: Some("http://venue/Loader.aspx?ParTree=15131S&i=DAP00PFPEXD000101".to_string()),
        status: Some(502),
        response: Some("bad gateway".to_string()),
        error: "HTTP 502".to_string(),
    };
    let lines = capture_json("energy_symbol_crawler=info", &[failed]);

    let line = &lines[0];
    assert_eq!(line["level"], "ERROR");
    assert_eq!(line["fields"]["status"], 502);
    assert_eq!(line["fields"]["response"], "bad gateway");
    assert!(line["fields"]["request"]
        .as_str()
        .unwrap()
        .ends_with("i=DAP00PFPEXD000101"));
}

#[test]
fn test_debug_events_hidden_at_info() {
    let completed = CrawlEvent::Completed {
        counter: 1,
        identifier: SymbolIdentifier::from_raw("DAP00PFBEXD000101"),
        trades: 4,
    };

    let info = capture_json("energy_symbol_crawler=info", &[completed.clone(), attempt()]);
    assert_eq!(info.len(), 1);

    let debug = capture_json("energy_symbol_crawler=debug", &[completed, attempt()]);
    assert_eq!(debug.len(), 2);
    assert_eq!(debug[0]["level"], "DEBUG");
}
