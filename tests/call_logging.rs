//! Log output controlled by the `trace` and `log_result` flags.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use resilient_http_client::{
    RequestOptions, ResilienceOverrides, ResilienceSettings, ResilientHttpClient,
};

mod common;
use common::{CapturedLogs, RecordingHooks, ScriptedTransport, Step};

const URL: &str = "http://backend.test/books";
const TRACE_LINE: &str = "Fetch time of call-topic books";
const RESULT_LINE: &str = "Request result";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Book {
    title: String,
}

async fn slow_call(trace: bool, log_result: bool) -> (String, String) {
    let hooks = RecordingHooks::new();
    let client = ResilientHttpClient::new(
        ScriptedTransport::new([
            Step::ok(json!({ "title": "Dune" })).after(Duration::from_millis(6000))
        ]),
        ResilienceSettings::default(),
    );

    let (logs, _guard) = CapturedLogs::install();
    let _: Book = client
        .get(
            URL,
            ResilienceOverrides {
                trace: Some(trace),
                log_result: Some(log_result),
                ..ResilienceOverrides::for_topic("books").with_hooks(hooks.clone())
            },
            &RequestOptions::default(),
        )
        .await
        .unwrap();

    (logs.contents(), hooks.ids()[0].to_string())
}

#[tokio::test(start_paused = true)]
async fn test_trace_logs_elapsed_time() {
    let (logs, id) = slow_call(true, false).await;

    let line = logs
        .lines()
        .find(|line| line.contains(TRACE_LINE))
        .unwrap_or_else(|| panic!("no trace line in:\n{}", logs));
    assert!(line.contains("elapsed_ms=6000"), "line: {}", line);
    assert!(line.contains("topic=books"), "line: {}", line);
    assert!(line.contains(&format!("id={}", id)), "line: {}", line);
    assert!(!logs.contains(RESULT_LINE));
}

#[tokio::test(start_paused = true)]
async fn test_log_result_logs_body() {
    let (logs, id) = slow_call(false, true).await;

    let line = logs
        .lines()
        .find(|line| line.contains(RESULT_LINE))
        .unwrap_or_else(|| panic!("no result line in:\n{}", logs));
    assert!(line.contains("Dune"), "line: {}", line);
    assert!(line.contains(&format!("id={}", id)), "line: {}", line);
    assert!(!logs.contains(TRACE_LINE));
}

#[tokio::test(start_paused = true)]
async fn test_no_call_logs_with_flags_off() {
    let (logs, _) = slow_call(false, false).await;

    assert!(!logs.contains(TRACE_LINE), "logs: {}", logs);
    assert!(!logs.contains(RESULT_LINE), "logs: {}", logs);
}
