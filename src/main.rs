//! resilient-get: fetch a JSON resource with the resilience policy applied.
//!
//! ```text
//! resilient-get https://api.example.com/books --topic books --wait-for-user-decision
//! ```
//!
//! Lifecycle events are logged; when the retry budget is used up and user
//! gating is enabled, the decision is read from stdin.

use clap::Parser;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use resilient_http_client::config::loader::load_config;
use resilient_http_client::observability::logging::init_logging;
use resilient_http_client::{
    ClientConfig, DecisionGate, LifecycleHooks, RequestId, RequestOptions, ResilienceOverrides,
    ResilientHttpClient, ReqwestTransport,
};

#[derive(Parser)]
#[command(name = "resilient-get")]
#[command(about = "GET a JSON resource with retry, backoff and failover", long_about = None)]
struct Cli {
    /// URL to fetch
    url: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Topic used for override lookup and log correlation
    #[arg(short, long, default_value = "cli")]
    topic: String,

    /// Header in "Name: value" form (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter in "key=value" form (repeatable)
    #[arg(short = 'q', long = "query")]
    params: Vec<String>,

    /// Never retry
    #[arg(long)]
    no_retry: bool,

    /// Ask before giving up once the retry budget is used up
    #[arg(long)]
    wait_for_user_decision: bool,

    /// Log elapsed time of the call
    #[arg(long)]
    trace: bool,

    /// Log the decoded response
    #[arg(long)]
    log_result: bool,

    /// Log level, overriding the configuration file
    #[arg(long)]
    log_level: Option<String>,
}

/// Logs lifecycle events and asks on stdin when a decision is needed.
struct ConsoleHooks;

impl LifecycleHooks for ConsoleHooks {
    fn on_request_start(&self, topic: &str, id: &RequestId) {
        tracing::info!(topic, id = %id, "Request started");
    }

    fn on_request_delayed(&self, topic: &str, id: &RequestId) {
        tracing::warn!(topic, id = %id, "Request is taking longer than expected");
    }

    fn on_request_retry(
        &self,
        topic: &str,
        id: &RequestId,
        retry_count: usize,
        next_retry: Duration,
        failed_on_status: u16,
    ) {
        tracing::warn!(
            topic,
            id = %id,
            retry = retry_count,
            delay = ?next_retry,
            status = failed_on_status,
            "Retrying"
        );
    }

    fn on_waiting_for_user_decision(
        &self,
        topic: &str,
        id: &RequestId,
        retry_count: usize,
        failed_on_status: u16,
        gate: DecisionGate,
    ) {
        let question = format!(
            "[{}] still failing with {} after {} retries. Retry? [y/N] ",
            topic, failed_on_status, retry_count
        );
        let id = *id;
        tokio::task::spawn_blocking(move || {
            let retry = ask(&question).unwrap_or(false);
            if !gate.resolve(retry) {
                tracing::debug!(id = %id, "Request no longer waiting for a decision");
            }
        });
    }

    fn on_fail(&self, topic: &str, id: &RequestId, message: &str) {
        if message.is_empty() {
            tracing::error!(topic, id = %id, "Request failed");
        } else {
            tracing::error!(topic, id = %id, "{}", message);
        }
    }

    fn on_request_finalize(&self, topic: &str, id: &RequestId) {
        tracing::debug!(topic, id = %id, "Request finalized");
    }
}

fn ask(question: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    stderr.write_all(question.as_bytes())?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn split_pair(raw: &str, separator: char) -> Result<(String, String), String> {
    raw.split_once(separator)
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected '<name>{}<value>', got '{}'", separator, raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.observability.log_level));

    let mut options = RequestOptions::default();
    for header in &cli.headers {
        let (name, value) = split_pair(header, ':')?;
        options = options.header(name, value);
    }
    for param in &cli.params {
        let (name, value) = split_pair(param, '=')?;
        options = options.param(name, value);
    }

    let overrides = ResilienceOverrides {
        disable_retry: cli.no_retry.then_some(true),
        wait_for_user_decision: cli.wait_for_user_decision.then_some(true),
        trace: cli.trace.then_some(true),
        log_result: cli.log_result.then_some(true),
        hooks: Some(Arc::new(ConsoleHooks)),
        ..ResilienceOverrides::for_topic(cli.topic.as_str())
    };

    let transport = ReqwestTransport::new(&config.http)?;
    let client = ResilientHttpClient::new(transport, config.resilience);

    let body: Value = client.get(&cli.url, overrides, &options).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
