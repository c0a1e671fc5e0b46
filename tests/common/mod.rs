//! Shared utilities for integration tests.

#![allow(dead_code)]

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use resilient_http_client::http::{HttpResponse, Transport};
use resilient_http_client::{
    DecisionGate, LifecycleHooks, RequestId, RequestOptions, TransportError,
};

/// Lifecycle event as seen by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    Delayed,
    Retry {
        count: usize,
        delay: Duration,
        status: u16,
    },
    Waiting {
        count: usize,
        status: u16,
    },
    Fail(String),
    Finalize,
}

/// Hooks that record every event and hand decision gates to the test.
///
/// Scripted decisions are applied immediately; once they run out, gates are
/// sent through the channel returned by [`RecordingHooks::with_gate_channel`].
#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<(RequestId, Event)>>,
    decisions: Mutex<VecDeque<bool>>,
    gates: Mutex<Option<mpsc::UnboundedSender<DecisionGate>>>,
}

impl RecordingHooks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_decisions(decisions: &[bool]) -> Arc<Self> {
        let hooks = Self::default();
        hooks.decisions.lock().unwrap().extend(decisions);
        Arc::new(hooks)
    }

    pub fn with_gate_channel() -> (Arc<Self>, mpsc::UnboundedReceiver<DecisionGate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hooks = Self::default();
        *hooks.gates.lock().unwrap() = Some(tx);
        (Arc::new(hooks), rx)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn ids(&self) -> Vec<RequestId> {
        self.events.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|event| matches(event)).count()
    }

    pub fn retries(&self) -> Vec<(usize, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Retry { count, delay, .. } => Some((count, delay)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, id: &RequestId, event: Event) {
        self.events.lock().unwrap().push((*id, event));
    }
}

impl LifecycleHooks for RecordingHooks {
    fn on_request_start(&self, _topic: &str, id: &RequestId) {
        self.push(id, Event::Start);
    }

    fn on_request_delayed(&self, _topic: &str, id: &RequestId) {
        self.push(id, Event::Delayed);
    }

    fn on_request_retry(
        &self,
        _topic: &str,
        id: &RequestId,
        retry_count: usize,
        next_retry: Duration,
        failed_on_status: u16,
    ) {
        self.push(
            id,
            Event::Retry {
                count: retry_count,
                delay: next_retry,
                status: failed_on_status,
            },
        );
    }

    fn on_waiting_for_user_decision(
        &self,
        _topic: &str,
        id: &RequestId,
        retry_count: usize,
        failed_on_status: u16,
        gate: DecisionGate,
    ) {
        self.push(
            id,
            Event::Waiting {
                count: retry_count,
                status: failed_on_status,
            },
        );

        if let Some(retry) = self.decisions.lock().unwrap().pop_front() {
            gate.resolve(retry);
            return;
        }
        if let Some(tx) = self.gates.lock().unwrap().as_ref() {
            let _ = tx.send(gate);
        }
    }

    fn on_fail(&self, _topic: &str, id: &RequestId, message: &str) {
        self.push(id, Event::Fail(message.to_string()));
    }

    fn on_request_finalize(&self, _topic: &str, id: &RequestId) {
        self.push(id, Event::Finalize);
    }
}

/// One scripted transport attempt.
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub result: Result<Value, TransportError>,
}

impl Step {
    pub fn ok(body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(body),
        }
    }

    pub fn fail(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(TransportError::new(status, format!("status {}", status))),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// In-memory transport replaying a fixed list of attempts.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    attempts: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// `failures` attempts failing with `status`, then `body`.
    pub fn failing_then(failures: usize, status: u16, body: Value) -> Self {
        Self::new(
            std::iter::repeat_with(|| Step::fail(status))
                .take(failures)
                .chain(std::iter::once(Step::ok(body))),
        )
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn get<T>(
        &self,
        _url: &str,
        _options: &RequestOptions,
    ) -> impl Future<Output = Result<HttpResponse<T>, TransportError>> + Send
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();

        async move {
            let step = step.ok_or_else(|| TransportError::network("script exhausted"))?;
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
            let body = serde_json::from_value(step.result?)
                .map_err(|e| TransportError::new(200, e.to_string()))?;
            Ok(HttpResponse::new(200, body))
        }
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the raw request head and returns status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;
                        let (status, body) = f(head).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// In-memory sink for formatted log output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route INFO and above on the current thread into a fresh buffer.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
