// Shared test helpers for integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use share_consistency::core::error::ProbeError;
use share_consistency::infra::database::DataSource;
use share_consistency::infra::http::ApiClient;
use share_consistency::models::{ApiResponse, Row, SqlValue};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Builds a row from `(column, value)` pairs.
pub fn row<const N: usize>(columns: [(&str, SqlValue); N]) -> Row {
    columns.into_iter().collect()
}

/// An in-memory data source. Each rule pairs a statement fragment with the
/// rows returned when a statement containing it is executed; the first
/// matching rule wins and unmatched statements return no rows.
#[derive(Default)]
pub struct FakeSource {
    rules: Vec<(String, Vec<Row>)>,
    panic_on: Option<String>,
    calls: RefCell<Vec<(String, Vec<SqlValue>)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.rules.push((needle.to_string(), rows));
        self
    }

    pub fn panicking_on(mut self, needle: &str) -> Self {
        self.panic_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.calls.borrow().clone()
    }
}

impl DataSource for FakeSource {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> Vec<Row> {
        self.calls
            .borrow_mut()
            .push((statement.to_string(), params.to_vec()));
        if let Some(needle) = &self.panic_on {
            if statement.contains(needle.as_str()) {
                panic!("fake source exploded on {}", needle);
            }
        }
        self.rules
            .iter()
            .find(|(needle, _)| statement.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }
}

/// How the fake API answers every request.
#[derive(Clone)]
pub enum FakeReply {
    Status(u16, &'static str),
    Unreachable,
    Structural,
}

/// An in-memory API client answering every request the same way.
pub struct FakeApi {
    reply: FakeReply,
    requests: RefCell<Vec<(String, String, bool)>>,
}

impl FakeApi {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn up() -> Self {
        Self::new(FakeReply::Status(200, "{\"status\":\"ok\"}"))
    }

    pub fn requests(&self) -> Vec<(String, String, bool)> {
        self.requests.borrow().clone()
    }
}

impl ApiClient for FakeApi {
    async fn request(
        &self,
        method: &str,
        path: &str,
        auth: bool,
        _timeout: Option<Duration>,
    ) -> Result<ApiResponse, ProbeError> {
        self.requests
            .borrow_mut()
            .push((method.to_string(), path.to_string(), auth));
        match &self.reply {
            FakeReply::Status(status, body) => Ok(ApiResponse {
                status: *status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: body.to_string(),
            }),
            FakeReply::Unreachable => Err(ProbeError::Connectivity(
                "connection refused".to_string(),
            )),
            FakeReply::Structural => Err(ProbeError::Structural(
                "api.token is not configured".to_string(),
            )),
        }
    }
}

/// A one-route HTTP server on a random local port that answers every
/// request with a fixed status and body, optionally after a delay.
/// Raw request heads are captured for assertions.
pub struct StubServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Failed to read stub address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    captured
                        .lock()
                        .unwrap()
                        .push(String::from_utf8_lossy(&buf).into_owned());

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn captured(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Returns a base URL on which nothing listens.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{}", addr)
}

/// Connection settings pointing at an address no database listens on.
pub const UNREACHABLE_PLAN_HEAD: &str = r#"
language = "en"

[database]
host = "127.0.0.1"
port = 1
user = "checker"
password = "secret"
database = "knot_image_sharing"
connect_timeout_secs = 1
query_timeout_secs = 2
"#;

/// Writes a check plan into `temp_dir` and returns its path.
pub fn write_plan(temp_dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(file_name);
    fs::write(&path, content).expect("Failed to write check plan");
    path
}

/// A plan whose database is unreachable and whose API lives at `base_url`.
pub fn unreachable_db_plan(temp_dir: &TempDir, base_url: &str, probes: &str) -> PathBuf {
    let content = format!(
        "{}\n[api]\nbase_url = \"{}\"\ntimeout_secs = 2\n\n{}",
        UNREACHABLE_PLAN_HEAD, base_url, probes
    );
    write_plan(temp_dir, "ConsistencyCheck.toml", &content)
}

/// Helper function to create an invalid TOML plan
pub fn create_invalid_toml(temp_dir: &TempDir) -> PathBuf {
    let content = r#"
language = "en"
# Invalid TOML - missing closing bracket
[[probes]
name = "broken"
"#;
    write_plan(temp_dir, "invalid.toml", content)
}
