// ABOUTME: Forwarding client for the loopback signing daemon
// ABOUTME: Relays one request per call and tags the reply as structured JSON or raw bytes

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use std::time::Duration;
use thiserror::Error;

/// Loopback address of the signing daemon.
pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:8442";

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("signing daemon did not answer within {0:?}")]
    Timeout(Duration),
    #[error("signing daemon unreachable: {0}")]
    Unreachable(String),
}

/// Body of a daemon reply. A body that does not parse as JSON is `Raw`,
/// not an error; callers pass it through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum DaemonBody {
    Structured(serde_json::Value),
    Raw(Vec<u8>),
}

/// The daemon's answer, unmodified: its status code and its body bytes
/// (re-encodable when structured).
#[derive(Debug, Clone)]
pub struct DaemonReply {
    pub status: u16,
    pub body: DaemonBody,
}

impl DaemonReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn classify(bytes: Vec<u8>) -> DaemonBody {
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(value) => DaemonBody::Structured(value),
        Err(_) => DaemonBody::Raw(bytes),
    }
}

/// Synchronous pass-through client for the daemon. One attempt per
/// call, bounded by the client timeout; never retries.
#[derive(Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        // No connections held open between requests; each forward
        // dials the loopback daemon fresh.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Issues the equivalent call against the daemon, preserving method,
    /// path, query, and body. The reply's status and bytes come back
    /// unmodified; only the JSON-or-not classification is added.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Vec<u8>>,
    ) -> Result<DaemonReply, DaemonError> {
        let url = format!("{}/{}", self.base_url, path_and_query.trim_start_matches('/'));
        let mut request = self.http.request(method, &url);
        if let Some(bytes) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                DaemonError::Timeout(self.timeout)
            } else {
                DaemonError::Unreachable(err.to_string())
            }
        })?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| DaemonError::Unreachable(err.to_string()))?;
        Ok(DaemonReply {
            status,
            body: classify(bytes.to_vec()),
        })
    }

    pub async fn get(&self, path_and_query: &str) -> Result<DaemonReply, DaemonError> {
        self.forward(Method::GET, path_and_query, None).await
    }

    pub async fn post(
        &self,
        path_and_query: &str,
        body: Vec<u8>,
    ) -> Result<DaemonReply, DaemonError> {
        self.forward(Method::POST, path_and_query, Some(body)).await
    }
}
