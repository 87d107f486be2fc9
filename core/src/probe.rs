// ABOUTME: Diagnostic probes for the health report
// ABOUTME: Interface-bound reachability pings, wall-power GPIO sensing, and metrics passthrough

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Well-known external address used for reachability probes.
pub const PROBE_TARGET_IP: &str = "8.8.8.8";

/// Local metrics exporter scraped for the passthrough section.
pub const DEFAULT_METRICS_URL: &str = "http://127.0.0.1:9100/metrics";

/// GPIO pin wired to the wall-power sense line.
pub const DEFAULT_POWER_PIN: u32 = 6;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("metrics endpoint unreachable: {0}")]
    MetricsUnreachable(String),
}

/// Reachability probe over a named network interface. Returns a ping
/// exit code: 0 means reachable, anything else is a failure sentinel.
#[async_trait]
pub trait NetworkProber: Send + Sync {
    async fn ping(&self, interface: &str) -> i32;
}

/// Boolean-like wall-power reading. 0 means wall power, 1 means
/// battery; -1 is the sentinel for an unreadable pin.
#[async_trait]
pub trait PowerSensor: Send + Sync {
    async fn read(&self) -> i64;
}

/// Plain-text metrics exposition fetch, appended verbatim to the
/// health report.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn scrape(&self) -> Result<String, ProbeError>;
}

/// Shells out to `/bin/ping -I <interface> -c1 <target>` with an outer
/// timeout so a dead interface can never hang the health report.
pub struct IcmpProber {
    target_ip: String,
    timeout: Duration,
}

impl IcmpProber {
    pub fn new(target_ip: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target_ip: target_ip.into(),
            timeout,
        }
    }
}

#[async_trait]
impl NetworkProber for IcmpProber {
    async fn ping(&self, interface: &str) -> i32 {
        let mut command = Command::new("/bin/ping");
        command
            .args(["-I", interface, "-c1", &self.target_ip])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        match tokio::time::timeout(self.timeout, command.status()).await {
            Ok(Ok(status)) => status.code().unwrap_or(1),
            Ok(Err(err)) => {
                tracing::warn!(interface, "ping failed to run: {}", err);
                1
            }
            Err(_) => {
                tracing::warn!(interface, "ping timed out after {:?}", self.timeout);
                1
            }
        }
    }
}

/// Reads a sysfs GPIO value file. Read failures degrade to the -1
/// sentinel rather than erroring; the health report is never partial.
pub struct GpioPin {
    value_path: PathBuf,
}

impl GpioPin {
    pub fn new(pin: u32) -> Self {
        Self {
            value_path: PathBuf::from(format!("/sys/class/gpio/gpio{}/value", pin)),
        }
    }

    pub fn at_path(value_path: impl Into<PathBuf>) -> Self {
        Self {
            value_path: value_path.into(),
        }
    }
}

#[async_trait]
impl PowerSensor for GpioPin {
    async fn read(&self) -> i64 {
        match tokio::fs::read_to_string(&self.value_path).await {
            Ok(raw) => raw.trim().parse().unwrap_or(-1),
            Err(err) => {
                tracing::warn!("power pin unreadable: {}", err);
                -1
            }
        }
    }
}

/// Fetches the node exporter's plain-text exposition.
pub struct NodeExporter {
    http: reqwest::Client,
    url: String,
}

impl NodeExporter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MetricsSource for NodeExporter {
    async fn scrape(&self) -> Result<String, ProbeError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| ProbeError::MetricsUnreachable(err.to_string()))?;
        response
            .text()
            .await
            .map_err(|err| ProbeError::MetricsUnreachable(err.to_string()))
    }
}
