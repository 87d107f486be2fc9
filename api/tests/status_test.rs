// ABOUTME: Integration tests for the status verification endpoint
// ABOUTME: Exhaustive check matrix, URL normalization, and device-access serialization

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request as StubRequest;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use gateway_api::settings::HealthSettings;
use gateway_api::state::GatewayState;
use gateway_core::config::{ConfigError, ConfigReader};
use gateway_core::daemon::DaemonClient;
use gateway_core::device::DeviceWatcher;
use gateway_core::probe::{MetricsSource, NetworkProber, PowerSensor, ProbeError};
use http_body_util::BodyExt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const CONFIGURED_URL: &str = "ledger://wxyz-abcd/ed25519/0'/0'";

// ============ Mock collaborators ============

struct FixedConfig(Option<String>);

#[async_trait]
impl ConfigReader for FixedConfig {
    async fn configured_device_url(&self) -> Result<String, ConfigError> {
        self.0.clone().ok_or(ConfigError::Missing {
            entry: "ledger_tezos".to_string(),
        })
    }
}

struct FixedDevice(bool);

#[async_trait]
impl DeviceWatcher for FixedDevice {
    async fn is_signer_ready(&self) -> bool {
        self.0
    }
}

/// Device mock that counts concurrent entries into the enumeration
/// critical section.
struct CountingDevice {
    current: AtomicUsize,
    max_seen: Arc<AtomicUsize>,
}

#[async_trait]
impl DeviceWatcher for CountingDevice {
    async fn is_signer_ready(&self) -> bool {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        true
    }
}

/// Device mock that marks itself busy for the duration of a slow
/// enumeration.
struct SlowDevice {
    busy: Arc<AtomicBool>,
}

#[async_trait]
impl DeviceWatcher for SlowDevice {
    async fn is_signer_ready(&self) -> bool {
        self.busy.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.busy.store(false, Ordering::SeqCst);
        true
    }
}

/// Prober mock that records whether it ever ran while the device mock
/// was busy.
struct OverlapProber {
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
}

#[async_trait]
impl NetworkProber for OverlapProber {
    async fn ping(&self, _interface: &str) -> i32 {
        if self.busy.load(Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
        if self.busy.load(Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        0
    }
}

struct IdleProber;

#[async_trait]
impl NetworkProber for IdleProber {
    async fn ping(&self, _interface: &str) -> i32 {
        0
    }
}

struct IdlePower;

#[async_trait]
impl PowerSensor for IdlePower {
    async fn read(&self) -> i64 {
        0
    }
}

struct IdleMetrics;

#[async_trait]
impl MetricsSource for IdleMetrics {
    async fn scrape(&self) -> Result<String, ProbeError> {
        Ok(String::new())
    }
}

// ============ Helpers ============

/// Stub daemon answering `GET /keys/...` with 200 JSON when the key is
/// known and 404 text otherwise.
async fn spawn_daemon(key_known: bool) -> SocketAddr {
    let app = Router::new().fallback(move |_req: StubRequest| async move {
        if key_known {
            Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"public_key":"edpk..."}"#))
                .unwrap()
        } else {
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Body::from("unknown key"))
                .unwrap()
        }
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn app_with(
    daemon_addr: SocketAddr,
    config: Arc<dyn ConfigReader>,
    device: Arc<dyn DeviceWatcher>,
) -> Router {
    let state = Arc::new(GatewayState {
        daemon: DaemonClient::new(format!("http://{}", daemon_addr), Duration::from_secs(2)),
        config,
        device,
        prober: Arc::new(IdleProber),
        power: Arc::new(IdlePower),
        metrics: Arc::new(IdleMetrics),
        health: HealthSettings {
            wired_interface: "eth0".to_string(),
            wireless_interface: "wlan0".to_string(),
        },
        signer_lock: tokio::sync::Mutex::new(()),
    });
    gateway_api::api::http::routes::routes(state)
}

fn statusz_request(device_url: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/statusz/edpkuTest?device_url={}", device_url))
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============ Tests ============

/// Flipping any single check to failing must flip the verdict: success
/// only when the daemon knows the key AND the URLs match AND the device
/// is ready.
#[tokio::test]
async fn status_is_success_iff_all_three_checks_hold() {
    for key_known in [true, false] {
        for url_matches in [true, false] {
            for device_ready in [true, false] {
                let daemon = spawn_daemon(key_known).await;
                let app = app_with(
                    daemon,
                    Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
                    Arc::new(FixedDevice(device_ready)),
                );
                let caller_url = if url_matches {
                    "ledger://wxyz-abcd/ed25519/0%27/0%27"
                } else {
                    "ledger://other-device/ed25519/0%27/0%27"
                };
                let response = app.oneshot(statusz_request(caller_url)).await.unwrap();

                let expected = match (key_known, url_matches, device_ready) {
                    (true, true, true) => StatusCode::OK,
                    // Daemon verdict passes through verbatim.
                    (false, _, _) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                assert_eq!(
                    response.status(),
                    expected,
                    "combination key_known={} url_matches={} device_ready={}",
                    key_known,
                    url_matches,
                    device_ready
                );
            }
        }
    }
}

#[tokio::test]
async fn success_relays_the_daemon_body() {
    let daemon = spawn_daemon(true).await;
    let app = app_with(
        daemon,
        Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
        Arc::new(FixedDevice(true)),
    );
    let response = app
        .oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%27/0%27"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&body).unwrap(),
        serde_json::json!({"public_key": "edpk..."})
    );
}

#[tokio::test]
async fn daemon_failure_body_passes_through_verbatim() {
    let daemon = spawn_daemon(false).await;
    let app = app_with(
        daemon,
        Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
        Arc::new(FixedDevice(true)),
    );
    let response = app
        .oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%27/0%27"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "unknown key");
}

/// The caller's load balancer may percent-encode the URL; both sides
/// are normalized identically before comparison, so an already-encoded
/// caller value still matches the raw configured one.
#[tokio::test]
async fn url_comparison_survives_pre_encoded_caller_values() {
    let daemon = spawn_daemon(true).await;
    let app = app_with(
        daemon,
        Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
        Arc::new(FixedDevice(true)),
    );
    // Double-encoded apostrophes: Query decoding yields "%27", which the
    // normalization keeps verbatim while escaping the configured "'".
    let response = app
        .oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%2527/0%2527"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_config_entry_is_a_500_not_a_default() {
    let daemon = spawn_daemon(true).await;
    let app = app_with(daemon, Arc::new(FixedConfig(None)), Arc::new(FixedDevice(true)));
    let response = app
        .oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%27/0%27"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("configuration"), "body was: {}", body);
}

#[tokio::test]
async fn missing_device_url_parameter_is_rejected() {
    let daemon = spawn_daemon(true).await;
    let app = app_with(
        daemon,
        Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
        Arc::new(FixedDevice(true)),
    );
    let response = app
        .oneshot(
            Request::builder()
                .uri("/statusz/edpkuTest")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Two simultaneous status checks must never overlap inside the
/// device-access critical section.
#[tokio::test]
async fn concurrent_status_checks_are_serialized() {
    let daemon = spawn_daemon(true).await;
    let max_seen = Arc::new(AtomicUsize::new(0));
    let device = Arc::new(CountingDevice {
        current: AtomicUsize::new(0),
        max_seen: max_seen.clone(),
    });
    let app = app_with(
        daemon,
        Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
        device,
    );

    let first = {
        let app = app.clone();
        tokio::spawn(async move {
            app.oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%27/0%27"))
                .await
                .unwrap()
        })
    };
    let second = tokio::spawn(async move {
        app.oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%27/0%27"))
            .await
            .unwrap()
    });

    let (first, second) = (first.await.unwrap(), second.await.unwrap());
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        max_seen.load(Ordering::SeqCst),
        1,
        "device critical section was entered concurrently"
    );
}

/// Health probes may run concurrently with each other but never with a
/// device-touching operation; the whole report queues on the signer
/// lock.
#[tokio::test]
async fn health_probes_wait_for_device_operations() {
    let daemon = spawn_daemon(true).await;
    let busy = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let state = Arc::new(GatewayState {
        daemon: DaemonClient::new(format!("http://{}", daemon), Duration::from_secs(2)),
        config: Arc::new(FixedConfig(Some(CONFIGURED_URL.to_string()))),
        device: Arc::new(SlowDevice { busy: busy.clone() }),
        prober: Arc::new(OverlapProber {
            busy: busy.clone(),
            overlaps: overlaps.clone(),
        }),
        power: Arc::new(IdlePower),
        metrics: Arc::new(IdleMetrics),
        health: HealthSettings {
            wired_interface: "eth0".to_string(),
            wireless_interface: "wlan0".to_string(),
        },
        signer_lock: tokio::sync::Mutex::new(()),
    });
    let app = gateway_api::api::http::routes::routes(state);

    let status = {
        let app = app.clone();
        tokio::spawn(async move {
            app.oneshot(statusz_request("ledger://wxyz-abcd/ed25519/0%27/0%27"))
                .await
                .unwrap()
        })
    };
    // Give the status check time to take the signer lock first.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let health = tokio::spawn(async move {
        app.oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    });

    let (status, health) = (status.await.unwrap(), health.await.unwrap());
    assert_eq!(status.status(), StatusCode::OK);
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(
        overlaps.load(Ordering::SeqCst),
        0,
        "a health probe ran during a device operation"
    );
}
