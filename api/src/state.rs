// ABOUTME: Shared state for the gateway router
// ABOUTME: Explicitly constructed collaborators plus the signer exclusivity lock

use crate::settings::HealthSettings;
use gateway_core::config::ConfigReader;
use gateway_core::daemon::DaemonClient;
use gateway_core::device::DeviceWatcher;
use gateway_core::probe::{MetricsSource, NetworkProber, PowerSensor};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Every collaborator is built once in `main` and injected here; no
/// hidden global state.
pub struct GatewayState {
    pub daemon: DaemonClient,
    pub config: Arc<dyn ConfigReader>,
    pub device: Arc<dyn DeviceWatcher>,
    pub prober: Arc<dyn NetworkProber>,
    pub power: Arc<dyn PowerSensor>,
    pub metrics: Arc<dyn MetricsSource>,
    pub health: HealthSettings,
    /// The physical signer cannot multiplex sessions. Every operation
    /// that touches the device (status verification, sign forwards,
    /// write-method catch-all forwards, the health report) runs inside
    /// this lock; concurrent callers queue instead of racing.
    pub signer_lock: Mutex<()>,
}
