// ABOUTME: Startup configuration resolved from the environment
// ABOUTME: Fixed defaults match the deployed signer box; every value is overridable

use gateway_core::config::{DEFAULT_SECRET_KEYS_PATH, DEVICE_URL_ENTRY};
use gateway_core::daemon::DEFAULT_DAEMON_URL;
use gateway_core::device::SIGNER_USB_ID;
use gateway_core::probe::{DEFAULT_METRICS_URL, DEFAULT_POWER_PIN, PROBE_TARGET_IP};
use std::env;
use std::time::Duration;

/// Interface names the health report probes, one wired and one
/// wireless backup.
#[derive(Debug, Clone)]
pub struct HealthSettings {
    pub wired_interface: String,
    pub wireless_interface: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub daemon_url: String,
    pub daemon_timeout: Duration,
    pub secret_keys_path: String,
    pub device_url_entry: String,
    pub signer_usb_id: String,
    pub probe_target_ip: String,
    pub probe_timeout: Duration,
    pub power_pin: u32,
    pub metrics_url: String,
    pub health: HealthSettings,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn secs_or(name: &str, default: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Settings {
    /// Reads all settings once at startup; handlers never consult the
    /// environment again.
    pub fn from_env() -> Self {
        Self {
            bind_addr: var_or("GATEWAY_BIND_ADDR", "0.0.0.0:8443"),
            daemon_url: var_or("SIGNER_DAEMON_URL", DEFAULT_DAEMON_URL),
            daemon_timeout: secs_or("SIGNER_DAEMON_TIMEOUT_SECS", 30),
            secret_keys_path: var_or("SIGNER_SECRET_KEYS_PATH", DEFAULT_SECRET_KEYS_PATH),
            device_url_entry: var_or("SIGNER_DEVICE_URL_ENTRY", DEVICE_URL_ENTRY),
            signer_usb_id: var_or("SIGNER_USB_ID", SIGNER_USB_ID),
            probe_target_ip: var_or("PROBE_TARGET_IP", PROBE_TARGET_IP),
            probe_timeout: secs_or("PROBE_TIMEOUT_SECS", 5),
            power_pin: env::var("POWER_GPIO_PIN")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_POWER_PIN),
            metrics_url: var_or("METRICS_URL", DEFAULT_METRICS_URL),
            health: HealthSettings {
                wired_interface: var_or("WIRED_INTERFACE_NAME", "eth0"),
                wireless_interface: var_or("WIRELESS_INTERFACE_NAME", "wlan0"),
            },
        }
    }
}
