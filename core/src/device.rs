// ABOUTME: USB enumeration for the hardware signer device
// ABOUTME: Parses lsusb output and decides whether exactly one signer is attached and unlocked

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

/// Vendor:product identifier the supported hardware signer reports once
/// its signing app is open.
pub const SIGNER_USB_ID: &str = "2c97:0001";

/// One parsed line of the system device listing.
///
/// Rebuilt fresh on every enumeration and discarded once the readiness
/// verdict is extracted; device state changes between calls, so nothing
/// here is ever cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedDevice {
    pub bus_path: String,
    pub device_path: String,
    pub vendor_product_id: String,
    pub description_tag: String,
}

static DEVICE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Bus\s+(?P<bus>\d+)\s+Device\s+(?P<device>\d+).+ID\s+(?P<id>\w+:\w+)\s+(?P<tag>.+)$")
        .expect("device line pattern")
});

/// Parses a single `lsusb` line. Lines that do not match the fixed
/// pattern yield `None` and are skipped by the scan, never failing it.
pub fn parse_device_line(line: &str) -> Option<AttachedDevice> {
    let caps = DEVICE_LINE.captures(line)?;
    let bus = caps.name("bus")?.as_str();
    let device = caps.name("device")?.as_str();
    Some(AttachedDevice {
        bus_path: bus.to_string(),
        device_path: format!("/dev/bus/usb/{}/{}", bus, device),
        vendor_product_id: caps.name("id")?.as_str().to_ascii_lowercase(),
        description_tag: caps.name("tag")?.as_str().to_string(),
    })
}

fn matching_count(listing: &str, wanted: &str) -> usize {
    listing
        .lines()
        .filter_map(parse_device_line)
        .filter(|device| device.vendor_product_id == wanted)
        .count()
}

/// Reports whether the physical signer is attached and usable.
#[async_trait]
pub trait DeviceWatcher: Send + Sync {
    /// True iff exactly one matching device is present and unlocked.
    /// Zero matches means unplugged or locked; two or more is an
    /// ambiguous hardware state and is never collapsed into "ready".
    async fn is_signer_ready(&self) -> bool;
}

/// Enumerates attached USB devices with `lsusb`.
pub struct UsbDeviceWatcher {
    vendor_product_id: String,
}

impl UsbDeviceWatcher {
    pub fn new(vendor_product_id: impl Into<String>) -> Self {
        Self {
            vendor_product_id: vendor_product_id.into().to_ascii_lowercase(),
        }
    }
}

#[async_trait]
impl DeviceWatcher for UsbDeviceWatcher {
    async fn is_signer_ready(&self) -> bool {
        let output = match Command::new("lsusb").output().await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!("USB enumeration failed to run: {}", err);
                return false;
            }
        };
        if !output.status.success() {
            tracing::warn!(code = ?output.status.code(), "USB enumeration exited with an error");
            return false;
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        matching_count(&listing, &self.vendor_product_id) == 1
    }
}
