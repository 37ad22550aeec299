use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PRODUCT_IDS_NEO, YUBICO_VENDOR_ID};

/// Which devices to look for and how to talk to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsbConfig {
    pub vendor_id: u16,
    pub product_ids: Vec<u16>,
    /// Interface number of the HID keyboard interface carrying the feature reports.
    ///
    /// Defaults to 0, the OTP interface on the NEO. Older host tools for this protocol claim
    /// interface 1 and send it as `wIndex`; set this to 1 to talk to the device the same way.
    pub interface: u8,
    /// Timeout of a single control transfer, in milliseconds.
    pub timeout_ms: u64,
}

impl UsbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UsbConfig {
    fn default() -> Self {
        UsbConfig {
            vendor_id: YUBICO_VENDOR_ID,
            product_ids: PRODUCT_IDS_NEO.to_vec(),
            interface: 0,
            timeout_ms: 2000,
        }
    }
}
