//! # YubiKey HID over USB
//!
//! Finds a YubiKey on the USB bus, claims its HID interface and exchanges feature reports with it
//! through class control transfers, so it can be driven by
//! [`yubikey_hid_protocol::ChallengeResponse`].
//!
//! ## Example
//! ```rust,no_run
//! use yubikey_hid_protocol::{ChallengeMode, ChallengeResponse};
//! use yubikey_hid_usb::{UsbConfig, YubikeyHandle};
//!
//! let handle = YubikeyHandle::open_first(&UsbConfig::default()).unwrap();
//! let mut yubikey = ChallengeResponse::new(handle);
//! let hmac = yubikey
//!     .challenge_response(b"Sample #2", ChallengeMode::HmacSha1, 2, false, true)
//!     .unwrap();
//! ```

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

mod config;
mod device;
mod discovery;
mod error;

pub use config::UsbConfig;
pub use device::YubikeyHandle;
pub use discovery::{find_yubikey, is_yubikey};
pub use error::UsbError;

/// Vendor ID of Yubico.
pub const YUBICO_VENDOR_ID: u16 = 0x1050;

/// Product IDs of the YubiKey NEO with the OTP interface enabled.
pub const PRODUCT_IDS_NEO: [u16; 2] = [0x0111, 0x0114];

// HID class requests
const HID_GET_REPORT: u8 = 0x01;
const HID_SET_REPORT: u8 = 0x09;

const REPORT_TYPE_FEATURE: u16 = 0x03;
