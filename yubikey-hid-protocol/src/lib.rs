#[cfg(test)]
#[macro_use]
extern crate assert_matches;

mod checksum;
mod config;
mod engine;
mod error;
mod frame;
mod poller;
mod report;
mod transport;

#[cfg(test)]
mod fake_transport;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

pub use checksum::{crc16, crc16_range, validate, validate_range, CRC_OK_RESIDUAL};
pub use config::Config;
pub use engine::ChallengeResponse;
pub use error::{Error, InputError, IntegrityError, TransportError};
pub use frame::Frame;
pub use poller::{wait_for, wait_for_clear, wait_for_set, WaitMode};
pub use report::Report;
pub use transport::Transport;

/// Size of a single HID feature report exchanged with the device.
pub const FEATURE_REPORT_LEN: usize = 8;

/// Number of frame bytes carried by one feature report, the last byte is the status/sequence byte.
pub const REPORT_DATA_LEN: usize = FEATURE_REPORT_LEN - 1;

/// Size of the payload carried by every frame written to a slot.
pub const SLOT_DATA_SIZE: usize = 64;

/// Max size of an input SHA1 block, challenges longer than this are rejected.
pub const SHA1_MAX_BLOCK_SIZE: usize = 64;

/// Size of a SHA1 digest (160 bits).
pub const SHA1_DIGEST_SIZE: usize = 20;

/// Size of the buffer a response is accumulated into.
pub const RESPONSE_BUFFER_LEN: usize = 48;

/// Write 64 byte challenge to slot 1, get HMAC-SHA1 response.
pub const SLOT_CHAL_HMAC1: u8 = 0x30;

/// Write 64 byte challenge to slot 2, get HMAC-SHA1 response.
pub const SLOT_CHAL_HMAC2: u8 = 0x38;

/// Mask for the seconds-left (while waiting) or sequence number (while responding) field.
pub const RESP_TIMEOUT_WAIT_MASK: u8 = 0x1f;

/// Sequence number of the trailer report that closes a frame.
pub const TRAILER_SEQUENCE: u8 = 9;

/// Sequence number of the report that returns the device to idle.
pub const RESET_SEQUENCE: u8 = 0x0f;

bitflags! {
    /// Status bits found in the last byte of every feature report.
    pub struct StatusFlags: u8 {
        const RESP_TIMEOUT_WAIT = 0x20; // Waiting for timeout operation, seconds left in lower 5 bits
        const RESP_PENDING = 0x40; // Response pending
        const SLOT_WRITE = 0x80; // Write flag, set by app, cleared by device
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum ChallengeMode {
    /// HMAC-SHA1 challenge-response, the token answers with a 20 byte digest.
    HmacSha1,
    /// Yubico OTP challenge-response, recognized but not supported.
    Otp,
}

impl ChallengeMode {
    pub fn response_len(self) -> Option<usize> {
        match self {
            ChallengeMode::HmacSha1 => Some(SHA1_DIGEST_SIZE),
            ChallengeMode::Otp => None,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Selector byte placed in the trailer report for an HMAC challenge.
    pub fn hmac_selector(self) -> u8 {
        match self {
            Slot::One => SLOT_CHAL_HMAC1,
            Slot::Two => SLOT_CHAL_HMAC2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = InputError;

    fn try_from(slot: u8) -> Result<Self, Self::Error> {
        match slot {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            slot => Err(InputError::InvalidSlot(slot)),
        }
    }
}
