use thiserror::Error;

use crate::poller::WaitMode;
use crate::ChallengeMode;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Timed out waiting for device to {mode} status {mask:02x}")]
    Timeout { mode: WaitMode, mask: u8 },

    #[error("Response integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Rejected before any report is exchanged with the device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Unsupported challenge mode: {0:?}")]
    UnsupportedMode(ChallengeMode),

    #[error("Unsupported challenge size ({actual_len}), at most {max_len} bytes are allowed")]
    UnsupportedChallengeSize { max_len: usize, actual_len: usize },

    #[error("Unsupported challenge slot: {0}")]
    InvalidSlot(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Read from device failed CRC check")]
    Checksum,

    #[error("Response does not fit in {capacity} bytes")]
    ResponseOverflow { capacity: usize },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Not all data was sent to device ({actual_len} of {expected_len} bytes)")]
    ShortWrite {
        expected_len: usize,
        actual_len: usize,
    },

    #[error("Not all data was received from device ({actual_len} of {expected_len} bytes)")]
    ShortRead {
        expected_len: usize,
        actual_len: usize,
    },

    #[error("Device error: {0}")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn device<E>(err: E) -> TransportError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TransportError::Device(Box::new(err))
    }
}
