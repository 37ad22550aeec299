use std::fmt;

use crate::{StatusFlags, FEATURE_REPORT_LEN, REPORT_DATA_LEN, RESP_TIMEOUT_WAIT_MASK};

/// A single feature report as exchanged with the device.
///
/// Offset  Length  Description
/// ------------------------------------------------------------------------------
/// 0       7       Frame data (payload chunk, trailer fields or response bytes)
/// 7       1       Status flags (bits 5-7) and sequence number / seconds left (bits 0-4)
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Report(pub [u8; FEATURE_REPORT_LEN]);

impl Report {
    pub fn new(data: [u8; REPORT_DATA_LEN], status: u8) -> Report {
        let mut bytes = [0u8; FEATURE_REPORT_LEN];
        bytes[..REPORT_DATA_LEN].copy_from_slice(&data);
        bytes[REPORT_DATA_LEN] = status;
        Report(bytes)
    }

    /// Builds a report written by the host, the write flag is always set.
    pub fn write(data: [u8; REPORT_DATA_LEN], sequence: u8) -> Report {
        Report::new(
            data,
            StatusFlags::SLOT_WRITE.bits() | (sequence & RESP_TIMEOUT_WAIT_MASK),
        )
    }

    /// Builds a report from a buffer returned by the transport, `None` if it is not exactly one report long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Report> {
        if bytes.len() != FEATURE_REPORT_LEN {
            return None;
        }
        let mut report = [0u8; FEATURE_REPORT_LEN];
        report.copy_from_slice(bytes);
        Some(Report(report))
    }

    pub fn as_bytes(&self) -> &[u8; FEATURE_REPORT_LEN] {
        &self.0
    }

    pub fn data(&self) -> &[u8] {
        &self.0[..REPORT_DATA_LEN]
    }

    pub fn status(&self) -> u8 {
        self.0[REPORT_DATA_LEN]
    }

    pub fn flags(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.status())
    }

    /// Low five bits of the status byte: sequence number on writes and responses,
    /// seconds left while the device signals [`StatusFlags::RESP_TIMEOUT_WAIT`].
    pub fn sequence(&self) -> u8 {
        self.status() & RESP_TIMEOUT_WAIT_MASK
    }

    /// True if every bit of `mask` is set in the status byte.
    pub fn has_status(&self, mask: u8) -> bool {
        self.status() & mask == mask
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Report({})", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Report {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
