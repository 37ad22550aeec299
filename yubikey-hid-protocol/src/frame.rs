use tracing::trace;

use crate::checksum::crc16;
use crate::report::Report;
use crate::{Slot, REPORT_DATA_LEN, SLOT_DATA_SIZE, TRAILER_SEQUENCE};

/// A slot command as written to the device: a full 64 byte payload, the slot selector and a checksum.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Frame {
    payload: [u8; SLOT_DATA_SIZE],
    slot: u8,
}

impl Frame {
    pub fn new(payload: [u8; SLOT_DATA_SIZE], slot: Slot) -> Frame {
        Frame {
            payload,
            slot: slot.hmac_selector(),
        }
    }

    pub fn payload(&self) -> &[u8; SLOT_DATA_SIZE] {
        &self.payload
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Checksum over the payload, computed from the current payload on every call.
    pub fn crc(&self) -> u16 {
        crc16(&self.payload)
    }

    /// Splits the frame into the reports written to the device.
    ///
    /// Payload chunks that are entirely zero are omitted, the device fills the gap from the
    /// sequence numbers. The first report and the trailer are always sent.
    pub fn to_reports(&self) -> Vec<Report> {
        let crc = self.crc();

        let mut reports = Vec::with_capacity(TRAILER_SEQUENCE as usize + 1);
        for (sequence, chunk) in self.payload.chunks_exact(REPORT_DATA_LEN).enumerate() {
            if sequence != 0 && chunk.iter().all(|&b| b == 0) {
                continue;
            }
            let mut data = [0u8; REPORT_DATA_LEN];
            data.copy_from_slice(chunk);
            reports.push(Report::write(data, sequence as u8));
        }

        // Last payload byte, slot, crc (lsb first) and filler
        let [crc_lsb, crc_msb] = crc.to_le_bytes();
        reports.push(Report::write(
            [
                self.payload[SLOT_DATA_SIZE - 1],
                self.slot,
                crc_lsb,
                crc_msb,
                0x00,
                0x00,
                0x00,
            ],
            TRAILER_SEQUENCE,
        ));

        trace!(count = reports.len(), crc, "Split frame into reports");
        reports
    }
}
