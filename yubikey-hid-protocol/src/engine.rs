use std::convert::TryFrom;

use tracing::{debug, trace};

use crate::checksum::validate_range;
use crate::config::Config;
use crate::error::{Error, InputError, IntegrityError};
use crate::frame::Frame;
use crate::poller::{wait_for_clear, wait_for_set};
use crate::report::Report;
use crate::transport::Transport;
use crate::{
    ChallengeMode, Slot, StatusFlags, REPORT_DATA_LEN, RESET_SEQUENCE, RESPONSE_BUFFER_LEN,
    SHA1_MAX_BLOCK_SIZE, SLOT_DATA_SIZE,
};

/// Runs challenge-response exchanges against a token reachable through `T`.
///
/// Holds no per-exchange state, every buffer lives for the duration of one call.
pub struct ChallengeResponse<T> {
    transport: T,
    config: Config,
}

impl<T: Transport> ChallengeResponse<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    pub fn with_config(transport: T, config: Config) -> Self {
        ChallengeResponse { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Sends `challenge` to `slot` and returns the token's response.
    ///
    /// Challenges shorter than 64 bytes are padded. With `variable` set, a challenge ending in a
    /// zero byte is padded with 0xff so the token can tell the padding apart from the challenge.
    /// `may_block` lets the token extend the wait for a response, e.g. while it waits for a touch.
    pub fn challenge_response(
        &mut self,
        challenge: &[u8],
        mode: ChallengeMode,
        slot: u8,
        variable: bool,
        may_block: bool,
    ) -> Result<Vec<u8>, Error> {
        let response_len = mode
            .response_len()
            .ok_or(InputError::UnsupportedMode(mode))?;
        let payload = pad_challenge(challenge, variable)?;
        let slot = Slot::try_from(slot)?;

        debug!(?slot, ?mode, len = challenge.len(), "Sending challenge");

        let frame = Frame::new(payload, slot);
        self.write_frame(&frame)?;
        let response = self.read_response(may_block)?;

        if !validate_range(&response, 0, response_len + 2) {
            return Err(IntegrityError::Checksum.into());
        }

        Ok(response[..response_len].to_vec())
    }

    /// Writes every report of `frame`, waiting for the device to accept each one.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        for report in frame.to_reports() {
            wait_for_clear(
                &mut self.transport,
                StatusFlags::SLOT_WRITE,
                false,
                &self.config,
            )?;
            self.write_report(&report)?;
        }
        Ok(())
    }

    /// Waits for a response to become available and reads it, then returns the device to idle.
    ///
    /// Only the leading bytes of the returned buffer are meaningful, the rest is zero filled.
    /// Reading stops as soon as the response outgrows the buffer, the device is still reset.
    pub fn read_response(&mut self, may_block: bool) -> Result<[u8; RESPONSE_BUFFER_LEN], Error> {
        let mut response = ResponseBuffer::new();

        let first = wait_for_set(
            &mut self.transport,
            StatusFlags::RESP_PENDING,
            may_block,
            &self.config,
        )?;
        trace!(?first, "Response pending");
        let mut result = response.push(&first);

        // Continue reading while response pending is set
        while result.is_ok() {
            let report = self.transport.read_feature_report()?;
            trace!(?report, "Received from device");
            if !report.flags().contains(StatusFlags::RESP_PENDING) || report.sequence() == 0 {
                break;
            }
            result = response.push(&report);
        }

        self.write_reset()?;

        result?;
        Ok(response.bytes)
    }

    /// Returns the device to idle, discarding any remaining response.
    pub fn write_reset(&mut self) -> Result<(), Error> {
        self.write_report(&Report::write([0u8; REPORT_DATA_LEN], RESET_SEQUENCE))?;
        wait_for_clear(
            &mut self.transport,
            StatusFlags::SLOT_WRITE,
            false,
            &self.config,
        )?;
        Ok(())
    }

    fn write_report(&mut self, report: &Report) -> Result<(), Error> {
        trace!(?report, "Sending to device");
        self.transport.write_feature_report(report)?;
        Ok(())
    }
}

/// Pads `challenge` to a full slot payload.
pub(crate) fn pad_challenge(
    challenge: &[u8],
    variable: bool,
) -> Result<[u8; SLOT_DATA_SIZE], InputError> {
    if challenge.len() > SHA1_MAX_BLOCK_SIZE {
        return Err(InputError::UnsupportedChallengeSize {
            max_len: SHA1_MAX_BLOCK_SIZE,
            actual_len: challenge.len(),
        });
    }

    let pad_with = match challenge.last() {
        Some(0x00) if variable => 0xff,
        _ => 0x00,
    };
    let mut payload = [pad_with; SLOT_DATA_SIZE];
    payload[..challenge.len()].copy_from_slice(challenge);
    Ok(payload)
}

struct ResponseBuffer {
    bytes: [u8; RESPONSE_BUFFER_LEN],
    len: usize,
}

impl ResponseBuffer {
    fn new() -> Self {
        ResponseBuffer {
            bytes: [0u8; RESPONSE_BUFFER_LEN],
            len: 0,
        }
    }

    fn push(&mut self, report: &Report) -> Result<(), IntegrityError> {
        let end = self.len + REPORT_DATA_LEN;
        if end > RESPONSE_BUFFER_LEN {
            return Err(IntegrityError::ResponseOverflow {
                capacity: RESPONSE_BUFFER_LEN,
            });
        }
        self.bytes[self.len..end].copy_from_slice(report.data());
        self.len = end;
        Ok(())
    }
}
