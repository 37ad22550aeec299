use std::collections::VecDeque;

use crate::{Report, StatusFlags, Transport, TransportError, TRAILER_SEQUENCE};

pub fn status(status: u8) -> Report {
    Report([0, 0, 0, 0, 0, 0, 0, status])
}

/// Replays scripted reads and records writes.
#[derive(Default)]
pub struct FakeTransport {
    pub reads: VecDeque<Report>,
    pub repeat: Option<Report>,
    pub writes: Vec<Report>,
    pub read_count: usize,
}

impl FakeTransport {
    pub fn with_reads(reads: Vec<Report>) -> Self {
        FakeTransport {
            reads: reads.into(),
            ..FakeTransport::default()
        }
    }

    pub fn repeating(report: Report) -> Self {
        FakeTransport {
            repeat: Some(report),
            ..FakeTransport::default()
        }
    }
}

impl Transport for FakeTransport {
    fn write_feature_report(&mut self, report: &Report) -> Result<(), TransportError> {
        self.writes.push(*report);
        Ok(())
    }

    fn read_feature_report(&mut self) -> Result<Report, TransportError> {
        self.read_count += 1;
        match self.reads.pop_front().or(self.repeat) {
            Some(report) => Ok(report),
            None => Err(TransportError::ShortRead {
                expected_len: 8,
                actual_len: 0,
            }),
        }
    }
}

/// Behaves like a token: idle while a frame is written, then answers with the scripted
/// response reports once the trailer arrives.
#[derive(Default)]
pub struct FakeYubikey {
    pub response: VecDeque<Report>,
    pub writes: Vec<Report>,
    pub read_count: usize,
    /// Number of reads after each write that still report the write flag.
    pub busy_reads: usize,
    busy: usize,
    responding: bool,
}

impl FakeYubikey {
    pub fn new(response: Vec<Report>) -> Self {
        FakeYubikey {
            response: response.into(),
            ..FakeYubikey::default()
        }
    }

    /// Response reports carrying `data` 7 bytes at a time with the pending flag set, the sequence
    /// field counting up from zero, followed by a report that ends the response.
    pub fn respond_with(data: &[u8], end: Report) -> Self {
        let mut response: Vec<Report> = data
            .chunks(7)
            .enumerate()
            .map(|(sequence, chunk)| {
                let mut bytes = [0u8; 7];
                bytes[..chunk.len()].copy_from_slice(chunk);
                Report::new(bytes, StatusFlags::RESP_PENDING.bits() | sequence as u8)
            })
            .collect();
        response.push(end);
        FakeYubikey::new(response)
    }
}

impl Transport for FakeYubikey {
    fn write_feature_report(&mut self, report: &Report) -> Result<(), TransportError> {
        self.writes.push(*report);
        self.busy = self.busy_reads;
        if report.sequence() == TRAILER_SEQUENCE {
            self.responding = true;
        }
        Ok(())
    }

    fn read_feature_report(&mut self) -> Result<Report, TransportError> {
        self.read_count += 1;
        if self.busy > 0 {
            self.busy -= 1;
            return Ok(status(StatusFlags::SLOT_WRITE.bits()));
        }
        if self.responding {
            if let Some(report) = self.response.pop_front() {
                return Ok(report);
            }
            self.responding = false;
        }
        Ok(status(0))
    }
}
