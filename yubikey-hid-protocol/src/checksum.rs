/// Value the CRC register holds after running over data that already ends in its (inverted) checksum.
pub const CRC_OK_RESIDUAL: u16 = 0xf0b8;

const CRC_PRESET: u16 = 0xffff;
const CRC_POLYNOMIAL: u16 = 0x8408;

/// Calculate an ISO 13239 CRC over the whole buffer.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(CRC_PRESET, |crc, &byte| update(crc, byte))
}

/// Calculate an ISO 13239 CRC over `length` bytes starting at `offset`.
///
/// A range that does not fit inside `data` is clamped to the bytes that are present.
pub fn crc16_range(data: &[u8], offset: usize, length: usize) -> u16 {
    match range(data, offset, length) {
        Some(bytes) => crc16(bytes),
        None => crc16(data.get(offset..).unwrap_or(&[])),
    }
}

pub fn validate(data: &[u8]) -> bool {
    crc16(data) == CRC_OK_RESIDUAL
}

/// Like [`validate`] but only over a subrange, a range that does not fit inside `data` never validates.
pub fn validate_range(data: &[u8], offset: usize, length: usize) -> bool {
    range(data, offset, length).map_or(false, validate)
}

fn range(data: &[u8], offset: usize, length: usize) -> Option<&[u8]> {
    let end = offset.checked_add(length)?;
    data.get(offset..end)
}

fn update(mut crc: u16, byte: u8) -> u16 {
    crc ^= u16::from(byte);
    for _ in 0..8 {
        if crc & 1 != 0 {
            crc = (crc >> 1) ^ CRC_POLYNOMIAL;
        } else {
            crc >>= 1;
        }
    }
    crc
}
