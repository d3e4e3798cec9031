//! TFRecord framing.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ length: u64 LE                               │
//! │ masked_crc32c(length bytes): u32 LE          │
//! │ data: [u8; length]                           │
//! │ masked_crc32c(data): u32 LE                  │
//! └──────────────────────────────────────────────┘
//! ```

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::RecordError;

/// Bytes of framing around each payload.
pub const FRAME_OVERHEAD: usize = 8 + 4 + 4;

const MASK_DELTA: u32 = 0xa282_ead8;

/// CRC-32C (Castagnoli), reflected polynomial.
const CASTAGNOLI: u32 = 0x82F6_3B78;

const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut crc = n as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CASTAGNOLI
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[n] = crc;
        n += 1;
    }
    table
}

pub fn crc32c(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        crc = (crc >> 8) ^ CRC_TABLE[((crc ^ byte as u32) & 0xff) as usize];
    }
    !crc
}

pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c(data);
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Appends one framed record to `out`.
pub fn write_frame(out: &mut Vec<u8>, payload: &[u8]) {
    let len_bytes = (payload.len() as u64).to_le_bytes();
    out.reserve(FRAME_OVERHEAD + payload.len());
    out.extend_from_slice(&len_bytes);
    let _ = out.write_u32::<LittleEndian>(masked_crc32c(&len_bytes));
    out.extend_from_slice(payload);
    let _ = out.write_u32::<LittleEndian>(masked_crc32c(payload));
}

/// Splits a TFRecord stream into its payloads, verifying both checksums.
pub fn read_frames(mut data: &[u8]) -> Result<Vec<&[u8]>, RecordError> {
    let mut frames = Vec::new();
    while !data.is_empty() {
        if data.len() < 12 {
            return Err(RecordError::Truncated);
        }
        let len_bytes = &data[..8];
        let expected = LittleEndian::read_u32(&data[8..12]);
        if masked_crc32c(len_bytes) != expected {
            return Err(RecordError::Checksum("length"));
        }
        let len = usize::try_from(LittleEndian::read_u64(len_bytes))
            .map_err(|_| RecordError::Truncated)?;
        let rest = &data[12..];
        if rest.len() < len.saturating_add(4) {
            return Err(RecordError::Truncated);
        }
        let payload = &rest[..len];
        if masked_crc32c(payload) != LittleEndian::read_u32(&rest[len..len + 4]) {
            return Err(RecordError::Checksum("data"));
        }
        frames.push(payload);
        data = &rest[len + 4..];
    }
    Ok(frames)
}
