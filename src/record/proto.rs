//! Minimal protobuf wire helpers for `tf.train.Example`.
//!
//! Only the pieces the record format needs: varints, length-delimited
//! fields and packed little-endian floats, plus a field reader that skips
//! anything it does not recognise.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::RecordError;

pub const WIRE_VARINT: u8 = 0;
pub const WIRE_FIXED64: u8 = 1;
pub const WIRE_LEN: u8 = 2;
pub const WIRE_FIXED32: u8 = 5;

pub fn tag(field: u32, wire_type: u8) -> u64 {
    ((field as u64) << 3) | wire_type as u64
}

pub fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

pub fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Size of a length-delimited field (tag + length prefix + body).
pub fn len_field_size(field: u32, body_len: usize) -> usize {
    varint_len(tag(field, WIRE_LEN)) + varint_len(body_len as u64) + body_len
}

pub fn put_len_header(buf: &mut Vec<u8>, field: u32, body_len: usize) {
    put_varint(buf, tag(field, WIRE_LEN));
    put_varint(buf, body_len as u64);
}

pub fn put_f32(buf: &mut Vec<u8>, value: f32) {
    // Vec<u8> writes are infallible.
    let _ = buf.write_f32::<LittleEndian>(value);
}

/// One decoded field. Length-delimited bodies borrow from the input.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

/// Iterates the top-level fields of one message.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn varint(&mut self) -> Result<u64, RecordError> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or(RecordError::Malformed("truncated varint"))?;
            self.pos += 1;
            value |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(RecordError::Malformed("varint too long"))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], RecordError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or(RecordError::Malformed("field runs past end of message"))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn next_field(&mut self) -> Result<Option<(u32, FieldValue<'a>)>, RecordError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let key = self.varint()?;
        let field = (key >> 3) as u32;
        let value = match (key & 0x7) as u8 {
            WIRE_VARINT => FieldValue::Varint(self.varint()?),
            WIRE_FIXED64 => FieldValue::Fixed64(LittleEndian::read_u64(self.take(8)?)),
            WIRE_LEN => {
                let len = self.varint()? as usize;
                FieldValue::Bytes(self.take(len)?)
            }
            WIRE_FIXED32 => FieldValue::Fixed32(LittleEndian::read_u32(self.take(4)?)),
            _ => return Err(RecordError::Malformed("unsupported wire type")),
        };
        Ok(Some((field, value)))
    }
}
