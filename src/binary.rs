use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecodeError, EncodeError};
use crate::geom::{Color, Matrix4, Vector2, Vector3};

/// Little-endian reader over an in-memory byte slice.
///
/// Every read either consumes exactly the requested bytes or fails with
/// `TruncatedStream`; there is no partial consumption on error.
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

/// Little-endian writer appending to an owned buffer.
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fails with `TrailingBytes` unless the whole input was consumed.
    pub fn expect_end(&self) -> Result<(), DecodeError> {
        if self.remaining() != 0 {
            return Err(DecodeError::TrailingBytes {
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::TruncatedStream {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    /// Reads a count field and rejects values that cannot possibly be
    /// backed by the remaining input, assuming `min_record_size` bytes per
    /// record. Keeps a corrupt count from driving a huge allocation.
    pub fn read_count(&mut self, min_record_size: usize) -> Result<u32, DecodeError> {
        let offset = self.pos;
        let count = self.read_u32()?;
        if count as usize * min_record_size > self.remaining() {
            return Err(DecodeError::CountOverflow { offset, count });
        }
        Ok(count)
    }

    /// Fixed-length, null-padded string field.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let raw = self.take(len)?;
        Ok(String::from_utf8_lossy(raw)
            .trim_end_matches(char::from(0))
            .to_string())
    }

    pub fn read_vector2(&mut self) -> Result<Vector2, DecodeError> {
        Ok(Vector2 {
            u: self.read_f32()?,
            v: self.read_f32()?,
        })
    }

    pub fn read_vector3(&mut self) -> Result<Vector3, DecodeError> {
        Ok(Vector3 {
            x: self.read_f32()?,
            y: self.read_f32()?,
            z: self.read_f32()?,
        })
    }

    /// Row-major 4x4 float matrix.
    pub fn read_matrix4(&mut self) -> Result<Matrix4, DecodeError> {
        let mut rows = [[0.0f32; 4]; 4];
        for row in rows.iter_mut() {
            for cell in row.iter_mut() {
                *cell = self.read_f32()?;
            }
        }
        Ok(Matrix4 { rows })
    }

    /// RGB or RGBA byte color; alpha defaults to opaque when absent.
    pub fn read_color(&mut self, has_alpha: bool) -> Result<Color, DecodeError> {
        let r = self.read_u8()?;
        let g = self.read_u8()?;
        let b = self.read_u8()?;
        let a = if has_alpha { self.read_u8()? } else { 255 };
        Ok(Color { r, g, b, a })
    }

    /// Reads `count` homogeneous records with the supplied element reader.
    pub fn read_array<T, F>(&mut self, count: usize, mut f: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut Self) -> Result<T, DecodeError>,
    {
        let mut out = Vec::with_capacity(count);
        for ordinal in 0..count {
            out.push(f(self).map_err(|e| e.at_record(ordinal))?);
        }
        Ok(out)
    }
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut raw = [0u8; 2];
        LittleEndian::write_u16(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut raw = [0u8; 2];
        LittleEndian::write_i16(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_u32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_i32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_f32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    /// Writes a count field, rejecting lengths above `u32::MAX`.
    pub fn write_count(&mut self, field: &'static str, count: usize) -> Result<(), EncodeError> {
        let value = u32::try_from(count).map_err(|_| EncodeError::ValueOutOfRange {
            field,
            value: count as i64,
        })?;
        self.write_u32(value);
        Ok(())
    }

    /// Fixed-length, null-padded string field. A value longer than the
    /// field is an error, never a silent truncation.
    pub fn write_fixed_string(&mut self, value: &str, len: usize) -> Result<(), EncodeError> {
        let raw = value.as_bytes();
        if raw.len() > len {
            return Err(EncodeError::FieldTooLong {
                value: value.to_string(),
                capacity: len,
            });
        }
        self.buf.extend_from_slice(raw);
        self.buf.resize(self.buf.len() + (len - raw.len()), 0);
        Ok(())
    }

    pub fn write_vector2(&mut self, v: &Vector2) {
        self.write_f32(v.u);
        self.write_f32(v.v);
    }

    pub fn write_vector3(&mut self, v: &Vector3) {
        self.write_f32(v.x);
        self.write_f32(v.y);
        self.write_f32(v.z);
    }

    pub fn write_matrix4(&mut self, m: &Matrix4) {
        for row in &m.rows {
            for cell in row {
                self.write_f32(*cell);
            }
        }
    }

    pub fn write_color(&mut self, c: &Color, has_alpha: bool) {
        self.write_u8(c.r);
        self.write_u8(c.g);
        self.write_u8(c.b);
        if has_alpha {
            self.write_u8(c.a);
        }
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip() {
        let mut w = BinaryWriter::new();
        w.write_u8(0xAB);
        w.write_u16(0x1234);
        w.write_i16(-2);
        w.write_u32(0xDEADBEEF);
        w.write_i32(-70000);
        w.write_f32(1.5);
        let bytes = w.into_bytes();

        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(r.read_i32().unwrap(), -70000);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert!(r.expect_end().is_ok());
    }

    #[test]
    fn little_endian_layout() {
        let mut w = BinaryWriter::new();
        w.write_u32(0x0403_0201);
        assert_eq!(w.into_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn truncated_read_reports_offset_and_need() {
        let mut r = BinaryReader::new(&[0u8; 6]);
        r.read_u32().unwrap();
        let err = r.read_u32().unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedStream {
                offset: 4,
                needed: 2
            }
        );
    }

    #[test]
    fn fixed_string_round_trip_and_padding() {
        let mut w = BinaryWriter::new();
        w.write_fixed_string("body", 9).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[4..], &[0u8; 5]);

        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_fixed_string(9).unwrap(), "body");
    }

    #[test]
    fn overlong_string_is_rejected() {
        let mut w = BinaryWriter::new();
        let err = w.write_fixed_string("muchtoolongname", 9).unwrap_err();
        assert_eq!(
            err,
            EncodeError::FieldTooLong {
                value: "muchtoolongname".to_string(),
                capacity: 9
            }
        );
        // Nothing was written.
        assert!(w.is_empty());
    }

    #[test]
    fn count_overflow_is_rejected() {
        let mut w = BinaryWriter::new();
        w.write_u32(1000);
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        let err = r.read_count(16).unwrap_err();
        assert_eq!(
            err,
            DecodeError::CountOverflow {
                offset: 0,
                count: 1000
            }
        );
    }

    #[test]
    fn array_errors_carry_ordinal() {
        let mut w = BinaryWriter::new();
        w.write_u32(7);
        w.write_u32(8);
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        let err = r.read_array(3, |r| r.read_u32()).unwrap_err();
        match err {
            DecodeError::Record { ordinal, .. } => assert_eq!(ordinal, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn color_without_alpha_defaults_opaque() {
        let mut w = BinaryWriter::new();
        w.write_color(
            &Color {
                r: 10,
                g: 20,
                b: 30,
                a: 99,
            },
            false,
        );
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 3);
        let mut r = BinaryReader::new(&bytes);
        let c = r.read_color(false).unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (10, 20, 30, 255));
    }
}
