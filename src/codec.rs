//! Fixed-layout binary codec shared by all records.
//!
//! Every record mirrors a packed little-endian C struct in the firmware: no
//! padding, no framing, no length prefix. GATT delivers a whole characteristic
//! value at once, so a payload must be exactly the record's wire size.

use crate::error::{Error, Result};

/// A record with a fixed packed little-endian layout.
pub trait WireFormat: Sized {
    /// Name used in errors and logs.
    const NAME: &'static str;
    /// Exact encoded length in bytes.
    const WIRE_SIZE: usize;

    fn write_fields(&self, w: &mut WireWriter);

    /// Only called with exactly `WIRE_SIZE` bytes available.
    fn read_fields(r: &mut WireReader<'_>) -> Self;

    /// Encode into exactly `WIRE_SIZE` bytes.
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(Self::WIRE_SIZE);
        self.write_fields(&mut w);
        debug_assert_eq!(w.len(), Self::WIRE_SIZE, "{} layout drifted", Self::NAME);
        w.into_inner()
    }

    /// Decode a payload, which must be exactly `WIRE_SIZE` bytes long.
    fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != Self::WIRE_SIZE {
            return Err(Error::SizeMismatch {
                record: Self::NAME,
                expected: Self::WIRE_SIZE,
                actual: data.len(),
            });
        }
        let mut r = WireReader::new(data);
        Ok(Self::read_fields(&mut r))
    }
}

/// Appends little-endian fields to a buffer.
#[derive(Debug, Default)]
pub struct WireWriter(Vec<u8>);

impl WireWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub fn u8(&mut self, v: u8) {
        self.0.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    /// Bits are written untouched, so NaN payloads survive.
    pub fn f32(&mut self, v: f32) {
        self.0.extend_from_slice(&v.to_bits().to_le_bytes());
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.0.extend_from_slice(v);
    }
}

/// Reads little-endian fields from a payload of known length.
///
/// Callers check the payload length up front (see [`WireFormat::decode`]);
/// reading past the end is a layout bug and panics.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    pub fn u8(&mut self) -> u8 {
        let [b] = self.array::<1>();
        b
    }

    pub fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }

    pub fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.array())
    }

    pub fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    pub fn f32(&mut self) -> f32 {
        f32::from_bits(u32::from_le_bytes(self.array()))
    }
}

/// Truncate or zero-pad `data` to exactly `N` bytes.
pub fn fixed_blob<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = data.len().min(N);
    out[..n].copy_from_slice(&data[..n]);
    out
}

#[test]
fn test_writer_little_endian() {
    let mut w = WireWriter::default();
    w.u8(0x01);
    w.u16(0x0203);
    w.i32(-2);
    w.u32(0x0a0b0c0d);
    w.f32(1.0);
    assert_eq!(
        hex::encode(w.into_inner()),
        "010302feffffff0d0c0b0a0000803f"
    );
}

#[test]
fn test_reader_little_endian() {
    let data = hex::decode("010302feffffff0d0c0b0a0000803f").unwrap();
    let mut r = WireReader::new(&data);
    assert_eq!(r.u8(), 0x01);
    assert_eq!(r.u16(), 0x0203);
    assert_eq!(r.i32(), -2);
    assert_eq!(r.u32(), 0x0a0b0c0d);
    assert_eq!(r.f32(), 1.0);
    assert_eq!(r.remaining(), 0);
}

#[test]
fn test_nan_payload_preserved() {
    let odd_nan = f32::from_bits(0x7fc0_1234);
    let mut w = WireWriter::default();
    w.f32(odd_nan);
    let data = w.into_inner();
    assert_eq!(WireReader::new(&data).f32().to_bits(), 0x7fc0_1234);
}

#[test]
fn test_fixed_blob() {
    assert_eq!(fixed_blob::<4>(&[1, 2]), [1, 2, 0, 0]);
    assert_eq!(fixed_blob::<4>(&[1, 2, 3, 4, 5, 6]), [1, 2, 3, 4]);
    assert_eq!(fixed_blob::<4>(&[]), [0; 4]);
}
