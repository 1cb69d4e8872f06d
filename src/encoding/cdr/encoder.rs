// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR output stream for writing GIOP-encoded data.
//!
//! Encapsulations are written in place: [`CdrOutputStream::begin_encapsulation`]
//! reserves the 4-byte length prefix and [`CdrOutputStream::end_encapsulation`]
//! patches it. Every position is therefore an absolute offset into one buffer,
//! which is what TypeCode indirection offsets are measured against.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::cursor::CdrInputStream;
use crate::core::{CharCodeSet, GiopVersion, OrbError, Result};
use crate::value::FixedDecimal;
use crate::Orb;

/// Default initial capacity for the output buffer.
const DEFAULT_CAPACITY: usize = 64;

/// Saved state of an open encapsulation.
#[derive(Debug, Clone, Copy)]
struct OpenEncapsulation {
    /// Origin of the enclosing scope
    outer_origin: usize,
    /// Offset of the reserved length prefix
    length_slot: usize,
}

/// CDR output stream.
///
/// This stream handles:
/// - Alignment relative to the innermost encapsulation
/// - Endianness handling
/// - GIOP-version dependent wide character encoding
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use orbcodec::Orb;
///
/// let orb = Orb::default();
/// let mut out = orb.create_output_stream();
/// out.write_long(42)?.write_string("hello")?;
/// let data = out.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct CdrOutputStream {
    /// Output buffer
    buffer: Vec<u8>,
    /// Origin offset for alignment calculation
    origin: usize,
    /// Stack of open encapsulations
    encapsulations: Vec<OpenEncapsulation>,
    /// Whether to use little endian encoding
    little_endian: bool,
    giop_version: GiopVersion,
    char_codeset: CharCodeSet,
    /// Stream created by an Any for its own payload
    any_owned: bool,
    orb: Orb,
}

impl CdrOutputStream {
    /// Create a new stream using the ORB's configured byte order.
    pub fn new(orb: &Orb) -> Self {
        Self::with_byte_order(orb, orb.config().little_endian)
    }

    /// Create a new stream with an explicit byte order.
    pub fn with_byte_order(orb: &Orb, little_endian: bool) -> Self {
        let config = orb.config();
        Self {
            buffer: Vec::with_capacity(DEFAULT_CAPACITY),
            origin: 0,
            encapsulations: Vec::new(),
            little_endian,
            giop_version: config.giop_version,
            char_codeset: config.char_codeset,
            any_owned: false,
            orb: orb.clone(),
        }
    }

    /// Override the GIOP version used for wide characters.
    #[must_use]
    pub fn with_giop_version(mut self, version: GiopVersion) -> Self {
        self.giop_version = version;
        self
    }

    /// Override the narrow character code set.
    #[must_use]
    pub fn with_char_codeset(mut self, codeset: CharCodeSet) -> Self {
        self.char_codeset = codeset;
        self
    }

    pub(crate) fn mark_any_owned(mut self) -> Self {
        self.any_owned = true;
        self
    }

    /// The ORB this stream belongs to.
    pub fn orb(&self) -> &Orb {
        &self.orb
    }

    /// Get the current absolute write position.
    #[inline]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Whether multi-byte values are little endian.
    #[inline]
    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    /// GIOP version used for wide characters.
    #[inline]
    pub fn giop_version(&self) -> GiopVersion {
        self.giop_version
    }

    /// Narrow character code set.
    #[inline]
    pub fn char_codeset(&self) -> CharCodeSet {
        self.char_codeset
    }

    /// Whether this stream was produced by an Any for its own payload.
    #[inline]
    pub fn is_any_stream(&self) -> bool {
        self.any_owned
    }

    /// Get a reference to the encoded data.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the stream and return the encoded data.
    pub fn finish(self) -> Result<Vec<u8>> {
        if !self.encapsulations.is_empty() {
            return Err(OrbError::bad_inv_order(format!(
                "{} encapsulation(s) still open",
                self.encapsulations.len()
            )));
        }
        Ok(self.buffer)
    }

    /// Consume the stream and open an input stream over what was written.
    ///
    /// The input stream inherits byte order, GIOP version, code set and the
    /// Any ownership tag.
    pub fn into_input_stream(self) -> Result<CdrInputStream> {
        let orb = self.orb.clone();
        let little_endian = self.little_endian;
        let giop_version = self.giop_version;
        let char_codeset = self.char_codeset;
        let any_owned = self.any_owned;
        let input = CdrInputStream::new(&orb, self.finish()?, little_endian)
            .with_giop_version(giop_version)
            .with_char_codeset(char_codeset);
        Ok(if any_owned {
            input.mark_any_owned()
        } else {
            input
        })
    }

    /// Align to the specified boundary, writing zero padding bytes.
    pub fn align(&mut self, size: usize) {
        let alignment = (self.buffer.len() - self.origin) % size;
        if alignment > 0 {
            let padding = size - alignment;
            self.buffer.resize(self.buffer.len() + padding, 0);
        }
    }

    /// Write an octet.
    pub fn write_octet(&mut self, value: u8) -> Result<&mut Self> {
        self.buffer.push(value);
        Ok(self)
    }

    /// Write a boolean as a single octet.
    pub fn write_boolean(&mut self, value: bool) -> Result<&mut Self> {
        self.write_octet(u8::from(value))
    }

    /// Write a `short`.
    pub fn write_short(&mut self, value: i16) -> Result<&mut Self> {
        self.write_ushort(value as u16)
    }

    /// Write an `unsigned short`.
    pub fn write_ushort(&mut self, value: u16) -> Result<&mut Self> {
        self.align(2);
        let mut bytes = [0u8; 2];
        if self.little_endian {
            LittleEndian::write_u16(&mut bytes, value);
        } else {
            BigEndian::write_u16(&mut bytes, value);
        }
        self.buffer.extend_from_slice(&bytes);
        Ok(self)
    }

    /// Write a `long`.
    pub fn write_long(&mut self, value: i32) -> Result<&mut Self> {
        self.write_ulong(value as u32)
    }

    /// Write an `unsigned long`.
    pub fn write_ulong(&mut self, value: u32) -> Result<&mut Self> {
        self.align(4);
        let mut bytes = [0u8; 4];
        if self.little_endian {
            LittleEndian::write_u32(&mut bytes, value);
        } else {
            BigEndian::write_u32(&mut bytes, value);
        }
        self.buffer.extend_from_slice(&bytes);
        Ok(self)
    }

    /// Write a `long long`.
    pub fn write_longlong(&mut self, value: i64) -> Result<&mut Self> {
        self.write_ulonglong(value as u64)
    }

    /// Write an `unsigned long long`.
    pub fn write_ulonglong(&mut self, value: u64) -> Result<&mut Self> {
        self.align(8);
        let mut bytes = [0u8; 8];
        if self.little_endian {
            LittleEndian::write_u64(&mut bytes, value);
        } else {
            BigEndian::write_u64(&mut bytes, value);
        }
        self.buffer.extend_from_slice(&bytes);
        Ok(self)
    }

    /// Write a `float`.
    pub fn write_float(&mut self, value: f32) -> Result<&mut Self> {
        self.write_ulong(value.to_bits())
    }

    /// Write a `double`.
    pub fn write_double(&mut self, value: f64) -> Result<&mut Self> {
        self.write_ulonglong(value.to_bits())
    }

    /// Write a narrow `char` in the stream's code set.
    pub fn write_char(&mut self, value: char) -> Result<&mut Self> {
        let octet = encode_narrow_char(value, self.char_codeset)?;
        self.write_octet(octet)
    }

    /// Write a wide `wchar` following the stream's GIOP version.
    pub fn write_wchar(&mut self, value: char) -> Result<&mut Self> {
        let mut units = [0u16; 2];
        let units = value.encode_utf16(&mut units);
        if self.giop_version.has_octet_counted_wstrings() {
            self.write_octet((units.len() * 2) as u8)?;
            for unit in units.iter() {
                self.buffer.extend_from_slice(&unit.to_be_bytes());
            }
            return Ok(self);
        }
        if units.len() != 1 {
            return Err(OrbError::data_conversion(format!(
                "wchar {value:?} needs a surrogate pair, not representable before GIOP 1.2"
            )));
        }
        self.write_ushort(units[0])
    }

    /// Write raw octets without alignment.
    pub fn write_octets(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.buffer.extend_from_slice(bytes);
        Ok(self)
    }

    /// Write a length-prefixed octet sequence.
    pub fn write_octet_sequence(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.write_ulong(checked_len(bytes.len())?)?;
        self.write_octets(bytes)
    }

    /// Write a narrow string: length including the terminating NUL, then bytes.
    pub fn write_string(&mut self, value: &str) -> Result<&mut Self> {
        let encoded: Vec<u8> = match self.char_codeset {
            CharCodeSet::Iso8859_1 => value
                .chars()
                .map(|c| encode_narrow_char(c, CharCodeSet::Iso8859_1))
                .collect::<Result<_>>()?,
            CharCodeSet::Utf8 => value.as_bytes().to_vec(),
        };
        self.write_ulong(checked_len(encoded.len() + 1)?)?;
        self.buffer.extend_from_slice(&encoded);
        self.buffer.push(0);
        Ok(self)
    }

    /// Write a wide string following the stream's GIOP version.
    pub fn write_wstring(&mut self, value: &str) -> Result<&mut Self> {
        let units: Vec<u16> = value.encode_utf16().collect();
        if self.giop_version.has_octet_counted_wstrings() {
            self.write_ulong(checked_len(units.len() * 2)?)?;
            for unit in &units {
                self.buffer.extend_from_slice(&unit.to_be_bytes());
            }
            return Ok(self);
        }
        self.write_ulong(checked_len(units.len() + 1)?)?;
        for unit in units {
            self.write_ushort(unit)?;
        }
        self.write_ushort(0)
    }

    /// Write a fixed-point decimal as packed BCD with `digits` digits.
    pub fn write_fixed(
        &mut self,
        value: &FixedDecimal,
        digits: u16,
        scale: i16,
    ) -> Result<&mut Self> {
        let bytes = value.to_bcd(digits, scale)?;
        self.write_octets(&bytes)
    }

    /// Open an encapsulation.
    ///
    /// Reserves the 4-byte length prefix, restarts alignment at the byte
    /// order octet and writes that octet. Must be paired with
    /// [`end_encapsulation`](Self::end_encapsulation).
    pub fn begin_encapsulation(&mut self) -> Result<&mut Self> {
        self.align(4);
        let length_slot = self.buffer.len();
        self.buffer.extend_from_slice(&[0; 4]);
        self.encapsulations.push(OpenEncapsulation {
            outer_origin: self.origin,
            length_slot,
        });
        self.origin = self.buffer.len();
        let little_endian = self.little_endian;
        self.write_boolean(little_endian)
    }

    /// Close the innermost encapsulation, writing back its length.
    pub fn end_encapsulation(&mut self) -> Result<&mut Self> {
        let open = self
            .encapsulations
            .pop()
            .ok_or_else(|| {
                OrbError::bad_inv_order("end_encapsulation() without an open encapsulation")
            })?;
        let body_start = open.length_slot + 4;
        let len = checked_len(self.buffer.len() - body_start)?;
        let slot = &mut self.buffer[open.length_slot..body_start];
        if self.little_endian {
            LittleEndian::write_u32(slot, len);
        } else {
            BigEndian::write_u32(slot, len);
        }
        self.origin = open.outer_origin;
        Ok(self)
    }
}

impl std::fmt::Debug for CdrOutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdrOutputStream")
            .field("len", &self.buffer.len())
            .field("origin", &self.origin)
            .field("open_encapsulations", &self.encapsulations.len())
            .field("little_endian", &self.little_endian)
            .finish()
    }
}

fn checked_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| OrbError::marshal("length", format!("length {len} exceeds 32 bits")))
}

fn encode_narrow_char(value: char, codeset: CharCodeSet) -> Result<u8> {
    let code = value as u32;
    let limit = match codeset {
        CharCodeSet::Iso8859_1 => 0xFF,
        CharCodeSet::Utf8 => 0x7F,
    };
    if code > limit {
        return Err(OrbError::data_conversion(format!(
            "char {value:?} is not representable as a single {codeset:?} octet"
        )));
    }
    Ok(code as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(little_endian: bool) -> CdrOutputStream {
        CdrOutputStream::with_byte_order(&Orb::default(), little_endian)
    }

    #[test]
    fn test_write_ulong_big_endian() {
        let mut out = output(false);
        out.write_ulong(42).unwrap();
        assert_eq!(out.data(), &[0, 0, 0, 42]);
    }

    #[test]
    fn test_alignment_padding() {
        let mut out = output(true);
        out.write_octet(1).unwrap().write_long(-1).unwrap();
        assert_eq!(out.data(), &[1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);

        out.write_double(1.0).unwrap();
        assert_eq!(out.position(), 16);
    }

    #[test]
    fn test_write_string_includes_terminator() {
        let mut out = output(false);
        out.write_string("hi").unwrap();
        assert_eq!(out.data(), &[0, 0, 0, 3, b'h', b'i', 0]);
    }

    #[test]
    fn test_write_string_rejects_non_latin1() {
        let mut out = output(false);
        let err = out.write_string("\u{20ac}").unwrap_err();
        assert!(matches!(err, OrbError::DataConversion { .. }));

        let mut utf8 = output(false).with_char_codeset(CharCodeSet::Utf8);
        utf8.write_string("\u{20ac}").unwrap();
        assert_eq!(utf8.data()[..4], [0, 0, 0, 4]);
    }

    #[test]
    fn test_write_char_code_sets() {
        let mut out = output(false);
        out.write_char('\u{e9}').unwrap();
        assert_eq!(out.data(), &[0xE9]);

        let mut utf8 = output(false).with_char_codeset(CharCodeSet::Utf8);
        assert!(utf8.write_char('\u{e9}').is_err());
    }

    #[test]
    fn test_write_wstring_giop_versions() {
        let mut v12 = output(true);
        v12.write_wstring("ab").unwrap();
        assert_eq!(v12.data(), &[4, 0, 0, 0, 0, b'a', 0, b'b']);

        let mut v11 = output(true).with_giop_version(GiopVersion::V1_1);
        v11.write_wstring("ab").unwrap();
        assert_eq!(v11.data(), &[3, 0, 0, 0, b'a', 0, b'b', 0, 0, 0]);
    }

    #[test]
    fn test_write_wchar_surrogate_pair() {
        let mut v12 = output(false);
        v12.write_wchar('\u{1F600}').unwrap();
        assert_eq!(v12.data()[0], 4);

        let mut v11 = output(false).with_giop_version(GiopVersion::V1_1);
        assert!(v11.write_wchar('\u{1F600}').is_err());
    }

    #[test]
    fn test_encapsulation_length_and_alignment() {
        let mut out = output(false);
        out.write_octet(9).unwrap();
        out.begin_encapsulation().unwrap();
        // Alignment restarts at the byte order octet (position 8).
        out.write_ulong(7).unwrap();
        out.end_encapsulation().unwrap();

        assert_eq!(
            out.data(),
            &[9, 0, 0, 0, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 7]
        );
    }

    #[test]
    fn test_nested_encapsulations() {
        let mut out = output(true);
        out.begin_encapsulation().unwrap();
        out.begin_encapsulation().unwrap();
        out.write_octet(0xAA).unwrap();
        out.end_encapsulation().unwrap();
        out.end_encapsulation().unwrap();
        let data = out.finish().unwrap();

        // outer: len 10 = flag + pad(3) + inner len(4) + inner flag + octet
        assert_eq!(&data[0..4], &10u32.to_le_bytes());
        assert_eq!(&data[8..12], &2u32.to_le_bytes());
        assert_eq!(data.len(), 14);
    }

    #[test]
    fn test_unbalanced_encapsulation() {
        let mut out = output(false);
        assert!(out.end_encapsulation().is_err());
        out.begin_encapsulation().unwrap();
        assert!(out.finish().is_err());
    }

    #[test]
    fn test_into_input_stream_round_trip() {
        let mut out = output(true).mark_any_owned();
        out.write_short(-2).unwrap();
        out.write_string("abc").unwrap();
        let mut input = out.into_input_stream().unwrap();
        assert!(input.is_any_stream());
        assert!(input.is_little_endian());
        assert_eq!(input.read_short().unwrap(), -2);
        assert_eq!(input.read_string().unwrap(), "abc");
    }
}
