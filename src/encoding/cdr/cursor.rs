// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR input stream for reading GIOP-encoded data with proper alignment.
//!
//! [`CdrInputStream`] is a cheap-to-clone view over a shared byte buffer.
//! Positions reported by the stream are absolute offsets into that buffer, so
//! an encapsulation opened with [`CdrInputStream::read_encapsulation`] still
//! reports positions of the outermost stream. TypeCode indirection relies on
//! this to resolve offsets that cross encapsulation boundaries.

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::core::{CharCodeSet, GiopVersion, OrbError, Result};
use crate::Orb;

/// CDR input stream that tracks position and origin for proper alignment.
///
/// The stream tracks:
/// - `offset`: Current read position in the shared buffer
/// - `origin`: Alignment reference point (start of the stream, or the byte
///   order octet of the innermost encapsulation)
/// - `end`: Exclusive upper bound of this view
///
/// Alignment is calculated as `(offset - origin) % size`, not `offset % size`.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use orbcodec::Orb;
///
/// let orb = Orb::default();
/// let mut input = orb.create_input_stream(vec![0x00, 0x00, 0x00, 0x2A]);
/// assert_eq!(input.read_ulong()?, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CdrInputStream {
    /// Shared data buffer
    data: Arc<[u8]>,
    /// Exclusive end of this view
    end: usize,
    /// Current read position
    offset: usize,
    /// Origin offset for alignment calculation
    origin: usize,
    /// Saved position for `reset()`
    mark: Option<usize>,
    /// Whether the data uses little endian encoding
    little_endian: bool,
    giop_version: GiopVersion,
    char_codeset: CharCodeSet,
    /// Stream owned by an Any payload
    any_owned: bool,
    orb: Orb,
}

impl CdrInputStream {
    /// Create a stream over `data` with the given byte order.
    ///
    /// GIOP version and code set come from the ORB configuration.
    pub fn new(orb: &Orb, data: impl Into<Arc<[u8]>>, little_endian: bool) -> Self {
        let data = data.into();
        let config = orb.config();
        Self {
            end: data.len(),
            data,
            offset: 0,
            origin: 0,
            mark: None,
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

    /// Drop the Any ownership tag so the stream is read like any other.
    pub(crate) fn clear_any_owned(mut self) -> Self {
        self.any_owned = false;
        self
    }

    /// The ORB this stream belongs to.
    pub fn orb(&self) -> &Orb {
        &self.orb
    }

    /// Get the current absolute position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.offset)
    }

    /// Check if at end of this view.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.end
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

    /// Bytes from the current position to the end of this view.
    pub fn remaining_bytes(&self) -> &[u8] {
        &self.data[self.offset.min(self.end)..self.end]
    }

    #[cfg(test)]
    pub(crate) fn shares_buffer_with(&self, other: &CdrInputStream) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Remember the current position.
    pub fn mark(&mut self) {
        self.mark = Some(self.offset);
    }

    /// Return to the position saved by [`mark`](Self::mark).
    pub fn reset(&mut self) -> Result<()> {
        match self.mark.take() {
            Some(position) => {
                self.offset = position;
                Ok(())
            }
            None => Err(OrbError::bad_inv_order("reset() without a preceding mark()")),
        }
    }

    /// Align to the specified boundary, relative to the origin.
    pub fn align(&mut self, size: usize) -> Result<()> {
        let alignment = (self.offset - self.origin) % size;
        if alignment > 0 {
            let padding = size - alignment;
            if self.offset + padding > self.end {
                return Err(OrbError::buffer_too_short(
                    padding,
                    self.remaining(),
                    self.offset as u64,
                ));
            }
            self.offset += padding;
        }
        Ok(())
    }

    /// Skip bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Move to the end of this view.
    pub fn skip_to_end(&mut self) {
        self.offset = self.end;
    }

    fn take(&mut self, count: usize) -> Result<&[u8]> {
        if count > self.remaining() {
            return Err(OrbError::buffer_too_short(
                count,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    fn take_aligned(&mut self, size: usize) -> Result<&[u8]> {
        self.align(size)?;
        self.take(size)
    }

    /// Read a single octet.
    pub fn read_octet(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a boolean octet.
    pub fn read_boolean(&mut self) -> Result<bool> {
        let position = self.offset;
        match self.read_octet()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(OrbError::marshal(
                "boolean",
                format!("invalid boolean octet {other:#04x} at position {position}"),
            )),
        }
    }

    /// Read a `short`.
    pub fn read_short(&mut self) -> Result<i16> {
        Ok(self.read_ushort()? as i16)
    }

    /// Read an `unsigned short`.
    pub fn read_ushort(&mut self) -> Result<u16> {
        let little_endian = self.little_endian;
        let bytes = self.take_aligned(2)?;
        Ok(if little_endian {
            LittleEndian::read_u16(bytes)
        } else {
            BigEndian::read_u16(bytes)
        })
    }

    /// Read a `long`.
    pub fn read_long(&mut self) -> Result<i32> {
        Ok(self.read_ulong()? as i32)
    }

    /// Read an `unsigned long`.
    pub fn read_ulong(&mut self) -> Result<u32> {
        let little_endian = self.little_endian;
        let bytes = self.take_aligned(4)?;
        Ok(if little_endian {
            LittleEndian::read_u32(bytes)
        } else {
            BigEndian::read_u32(bytes)
        })
    }

    /// Read a `long long`.
    pub fn read_longlong(&mut self) -> Result<i64> {
        Ok(self.read_ulonglong()? as i64)
    }

    /// Read an `unsigned long long`.
    pub fn read_ulonglong(&mut self) -> Result<u64> {
        let little_endian = self.little_endian;
        let bytes = self.take_aligned(8)?;
        Ok(if little_endian {
            LittleEndian::read_u64(bytes)
        } else {
            BigEndian::read_u64(bytes)
        })
    }

    /// Read a `float`.
    pub fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_ulong()?))
    }

    /// Read a `double`.
    pub fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_ulonglong()?))
    }

    /// Read a narrow `char` in the stream's code set.
    pub fn read_char(&mut self) -> Result<char> {
        let octet = self.read_octet()?;
        decode_narrow_char(octet, self.char_codeset)
    }

    /// Read a wide `wchar` following the stream's GIOP version.
    pub fn read_wchar(&mut self) -> Result<char> {
        if self.giop_version.has_octet_counted_wstrings() {
            let len = self.read_octet()? as usize;
            let bytes = self.take(len)?;
            let decoded = decode_utf16_octets(bytes)?;
            let mut chars = decoded.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(OrbError::data_conversion(format!(
                    "wchar encoding of {len} octets does not hold exactly one character"
                ))),
            }
        } else {
            let unit = self.read_ushort()?;
            char::from_u32(unit as u32).ok_or_else(|| {
                OrbError::data_conversion(format!("unpaired surrogate {unit:#06x} in wchar"))
            })
        }
    }

    /// Read raw octets.
    pub fn read_octets(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.take(count)?.to_vec())
    }

    fn read_length(&mut self, what: &str) -> Result<u32> {
        let position = self.offset;
        let len = self.read_ulong()?;
        if len > self.orb.config().max_sequence_length {
            return Err(OrbError::marshal(
                what,
                format!("length {len} at position {position} exceeds the configured limit"),
            ));
        }
        Ok(len)
    }

    /// Read a length-prefixed octet sequence.
    pub fn read_octet_sequence(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length("octet sequence")? as usize;
        self.read_octets(len)
    }

    /// Read a sequence or array element count, checked against the limit.
    pub fn read_sequence_length(&mut self) -> Result<u32> {
        self.read_length("sequence")
    }

    /// Read a narrow string: length including the terminating NUL, then bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_length("string")? as usize;
        if len == 0 {
            return Err(OrbError::marshal(
                "string",
                format!("zero string length at position {}", self.offset - 4),
            ));
        }
        let codeset = self.char_codeset;
        let bytes = self.take(len)?;
        let (body, terminator) = bytes.split_at(len - 1);
        if terminator[0] != 0 {
            return Err(OrbError::marshal("string", "missing NUL terminator"));
        }
        match codeset {
            CharCodeSet::Iso8859_1 => Ok(body.iter().map(|&b| char::from(b)).collect()),
            CharCodeSet::Utf8 => String::from_utf8(body.to_vec())
                .map_err(|e| OrbError::data_conversion(format!("invalid UTF-8 string: {e}"))),
        }
    }

    /// Read a wide string following the stream's GIOP version.
    pub fn read_wstring(&mut self) -> Result<String> {
        let len = self.read_length("wstring")? as usize;
        if self.giop_version.has_octet_counted_wstrings() {
            let bytes = self.take(len)?;
            return decode_utf16_octets(bytes);
        }
        if len == 0 {
            return Ok(String::new());
        }
        let mut units = Vec::with_capacity(len);
        for _ in 0..len {
            units.push(self.read_ushort()?);
        }
        if units.pop() != Some(0) {
            return Err(OrbError::marshal("wstring", "missing NUL terminator"));
        }
        String::from_utf16(&units)
            .map_err(|e| OrbError::data_conversion(format!("invalid UTF-16 wstring: {e}")))
    }

    /// Open the encapsulation at the current position.
    ///
    /// Reads the length prefix and the byte order octet, and returns a stream
    /// restricted to the encapsulated bytes. This stream is advanced past the
    /// whole encapsulation.
    pub fn read_encapsulation(&mut self) -> Result<CdrInputStream> {
        let len = self.read_ulong()? as usize;
        if len == 0 || len > self.remaining() {
            return Err(OrbError::marshal(
                "encapsulation",
                format!(
                    "encapsulation length {len} at position {} exceeds {} remaining bytes",
                    self.offset - 4,
                    self.remaining()
                ),
            ));
        }
        let start = self.offset;
        self.offset += len;

        let mut encap = self.clone();
        encap.end = start + len;
        encap.offset = start;
        encap.origin = start;
        encap.mark = None;
        encap.little_endian = encap.read_boolean()?;
        Ok(encap)
    }
}

impl std::fmt::Debug for CdrInputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdrInputStream")
            .field("offset", &self.offset)
            .field("end", &self.end)
            .field("origin", &self.origin)
            .field("little_endian", &self.little_endian)
            .finish()
    }
}

fn decode_narrow_char(octet: u8, codeset: CharCodeSet) -> Result<char> {
    match codeset {
        CharCodeSet::Iso8859_1 => Ok(char::from(octet)),
        CharCodeSet::Utf8 if octet < 0x80 => Ok(char::from(octet)),
        CharCodeSet::Utf8 => Err(OrbError::data_conversion(format!(
            "octet {octet:#04x} is not a single-byte UTF-8 char"
        ))),
    }
}

/// Decode UTF-16 octets, honouring a leading byte order mark (big endian otherwise).
fn decode_utf16_octets(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(OrbError::marshal(
            "wstring",
            format!("odd UTF-16 octet count {}", bytes.len()),
        ));
    }
    let (body, little_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, false),
        [0xFF, 0xFE, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                LittleEndian::read_u16(pair)
            } else {
                BigEndian::read_u16(pair)
            }
        })
        .collect();
    String::from_utf16(&units)
        .map_err(|e| OrbError::data_conversion(format!("invalid UTF-16 data: {e}")))
}
