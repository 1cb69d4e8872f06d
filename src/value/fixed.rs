// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixed-point decimals and their packed-BCD wire form.

use std::fmt;
use std::str::FromStr;

use crate::core::{OrbError, Result};

const SIGN_POSITIVE: u8 = 0xC;
const SIGN_NEGATIVE: u8 = 0xD;
const SIGN_UNSIGNED: u8 = 0xF;

/// Signed decimal number with an explicit scale.
///
/// The value is `digits × 10^-scale`. Digits are kept most significant
/// first without leading zeros, so zero has no digits.
#[derive(Debug, Clone, Default)]
pub struct FixedDecimal {
    negative: bool,
    digits: Vec<u8>,
    scale: u16,
}

impl FixedDecimal {
    /// Create `unscaled × 10^-scale`.
    pub fn new(unscaled: i64, scale: u16) -> Self {
        let digits = unscaled
            .unsigned_abs()
            .to_string()
            .bytes()
            .map(|b| b - b'0')
            .collect();
        Self::from_parts(unscaled < 0, digits, scale)
    }

    fn from_parts(negative: bool, digits: Vec<u8>, scale: u16) -> Self {
        let first = digits.iter().position(|&d| d != 0).unwrap_or(digits.len());
        let digits = digits[first..].to_vec();
        Self {
            negative: negative && !digits.is_empty(),
            digits,
            scale,
        }
    }

    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u16 {
        self.scale
    }

    /// Number of significant digits, counting every fractional digit.
    pub fn digit_count(&self) -> u16 {
        (self.digits.len() as u16).max(self.scale)
    }

    /// Change the scale, padding with zeros or truncating fractional digits.
    #[must_use]
    pub fn rescale(&self, scale: u16) -> Self {
        let mut digits = self.digits.clone();
        if scale >= self.scale {
            digits.extend(std::iter::repeat(0).take(usize::from(scale - self.scale)));
        } else {
            let drop = usize::from(self.scale - scale);
            digits.truncate(digits.len().saturating_sub(drop));
        }
        Self::from_parts(self.negative, digits, scale)
    }

    /// Drop trailing fractional zeros.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.is_zero() {
            return Self::default();
        }
        let trailing = self
            .digits
            .iter()
            .rev()
            .take(usize::from(self.scale))
            .take_while(|&&d| d == 0)
            .count();
        self.rescale(self.scale - trailing as u16)
    }

    /// Encode as packed BCD for `fixed<digits, scale>`.
    ///
    /// Produces `(digits + 2) / 2` octets: the digits padded with leading
    /// zeros, followed by a sign nibble.
    pub fn to_bcd(&self, digits: u16, scale: i16) -> Result<Vec<u8>> {
        let scaled = self.rescale(scale.max(0) as u16);
        let width = usize::from(digits);
        if scaled.digits.len() > width {
            return Err(OrbError::data_conversion(format!(
                "{self} does not fit fixed<{digits},{scale}>"
            )));
        }
        // Nibble count must be even: pad to an odd number of digit nibbles.
        let padded = if width % 2 == 0 { width + 1 } else { width };
        let mut nibbles = vec![0u8; padded - scaled.digits.len()];
        nibbles.extend_from_slice(&scaled.digits);
        nibbles.push(if scaled.negative {
            SIGN_NEGATIVE
        } else {
            SIGN_POSITIVE
        });
        Ok(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
    }

    /// Decode packed BCD written for `fixed<digits, scale>`.
    pub fn from_bcd(bytes: &[u8], scale: i16) -> Result<Self> {
        let mut nibbles: Vec<u8> = bytes.iter().flat_map(|b| [b >> 4, b & 0x0F]).collect();
        let negative = match nibbles.pop() {
            Some(SIGN_POSITIVE) | Some(SIGN_UNSIGNED) => false,
            Some(SIGN_NEGATIVE) => true,
            Some(other) => {
                return Err(OrbError::marshal(
                    "fixed",
                    format!("invalid sign nibble {other:#x}"),
                ))
            }
            None => return Err(OrbError::marshal("fixed", "empty fixed value")),
        };
        if let Some(bad) = nibbles.iter().find(|&&n| n > 9) {
            return Err(OrbError::marshal(
                "fixed",
                format!("invalid digit nibble {bad:#x}"),
            ));
        }
        Ok(Self::from_parts(negative, nibbles, scale.max(0) as u16))
    }
}

impl PartialEq for FixedDecimal {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.negative == b.negative && a.digits == b.digits && a.scale == b.scale
    }
}

impl Eq for FixedDecimal {}

impl FromStr for FixedDecimal {
    type Err = OrbError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let text = text
            .strip_suffix('d')
            .or_else(|| text.strip_suffix('D'))
            .unwrap_or(text);
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(OrbError::data_conversion(format!("invalid fixed literal '{s}'")));
        }
        let mut digits = Vec::with_capacity(integer.len() + fraction.len());
        for c in integer.chars().chain(fraction.chars()) {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| OrbError::data_conversion(format!("invalid fixed literal '{s}'")))?;
            digits.push(digit as u8);
        }
        let scale = u16::try_from(fraction.len())
            .map_err(|_| OrbError::data_conversion(format!("fixed literal '{s}' too long")))?;
        Ok(Self::from_parts(negative, digits, scale))
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = usize::from(self.scale);
        let mut text: String = self.digits.iter().map(|d| char::from(b'0' + d)).collect();
        if text.len() <= scale {
            text = format!("{}{text}", "0".repeat(scale + 1 - text.len()));
        }
        if self.negative {
            f.write_str("-")?;
        }
        let (integer, fraction) = text.split_at(text.len() - scale);
        f.write_str(integer)?;
        if scale > 0 {
            write!(f, ".{fraction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(s: &str) -> FixedDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(fixed("123.45").to_string(), "123.45");
        assert_eq!(fixed("-0.05").to_string(), "-0.05");
        assert_eq!(fixed("007").to_string(), "7");
        assert_eq!(fixed("1.50d").scale(), 2);
        assert_eq!(fixed("0.0").to_string(), "0.0");
        assert!("1.2x".parse::<FixedDecimal>().is_err());
        assert!("-".parse::<FixedDecimal>().is_err());
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(fixed("1.50"), fixed("1.5"));
        assert_eq!(fixed("-0.0"), fixed("0"));
        assert_ne!(fixed("1.5"), fixed("-1.5"));
        assert_eq!(FixedDecimal::new(-1234, 2), fixed("-12.34"));
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(fixed("123.45").digit_count(), 5);
        assert_eq!(fixed("0.05").digit_count(), 2);
    }

    #[test]
    fn test_rescale() {
        assert_eq!(fixed("1.5").rescale(3).to_string(), "1.500");
        assert_eq!(fixed("1.579").rescale(1).to_string(), "1.5");
    }

    #[test]
    fn test_bcd_odd_digits() {
        // fixed<5,2> 123.45 -> 12 34 5C
        let bytes = fixed("123.45").to_bcd(5, 2).unwrap();
        assert_eq!(bytes, vec![0x12, 0x34, 0x5C]);
        assert_eq!(FixedDecimal::from_bcd(&bytes, 2).unwrap(), fixed("123.45"));
    }

    #[test]
    fn test_bcd_even_digits_negative() {
        // fixed<4,1> -12.5 -> 00 12 5D
        let bytes = fixed("-12.5").to_bcd(4, 1).unwrap();
        assert_eq!(bytes.len(), (4 + 2) / 2);
        assert_eq!(bytes, vec![0x00, 0x12, 0x5D]);
        assert_eq!(FixedDecimal::from_bcd(&bytes, 1).unwrap(), fixed("-12.5"));
    }

    #[test]
    fn test_bcd_overflow_and_bad_nibbles() {
        assert!(fixed("12345").to_bcd(3, 0).is_err());
        assert!(FixedDecimal::from_bcd(&[0x1A], 0).is_err());
        assert!(FixedDecimal::from_bcd(&[0xA1], 0).is_err());
        assert_eq!(FixedDecimal::from_bcd(&[0x1F], 0).unwrap(), fixed("1"));
    }
}
