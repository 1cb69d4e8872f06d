// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scalar values as raw bit patterns.
//!
//! Scalars travel through Anys, union labels and generic copy as a `u64`
//! holding the value's bits: integers zero-extended from their wire width,
//! floating point values as IEEE bits, characters as code points.

use crate::any::Any;
use crate::core::{OrbError, Result};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};

use super::{TypeCode, TypeKind};

/// Whether `kind` is held as a raw bit pattern.
pub(crate) fn is_scalar(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Short
            | TypeKind::Long
            | TypeKind::UShort
            | TypeKind::ULong
            | TypeKind::Float
            | TypeKind::Double
            | TypeKind::Boolean
            | TypeKind::Char
            | TypeKind::Octet
            | TypeKind::LongLong
            | TypeKind::ULongLong
            | TypeKind::WChar
            | TypeKind::Enum
    )
}

/// Read a scalar of `kind` and return its bits.
pub(crate) fn read_scalar(input: &mut CdrInputStream, kind: TypeKind) -> Result<u64> {
    Ok(match kind {
        TypeKind::Short | TypeKind::UShort => u64::from(input.read_ushort()?),
        TypeKind::Long | TypeKind::ULong | TypeKind::Enum => u64::from(input.read_ulong()?),
        TypeKind::LongLong | TypeKind::ULongLong => input.read_ulonglong()?,
        TypeKind::Float => u64::from(input.read_float()?.to_bits()),
        TypeKind::Double => input.read_double()?.to_bits(),
        TypeKind::Boolean => u64::from(input.read_boolean()?),
        TypeKind::Char => u64::from(input.read_char()?),
        TypeKind::WChar => u64::from(input.read_wchar()?),
        TypeKind::Octet => u64::from(input.read_octet()?),
        other => return Err(OrbError::bad_kind("read_scalar", other)),
    })
}

/// Write the scalar `bits` as a value of `kind`.
pub(crate) fn write_scalar(out: &mut CdrOutputStream, kind: TypeKind, bits: u64) -> Result<()> {
    match kind {
        TypeKind::Short | TypeKind::UShort => out.write_ushort(bits as u16)?,
        TypeKind::Long | TypeKind::ULong | TypeKind::Enum => out.write_ulong(bits as u32)?,
        TypeKind::LongLong | TypeKind::ULongLong => out.write_ulonglong(bits)?,
        TypeKind::Float => out.write_float(f32::from_bits(bits as u32))?,
        TypeKind::Double => out.write_double(f64::from_bits(bits))?,
        TypeKind::Boolean => out.write_boolean(bits != 0)?,
        TypeKind::Char => out.write_char(bits_to_char(bits)?)?,
        TypeKind::WChar => out.write_wchar(bits_to_char(bits)?)?,
        TypeKind::Octet => out.write_octet(bits as u8)?,
        other => return Err(OrbError::bad_kind("write_scalar", other)),
    };
    Ok(())
}

pub(crate) fn bits_to_char(bits: u64) -> Result<char> {
    u32::try_from(bits)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| OrbError::data_conversion(format!("{bits:#x} is not a character")))
}

/// Read a union discriminator into an Any bound to the unaliased
/// discriminator type.
pub(crate) fn read_discriminator(
    input: &mut CdrInputStream,
    discriminator: &TypeCode,
) -> Result<Any> {
    let resolved = discriminator.resolve_alias_and_indirect()?;
    if !resolved.kind().is_discriminator() {
        return Err(OrbError::marshal(
            "union discriminator",
            format!("{} is not a valid discriminator type", resolved.kind()),
        ));
    }
    let bits = read_scalar(input, resolved.kind())?;
    Ok(Any::from_scalar(input.orb(), resolved, bits))
}

/// Write a union discriminator or case label.
pub(crate) fn write_discriminator(
    out: &mut CdrOutputStream,
    discriminator: &TypeCode,
    value: &Any,
) -> Result<()> {
    let resolved = discriminator.resolve_alias_and_indirect()?;
    let bits = value.scalar_bits().ok_or_else(|| {
        OrbError::marshal("union discriminator", "discriminator value is not a scalar")
    })?;
    write_scalar(out, resolved.kind(), bits)
}
