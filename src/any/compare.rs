// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Any equality.
//!
//! Encoded values are compared by walking two cursors in step, decoding
//! each primitive, so values written with different byte orders compare
//! equal. Floating point values compare by bit pattern.

use std::sync::Arc;

use super::{Any, Boxed, Payload};
use crate::core::{OrbError, Result};
use crate::encoding::cdr::CdrInputStream;
use crate::typecode::{is_scalar, read_discriminator, read_scalar, TypeCode, TypeKind};
use crate::value::valuetype::read_value;
use crate::value::{CorbaValue, FixedDecimal};

impl Any {
    /// Whether both Anys hold equal values of equal types.
    ///
    /// Two uninitialized Anys are equal; an initialized and an uninitialized
    /// one are not.
    pub fn equal(&self, other: &Any) -> Result<bool> {
        match (self.initialized, other.initialized) {
            (false, false) => return Ok(true),
            (true, true) => {}
            _ => return Ok(false),
        }
        if !self.type_code.equal(&other.type_code) {
            return Ok(false);
        }
        let stripped = self.type_code.resolve_alias_and_indirect()?;
        if stripped.kind() == TypeKind::LongDouble {
            return Err(OrbError::unsupported("long double"));
        }
        let streamed = |payload: &Payload| matches!(payload, Payload::Streamed(_));
        if streamed(&self.payload) || streamed(&other.payload) {
            let mut a = self.create_input_stream()?;
            let mut b = other.create_input_stream()?;
            return values_equal(&stripped, &mut a, &mut b);
        }
        payloads_equal(&self.payload, &other.payload)
    }
}

fn payloads_equal(a: &Payload, b: &Payload) -> Result<bool> {
    Ok(match (a, b) {
        (Payload::Empty, Payload::Empty) => true,
        (Payload::Scalar(x), Payload::Scalar(y)) => x == y,
        (Payload::Boxed(x), Payload::Boxed(y)) => match (x, y) {
            (Boxed::String(x), Boxed::String(y)) => x == y,
            (Boxed::Any(x), Boxed::Any(y)) => return x.equal(y),
            (Boxed::TypeCode(x), Boxed::TypeCode(y)) => x.equal(y),
            (Boxed::Object(x), Boxed::Object(y)) => x == y,
            (Boxed::Fixed(x), Boxed::Fixed(y)) => x == y,
            (Boxed::Value(x), Boxed::Value(y)) => values_eq(x.as_ref(), y.as_ref()),
            _ => false,
        },
        _ => false,
    })
}

fn values_eq(a: Option<&Arc<dyn CorbaValue>>, b: Option<&Arc<dyn CorbaValue>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => Arc::ptr_eq(x, y) || x.value_eq(y.as_ref()),
        _ => false,
    }
}

/// Compare the next value of type `tc` on both cursors.
fn values_equal(tc: &TypeCode, a: &mut CdrInputStream, b: &mut CdrInputStream) -> Result<bool> {
    let tc = tc.resolve()?;
    let kind = tc.kind();
    if is_scalar(kind) {
        return Ok(read_scalar(a, kind)? == read_scalar(b, kind)?);
    }
    Ok(match kind {
        TypeKind::Null | TypeKind::Void | TypeKind::Native => true,
        TypeKind::LongDouble => return Err(OrbError::unsupported("long double")),
        TypeKind::String => a.read_string()? == b.read_string()?,
        TypeKind::WString => a.read_wstring()? == b.read_wstring()?,
        TypeKind::Fixed => {
            let len = (usize::from(tc.fixed_digits()?) + 2) / 2;
            let scale = tc.fixed_scale()?;
            FixedDecimal::from_bcd(&a.read_octets(len)?, scale)?
                == FixedDecimal::from_bcd(&b.read_octets(len)?, scale)?
        }
        TypeKind::Any => a.read_any()?.equal(&b.read_any()?)?,
        TypeKind::TypeCode => a.read_type_code()?.equal(&b.read_type_code()?),
        TypeKind::Principal => a.read_octet_sequence()? == b.read_octet_sequence()?,
        TypeKind::ObjRef => a.read_object()? == b.read_object()?,
        TypeKind::Struct | TypeKind::Except => {
            if kind == TypeKind::Except && a.read_string()? != b.read_string()? {
                return Ok(false);
            }
            for index in 0..tc.member_count()? {
                if !values_equal(&tc.member_type(index)?, a, b)? {
                    return Ok(false);
                }
            }
            true
        }
        TypeKind::Union => {
            let discriminator = tc.discriminator_type()?;
            let da = read_discriminator(a, &discriminator)?;
            let db = read_discriminator(b, &discriminator)?;
            if !da.equal(&db)? {
                return Ok(false);
            }
            let index = tc.current_union_member_index(&da)?;
            if index < 0 {
                return Err(OrbError::marshal(
                    "union",
                    format!(
                        "discriminator selects no member of {} and there is no default",
                        tc.id()?
                    ),
                ));
            }
            values_equal(&tc.member_type(index as usize)?, a, b)?
        }
        TypeKind::Sequence => {
            let len = a.read_sequence_length()?;
            if len != b.read_sequence_length()? {
                return Ok(false);
            }
            elements_equal(&tc.content_type()?, len, a, b)?
        }
        TypeKind::Array => elements_equal(&tc.content_type()?, tc.length()?, a, b)?,
        TypeKind::Alias => values_equal(&tc.content_type()?, a, b)?,
        TypeKind::Value | TypeKind::ValueBox => {
            values_eq(read_value(a, &tc)?.as_ref(), read_value(b, &tc)?.as_ref())
        }
        TypeKind::AbstractInterface => {
            let is_object = a.read_boolean()?;
            if is_object != b.read_boolean()? {
                return Ok(false);
            }
            if is_object {
                a.read_object()? == b.read_object()?
            } else {
                values_eq(read_value(a, &tc)?.as_ref(), read_value(b, &tc)?.as_ref())
            }
        }
        other => return Err(OrbError::bad_typecode(format!("cannot compare {other} values"))),
    })
}

fn elements_equal(
    element: &TypeCode,
    count: u32,
    a: &mut CdrInputStream,
    b: &mut CdrInputStream,
) -> Result<bool> {
    for _ in 0..count {
        if !values_equal(element, a, b)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::encoding::cdr::CdrOutputStream;
    use crate::{Orb, StructMember, TypeCode, TypeKind};

    fn pair(orb: &Orb) -> TypeCode {
        orb.create_struct_tc(
            "IDL:Pair:1.0",
            "Pair",
            vec![
                StructMember::new("a", orb.primitive_tc(TypeKind::Long).unwrap()),
                StructMember::new("b", orb.primitive_tc(TypeKind::Double).unwrap()),
            ],
        )
    }

    fn pair_any(orb: &Orb, little_endian: bool, a: i32, b: f64) -> crate::Any {
        let mut out = CdrOutputStream::with_byte_order(orb, little_endian);
        out.write_long(a).unwrap();
        out.write_double(b).unwrap();
        let mut any = orb.create_any();
        any.read_value_from_output(out, &pair(orb)).unwrap();
        any
    }

    #[test]
    fn test_streamed_equality_ignores_byte_order() {
        let orb = Orb::default();
        let big = pair_any(&orb, false, 7, 0.5);
        let little = pair_any(&orb, true, 7, 0.5);
        assert!(big.equal(&little).unwrap());
        assert!(little.equal(&big).unwrap());
        assert!(!big.equal(&pair_any(&orb, false, 7, 0.25)).unwrap());
    }

    #[test]
    fn test_scalar_equality_by_bits() {
        let orb = Orb::default();
        let (mut a, mut b) = (orb.create_any(), orb.create_any());
        a.insert_double(f64::NAN);
        b.insert_double(f64::NAN);
        assert!(a.equal(&b).unwrap());
        a.insert_double(0.0);
        b.insert_double(-0.0);
        assert!(!a.equal(&b).unwrap());
        b.insert_float(0.0);
        assert!(!a.equal(&b).unwrap());
    }

    #[test]
    fn test_initialization_state() {
        let orb = Orb::default();
        let long = orb.primitive_tc(TypeKind::Long).unwrap();
        let (mut a, mut b) = (orb.create_any(), orb.create_any());
        a.set_type(long.clone());
        b.set_type(long);
        assert!(a.equal(&b).unwrap());
        b.insert_long(0);
        assert!(!a.equal(&b).unwrap());
        assert!(!b.equal(&a).unwrap());
    }

    #[test]
    fn test_alias_binding_matters() {
        let orb = Orb::default();
        let long = orb.primitive_tc(TypeKind::Long).unwrap();
        let alias = orb.create_alias_tc("IDL:Count:1.0", "Count", long);
        let mut out = orb.create_output_stream();
        out.write_long(3).unwrap();
        let mut aliased = orb.create_any();
        aliased.read_value_from_output(out, &alias).unwrap();
        let mut plain = orb.create_any();
        plain.insert_long(3);
        assert!(!aliased.equal(&plain).unwrap());
        assert!(aliased.equal(&aliased.clone()).unwrap());
    }
}
