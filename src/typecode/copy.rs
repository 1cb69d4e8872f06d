// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type-driven copying of encoded values between CDR streams.
//!
//! Copying decodes each primitive from the source and re-encodes it on the
//! destination, so the two streams may differ in byte order, alignment
//! origin, GIOP version and character codeset.

use super::{
    is_scalar, read_discriminator, read_scalar, write_discriminator, write_scalar, Params,
    TypeCode, TypeKind,
};
use crate::core::{OrbError, Result};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};
use crate::value::valuetype::{read_value_header, write_value_header, ValueHeader, NULL_VALUE_TAG};

impl TypeCode {
    /// Copy one value of this type from `src` to `dst`.
    pub fn copy(&self, src: &mut CdrInputStream, dst: &mut CdrOutputStream) -> Result<()> {
        let tc = self.resolve()?;
        let kind = tc.kind();
        if is_scalar(kind) && kind != TypeKind::Enum {
            let bits = read_scalar(src, kind)?;
            return write_scalar(dst, kind, bits);
        }

        match kind {
            TypeKind::Null | TypeKind::Void | TypeKind::Native => {}
            TypeKind::Enum => {
                let ordinal = src.read_ulong()?;
                let count = tc.member_count()?;
                if ordinal as usize >= count {
                    return Err(OrbError::marshal(
                        "enum",
                        format!("ordinal {ordinal} out of range for {count} enumerators"),
                    ));
                }
                dst.write_ulong(ordinal)?;
            }
            TypeKind::LongDouble => return Err(OrbError::unsupported("long double")),
            TypeKind::String => {
                let value = src.read_string()?;
                check_bound("string", tc.length()?, value.chars().count())?;
                dst.write_string(&value)?;
            }
            TypeKind::WString => {
                let value = src.read_wstring()?;
                check_bound("wstring", tc.length()?, value.chars().count())?;
                dst.write_wstring(&value)?;
            }
            TypeKind::Fixed => {
                let len = (usize::from(tc.fixed_digits()?) + 2) / 2;
                let bytes = src.read_octets(len)?;
                dst.write_octets(&bytes)?;
            }
            TypeKind::Any => {
                let inner = src.read_type_code()?;
                dst.write_type_code(&inner)?;
                inner.copy(src, dst)?;
            }
            TypeKind::TypeCode => {
                let inner = src.read_type_code()?;
                dst.write_type_code(&inner)?;
            }
            TypeKind::Principal => {
                let bytes = src.read_octet_sequence()?;
                dst.write_octet_sequence(&bytes)?;
            }
            TypeKind::ObjRef => {
                let object = src.read_object()?;
                dst.write_object(&object)?;
            }
            TypeKind::Struct | TypeKind::Except => {
                if kind == TypeKind::Except {
                    let id = src.read_string()?;
                    dst.write_string(&id)?;
                }
                if let Params::Members(members) = tc.params()? {
                    for member in members {
                        member.type_code.copy(src, dst)?;
                    }
                }
            }
            TypeKind::Union => tc.copy_union(src, dst)?,
            TypeKind::Sequence => {
                let len = src.read_sequence_length()?;
                let bound = tc.length()?;
                if bound > 0 && len > bound {
                    return Err(OrbError::marshal(
                        "sequence",
                        format!("length {len} exceeds bound {bound}"),
                    ));
                }
                dst.write_ulong(len)?;
                copy_elements(&tc.content_type()?, len, src, dst)?;
            }
            TypeKind::Array => {
                copy_elements(&tc.content_type()?, tc.length()?, src, dst)?;
            }
            TypeKind::Alias => tc.content_type()?.copy(src, dst)?,
            TypeKind::Value | TypeKind::ValueBox => tc.copy_value(src, dst)?,
            TypeKind::AbstractInterface => {
                let is_object = src.read_boolean()?;
                dst.write_boolean(is_object)?;
                if is_object {
                    let object = src.read_object()?;
                    dst.write_object(&object)?;
                } else {
                    tc.copy_value(src, dst)?;
                }
            }
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
            | TypeKind::Indirect => {
                return Err(OrbError::bad_typecode(format!("cannot copy a {kind} value")))
            }
        }
        Ok(())
    }

    fn copy_union(&self, src: &mut CdrInputStream, dst: &mut CdrOutputStream) -> Result<()> {
        let Params::Union {
            discriminator,
            members,
            ..
        } = self.params()?
        else {
            return Err(OrbError::bad_kind("copy_union", self.kind()));
        };
        let value = read_discriminator(src, discriminator)?;
        write_discriminator(dst, discriminator, &value)?;
        let index = self.current_union_member_index(&value)?;
        let member = usize::try_from(index)
            .ok()
            .and_then(|index| members.get(index))
            .ok_or_else(|| {
                OrbError::marshal(
                    "union",
                    format!(
                        "discriminator selects no member of {} and there is no default",
                        self.raw_id()
                    ),
                )
            })?;
        member.type_code.copy(src, dst)
    }

    /// Copy a value header and state. The state layout comes from the
    /// registered TypeCode of the value's actual repository id when known.
    fn copy_value(&self, src: &mut CdrInputStream, dst: &mut CdrOutputStream) -> Result<()> {
        let id = match read_value_header(src)? {
            ValueHeader::Null => {
                dst.write_ulong(NULL_VALUE_TAG)?;
                return Ok(());
            }
            ValueHeader::Instance {
                repository_id: Some(id),
            } => id,
            ValueHeader::Instance {
                repository_id: None,
            } if self.kind() != TypeKind::AbstractInterface => self.raw_id().to_string(),
            ValueHeader::Instance { .. } => {
                return Err(OrbError::unsupported(
                    "abstract interface value without repository id",
                ))
            }
        };
        let registered = src
            .orb()
            .lookup_type_code(&id)
            .filter(|tc| matches!(tc.kind(), TypeKind::Value | TypeKind::ValueBox));
        let actual = match registered {
            Some(tc) => tc,
            None if self.kind() != TypeKind::AbstractInterface => self.clone(),
            None => {
                return Err(OrbError::unsupported(format!(
                    "value '{id}' in abstract interface has no registered type"
                )))
            }
        };
        write_value_header(dst, &id)?;
        actual.copy_value_state(src, dst)
    }

    /// Copy the state members of a value type (base members first) or the
    /// content of a value box.
    pub(crate) fn copy_value_state(
        &self,
        src: &mut CdrInputStream,
        dst: &mut CdrOutputStream,
    ) -> Result<()> {
        let tc = self.resolve()?;
        match tc.params()? {
            Params::Value {
                concrete_base,
                members,
                ..
            } => {
                if let Some(base) = concrete_base {
                    base.copy_value_state(src, dst)?;
                }
                for member in members {
                    member.type_code.copy(src, dst)?;
                }
                Ok(())
            }
            Params::Content(content) if tc.kind() == TypeKind::ValueBox => content.copy(src, dst),
            _ => Err(OrbError::bad_kind("copy_value_state", tc.kind())),
        }
    }
}

pub(crate) fn check_bound(what: &str, bound: u32, len: usize) -> Result<()> {
    if bound > 0 && len > bound as usize {
        return Err(OrbError::marshal(
            what,
            format!("length {len} exceeds bound {bound}"),
        ));
    }
    Ok(())
}

fn copy_elements(
    element: &TypeCode,
    count: u32,
    src: &mut CdrInputStream,
    dst: &mut CdrOutputStream,
) -> Result<()> {
    // Octets need no conversion.
    if element.resolve_alias_and_indirect()?.kind() == TypeKind::Octet {
        let bytes = src.read_octets(count as usize)?;
        dst.write_octets(&bytes)?;
        return Ok(());
    }
    for _ in 0..count {
        element.copy(src, dst)?;
    }
    Ok(())
}
