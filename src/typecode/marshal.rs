// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TypeCode wire encoding.
//!
//! A TypeCode is a 4-byte kind tag followed by its parameters: nothing for
//! empty kinds, inline scalars for string, wstring and fixed, and an
//! encapsulation for every complex kind. Within one top-level TypeCode, a
//! repository id that has already been written is emitted as an indirection:
//! the `0xFFFFFFFF` tag followed by the (negative) distance from the offset
//! field back to the earlier kind tag.

use std::collections::HashMap;

use tracing::trace;

use super::{
    read_discriminator, write_discriminator, Content, EncodingKey, Params, StructMember,
    TypeCode, TypeKind, UnionMember, ValueMember, Visibility, INDIRECT_TAG,
};
use crate::core::{OrbError, Result};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};

/// Nesting limit when decoding.
const MAX_TYPECODE_DEPTH: usize = 256;

/// Smallest legal indirection distance: the tag itself.
const MIN_INDIRECTION_DISTANCE: i64 = -4;

// ============================================================================
// Writer
// ============================================================================

struct TypeCodeWriter {
    /// Kind tag position of every id written so far
    positions: HashMap<String, usize>,
    /// Lowest indirection target written inside the current complex TypeCode
    lowest_target: usize,
}

impl TypeCodeWriter {
    fn new() -> Self {
        Self {
            positions: HashMap::new(),
            lowest_target: usize::MAX,
        }
    }

    fn write(&mut self, tc: &TypeCode, out: &mut CdrOutputStream) -> Result<()> {
        out.align(4);
        let start = out.position();

        if tc.is_indirect() {
            let id = tc.raw_id();
            if let Some(&target) = self.positions.get(id) {
                return self.write_indirection(out, target);
            }
            // Not an enclosing type: write the target in full.
            let resolved = tc.try_resolve().ok_or_else(|| {
                OrbError::marshal(
                    "type code",
                    format!("indirection to '{id}' which has not been marshaled"),
                )
            })?;
            return self.write(&resolved, out);
        }

        let kind = tc.kind();
        let id = tc.raw_id();
        if kind.has_id() && !id.is_empty() {
            if let Some(&target) = self.positions.get(id) {
                return self.write_indirection(out, target);
            }
            self.positions.insert(id.to_string(), start);
        }

        out.write_ulong(kind.code())?;
        match tc.params()? {
            Params::Empty => {}
            Params::Bound(bound) => {
                out.write_ulong(*bound)?;
            }
            Params::Fixed { digits, scale } => {
                out.write_ushort(*digits)?;
                out.write_short(*scale)?;
            }
            _ => self.write_complex(tc, out, start)?,
        }
        Ok(())
    }

    fn write_indirection(&mut self, out: &mut CdrOutputStream, target: usize) -> Result<()> {
        out.write_ulong(INDIRECT_TAG)?;
        let offset_position = out.position();
        let distance = target as i64 - offset_position as i64;
        if distance > MIN_INDIRECTION_DISTANCE {
            return Err(OrbError::marshal(
                "type code",
                format!("indirection distance {distance} must be at most -4"),
            ));
        }
        let offset = i32::try_from(distance).map_err(|_| {
            OrbError::marshal("type code", format!("indirection distance {distance} overflows"))
        })?;
        out.write_long(offset)?;
        self.lowest_target = self.lowest_target.min(target);
        trace!(
            position = target,
            offset,
            bytes = %hex::encode(&out.data()[offset_position - 4..]),
            "wrote type code indirection"
        );
        Ok(())
    }

    fn write_complex(
        &mut self,
        tc: &TypeCode,
        out: &mut CdrOutputStream,
        start: usize,
    ) -> Result<()> {
        let key = EncodingKey {
            little_endian: out.is_little_endian(),
            giop_version: out.giop_version(),
            char_codeset: out.char_codeset(),
        };
        if let Some(bytes) = tc.cached_encoding(key) {
            trace!(
                kind = %tc.kind(),
                id = tc.raw_id(),
                len = bytes.len(),
                head = %hex::encode(&bytes[..bytes.len().min(16)]),
                "replaying cached type code encoding"
            );
            out.write_octets(&bytes)?;
            return Ok(());
        }

        let body = out.position();
        let outer_lowest = std::mem::replace(&mut self.lowest_target, usize::MAX);
        out.begin_encapsulation()?;
        self.write_params(tc, out)?;
        out.end_encapsulation()?;

        // Bytes are relocatable only if every indirection stays inside them.
        let self_contained = self.lowest_target >= start;
        self.lowest_target = self.lowest_target.min(outer_lowest);
        if self_contained && tc.is_caching() {
            tc.store_encoding(key, &out.data()[body..]);
        }
        Ok(())
    }

    fn write_ident(tc: &TypeCode, out: &mut CdrOutputStream) -> Result<()> {
        out.write_string(tc.raw_id())?;
        out.write_string(tc.raw_name())?;
        Ok(())
    }

    fn write_params(&mut self, tc: &TypeCode, out: &mut CdrOutputStream) -> Result<()> {
        match tc.params()? {
            Params::Named => Self::write_ident(tc, out)?,
            Params::Members(members) => {
                Self::write_ident(tc, out)?;
                out.write_ulong(members.len() as u32)?;
                for member in members {
                    out.write_string(&member.name)?;
                    self.write(&member.type_code, out)?;
                }
            }
            Params::Union {
                discriminator,
                default_index,
                members,
            } => {
                Self::write_ident(tc, out)?;
                self.write(discriminator, out)?;
                out.write_long(*default_index)?;
                out.write_ulong(members.len() as u32)?;
                for (index, member) in members.iter().enumerate() {
                    if index as i32 == *default_index {
                        out.write_octet(0)?;
                    } else {
                        write_discriminator(out, discriminator, &member.label)?;
                    }
                    out.write_string(&member.name)?;
                    self.write(&member.type_code, out)?;
                }
            }
            Params::Enum(names) => {
                Self::write_ident(tc, out)?;
                out.write_ulong(names.len() as u32)?;
                for name in names {
                    out.write_string(name)?;
                }
            }
            Params::Sequence { bound, .. } => {
                self.write(&tc.content_type()?, out)?;
                out.write_ulong(*bound)?;
            }
            Params::Array { length, content } => {
                self.write(content, out)?;
                out.write_ulong(*length)?;
            }
            Params::Content(content) => {
                Self::write_ident(tc, out)?;
                self.write(content, out)?;
            }
            Params::Value {
                type_modifier,
                concrete_base,
                members,
            } => {
                Self::write_ident(tc, out)?;
                out.write_short(*type_modifier)?;
                match concrete_base {
                    Some(base) => self.write(base, out)?,
                    None => {
                        out.write_ulong(TypeKind::Null.code())?;
                    }
                }
                out.write_ulong(members.len() as u32)?;
                for member in members {
                    out.write_string(&member.name)?;
                    self.write(&member.type_code, out)?;
                    out.write_short(member.visibility.code())?;
                }
            }
            Params::Empty | Params::Bound(_) | Params::Fixed { .. } | Params::Indirect(_) => {
                return Err(OrbError::bad_typecode(format!(
                    "{} has no encapsulated parameters",
                    tc.kind()
                )))
            }
        }
        Ok(())
    }
}

// ============================================================================
// Reader
// ============================================================================

struct TypeCodeReader {
    /// TypeCode decoded at each kind tag position
    by_position: HashMap<usize, TypeCode>,
    depth: usize,
}

impl TypeCodeReader {
    fn new() -> Self {
        Self {
            by_position: HashMap::new(),
            depth: 0,
        }
    }

    fn read(&mut self, input: &mut CdrInputStream) -> Result<TypeCode> {
        if self.depth >= MAX_TYPECODE_DEPTH {
            return Err(OrbError::marshal(
                "type code",
                format!("nesting deeper than {MAX_TYPECODE_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let result = self.read_at(input);
        self.depth -= 1;
        result
    }

    fn read_at(&mut self, input: &mut CdrInputStream) -> Result<TypeCode> {
        input.align(4)?;
        let start = input.position();
        let code = input.read_ulong()?;
        let kind = TypeKind::from_code(code).ok_or_else(|| {
            OrbError::marshal(
                "type code",
                format!("invalid kind {code} at position {start}"),
            )
        })?;
        let orb = input.orb().clone();

        let tc = match kind {
            TypeKind::Indirect => return self.read_indirection(input),
            TypeKind::String | TypeKind::WString => {
                let tc = TypeCode::new_node(kind, false);
                tc.complete(Params::Bound(input.read_ulong()?));
                tc
            }
            TypeKind::Fixed => {
                let digits = input.read_ushort()?;
                let scale = input.read_short()?;
                let tc = TypeCode::new_node(kind, false);
                tc.complete(Params::Fixed { digits, scale });
                tc
            }
            kind if kind.is_empty() => orb.empty_tc(kind),
            kind => {
                let tc = TypeCode::new_node(kind, orb.config().typecode_caching);
                self.by_position.insert(start, tc.clone());
                let mut encapsulation = input.read_encapsulation()?;
                self.read_params(&tc, &mut encapsulation)?;
                orb.registry().register(tc.raw_id(), &tc);
                return Ok(tc);
            }
        };
        self.by_position.insert(start, tc.clone());
        Ok(tc)
    }

    fn read_indirection(&mut self, input: &mut CdrInputStream) -> Result<TypeCode> {
        let offset_position = input.position();
        let offset = input.read_long()?;
        if i64::from(offset) > MIN_INDIRECTION_DISTANCE {
            return Err(OrbError::marshal(
                "type code",
                format!("invalid indirection offset {offset} at position {offset_position}"),
            ));
        }
        let target = offset_position as i64 + i64::from(offset);
        let found = usize::try_from(target)
            .ok()
            .and_then(|target| self.by_position.get(&target))
            .ok_or_else(|| {
                OrbError::marshal("type code", "referenced type of indirect type not marshaled")
            })?;
        trace!(position = target, offset, id = found.raw_id(), "read type code indirection");

        // A finished TypeCode is shared directly; one still being decoded is
        // an enclosing type and gets a weak indirection.
        if found.is_complete() {
            return Ok(found.clone());
        }
        let orb = input.orb();
        let registry = orb
            .config()
            .recursive_typecodes
            .then(|| orb.registry().clone());
        Ok(TypeCode::new_indirect(found.raw_id(), Some(found), registry))
    }

    fn read_ident(tc: &TypeCode, input: &mut CdrInputStream) -> Result<()> {
        let id = input.read_string()?;
        let name = input.read_string()?;
        tc.set_ident(id, name);
        Ok(())
    }

    fn read_params(&mut self, tc: &TypeCode, input: &mut CdrInputStream) -> Result<()> {
        let params = match tc.kind() {
            TypeKind::ObjRef | TypeKind::Native | TypeKind::AbstractInterface => {
                Self::read_ident(tc, input)?;
                Params::Named
            }
            TypeKind::Struct | TypeKind::Except => {
                Self::read_ident(tc, input)?;
                let count = input.read_sequence_length()?;
                let mut members = Vec::with_capacity(count.min(64) as usize);
                for _ in 0..count {
                    let name = input.read_string()?;
                    members.push(StructMember::new(name, self.read(input)?));
                }
                Params::Members(members)
            }
            TypeKind::Union => self.read_union(tc, input)?,
            TypeKind::Enum => {
                Self::read_ident(tc, input)?;
                let count = input.read_sequence_length()?;
                let mut names = Vec::with_capacity(count.min(64) as usize);
                for _ in 0..count {
                    names.push(input.read_string()?);
                }
                Params::Enum(names)
            }
            TypeKind::Sequence => {
                let content = self.read(input)?;
                Params::Sequence {
                    bound: input.read_ulong()?,
                    content: Content::Direct(content),
                }
            }
            TypeKind::Array => {
                let content = self.read(input)?;
                Params::Array {
                    length: input.read_ulong()?,
                    content,
                }
            }
            TypeKind::Alias | TypeKind::ValueBox => {
                Self::read_ident(tc, input)?;
                Params::Content(self.read(input)?)
            }
            TypeKind::Value => {
                Self::read_ident(tc, input)?;
                let type_modifier = input.read_short()?;
                let base = self.read(input)?;
                let concrete_base = (base.kind() != TypeKind::Null).then_some(base);
                let count = input.read_sequence_length()?;
                let mut members = Vec::with_capacity(count.min(64) as usize);
                for _ in 0..count {
                    let name = input.read_string()?;
                    let type_code = self.read(input)?;
                    let visibility = Visibility::from_code(input.read_short()?)?;
                    members.push(ValueMember::new(name, type_code, visibility));
                }
                Params::Value {
                    type_modifier,
                    concrete_base,
                    members,
                }
            }
            other => {
                return Err(OrbError::marshal(
                    "type code",
                    format!("{other} does not take encapsulated parameters"),
                ))
            }
        };
        tc.complete(params);
        Ok(())
    }

    fn read_union(&mut self, tc: &TypeCode, input: &mut CdrInputStream) -> Result<Params> {
        Self::read_ident(tc, input)?;
        let discriminator = self.read(input)?;
        let default_index = input.read_long()?;
        let count = input.read_sequence_length()?;
        if default_index < -1 || default_index >= count as i32 {
            return Err(OrbError::marshal(
                "union type code",
                format!("default index {default_index} out of range for {count} members"),
            ));
        }
        let orb = input.orb().clone();
        let mut members = Vec::with_capacity(count.min(64) as usize);
        for index in 0..count {
            let label = if index as i32 == default_index {
                input.read_octet()?;
                None
            } else {
                Some(read_discriminator(input, &discriminator)?)
            };
            let name = input.read_string()?;
            let type_code = self.read(input)?;
            members.push(match label {
                Some(label) => UnionMember::new(name, label, type_code),
                None => UnionMember::default_case(&orb, name, type_code),
            });
        }
        Ok(Params::Union {
            discriminator,
            default_index,
            members,
        })
    }
}

// ============================================================================
// Stream entry points
// ============================================================================

impl TypeCode {
    /// Write this TypeCode as a top-level TypeCode.
    pub fn write(&self, out: &mut CdrOutputStream) -> Result<()> {
        TypeCodeWriter::new().write(self, out)
    }

    /// Read a top-level TypeCode.
    pub fn read(input: &mut CdrInputStream) -> Result<TypeCode> {
        TypeCodeReader::new().read(input)
    }
}

impl CdrOutputStream {
    /// Write a TypeCode.
    pub fn write_type_code(&mut self, tc: &TypeCode) -> Result<&mut Self> {
        tc.write(self)?;
        Ok(self)
    }
}

impl CdrInputStream {
    /// Read a TypeCode.
    pub fn read_type_code(&mut self) -> Result<TypeCode> {
        TypeCode::read(self)
    }
}
