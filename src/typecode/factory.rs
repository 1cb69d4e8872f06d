// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TypeCode construction on the [`Orb`].
//!
//! Every TypeCode with a non-empty repository id is registered with the ORB
//! registry as it is built, so recursive placeholders created earlier can
//! resolve against it.

use tracing::warn;

use super::{
    Content, Params, StructMember, TypeCode, TypeKind, UnionMember, ValueMember,
};
use crate::core::{OrbError, Result};
use crate::Orb;

impl Orb {
    fn build_tc(&self, kind: TypeKind, ident: Option<(&str, &str)>, params: Params) -> TypeCode {
        let tc = TypeCode::new_node(kind, self.config().typecode_caching);
        if let Some((id, name)) = ident {
            tc.set_ident(id, name);
        }
        tc.complete(params);
        if let Some((id, _)) = ident {
            self.registry().register(id, &tc);
        }
        tc
    }

    /// Create a struct TypeCode.
    pub fn create_struct_tc(&self, id: &str, name: &str, members: Vec<StructMember>) -> TypeCode {
        self.build_tc(TypeKind::Struct, Some((id, name)), Params::Members(members))
    }

    /// Create an exception TypeCode.
    pub fn create_exception_tc(
        &self,
        id: &str,
        name: &str,
        members: Vec<StructMember>,
    ) -> TypeCode {
        self.build_tc(TypeKind::Except, Some((id, name)), Params::Members(members))
    }

    /// Create a union TypeCode.
    ///
    /// A member whose label is the octet `0` is the default branch; if
    /// several are given the last one wins. Every other label must have the
    /// discriminator's type, and no two may be equal.
    pub fn create_union_tc(
        &self,
        id: &str,
        name: &str,
        discriminator: TypeCode,
        members: Vec<UnionMember>,
    ) -> Result<TypeCode> {
        let resolved = discriminator.resolve_alias_and_indirect()?;
        if !resolved.kind().is_discriminator() {
            return Err(OrbError::bad_param(format!(
                "{} is not a valid union discriminator type",
                resolved.kind()
            )));
        }

        let mut default_index = -1;
        let mut seen: Vec<u64> = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            if member.is_default() {
                default_index = index as i32;
                continue;
            }
            let label_kind = member.label.type_code().resolve_alias_and_indirect()?.kind();
            if label_kind != resolved.kind() {
                return Err(OrbError::bad_param(format!(
                    "label of member '{}' is {label_kind}, expected {}",
                    member.name,
                    resolved.kind()
                )));
            }
            let bits = member.label.scalar_bits().ok_or_else(|| {
                OrbError::bad_param(format!("label of member '{}' holds no value", member.name))
            })?;
            if seen.contains(&bits) {
                warn!(id, member = %member.name, "duplicate union label");
                return Err(OrbError::bad_param(format!(
                    "duplicate label on member '{}' of union {id}",
                    member.name
                )));
            }
            seen.push(bits);
        }

        Ok(self.build_tc(
            TypeKind::Union,
            Some((id, name)),
            Params::Union {
                discriminator,
                default_index,
                members,
            },
        ))
    }

    /// Create an enum TypeCode.
    pub fn create_enum_tc<I, S>(&self, id: &str, name: &str, members: I) -> TypeCode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = members.into_iter().map(Into::into).collect();
        self.build_tc(TypeKind::Enum, Some((id, name)), Params::Enum(names))
    }

    /// Create an alias (typedef) TypeCode.
    pub fn create_alias_tc(&self, id: &str, name: &str, original: TypeCode) -> TypeCode {
        self.build_tc(TypeKind::Alias, Some((id, name)), Params::Content(original))
    }

    /// Create a value box TypeCode.
    pub fn create_value_box_tc(&self, id: &str, name: &str, boxed: TypeCode) -> TypeCode {
        self.build_tc(TypeKind::ValueBox, Some((id, name)), Params::Content(boxed))
    }

    /// Create an object reference TypeCode.
    pub fn create_interface_tc(&self, id: &str, name: &str) -> TypeCode {
        self.build_tc(TypeKind::ObjRef, Some((id, name)), Params::Named)
    }

    /// Create a native TypeCode.
    pub fn create_native_tc(&self, id: &str, name: &str) -> TypeCode {
        self.build_tc(TypeKind::Native, Some((id, name)), Params::Named)
    }

    /// Create an abstract interface TypeCode.
    pub fn create_abstract_interface_tc(&self, id: &str, name: &str) -> TypeCode {
        self.build_tc(TypeKind::AbstractInterface, Some((id, name)), Params::Named)
    }

    /// Create a string TypeCode; a bound of 0 means unbounded.
    pub fn create_string_tc(&self, bound: u32) -> TypeCode {
        self.build_tc(TypeKind::String, None, Params::Bound(bound))
    }

    /// Create a wide string TypeCode; a bound of 0 means unbounded.
    pub fn create_wstring_tc(&self, bound: u32) -> TypeCode {
        self.build_tc(TypeKind::WString, None, Params::Bound(bound))
    }

    /// Create a sequence TypeCode; a bound of 0 means unbounded.
    pub fn create_sequence_tc(&self, bound: u32, element: TypeCode) -> TypeCode {
        self.build_tc(
            TypeKind::Sequence,
            None,
            Params::Sequence {
                bound,
                content: Content::Direct(element),
            },
        )
    }

    /// Create a sequence of the type enclosing it `offset` levels up.
    ///
    /// The content type becomes available once the sequence is a member of
    /// a struct, union or value type (`offset` 1 being the direct parent).
    pub fn create_recursive_sequence_tc(&self, bound: u32, offset: u32) -> TypeCode {
        self.build_tc(
            TypeKind::Sequence,
            None,
            Params::Sequence {
                bound,
                content: Content::Recursive {
                    offset: offset.max(1),
                    resolved: Default::default(),
                },
            },
        )
    }

    /// Create an array TypeCode.
    pub fn create_array_tc(&self, length: u32, element: TypeCode) -> TypeCode {
        self.build_tc(
            TypeKind::Array,
            None,
            Params::Array {
                length,
                content: element,
            },
        )
    }

    /// Create a fixed-point TypeCode.
    pub fn create_fixed_tc(&self, digits: u16, scale: i16) -> TypeCode {
        self.build_tc(TypeKind::Fixed, None, Params::Fixed { digits, scale })
    }

    /// Create a value type TypeCode.
    pub fn create_value_tc(
        &self,
        id: &str,
        name: &str,
        type_modifier: i16,
        concrete_base: Option<TypeCode>,
        members: Vec<ValueMember>,
    ) -> TypeCode {
        let concrete_base = concrete_base.filter(|base| base.kind() != TypeKind::Null);
        self.build_tc(
            TypeKind::Value,
            Some((id, name)),
            Params::Value {
                type_modifier,
                concrete_base,
                members,
            },
        )
    }

    /// Create a placeholder for the type registered under `id`.
    ///
    /// The placeholder resolves immediately if `id` is already registered,
    /// and otherwise on first use once a TypeCode with that id is built.
    pub fn create_recursive_tc(&self, id: &str) -> TypeCode {
        let registry = self
            .config()
            .recursive_typecodes
            .then(|| self.registry().clone());
        let target = registry.as_ref().and_then(|r| r.lookup(id));
        TypeCode::new_indirect(id, target.as_ref(), registry)
    }
}
