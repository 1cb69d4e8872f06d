// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TypeCode kinds and the per-kind lookup tables.
//!
//! Wire codes 0..=32 follow the CORBA `TCKind` enumeration; `Indirect` is the
//! all-ones indirection sentinel.

use std::fmt;

/// Wire value of the indirection sentinel.
pub const INDIRECT_TAG: u32 = 0xFFFF_FFFF;

/// Number of real (non-sentinel) kinds.
pub const KIND_COUNT: usize = 33;

/// Kind of a TypeCode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeKind {
    Null = 0,
    Void = 1,
    Short = 2,
    Long = 3,
    UShort = 4,
    ULong = 5,
    Float = 6,
    Double = 7,
    Boolean = 8,
    Char = 9,
    Octet = 10,
    Any = 11,
    TypeCode = 12,
    Principal = 13,
    ObjRef = 14,
    Struct = 15,
    Union = 16,
    Enum = 17,
    String = 18,
    Sequence = 19,
    Array = 20,
    Alias = 21,
    Except = 22,
    LongLong = 23,
    ULongLong = 24,
    LongDouble = 25,
    WChar = 26,
    WString = 27,
    Fixed = 28,
    Value = 29,
    ValueBox = 30,
    Native = 31,
    AbstractInterface = 32,
    /// Indirection to a TypeCode recorded elsewhere; never a resolved kind
    Indirect = INDIRECT_TAG,
}

/// How a kind's parameters are laid out after the kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCategory {
    /// No parameters
    Empty,
    /// Scalar parameters written inline
    Simple,
    /// Parameters wrapped in an encapsulation
    Complex,
    /// Indirection offset
    Indirect,
}

const ALL_KINDS: [TypeKind; KIND_COUNT] = [
    TypeKind::Null,
    TypeKind::Void,
    TypeKind::Short,
    TypeKind::Long,
    TypeKind::UShort,
    TypeKind::ULong,
    TypeKind::Float,
    TypeKind::Double,
    TypeKind::Boolean,
    TypeKind::Char,
    TypeKind::Octet,
    TypeKind::Any,
    TypeKind::TypeCode,
    TypeKind::Principal,
    TypeKind::ObjRef,
    TypeKind::Struct,
    TypeKind::Union,
    TypeKind::Enum,
    TypeKind::String,
    TypeKind::Sequence,
    TypeKind::Array,
    TypeKind::Alias,
    TypeKind::Except,
    TypeKind::LongLong,
    TypeKind::ULongLong,
    TypeKind::LongDouble,
    TypeKind::WChar,
    TypeKind::WString,
    TypeKind::Fixed,
    TypeKind::Value,
    TypeKind::ValueBox,
    TypeKind::Native,
    TypeKind::AbstractInterface,
];

use ParamCategory::{Complex as C, Empty as E, Simple as S};

const CATEGORIES: [ParamCategory; KIND_COUNT] = [
    E, E, E, E, E, E, E, E, E, E, E, // null .. octet
    E, E, E, // any, TypeCode, Principal
    C, C, C, C, // objref, struct, union, enum
    S, // string
    C, C, C, C, // sequence, array, alias, except
    E, E, E, E, // longlong, ulonglong, longdouble, wchar
    S, S, // wstring, fixed
    C, C, C, C, // value, value_box, native, abstract_interface
];

// Kinds whose Any payload is kept as an encoded byte region.
const STREAMED: [bool; KIND_COUNT] = [
    false, false, false, false, false, false, false, false, false, false, false, // null .. octet
    false, false, true, // any, TypeCode, Principal
    false, true, true, false, // objref, struct, union, enum
    false, // string
    true, true, true, true, // sequence, array, alias, except
    false, false, false, false, // longlong, ulonglong, longdouble, wchar
    false, false, // wstring, fixed
    false, false, false, false, // value, value_box, native, abstract_interface
];

const NAMES: [&str; KIND_COUNT] = [
    "null",
    "void",
    "short",
    "long",
    "unsigned short",
    "unsigned long",
    "float",
    "double",
    "boolean",
    "char",
    "octet",
    "any",
    "TypeCode",
    "Principal",
    "objref",
    "struct",
    "union",
    "enum",
    "string",
    "sequence",
    "array",
    "alias",
    "exception",
    "long long",
    "unsigned long long",
    "long double",
    "wchar",
    "wstring",
    "fixed",
    "valuetype",
    "valuebox",
    "native",
    "abstract interface",
];

impl TypeKind {
    /// Decode a wire kind code.
    pub fn from_code(code: u32) -> Option<Self> {
        if code == INDIRECT_TAG {
            return Some(TypeKind::Indirect);
        }
        ALL_KINDS.get(code as usize).copied()
    }

    /// Wire kind code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// All real kinds in code order.
    pub fn all() -> &'static [TypeKind] {
        &ALL_KINDS
    }

    /// Parameter layout of this kind.
    pub fn category(self) -> ParamCategory {
        match self {
            TypeKind::Indirect => ParamCategory::Indirect,
            kind => CATEGORIES[kind as usize],
        }
    }

    /// Whether an Any of this kind keeps its value as an encoded byte region.
    pub fn is_streamed(self) -> bool {
        match self {
            TypeKind::Indirect => false,
            kind => STREAMED[kind as usize],
        }
    }

    /// Whether this kind takes no parameters (shared singleton TypeCodes).
    #[inline]
    pub fn is_empty(self) -> bool {
        self.category() == ParamCategory::Empty
    }

    /// Whether TypeCodes of this kind carry a repository id and name.
    pub const fn has_id(self) -> bool {
        matches!(
            self,
            TypeKind::ObjRef
                | TypeKind::Struct
                | TypeKind::Union
                | TypeKind::Enum
                | TypeKind::Alias
                | TypeKind::Except
                | TypeKind::Value
                | TypeKind::ValueBox
                | TypeKind::Native
                | TypeKind::AbstractInterface
        )
    }

    /// Whether TypeCodes of this kind have typed members.
    pub const fn has_member_types(self) -> bool {
        matches!(
            self,
            TypeKind::Struct | TypeKind::Except | TypeKind::Union | TypeKind::Value
        )
    }

    /// Whether this kind is legal as a union discriminator.
    pub const fn is_discriminator(self) -> bool {
        matches!(
            self,
            TypeKind::Short
                | TypeKind::Long
                | TypeKind::UShort
                | TypeKind::ULong
                | TypeKind::LongLong
                | TypeKind::ULongLong
                | TypeKind::Boolean
                | TypeKind::Char
                | TypeKind::WChar
                | TypeKind::Enum
        )
    }

    /// IDL spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Indirect => "indirect",
            kind => NAMES[kind as usize],
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for (code, kind) in TypeKind::all().iter().enumerate() {
            assert_eq!(kind.code(), code as u32);
            assert_eq!(TypeKind::from_code(code as u32), Some(*kind));
        }
        assert_eq!(TypeKind::from_code(INDIRECT_TAG), Some(TypeKind::Indirect));
        assert_eq!(TypeKind::from_code(33), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(TypeKind::Long.category(), ParamCategory::Empty);
        assert_eq!(TypeKind::WChar.category(), ParamCategory::Empty);
        assert_eq!(TypeKind::String.category(), ParamCategory::Simple);
        assert_eq!(TypeKind::Fixed.category(), ParamCategory::Simple);
        assert_eq!(TypeKind::ObjRef.category(), ParamCategory::Complex);
        assert_eq!(TypeKind::AbstractInterface.category(), ParamCategory::Complex);
        assert_eq!(TypeKind::Indirect.category(), ParamCategory::Indirect);

        let empty = TypeKind::all().iter().filter(|k| k.is_empty()).count();
        assert_eq!(empty, 18);
    }

    #[test]
    fn test_streamed_table() {
        let streamed: Vec<TypeKind> = TypeKind::all()
            .iter()
            .copied()
            .filter(|k| k.is_streamed())
            .collect();
        assert_eq!(
            streamed,
            vec![
                TypeKind::Principal,
                TypeKind::Struct,
                TypeKind::Union,
                TypeKind::Sequence,
                TypeKind::Array,
                TypeKind::Alias,
                TypeKind::Except,
            ]
        );
        assert!(!TypeKind::Indirect.is_streamed());
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeKind::ULongLong.to_string(), "unsigned long long");
        assert_eq!(TypeKind::Indirect.to_string(), "indirect");
    }
}
