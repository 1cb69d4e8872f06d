// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use orbcodec::{Any, CdrOutputStream, Orb, StructMember, TypeCode, TypeKind, UnionMember};

// ============================================================================
// Type Builders
// ============================================================================

/// `struct Point { float x; float y; };`
pub fn point_tc(orb: &Orb) -> TypeCode {
    let float = orb.primitive_tc(TypeKind::Float).expect("float");
    orb.create_struct_tc(
        "IDL:Point:1.0",
        "Point",
        vec![
            StructMember::new("x", float.clone()),
            StructMember::new("y", float),
        ],
    )
}

/// `struct Node { long value; sequence<Node> children; };`
pub fn node_tc(orb: &Orb) -> TypeCode {
    orb.create_struct_tc(
        "IDL:Node:1.0",
        "Node",
        vec![
            StructMember::new("value", orb.primitive_tc(TypeKind::Long).expect("long")),
            StructMember::new(
                "children",
                orb.create_sequence_tc(0, orb.create_recursive_tc("IDL:Node:1.0")),
            ),
        ],
    )
}

/// ```idl
/// union Choice switch (long) {
///     case 1: string text;
///     case 2: long number;
///     default: boolean flag;
/// };
/// ```
pub fn choice_tc(orb: &Orb) -> TypeCode {
    let long = orb.primitive_tc(TypeKind::Long).expect("long");
    orb.create_union_tc(
        "IDL:Choice:1.0",
        "Choice",
        long.clone(),
        vec![
            UnionMember::new("text", long_label(orb, 1), orb.create_string_tc(0)),
            UnionMember::new("number", long_label(orb, 2), long),
            UnionMember::default_case(
                orb,
                "flag",
                orb.primitive_tc(TypeKind::Boolean).expect("boolean"),
            ),
        ],
    )
    .expect("create union")
}

/// An Any holding a `long`, for union labels.
pub fn long_label(orb: &Orb, value: i32) -> Any {
    let mut label = orb.create_any();
    label.insert_long(value);
    label
}

// ============================================================================
// Value Builders
// ============================================================================

/// Build an Any of type `tc` from the bytes written by `write`.
pub fn streamed_any(
    orb: &Orb,
    tc: &TypeCode,
    write: impl FnOnce(&mut CdrOutputStream) -> orbcodec::Result<()>,
) -> Any {
    let mut any = orb.create_any();
    let mut out = any.create_output_stream();
    write(&mut out).expect("write value");
    any.read_value_from_output(out, tc).expect("read value");
    any
}

/// Write `any` with its TypeCode and read it back through `peer`.
pub fn round_trip(any: &Any, peer: &Orb, little_endian: bool) -> Any {
    let mut out = CdrOutputStream::with_byte_order(any.orb(), little_endian);
    out.write_any(any).expect("write any");
    let bytes = out.finish().expect("finish");
    let mut input = orbcodec::CdrInputStream::new(peer, bytes, little_endian);
    let decoded = input.read_any().expect("read any");
    assert!(input.is_at_end(), "trailing bytes after any");
    decoded
}
