// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Recursive types built through placeholders and carried between ORBs.

mod common;

use common::{node_tc, round_trip, streamed_any};
use orbcodec::{CdrOutputStream, Orb, OrbConfig, OrbError, StructMember, TypeKind};

/// `Node { 1, [Node { 2, [] }, Node { 3, [Node { 4, [] }] }] }`
fn write_tree(out: &mut CdrOutputStream) -> orbcodec::Result<()> {
    out.write_long(1)?;
    out.write_ulong(2)?;
    out.write_long(2)?;
    out.write_ulong(0)?;
    out.write_long(3)?;
    out.write_ulong(1)?;
    out.write_long(4)?;
    out.write_ulong(0)?;
    Ok(())
}

#[test]
fn test_placeholder_resolves_to_enclosing_type() {
    let orb = Orb::default();
    let node = node_tc(&orb);
    let element = node.member_type(1).unwrap().content_type().unwrap();
    assert!(element.is_indirect());
    assert!(element.resolve().unwrap().ptr_eq(&node));
    assert_eq!(
        node.to_string(),
        "struct Node {\n    long value;\n    sequence<Node> children;\n};"
    );
}

#[test]
fn test_recursive_value_round_trip() {
    let orb = Orb::default();
    let node = node_tc(&orb);
    let tree = streamed_any(&orb, &node, write_tree);

    for little_endian in [false, true] {
        let peer = Orb::default();
        let decoded = round_trip(&tree, &peer, little_endian);
        assert!(decoded.type_code().equal(&node));
        assert!(decoded.equal(&tree).unwrap());

        let children = decoded.type_code().member_type(1).unwrap();
        let element = children.content_type().unwrap();
        assert!(element.is_indirect());
        assert!(element.resolve().unwrap().ptr_eq(decoded.type_code()));

        let mut cursor = decoded.create_input_stream().unwrap();
        let mut expected = orb.create_output_stream();
        write_tree(&mut expected).unwrap();
        let mut expected = expected.into_input_stream().unwrap();
        while !expected.is_at_end() {
            assert_eq!(cursor.read_ulong().unwrap(), expected.read_ulong().unwrap());
        }
        assert!(cursor.is_at_end());
    }
}

#[test]
fn test_recursion_through_sequence_offset() {
    let orb = Orb::default();
    let list = orb.create_struct_tc(
        "IDL:List:1.0",
        "List",
        vec![
            StructMember::new("head", orb.create_string_tc(0)),
            StructMember::new("tail", orb.create_recursive_sequence_tc(1, 1)),
        ],
    );
    let any = streamed_any(&orb, &list, |out| {
        out.write_string("a")?;
        out.write_ulong(1)?;
        out.write_string("b")?;
        out.write_ulong(0)?;
        Ok(())
    });
    let decoded = round_trip(&any, &Orb::default(), true);
    assert!(decoded.equal(&any).unwrap());
    let tail = decoded.type_code().member_type(1).unwrap();
    assert_eq!(tail.length().unwrap(), 1);

    // the bound of one element is enforced at every level
    let over = streamed_any(&orb, &list, |out| {
        out.write_string("a")?;
        out.write_ulong(2)?;
        Ok(())
    });
    let mut out = orb.create_output_stream();
    assert!(matches!(out.write_any(&over), Err(OrbError::Marshal { .. })));
}

#[test]
fn test_placeholder_without_registry_is_unresolved() {
    let orb = Orb::new(OrbConfig {
        recursive_typecodes: false,
        ..OrbConfig::default()
    })
    .unwrap();
    let placeholder = orb.create_recursive_tc("IDL:Node:1.0");
    orb.create_struct_tc(
        "IDL:Node:1.0",
        "Node",
        vec![StructMember::new(
            "value",
            orb.primitive_tc(TypeKind::Long).unwrap(),
        )],
    );
    assert!(placeholder.try_resolve().is_none());
    assert!(placeholder.resolve().is_err());
}
