// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Any round trips between independent ORB contexts.

mod common;

use std::str::FromStr;

use common::{point_tc, round_trip, streamed_any};
use orbcodec::{
    Any, FixedDecimal, ObjectRef, Orb, OrbError, StructMember, TaggedProfile, TypeKind,
};

fn scalar_anys(orb: &Orb) -> Vec<Any> {
    let fills: [fn(&mut Any); 13] = [
        |a| a.insert_short(i16::MIN),
        |a| a.insert_short(i16::MAX),
        |a| a.insert_long(i32::MIN),
        |a| a.insert_ushort(u16::MAX),
        |a| a.insert_ulong(u32::MAX),
        |a| a.insert_longlong(i64::MIN),
        |a| a.insert_ulonglong(u64::MAX),
        |a| a.insert_float(f32::MIN_POSITIVE),
        |a| a.insert_double(f64::MAX),
        |a| a.insert_boolean(true),
        |a| a.insert_char('\u{e9}'),
        |a| a.insert_wchar('\u{20ac}'),
        |a| a.insert_octet(0xFF),
    ];
    fills
        .iter()
        .map(|fill| {
            let mut any = orb.create_any();
            fill(&mut any);
            any
        })
        .collect()
}

#[test]
fn test_point_between_orbs() {
    let orb = Orb::default();
    let peer = Orb::default();
    let point = point_tc(&orb);
    let any = streamed_any(&orb, &point, |out| {
        out.write_float(1.5)?;
        out.write_float(-2.25)?;
        Ok(())
    });

    for little_endian in [false, true] {
        let decoded = round_trip(&any, &peer, little_endian);
        assert!(decoded.orb().ptr_eq(&peer));
        assert_eq!(decoded.kind(), TypeKind::Struct);
        assert!(decoded.type_code().equal(&point));
        assert!(decoded.equal(&any).unwrap());

        let mut cursor = decoded.create_input_stream().unwrap();
        assert_eq!(cursor.is_little_endian(), little_endian);
        assert_eq!(cursor.read_float().unwrap(), 1.5);
        assert_eq!(cursor.read_float().unwrap(), -2.25);
        assert!(cursor.is_at_end());
    }
}

#[test]
fn test_primitive_boundaries_survive_both_byte_orders() {
    let orb = Orb::default();
    let peer = Orb::default();
    for any in scalar_anys(&orb) {
        for little_endian in [false, true] {
            let decoded = round_trip(&any, &peer, little_endian);
            assert_eq!(decoded.kind(), any.kind());
            assert!(
                decoded.equal(&any).unwrap(),
                "{:?} changed in transit (little_endian = {little_endian})",
                any.kind()
            );
        }
    }

    let mut any = orb.create_any();
    any.insert_longlong(i64::MIN);
    assert_eq!(round_trip(&any, &peer, true).extract_longlong().unwrap(), i64::MIN);
    any.insert_wchar('\u{20ac}');
    assert_eq!(round_trip(&any, &peer, false).extract_wchar().unwrap(), '\u{20ac}');
}

#[test]
fn test_floating_point_bit_patterns() {
    let orb = Orb::default();
    let nan = f64::from_bits(0x7FF8_0000_0000_0001);

    let mut any = orb.create_any();
    any.insert_double(nan);
    let decoded = round_trip(&any, &orb, true);
    assert_eq!(decoded.extract_double().unwrap().to_bits(), 0x7FF8_0000_0000_0001);
    assert!(decoded.equal(&any).unwrap());

    any.insert_double(-0.0);
    let decoded = round_trip(&any, &orb, false);
    assert!(decoded.extract_double().unwrap().is_sign_negative());

    let mut zero = orb.create_any();
    zero.insert_double(0.0);
    assert!(!decoded.equal(&zero).unwrap());
}

#[test]
fn test_equality_is_symmetric() {
    let orb = Orb::default();
    let mut anys = scalar_anys(&orb);
    let mut text = orb.create_any();
    text.insert_string("text").unwrap();
    anys.push(text);
    let mut unset = orb.create_any();
    unset.set_type(orb.primitive_tc(TypeKind::Long).unwrap());
    anys.push(unset);

    for a in &anys {
        for b in &anys {
            assert_eq!(a.equal(b).unwrap(), b.equal(a).unwrap());
        }
        assert!(a.equal(a).unwrap());
    }
}

#[test]
fn test_bounded_strings() {
    let orb = Orb::default();
    let bounded = orb.create_string_tc(4);

    let mut any = orb.create_any();
    any.set_type(bounded.clone());
    assert!(matches!(
        any.insert_string("hello"),
        Err(OrbError::DataConversion { .. })
    ));
    any.insert_string("hi").unwrap();
    assert_eq!(any.type_code().length().unwrap(), 4);

    let decoded = round_trip(&any, &orb, true);
    assert_eq!(decoded.type_code().length().unwrap(), 4);
    assert_eq!(decoded.extract_string().unwrap(), "hi");

    // a peer sending more characters than its own bound is rejected
    let mut out = orb.create_output_stream();
    out.write_type_code(&bounded).unwrap();
    out.write_string("too long").unwrap();
    let mut input = out.into_input_stream().unwrap();
    assert!(matches!(input.read_any(), Err(OrbError::Marshal { .. })));
}

#[test]
fn test_alias_is_transparent_to_extraction_only() {
    let orb = Orb::default();
    let long = orb.primitive_tc(TypeKind::Long).unwrap();
    let count = orb.create_alias_tc("IDL:Count:1.0", "Count", long.clone());
    let any = streamed_any(&orb, &count, |out| {
        out.write_long(42)?;
        Ok(())
    });

    assert_eq!(any.kind(), TypeKind::Alias);
    assert_eq!(any.extract_long().unwrap(), 42);
    assert!(!any.type_code().equal(&long));
    assert!(any.type_code().equivalent(&long).unwrap());

    let decoded = round_trip(&any, &Orb::default(), true);
    assert_eq!(decoded.type_code().name().unwrap(), "Count");
    assert_eq!(decoded.extract_long().unwrap(), 42);
}

#[test]
fn test_nested_values() {
    let orb = Orb::default();
    let peer = Orb::default();

    let mut inner = orb.create_any();
    inner.insert_string("inside").unwrap();
    let mut outer = orb.create_any();
    outer.insert_any(inner);
    let decoded = round_trip(&outer, &peer, true);
    assert_eq!(
        decoded.extract_any().unwrap().extract_string().unwrap(),
        "inside"
    );

    let mut tc_any = orb.create_any();
    tc_any.insert_type_code(point_tc(&orb));
    let decoded = round_trip(&tc_any, &peer, false);
    assert!(decoded.extract_type_code().unwrap().equal(&point_tc(&orb)));

    let mut money = orb.create_any();
    money.insert_fixed(FixedDecimal::from_str("-123.45").unwrap());
    let decoded = round_trip(&money, &peer, true);
    assert_eq!(
        decoded.extract_fixed().unwrap(),
        FixedDecimal::from_str("-123.45").unwrap()
    );
}

#[test]
fn test_object_references() {
    let orb = Orb::default();
    let account = orb.create_interface_tc("IDL:Bank/Account:1.0", "Account");
    let object = ObjectRef::new(
        "IDL:Bank/Account:1.0",
        vec![TaggedProfile {
            tag: 0,
            data: vec![0, 1, 2, 3],
        }],
    );

    let mut any = orb.create_any();
    any.insert_object_with_type(object.clone(), account.clone())
        .unwrap();
    let decoded = round_trip(&any, &Orb::default(), true);
    assert_eq!(decoded.type_code().id().unwrap(), "IDL:Bank/Account:1.0");
    assert_eq!(decoded.extract_object().unwrap(), object);

    let other = ObjectRef::new("IDL:Bank/Teller:1.0", Vec::new());
    assert!(matches!(
        any.insert_object_with_type(other, account),
        Err(OrbError::BadOperation { .. })
    ));

    any.insert_object(ObjectRef::nil());
    assert!(round_trip(&any, &orb, false).extract_object().unwrap().is_nil());
}

#[test]
fn test_extraction_type_mismatch() {
    let orb = Orb::default();
    let mut any = orb.create_any();
    any.insert_ulong(7);
    assert!(matches!(any.extract_long(), Err(OrbError::BadOperation { .. })));
    assert!(matches!(any.extract_string(), Err(OrbError::BadOperation { .. })));
    assert_eq!(any.extract_ulong().unwrap(), 7);
}

#[test]
fn test_any_member_before_other_members() {
    let orb = Orb::default();
    let holder = orb.create_struct_tc(
        "IDL:Holder:1.0",
        "Holder",
        vec![
            StructMember::new("a", orb.primitive_tc(TypeKind::Any).unwrap()),
            StructMember::new("b", orb.primitive_tc(TypeKind::Long).unwrap()),
        ],
    );
    let point = point_tc(&orb);
    let build = |y: f32| {
        let body = streamed_any(&orb, &point, |out| {
            out.write_float(0.5)?;
            out.write_float(y)?;
            Ok(())
        });
        streamed_any(&orb, &holder, |out| {
            out.write_any(&body)?;
            out.write_long(-3)?;
            Ok(())
        })
    };
    let any = build(8.0);
    assert!(any.equal(&build(8.0)).unwrap());
    assert!(!any.equal(&build(9.0)).unwrap());

    let decoded = round_trip(&any, &Orb::default(), true);
    assert!(decoded.equal(&any).unwrap());
    let mut cursor = decoded.create_input_stream().unwrap();
    let body = cursor.read_any().unwrap();
    assert!(body.type_code().equal(&point));
    assert_eq!(cursor.read_long().unwrap(), -3);
    assert!(cursor.is_at_end());
}
