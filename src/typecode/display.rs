// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! IDL-like rendering of TypeCodes.
//!
//! The top-level TypeCode is printed as a full declaration. Named types
//! nested inside it are printed by name only, which also keeps recursive
//! types finite.

use std::fmt::{self, Write};

use super::{Params, TypeCode, TypeKind, Visibility};

const INDENT: &str = "    ";

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        declaration(self, &mut text)?;
        f.write_str(&text)
    }
}

fn declaration(tc: &TypeCode, out: &mut String) -> fmt::Result {
    if tc.is_indirect() {
        return out.write_str(&type_spec(tc));
    }
    let Ok(params) = tc.params() else {
        return write!(out, "<incomplete {}>", tc.kind());
    };
    let name = tc.raw_name();
    match params {
        Params::Members(members) => {
            let keyword = if tc.kind() == TypeKind::Except {
                "exception"
            } else {
                "struct"
            };
            writeln!(out, "{keyword} {name} {{")?;
            for member in members {
                writeln!(out, "{INDENT}{};", field(&member.type_code, &member.name))?;
            }
            out.write_str("};")
        }
        Params::Union {
            discriminator,
            default_index,
            members,
        } => {
            writeln!(out, "union {name} switch ({}) {{", type_spec(discriminator))?;
            for (index, member) in members.iter().enumerate() {
                if index as i32 == *default_index {
                    writeln!(out, "{INDENT}default:")?;
                } else {
                    let value = label(member.label.scalar_bits(), discriminator);
                    writeln!(out, "{INDENT}case {value}:")?;
                }
                writeln!(
                    out,
                    "{INDENT}{INDENT}{};",
                    field(&member.type_code, &member.name)
                )?;
            }
            out.write_str("};")
        }
        Params::Enum(names) => write!(out, "enum {name} {{ {} }};", names.join(", ")),
        Params::Content(content) if tc.kind() == TypeKind::Alias => {
            write!(out, "typedef {};", field(content, name))
        }
        Params::Content(content) => write!(out, "valuetype {name} {};", type_spec(content)),
        Params::Value {
            type_modifier,
            concrete_base,
            members,
        } => {
            let prefix = match type_modifier {
                1 => "custom ",
                2 => "abstract ",
                3 => "truncatable ",
                _ => "",
            };
            write!(out, "{prefix}valuetype {name}")?;
            if let Some(base) = concrete_base {
                write!(out, " : {}", type_spec(base))?;
            }
            out.write_str(" {\n")?;
            for member in members {
                let visibility = match member.visibility {
                    Visibility::Public => "public",
                    Visibility::Private => "private",
                };
                writeln!(
                    out,
                    "{INDENT}{visibility} {};",
                    field(&member.type_code, &member.name)
                )?;
            }
            out.write_str("};")
        }
        Params::Named => match tc.kind() {
            TypeKind::Native => write!(out, "native {name};"),
            TypeKind::AbstractInterface => write!(out, "abstract interface {name};"),
            _ => write!(out, "interface {name};"),
        },
        _ => out.write_str(&type_spec(tc)),
    }
}

/// A type as it appears in a member declaration.
fn type_spec(tc: &TypeCode) -> String {
    if tc.is_indirect() || tc.kind().has_id() {
        let name = tc.raw_name();
        return match tc.try_resolve() {
            Some(target) if name.is_empty() => target.raw_name().to_string(),
            _ if name.is_empty() => tc.raw_id().to_string(),
            _ => name.to_string(),
        };
    }
    let Ok(params) = tc.params() else {
        return format!("<incomplete {}>", tc.kind());
    };
    match params {
        Params::Bound(0) => tc.kind().name().to_string(),
        Params::Bound(bound) => format!("{}<{bound}>", tc.kind().name()),
        Params::Fixed { digits, scale } => format!("fixed<{digits},{scale}>"),
        Params::Sequence { bound, .. } => {
            let element = tc
                .content_type()
                .map(|content| type_spec(&content))
                .unwrap_or_else(|_| "<recursive>".to_string());
            if *bound == 0 {
                format!("sequence<{element}>")
            } else {
                format!("sequence<{element}, {bound}>")
            }
        }
        Params::Array { .. } => {
            let (element, dims) = array_dims(tc);
            format!("{}{dims}", type_spec(&element))
        }
        _ => tc.kind().name().to_string(),
    }
}

/// `type name` with array dimensions moved after the name.
fn field(tc: &TypeCode, name: &str) -> String {
    if tc.kind() == TypeKind::Array {
        let (element, dims) = array_dims(tc);
        return format!("{} {name}{dims}", type_spec(&element));
    }
    format!("{} {name}", type_spec(tc))
}

fn array_dims(tc: &TypeCode) -> (TypeCode, String) {
    let mut dims = String::new();
    let mut current = tc.clone();
    while let Ok(Params::Array { length, content }) = current.params() {
        let _ = write!(dims, "[{length}]");
        let next = content.clone();
        current = next;
    }
    (current, dims)
}

fn label(bits: Option<u64>, discriminator: &TypeCode) -> String {
    let Some(bits) = bits else {
        return "?".to_string();
    };
    let kind = discriminator
        .resolve_alias_and_indirect()
        .map(|tc| tc.kind())
        .unwrap_or(TypeKind::Long);
    match kind {
        TypeKind::Short => (bits as u16 as i16).to_string(),
        TypeKind::Long => (bits as u32 as i32).to_string(),
        TypeKind::LongLong => (bits as i64).to_string(),
        TypeKind::Boolean => String::from(if bits != 0 { "TRUE" } else { "FALSE" }),
        TypeKind::Char | TypeKind::WChar => match char::from_u32(bits as u32) {
            Some(c) => format!("'{}'", c.escape_default()),
            None => bits.to_string(),
        },
        TypeKind::Enum => discriminator
            .member_name(bits as usize)
            .unwrap_or_else(|_| bits.to_string()),
        _ => bits.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{Orb, StructMember, TypeKind, UnionMember};

    #[test]
    fn test_struct_rendering() {
        let orb = Orb::default();
        let float = orb.primitive_tc(TypeKind::Float).unwrap();
        let point = orb.create_struct_tc(
            "IDL:Point:1.0",
            "Point",
            vec![
                StructMember::new("x", float.clone()),
                StructMember::new("y", float),
            ],
        );
        assert_eq!(
            point.to_string(),
            "struct Point {\n    float x;\n    float y;\n};"
        );

        let path = orb.create_struct_tc(
            "IDL:Path:1.0",
            "Path",
            vec![
                StructMember::new("points", orb.create_sequence_tc(0, point.clone())),
                StructMember::new(
                    "corners",
                    orb.create_array_tc(2, orb.create_array_tc(3, point)),
                ),
                StructMember::new("label", orb.create_string_tc(16)),
            ],
        );
        assert_eq!(
            path.to_string(),
            "struct Path {\n    sequence<Point> points;\n    Point corners[2][3];\n    string<16> label;\n};"
        );
    }

    #[test]
    fn test_union_and_enum_rendering() {
        let orb = Orb::default();
        let long = orb.primitive_tc(TypeKind::Long).unwrap();
        let mut one = orb.create_any();
        one.insert_long(-1);
        let tc = orb
            .create_union_tc(
                "IDL:U:1.0",
                "U",
                long.clone(),
                vec![
                    UnionMember::new("a", one, long),
                    UnionMember::default_case(&orb, "b", orb.create_string_tc(0)),
                ],
            )
            .unwrap();
        assert_eq!(
            tc.to_string(),
            "union U switch (long) {\n    case -1:\n        long a;\n    default:\n        string b;\n};"
        );

        let color = orb.create_enum_tc("IDL:Color:1.0", "Color", ["red", "green"]);
        assert_eq!(color.to_string(), "enum Color { red, green };");
    }

    #[test]
    fn test_recursive_rendering_is_finite() {
        let orb = Orb::default();
        let node = orb.create_struct_tc(
            "IDL:Node:1.0",
            "Node",
            vec![StructMember::new(
                "children",
                orb.create_recursive_sequence_tc(0, 1),
            )],
        );
        assert_eq!(node.to_string(), "struct Node {\n    sequence<Node> children;\n};");
    }

    #[test]
    fn test_alias_rendering() {
        let orb = Orb::default();
        let alias = orb.create_alias_tc("IDL:Money:1.0", "Money", orb.create_fixed_tc(10, 2));
        assert_eq!(alias.to_string(), "typedef fixed<10,2> Money;");
        let ulonglong = orb.primitive_tc(TypeKind::ULongLong).unwrap();
        assert_eq!(ulonglong.to_string(), "unsigned long long");
    }
}
