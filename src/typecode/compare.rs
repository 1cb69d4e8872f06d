// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TypeCode equality and equivalence.

use super::{Params, TypeCode, TypeKind, CORBA_OBJECT_ID};
use crate::core::{OrbError, Result};

/// Nesting limit for structural equivalence.
const MAX_COMPARE_DEPTH: usize = 256;

impl TypeCode {
    /// Structural equality.
    ///
    /// Aliases are significant: an alias is never equal to the type it names.
    /// An indirection on either side compares repository ids only. Member
    /// names never take part.
    pub fn equal(&self, other: &TypeCode) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.is_indirect() || other.is_indirect() {
            return self.raw_id() == other.raw_id();
        }
        if self.kind() != other.kind() {
            return false;
        }
        let (Ok(a), Ok(b)) = (self.params(), other.params()) else {
            return false;
        };
        let same_id = || self.raw_id() == other.raw_id();

        match (a, b) {
            (Params::Empty, Params::Empty) => true,
            (Params::Bound(x), Params::Bound(y)) => x == y,
            (
                Params::Fixed {
                    digits: d1,
                    scale: s1,
                },
                Params::Fixed {
                    digits: d2,
                    scale: s2,
                },
            ) => d1 == d2 && s1 == s2,
            (Params::Named, Params::Named) => {
                same_id()
                    || (self.kind() == TypeKind::ObjRef
                        && (self.raw_id() == CORBA_OBJECT_ID || other.raw_id() == CORBA_OBJECT_ID))
            }
            (Params::Members(x), Params::Members(y)) => {
                x.len() == y.len()
                    && same_id()
                    && x.iter().zip(y).all(|(m, n)| m.type_code.equal(&n.type_code))
            }
            (
                Params::Union {
                    discriminator: d1,
                    default_index: i1,
                    members: x,
                },
                Params::Union {
                    discriminator: d2,
                    default_index: i2,
                    members: y,
                },
            ) => {
                x.len() == y.len()
                    && same_id()
                    && i1 == i2
                    && d1.equal(d2)
                    && x.iter().zip(y).all(|(m, n)| {
                        m.label.equal(&n.label).unwrap_or(false)
                            && m.type_code.equal(&n.type_code)
                    })
            }
            (Params::Enum(x), Params::Enum(y)) => same_id() && x.len() == y.len(),
            (Params::Sequence { bound: b1, .. }, Params::Sequence { bound: b2, .. }) => {
                b1 == b2 && contents_equal(self, other)
            }
            (Params::Array { length: l1, .. }, Params::Array { length: l2, .. }) => {
                l1 == l2 && contents_equal(self, other)
            }
            (Params::Content(c1), Params::Content(c2)) => same_id() && c1.equal(c2),
            (
                Params::Value {
                    type_modifier: t1,
                    concrete_base: b1,
                    members: x,
                },
                Params::Value {
                    type_modifier: t2,
                    concrete_base: b2,
                    members: y,
                },
            ) => {
                x.len() == y.len()
                    && same_id()
                    && x.iter().zip(y).all(|(m, n)| {
                        m.visibility == n.visibility && m.type_code.equal(&n.type_code)
                    })
                    && t1 == t2
                    && match (b1, b2) {
                        (None, None) => true,
                        (Some(p), Some(q)) => p.equal(q),
                        _ => false,
                    }
            }
            _ => false,
        }
    }

    /// Equivalence: equality after resolving indirections and stripping
    /// aliases, where two non-empty repository ids decide on their own.
    pub fn equivalent(&self, other: &TypeCode) -> Result<bool> {
        equivalent_at(self, other, 0)
    }
}

impl PartialEq for TypeCode {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

fn contents_equal(a: &TypeCode, b: &TypeCode) -> bool {
    match (a.content_type(), b.content_type()) {
        (Ok(x), Ok(y)) => x.equal(&y),
        _ => false,
    }
}

fn equivalent_at(a: &TypeCode, b: &TypeCode, depth: usize) -> Result<bool> {
    if depth > MAX_COMPARE_DEPTH {
        return Err(OrbError::bad_typecode("type nesting too deep to compare"));
    }
    let a = a.resolve_alias_and_indirect()?;
    let b = b.resolve_alias_and_indirect()?;
    if a.ptr_eq(&b) {
        return Ok(true);
    }
    if a.kind() != b.kind() {
        return Ok(false);
    }
    if a.kind().has_id() && !a.raw_id().is_empty() && !b.raw_id().is_empty() {
        return Ok(a.raw_id() == b.raw_id());
    }
    let next = depth + 1;

    let (pa, pb) = (a.params()?, b.params()?);
    Ok(match (pa, pb) {
        (Params::Empty, Params::Empty) | (Params::Named, Params::Named) => true,
        (Params::Bound(x), Params::Bound(y)) => x == y,
        (
            Params::Fixed {
                digits: d1,
                scale: s1,
            },
            Params::Fixed {
                digits: d2,
                scale: s2,
            },
        ) => d1 == d2 && s1 == s2,
        (Params::Members(x), Params::Members(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (m, n) in x.iter().zip(y) {
                if !equivalent_at(&m.type_code, &n.type_code, next)? {
                    return Ok(false);
                }
            }
            true
        }
        (
            Params::Union {
                discriminator: d1,
                default_index: i1,
                members: x,
            },
            Params::Union {
                discriminator: d2,
                default_index: i2,
                members: y,
            },
        ) => {
            if x.len() != y.len() || i1 != i2 || !equivalent_at(d1, d2, next)? {
                return Ok(false);
            }
            for (m, n) in x.iter().zip(y) {
                if m.label.scalar_bits() != n.label.scalar_bits()
                    || !equivalent_at(&m.type_code, &n.type_code, next)?
                {
                    return Ok(false);
                }
            }
            true
        }
        (Params::Enum(x), Params::Enum(y)) => x.len() == y.len(),
        (Params::Sequence { bound: b1, .. }, Params::Sequence { bound: b2, .. }) => {
            b1 == b2 && equivalent_at(&a.content_type()?, &b.content_type()?, next)?
        }
        (Params::Array { length: l1, .. }, Params::Array { length: l2, .. }) => {
            l1 == l2 && equivalent_at(&a.content_type()?, &b.content_type()?, next)?
        }
        (Params::Content(c1), Params::Content(c2)) => equivalent_at(c1, c2, next)?,
        (
            Params::Value {
                type_modifier: t1,
                concrete_base: b1,
                members: x,
            },
            Params::Value {
                type_modifier: t2,
                concrete_base: b2,
                members: y,
            },
        ) => {
            if x.len() != y.len() || t1 != t2 {
                return Ok(false);
            }
            for (m, n) in x.iter().zip(y) {
                if m.visibility != n.visibility
                    || !equivalent_at(&m.type_code, &n.type_code, next)?
                {
                    return Ok(false);
                }
            }
            match (b1, b2) {
                (None, None) => true,
                (Some(p), Some(q)) => equivalent_at(p, q, next)?,
                _ => false,
            }
        }
        _ => false,
    })
}
