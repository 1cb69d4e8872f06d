// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Runtime type descriptions.
//!
//! A [`TypeCode`] describes an IDL type: a primitive, a constructed type
//! (struct, union, enum, exception, value type), a template type (string,
//! sequence, array, fixed) or a named reference (objref, alias, native). Type
//! graphs may be recursive. Children are held strongly, every back-edge is
//! weak:
//!
//! - an `Indirect` TypeCode points at its target through a weak reference,
//!   resolved lazily against the ORB registry when the target is not known
//!   yet;
//! - struct, union and value members record their enclosing TypeCode as a
//!   weak parent, which is how recursive sequences find their content type.
//!
//! TypeCodes are immutable after construction apart from write-once lazy
//! state and the output-byte cache.

mod compare;
mod copy;
mod display;
mod factory;
pub mod kind;
mod marshal;
mod scalar;

pub(crate) use copy::check_bound;
pub use kind::{ParamCategory, TypeKind, INDIRECT_TAG, KIND_COUNT};

pub(crate) use scalar::{
    bits_to_char, is_scalar, read_discriminator, read_scalar, write_discriminator, write_scalar,
};

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::any::Any;
use crate::core::{CharCodeSet, GiopVersion, OrbError, Result, TypeCodeRegistry};
use crate::Orb;

/// Repository id of `CORBA::Object`, compatible with every interface.
pub const CORBA_OBJECT_ID: &str = "IDL:omg.org/CORBA/Object:1.0";

/// Longest chain of indirections followed before giving up.
const MAX_INDIRECTION_CHAIN: usize = 64;

// ============================================================================
// Members
// ============================================================================

/// Member of a struct or exception.
#[derive(Debug, Clone)]
pub struct StructMember {
    /// Member name
    pub name: String,
    /// Member type
    pub type_code: TypeCode,
}

impl StructMember {
    /// Create a struct member.
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
        }
    }
}

/// Branch of a union.
#[derive(Debug, Clone)]
pub struct UnionMember {
    /// Member name
    pub name: String,
    /// Case label; an octet `0` marks the default branch
    pub label: Any,
    /// Member type
    pub type_code: TypeCode,
}

impl UnionMember {
    /// Create a union branch selected by `label`.
    pub fn new(name: impl Into<String>, label: Any, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            label,
            type_code,
        }
    }

    /// Create the default branch.
    pub fn default_case(orb: &Orb, name: impl Into<String>, type_code: TypeCode) -> Self {
        let mut label = orb.create_any();
        label.insert_octet(0);
        Self::new(name, label, type_code)
    }

    /// Whether the label is the default marker.
    pub fn is_default(&self) -> bool {
        self.label.kind() == TypeKind::Octet && self.label.scalar_bits() == Some(0)
    }
}

/// Visibility of a value type state member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum Visibility {
    /// `private` state member
    Private = 0,
    /// `public` state member
    Public = 1,
}

impl Visibility {
    /// Decode a wire visibility.
    pub fn from_code(code: i16) -> Result<Self> {
        match code {
            0 => Ok(Visibility::Private),
            1 => Ok(Visibility::Public),
            other => Err(OrbError::marshal(
                "value member",
                format!("invalid visibility {other}"),
            )),
        }
    }

    /// Wire code.
    pub fn code(self) -> i16 {
        self as i16
    }
}

/// State member of a value type.
#[derive(Debug, Clone)]
pub struct ValueMember {
    /// Member name
    pub name: String,
    /// Member type
    pub type_code: TypeCode,
    /// Member visibility
    pub visibility: Visibility,
}

impl ValueMember {
    /// Create a value type member.
    pub fn new(name: impl Into<String>, type_code: TypeCode, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            type_code,
            visibility,
        }
    }
}

// ============================================================================
// Node
// ============================================================================

struct Ident {
    id: String,
    name: String,
}

/// Content type of a sequence.
pub(crate) enum Content {
    Direct(TypeCode),
    /// Recursive reference to the enclosing type `offset` levels up
    Recursive {
        offset: u32,
        resolved: OnceLock<TypeCode>,
    },
}

pub(crate) struct IndirectSlot {
    target: OnceLock<WeakTypeCode>,
    registry: Option<TypeCodeRegistry>,
}

/// Kind-specific parameters.
pub(crate) enum Params {
    Empty,
    /// string, wstring
    Bound(u32),
    Fixed {
        digits: u16,
        scale: i16,
    },
    /// objref, native, abstract interface
    Named,
    /// struct, except
    Members(Vec<StructMember>),
    Union {
        discriminator: TypeCode,
        default_index: i32,
        members: Vec<UnionMember>,
    },
    Enum(Vec<String>),
    Sequence {
        bound: u32,
        content: Content,
    },
    Array {
        length: u32,
        content: TypeCode,
    },
    /// alias, valuebox
    Content(TypeCode),
    Value {
        type_modifier: i16,
        concrete_base: Option<TypeCode>,
        members: Vec<ValueMember>,
    },
    Indirect(IndirectSlot),
}

/// Key of a cached encoding: the stream settings the bytes depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EncodingKey {
    pub little_endian: bool,
    pub giop_version: GiopVersion,
    pub char_codeset: CharCodeSet,
}

struct CachedEncoding {
    key: EncodingKey,
    bytes: Arc<[u8]>,
}

#[derive(Default)]
struct OutputCache {
    enabled: bool,
    encoded: Option<CachedEncoding>,
}

struct TypeCodeNode {
    kind: TypeKind,
    ident: OnceLock<Ident>,
    params: OnceLock<Params>,
    parent: OnceLock<Weak<TypeCodeNode>>,
    cache: Mutex<OutputCache>,
}

/// Shared, immutable description of an IDL type.
///
/// Cloning a `TypeCode` is cheap and yields another handle to the same node.
#[derive(Clone)]
pub struct TypeCode(Arc<TypeCodeNode>);

/// Non-owning handle to a [`TypeCode`].
#[derive(Clone, Default)]
pub struct WeakTypeCode(Weak<TypeCodeNode>);

impl WeakTypeCode {
    /// Upgrade to a strong handle if the TypeCode is still alive.
    pub fn upgrade(&self) -> Option<TypeCode> {
        self.0.upgrade().map(TypeCode)
    }
}

impl TypeCode {
    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    pub(crate) fn new_node(kind: TypeKind, caching: bool) -> Self {
        TypeCode(Arc::new(TypeCodeNode {
            kind,
            ident: OnceLock::new(),
            params: OnceLock::new(),
            parent: OnceLock::new(),
            cache: Mutex::new(OutputCache {
                enabled: caching,
                encoded: None,
            }),
        }))
    }

    pub(crate) fn primitive(kind: TypeKind) -> Self {
        let tc = Self::new_node(kind, false);
        tc.complete(Params::Empty);
        tc
    }

    pub(crate) fn set_ident(&self, id: impl Into<String>, name: impl Into<String>) {
        let _ = self.0.ident.set(Ident {
            id: id.into(),
            name: name.into(),
        });
    }

    /// Install the parameters and adopt the member types as children.
    pub(crate) fn complete(&self, params: Params) {
        let children: Vec<&TypeCode> = match &params {
            Params::Members(members) => members.iter().map(|m| &m.type_code).collect(),
            Params::Union { members, .. } => members.iter().map(|m| &m.type_code).collect(),
            Params::Value { members, .. } => members.iter().map(|m| &m.type_code).collect(),
            _ => Vec::new(),
        };
        for child in children {
            if !child.kind().is_empty() {
                let _ = child.0.parent.set(Arc::downgrade(&self.0));
            }
        }
        let _ = self.0.params.set(params);
    }

    pub(crate) fn new_indirect(
        id: impl Into<String>,
        target: Option<&TypeCode>,
        registry: Option<TypeCodeRegistry>,
    ) -> Self {
        let slot = IndirectSlot {
            target: OnceLock::new(),
            registry,
        };
        if let Some(target) = target {
            let _ = slot.target.set(target.downgrade());
        }
        let tc = Self::new_node(TypeKind::Indirect, false);
        tc.set_ident(id, "");
        tc.complete(Params::Indirect(slot));
        tc
    }

    pub(crate) fn params(&self) -> Result<&Params> {
        self.0.params.get().ok_or_else(|| {
            OrbError::bad_typecode(format!("{} type code is incomplete", self.0.kind))
        })
    }

    /// Repository id as stored on this node, empty when the kind has none.
    pub(crate) fn raw_id(&self) -> &str {
        self.0.ident.get().map(|i| i.id.as_str()).unwrap_or("")
    }

    /// Simple name as stored on this node, empty when the kind has none.
    pub(crate) fn raw_name(&self) -> &str {
        self.0.ident.get().map(|i| i.name.as_str()).unwrap_or("")
    }

    /// Whether the parameters have been installed.
    pub(crate) fn is_complete(&self) -> bool {
        self.0.params.get().is_some()
    }

    fn parent(&self) -> Option<TypeCode> {
        self.0.parent.get().and_then(Weak::upgrade).map(TypeCode)
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    /// Kind of this TypeCode. `Indirect` until resolved.
    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    /// Whether this is an indirection or recursive placeholder.
    #[inline]
    pub fn is_indirect(&self) -> bool {
        self.0.kind == TypeKind::Indirect
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &TypeCode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Create a non-owning handle.
    pub fn downgrade(&self) -> WeakTypeCode {
        WeakTypeCode(Arc::downgrade(&self.0))
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Follow indirections to the target TypeCode.
    ///
    /// Returns `None` while the target is not available yet. A non-indirect
    /// TypeCode resolves to itself.
    pub fn try_resolve(&self) -> Option<TypeCode> {
        let mut current = self.clone();
        for _ in 0..MAX_INDIRECTION_CHAIN {
            let slot = match current.0.params.get() {
                Some(Params::Indirect(slot)) => slot,
                _ => return Some(current),
            };
            let next = match slot.target.get().and_then(WeakTypeCode::upgrade) {
                Some(target) => target,
                None => {
                    let id = current.raw_id();
                    let found = slot
                        .registry
                        .as_ref()
                        .and_then(|registry| registry.lookup(id))
                        .filter(|found| !found.ptr_eq(&current));
                    match found {
                        Some(found) => {
                            let _ = slot.target.set(found.downgrade());
                            found
                        }
                        None => {
                            debug!(id, "recursive type code not resolvable yet");
                            return None;
                        }
                    }
                }
            };
            current = next;
        }
        None
    }

    /// Follow indirections, failing with `BadTypeCode` if the target is missing.
    pub fn resolve(&self) -> Result<TypeCode> {
        self.try_resolve().ok_or_else(|| {
            OrbError::bad_typecode(format!(
                "unresolved recursive type code '{}'",
                self.raw_id()
            ))
        })
    }

    /// Resolve indirections and strip aliases down to the underlying type.
    pub fn resolve_alias_and_indirect(&self) -> Result<TypeCode> {
        let mut current = self.resolve()?;
        for _ in 0..MAX_INDIRECTION_CHAIN {
            match current.params()? {
                Params::Content(content) if current.kind() == TypeKind::Alias => {
                    current = content.resolve()?;
                }
                _ => return Ok(current),
            }
        }
        Err(OrbError::bad_typecode("alias chain too long"))
    }

    fn target(&self) -> Result<TypeCode> {
        if self.is_indirect() {
            self.resolve()
        } else {
            Ok(self.clone())
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Repository id.
    pub fn id(&self) -> Result<String> {
        if self.is_indirect() {
            return Ok(self.raw_id().to_string());
        }
        if !self.kind().has_id() {
            return Err(OrbError::bad_kind("id", self.kind()));
        }
        Ok(self.raw_id().to_string())
    }

    /// Simple name.
    pub fn name(&self) -> Result<String> {
        let tc = self.target()?;
        if !tc.kind().has_id() {
            return Err(OrbError::bad_kind("name", tc.kind()));
        }
        Ok(tc.raw_name().to_string())
    }

    /// Number of members (or enumerators).
    pub fn member_count(&self) -> Result<usize> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Members(members) => Ok(members.len()),
            Params::Union { members, .. } => Ok(members.len()),
            Params::Value { members, .. } => Ok(members.len()),
            Params::Enum(names) => Ok(names.len()),
            _ => Err(OrbError::bad_kind("member_count", tc.kind())),
        }
    }

    /// Name of member `index`.
    pub fn member_name(&self, index: usize) -> Result<String> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Members(members) => pick(members, index).map(|m| m.name.clone()),
            Params::Union { members, .. } => pick(members, index).map(|m| m.name.clone()),
            Params::Value { members, .. } => pick(members, index).map(|m| m.name.clone()),
            Params::Enum(names) => pick(names, index).cloned(),
            _ => Err(OrbError::bad_kind("member_name", tc.kind())),
        }
    }

    /// Type of member `index`.
    pub fn member_type(&self, index: usize) -> Result<TypeCode> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Members(members) => pick(members, index).map(|m| m.type_code.clone()),
            Params::Union { members, .. } => pick(members, index).map(|m| m.type_code.clone()),
            Params::Value { members, .. } => pick(members, index).map(|m| m.type_code.clone()),
            _ => Err(OrbError::bad_kind("member_type", tc.kind())),
        }
    }

    /// Case label of union member `index`.
    pub fn member_label(&self, index: usize) -> Result<Any> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Union { members, .. } => pick(members, index).map(|m| m.label.clone()),
            _ => Err(OrbError::bad_kind("member_label", tc.kind())),
        }
    }

    /// Visibility of value member `index`.
    pub fn member_visibility(&self, index: usize) -> Result<Visibility> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Value { members, .. } => pick(members, index).map(|m| m.visibility),
            _ => Err(OrbError::bad_kind("member_visibility", tc.kind())),
        }
    }

    /// Discriminator type of a union.
    pub fn discriminator_type(&self) -> Result<TypeCode> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Union { discriminator, .. } => Ok(discriminator.clone()),
            _ => Err(OrbError::bad_kind("discriminator_type", tc.kind())),
        }
    }

    /// Index of the default branch of a union, or -1.
    pub fn default_index(&self) -> Result<i32> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Union { default_index, .. } => Ok(*default_index),
            _ => Err(OrbError::bad_kind("default_index", tc.kind())),
        }
    }

    /// Bound of a string, wstring or sequence (0 when unbounded), or the
    /// length of an array.
    pub fn length(&self) -> Result<u32> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Bound(bound) => Ok(*bound),
            Params::Sequence { bound, .. } => Ok(*bound),
            Params::Array { length, .. } => Ok(*length),
            _ => Err(OrbError::bad_kind("length", tc.kind())),
        }
    }

    /// Element type of a sequence or array, or aliased type of an alias or
    /// value box.
    ///
    /// For a recursive sequence this is an indirection to the enclosing type
    /// found by walking up the parent chain.
    pub fn content_type(&self) -> Result<TypeCode> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Sequence { content, .. } => tc.sequence_content(content),
            Params::Array { content, .. } => Ok(content.clone()),
            Params::Content(content) => Ok(content.clone()),
            _ => Err(OrbError::bad_kind("content_type", tc.kind())),
        }
    }

    fn sequence_content(&self, content: &Content) -> Result<TypeCode> {
        let (offset, resolved) = match content {
            Content::Direct(tc) => return Ok(tc.clone()),
            Content::Recursive { offset, resolved } => (*offset, resolved),
        };
        if let Some(tc) = resolved.get() {
            return Ok(tc.clone());
        }
        let mut enclosing = self.parent();
        for _ in 1..offset {
            enclosing = enclosing.and_then(|p| p.parent());
        }
        let enclosing = enclosing.ok_or_else(|| {
            OrbError::bad_typecode(format!(
                "recursive sequence has no enclosing type {offset} level(s) up"
            ))
        })?;
        let indirect = TypeCode::new_indirect(enclosing.raw_id(), Some(&enclosing), None);
        Ok(resolved.get_or_init(|| indirect).clone())
    }

    /// Number of digits of a fixed type.
    pub fn fixed_digits(&self) -> Result<u16> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Fixed { digits, .. } => Ok(*digits),
            _ => Err(OrbError::bad_kind("fixed_digits", tc.kind())),
        }
    }

    /// Scale of a fixed type.
    pub fn fixed_scale(&self) -> Result<i16> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Fixed { scale, .. } => Ok(*scale),
            _ => Err(OrbError::bad_kind("fixed_scale", tc.kind())),
        }
    }

    /// Value type modifier.
    pub fn type_modifier(&self) -> Result<i16> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Value { type_modifier, .. } => Ok(*type_modifier),
            _ => Err(OrbError::bad_kind("type_modifier", tc.kind())),
        }
    }

    /// Concrete base of a value type, if any.
    pub fn concrete_base_type(&self) -> Result<Option<TypeCode>> {
        let tc = self.target()?;
        match tc.params()? {
            Params::Value { concrete_base, .. } => Ok(concrete_base.clone()),
            _ => Err(OrbError::bad_kind("concrete_base_type", tc.kind())),
        }
    }

    /// Index of the union branch selected by `discriminator`.
    ///
    /// Scans the non-default labels, then falls back to the default branch.
    /// Returns -1 when no branch applies.
    pub fn current_union_member_index(&self, discriminator: &Any) -> Result<i32> {
        let tc = self.target()?;
        let (default_index, members) = match tc.params()? {
            Params::Union {
                default_index,
                members,
                ..
            } => (*default_index, members),
            _ => return Err(OrbError::bad_kind("current_union_member_index", tc.kind())),
        };
        let value = discriminator.scalar_bits().ok_or_else(|| {
            OrbError::bad_operation("current_union_member_index", "discriminator holds no value")
        })?;
        let selected = members
            .iter()
            .enumerate()
            .filter(|(i, _)| *i as i32 != default_index)
            .find(|(_, m)| m.label.scalar_bits() == Some(value))
            .map(|(i, _)| i as i32);
        Ok(selected.unwrap_or(default_index))
    }

    // ------------------------------------------------------------------------
    // Output cache
    // ------------------------------------------------------------------------

    /// Enable or disable the output-byte cache. Disabling clears it.
    pub fn set_caching(&self, enabled: bool) {
        let mut cache = self.0.cache.lock();
        cache.enabled = enabled;
        if !enabled {
            cache.encoded = None;
        }
    }

    /// Whether the output-byte cache is enabled.
    pub fn is_caching(&self) -> bool {
        self.0.cache.lock().enabled
    }

    /// Whether an encoding is currently cached.
    pub fn has_cached_encoding(&self) -> bool {
        self.0.cache.lock().encoded.is_some()
    }

    pub(crate) fn cached_encoding(&self, key: EncodingKey) -> Option<Arc<[u8]>> {
        let cache = self.0.cache.lock();
        match &cache.encoded {
            Some(entry) if cache.enabled && entry.key == key => Some(Arc::clone(&entry.bytes)),
            _ => None,
        }
    }

    pub(crate) fn store_encoding(&self, key: EncodingKey, bytes: &[u8]) {
        let mut cache = self.0.cache.lock();
        if cache.enabled {
            cache.encoded = Some(CachedEncoding {
                key,
                bytes: Arc::from(bytes),
            });
        }
    }
}

fn pick<T>(items: &[T], index: usize) -> Result<&T> {
    items
        .get(index)
        .ok_or_else(|| OrbError::bounds(index, items.len()))
}

impl std::fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("TypeCode");
        s.field("kind", &self.kind());
        if self.0.ident.get().is_some() {
            s.field("id", &self.raw_id());
        }
        s.finish()
    }
}

impl std::fmt::Debug for WeakTypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(tc) => write!(f, "WeakTypeCode({tc:?})"),
            None => f.write_str("WeakTypeCode(<dropped>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(orb: &Orb) -> TypeCode {
        orb.primitive_tc(TypeKind::Long).unwrap()
    }

    #[test]
    fn test_struct_accessors() {
        let orb = Orb::default();
        let tc = orb.create_struct_tc(
            "IDL:Pair:1.0",
            "Pair",
            vec![
                StructMember::new("first", long(&orb)),
                StructMember::new("second", orb.create_string_tc(8)),
            ],
        );
        assert_eq!(tc.kind(), TypeKind::Struct);
        assert_eq!(tc.id().unwrap(), "IDL:Pair:1.0");
        assert_eq!(tc.name().unwrap(), "Pair");
        assert_eq!(tc.member_count().unwrap(), 2);
        assert_eq!(tc.member_name(1).unwrap(), "second");
        assert_eq!(tc.member_type(1).unwrap().length().unwrap(), 8);
    }

    #[test]
    fn test_accessor_errors() {
        let orb = Orb::default();
        let tc = orb.create_enum_tc("IDL:E:1.0", "E", ["a"]);

        assert!(matches!(tc.member_type(0), Err(OrbError::BadKind { .. })));
        assert!(matches!(
            tc.member_name(3),
            Err(OrbError::Bounds { index: 3, count: 1 })
        ));
        assert!(matches!(long(&orb).id(), Err(OrbError::BadKind { .. })));
        assert!(matches!(long(&orb).length(), Err(OrbError::BadKind { .. })));
    }

    #[test]
    fn test_objref_id() {
        let orb = Orb::default();
        let tc = orb.create_interface_tc("IDL:Account:1.0", "Account");
        assert_eq!(tc.id().unwrap(), "IDL:Account:1.0");
        assert!(tc.member_count().is_err());
    }

    #[test]
    fn test_members_record_parent() {
        let orb = Orb::default();
        let inner = orb.create_sequence_tc(0, long(&orb));
        let outer = orb.create_struct_tc(
            "IDL:Holder:1.0",
            "Holder",
            vec![StructMember::new("items", inner.clone())],
        );
        assert!(inner.parent().unwrap().ptr_eq(&outer));
        assert!(long(&orb).parent().is_none());
    }

    #[test]
    fn test_recursive_sequence_content() {
        let orb = Orb::default();
        let children = orb.create_recursive_sequence_tc(0, 1);
        assert!(matches!(
            children.content_type(),
            Err(OrbError::BadTypeCode { .. })
        ));

        let node = orb.create_struct_tc(
            "IDL:Node:1.0",
            "Node",
            vec![
                StructMember::new("value", long(&orb)),
                StructMember::new("children", children.clone()),
            ],
        );
        let content = children.content_type().unwrap();
        assert!(content.is_indirect());
        assert_eq!(content.id().unwrap(), "IDL:Node:1.0");
        assert!(content.resolve().unwrap().ptr_eq(&node));
        assert!(children.content_type().unwrap().ptr_eq(&content));
    }

    #[test]
    fn test_placeholder_resolves_through_registry() {
        let orb = Orb::default();
        let placeholder = orb.create_recursive_tc("IDL:Later:1.0");
        assert!(placeholder.try_resolve().is_none());
        assert!(matches!(
            placeholder.member_count(),
            Err(OrbError::BadTypeCode { .. })
        ));

        let real = orb.create_struct_tc(
            "IDL:Later:1.0",
            "Later",
            vec![StructMember::new("x", long(&orb))],
        );
        assert!(placeholder.resolve().unwrap().ptr_eq(&real));
        assert_eq!(placeholder.kind(), TypeKind::Indirect);
        assert_eq!(placeholder.member_count().unwrap(), 1);
        assert_eq!(placeholder.name().unwrap(), "Later");
    }

    #[test]
    fn test_resolve_alias_and_indirect() {
        let orb = Orb::default();
        let inner = orb.create_alias_tc("IDL:A:1.0", "A", long(&orb));
        let outer = orb.create_alias_tc("IDL:B:1.0", "B", inner);
        let stripped = outer.resolve_alias_and_indirect().unwrap();
        assert_eq!(stripped.kind(), TypeKind::Long);
    }

    #[test]
    fn test_union_member_index() {
        let orb = Orb::default();
        let mut one = orb.create_any();
        one.insert_long(1);
        let tc = orb
            .create_union_tc(
                "IDL:U:1.0",
                "U",
                long(&orb),
                vec![
                    UnionMember::new("a", one, long(&orb)),
                    UnionMember::default_case(&orb, "other", orb.create_string_tc(0)),
                ],
            )
            .unwrap();
        assert_eq!(tc.default_index().unwrap(), 1);

        let mut disc = orb.create_any();
        disc.insert_long(1);
        assert_eq!(tc.current_union_member_index(&disc).unwrap(), 0);
        disc.insert_long(99);
        assert_eq!(tc.current_union_member_index(&disc).unwrap(), 1);
    }

    #[test]
    fn test_caching_flag() {
        let orb = Orb::default();
        let tc = orb.create_interface_tc("IDL:C:1.0", "C");
        assert!(!tc.is_caching());
        tc.set_caching(true);
        let key = EncodingKey {
            little_endian: false,
            giop_version: GiopVersion::V1_2,
            char_codeset: CharCodeSet::Iso8859_1,
        };
        tc.store_encoding(key, &[1, 2, 3]);
        assert_eq!(tc.cached_encoding(key).as_deref(), Some(&[1u8, 2, 3][..]));
        assert!(tc
            .cached_encoding(EncodingKey {
                little_endian: true,
                ..key
            })
            .is_none());

        tc.set_caching(false);
        assert!(!tc.has_cached_encoding());
    }

    #[test]
    fn test_visibility_codes() {
        assert_eq!(Visibility::from_code(1).unwrap(), Visibility::Public);
        assert_eq!(Visibility::Private.code(), 0);
        assert!(Visibility::from_code(2).is_err());
    }
}
