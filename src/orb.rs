// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The ORB context.
//!
//! An [`Orb`] owns everything that would otherwise be process-global: the
//! configuration, the TypeCode registry, the primitive TypeCode singletons
//! and the value factories. It is the factory for TypeCodes, Anys and CDR
//! streams. Cloning an `Orb` is cheap and yields a handle to the same context.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::any::Any;
use crate::core::{OrbConfig, OrbError, Result, TypeCodeRegistry};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};
use crate::typecode::{Params, TypeCode, TypeKind, CORBA_OBJECT_ID};
use crate::value::ValueFactory;

struct OrbInner {
    config: OrbConfig,
    registry: TypeCodeRegistry,
    primitives: HashMap<TypeKind, TypeCode>,
    string: TypeCode,
    wstring: TypeCode,
    object: TypeCode,
    value_factories: DashMap<String, Arc<dyn ValueFactory>>,
}

/// Shared ORB context.
#[derive(Clone)]
pub struct Orb {
    inner: Arc<OrbInner>,
}

impl Orb {
    /// Create a context with the given configuration.
    pub fn new(config: OrbConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: OrbConfig) -> Self {
        let primitives = TypeKind::all()
            .iter()
            .copied()
            .filter(|kind| kind.is_empty())
            .map(|kind| (kind, TypeCode::primitive(kind)))
            .collect();
        let unbounded = |kind| {
            let tc = TypeCode::new_node(kind, false);
            tc.complete(Params::Bound(0));
            tc
        };
        let object = TypeCode::new_node(TypeKind::ObjRef, false);
        object.set_ident(CORBA_OBJECT_ID, "Object");
        object.complete(Params::Named);

        let registry = TypeCodeRegistry::new();
        registry.register(CORBA_OBJECT_ID, &object);
        Self {
            inner: Arc::new(OrbInner {
                config,
                registry,
                primitives,
                string: unbounded(TypeKind::String),
                wstring: unbounded(TypeKind::WString),
                object,
                value_factories: DashMap::new(),
            }),
        }
    }

    /// Configuration this context was created with.
    pub fn config(&self) -> &OrbConfig {
        &self.inner.config
    }

    /// Repository id registry.
    pub fn registry(&self) -> &TypeCodeRegistry {
        &self.inner.registry
    }

    /// Look up a registered TypeCode by repository id.
    pub fn lookup_type_code(&self, id: &str) -> Option<TypeCode> {
        self.inner.registry.lookup(id)
    }

    /// The shared TypeCode of a parameterless kind.
    ///
    /// Fails with `BadKind` for kinds that take parameters.
    pub fn primitive_tc(&self, kind: TypeKind) -> Result<TypeCode> {
        self.inner
            .primitives
            .get(&kind)
            .cloned()
            .ok_or_else(|| OrbError::bad_kind("primitive_tc", kind))
    }

    /// Primitive TypeCode for a kind known to be parameterless.
    pub(crate) fn empty_tc(&self, kind: TypeKind) -> TypeCode {
        match self.inner.primitives.get(&kind) {
            Some(tc) => tc.clone(),
            None => TypeCode::primitive(kind),
        }
    }

    /// Shared unbounded string (or wstring) TypeCode.
    pub(crate) fn unbounded_string_tc(&self, wide: bool) -> TypeCode {
        if wide {
            self.inner.wstring.clone()
        } else {
            self.inner.string.clone()
        }
    }

    /// Shared `CORBA::Object` TypeCode.
    pub(crate) fn object_tc(&self) -> TypeCode {
        self.inner.object.clone()
    }

    /// Create an Any bound to `tk_null`.
    pub fn create_any(&self) -> Any {
        Any::new(self)
    }

    /// Create an output stream using the configured byte order.
    pub fn create_output_stream(&self) -> CdrOutputStream {
        CdrOutputStream::new(self)
    }

    /// Create an input stream over `data` using the configured byte order.
    pub fn create_input_stream(&self, data: impl Into<Arc<[u8]>>) -> CdrInputStream {
        CdrInputStream::new(self, data, self.inner.config.little_endian)
    }

    /// Register the factory used to unmarshal values of repository id `id`.
    ///
    /// Returns the factory previously registered for that id, if any.
    pub fn register_value_factory(
        &self,
        id: impl Into<String>,
        factory: Arc<dyn ValueFactory>,
    ) -> Option<Arc<dyn ValueFactory>> {
        let id = id.into();
        debug!(id = %id, "registering value factory");
        self.inner.value_factories.insert(id, factory)
    }

    /// Remove the factory registered for `id`.
    pub fn unregister_value_factory(&self, id: &str) -> Option<Arc<dyn ValueFactory>> {
        self.inner.value_factories.remove(id).map(|(_, f)| f)
    }

    /// Factory registered for `id`.
    pub fn value_factory(&self, id: &str) -> Option<Arc<dyn ValueFactory>> {
        self.inner.value_factories.get(id).map(|f| Arc::clone(f.value()))
    }

    /// Whether both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Orb) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Orb {
    fn default() -> Self {
        Self::build(OrbConfig::default())
    }
}

impl std::fmt::Debug for Orb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orb")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .field("value_factories", &self.inner.value_factories.len())
            .finish()
    }
}
