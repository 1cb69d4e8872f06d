// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-ORB TypeCode registry keyed by repository id.
//!
//! The registry is what recursive placeholders resolve against. Entries are
//! weak: registering a TypeCode never keeps it alive, and entries whose
//! TypeCode has been dropped are pruned lazily on lookup or eagerly via
//! [`TypeCodeRegistry::prune`].

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::typecode::{TypeCode, WeakTypeCode};

/// Thread-safe map from repository id to TypeCode.
///
/// Cloning yields another handle to the same map. Lookups and inserts may
/// interleave freely across threads. The first live TypeCode registered
/// under an id keeps it; a later registration only takes over an entry
/// whose TypeCode has been dropped.
#[derive(Clone, Default)]
pub struct TypeCodeRegistry {
    entries: Arc<DashMap<String, WeakTypeCode>>,
}

impl TypeCodeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `type_code` under `id` unless a live TypeCode already holds it.
    ///
    /// Returns `true` if `type_code` is the entry registered under `id`.
    pub fn register(&self, id: &str, type_code: &TypeCode) -> bool {
        if id.is_empty() {
            return false;
        }
        match self.entries.entry(id.to_string()) {
            Entry::Occupied(mut entry) => match entry.get().upgrade() {
                Some(live) => live.ptr_eq(type_code),
                None => {
                    debug!(id, "replacing dropped type code");
                    entry.insert(type_code.downgrade());
                    true
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(type_code.downgrade());
                true
            }
        }
    }

    /// Look up a live TypeCode by repository id.
    pub fn lookup(&self, id: &str) -> Option<TypeCode> {
        let found = self.entries.get(id).map(|entry| entry.upgrade());
        match found {
            Some(Some(type_code)) => Some(type_code),
            Some(None) => {
                self.entries.remove_if(id, |_, weak| weak.upgrade().is_none());
                None
            }
            None => None,
        }
    }

    /// Check if a live TypeCode is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    /// Remove the entry for `id`.
    pub fn remove(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drop entries whose TypeCode no longer exists. Returns the number removed.
    pub fn prune(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, weak| weak.upgrade().is_some());
        before - self.entries.len()
    }

    /// All registered ids, live or not yet pruned.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of entries, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for TypeCodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCodeRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
