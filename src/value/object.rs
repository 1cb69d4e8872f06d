// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Interoperable object references.
//!
//! An IOR is a repository id followed by a sequence of tagged profiles. The
//! profile bodies are opaque here; the transport layer interprets them.

use crate::core::Result;
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};
use crate::typecode::CORBA_OBJECT_ID;

/// Profile tag of an IIOP profile.
pub const TAG_INTERNET_IOP: u32 = 0;

/// Profile tag of a multiple-components profile.
pub const TAG_MULTIPLE_COMPONENTS: u32 = 1;

/// One tagged profile of an IOR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedProfile {
    /// Profile tag
    pub tag: u32,
    /// Encapsulated profile body
    pub data: Vec<u8>,
}

/// Object reference in IOR form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRef {
    type_id: String,
    profiles: Vec<TaggedProfile>,
}

impl ObjectRef {
    /// Create a reference of the given most-derived type.
    pub fn new(type_id: impl Into<String>, profiles: Vec<TaggedProfile>) -> Self {
        Self {
            type_id: type_id.into(),
            profiles,
        }
    }

    /// The nil reference.
    pub fn nil() -> Self {
        Self::default()
    }

    /// Whether this is the nil reference.
    pub fn is_nil(&self) -> bool {
        self.type_id.is_empty() && self.profiles.is_empty()
    }

    /// Repository id of the most-derived interface.
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Tagged profiles.
    pub fn profiles(&self) -> &[TaggedProfile] {
        &self.profiles
    }

    /// Whether this reference may be held where `id` is expected.
    ///
    /// Nil references are compatible with every interface, and every
    /// reference is compatible with `CORBA::Object`.
    pub fn is_compatible_with(&self, id: &str) -> bool {
        self.is_nil() || id == CORBA_OBJECT_ID || self.type_id == id
    }
}

impl CdrOutputStream {
    /// Write an object reference as an IOR.
    pub fn write_object(&mut self, object: &ObjectRef) -> Result<&mut Self> {
        self.write_string(&object.type_id)?;
        self.write_ulong(object.profiles.len() as u32)?;
        for profile in &object.profiles {
            self.write_ulong(profile.tag)?;
            self.write_octet_sequence(&profile.data)?;
        }
        Ok(self)
    }
}

impl CdrInputStream {
    /// Read an object reference in IOR form.
    pub fn read_object(&mut self) -> Result<ObjectRef> {
        let type_id = self.read_string()?;
        let count = self.read_sequence_length()?;
        let mut profiles = Vec::with_capacity(count.min(16) as usize);
        for _ in 0..count {
            let tag = self.read_ulong()?;
            let data = self.read_octet_sequence()?;
            profiles.push(TaggedProfile { tag, data });
        }
        Ok(ObjectRef { type_id, profiles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Orb;

    fn account() -> ObjectRef {
        ObjectRef::new(
            "IDL:Bank/Account:1.0",
            vec![TaggedProfile {
                tag: TAG_INTERNET_IOP,
                data: vec![0, 1, 2, 0, 9, 9],
            }],
        )
    }

    #[test]
    fn test_nil() {
        let nil = ObjectRef::nil();
        assert!(nil.is_nil());
        assert!(nil.is_compatible_with("IDL:Anything:1.0"));
        assert!(!account().is_nil());
    }

    #[test]
    fn test_compatibility() {
        let obj = account();
        assert!(obj.is_compatible_with("IDL:Bank/Account:1.0"));
        assert!(obj.is_compatible_with(CORBA_OBJECT_ID));
        assert!(!obj.is_compatible_with("IDL:Bank/Teller:1.0"));
    }

    #[test]
    fn test_ior_round_trip() {
        let orb = Orb::default();
        let mut out = orb.create_output_stream();
        out.write_object(&account()).unwrap();
        out.write_object(&ObjectRef::nil()).unwrap();

        let mut input = out.into_input_stream().unwrap();
        assert_eq!(input.read_object().unwrap(), account());
        assert!(input.read_object().unwrap().is_nil());
        assert!(input.is_at_end());
    }

    #[test]
    fn test_nil_encoding() {
        let orb = Orb::default();
        let mut out = orb.create_output_stream();
        out.write_object(&ObjectRef::nil()).unwrap();
        // empty type id (length 1, NUL, padding) and zero profiles
        assert_eq!(out.data(), &[0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
}
