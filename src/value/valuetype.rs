// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Value type instances.
//!
//! Values travel as a value tag, an optional repository id and the state
//! members. Only unchunked values with at most one repository id are
//! handled. Applications register a [`ValueFactory`] per repository id to
//! receive typed instances; values without a factory are kept as
//! [`OpaqueValue`] holding their encoded state.

use std::any::Any as StdAny;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::core::{OrbError, Result};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};
use crate::typecode::{TypeCode, TypeKind};

/// Tag of a null value.
pub const NULL_VALUE_TAG: u32 = 0;

/// Tag of a value without type information.
pub const VALUE_TAG_NO_TYPE_INFO: u32 = 0x7FFF_FF00;

/// Tag of a value carrying a single repository id.
pub const VALUE_TAG_SINGLE_ID: u32 = 0x7FFF_FF02;

const VALUE_TAG_MASK: u32 = 0xFFFF_FF00;
const TYPE_INFO_BITS: u32 = 0x06;
const CODEBASE_BIT: u32 = 0x01;
const CHUNKED_BIT: u32 = 0x08;

/// A value type instance.
pub trait CorbaValue: fmt::Debug + Send + Sync {
    /// Repository id of the value's most-derived type.
    fn repository_id(&self) -> &str;

    /// Write the state members.
    fn marshal(&self, out: &mut CdrOutputStream) -> Result<()>;

    /// Value equality against another instance.
    fn value_eq(&self, other: &dyn CorbaValue) -> bool;

    /// Downcasting support.
    fn as_any(&self) -> &dyn StdAny;
}

/// Creates value instances from their encoded state.
pub trait ValueFactory: Send + Sync {
    /// Read the state members of a value of type `type_code`.
    fn read_value(
        &self,
        type_code: &TypeCode,
        input: &mut CdrInputStream,
    ) -> Result<Arc<dyn CorbaValue>>;
}

/// Value whose type has no registered factory.
#[derive(Clone)]
pub struct OpaqueValue {
    repository_id: String,
    type_code: TypeCode,
    state: CdrInputStream,
}

impl OpaqueValue {
    /// Capture the state of a value of type `type_code` from `input`.
    pub fn read(
        repository_id: impl Into<String>,
        type_code: &TypeCode,
        input: &mut CdrInputStream,
    ) -> Result<Self> {
        let mut state = CdrOutputStream::with_byte_order(input.orb(), input.is_little_endian())
            .with_giop_version(input.giop_version())
            .with_char_codeset(input.char_codeset());
        type_code.copy_value_state(input, &mut state)?;
        Ok(Self {
            repository_id: repository_id.into(),
            type_code: type_code.clone(),
            state: state.into_input_stream()?,
        })
    }

    /// Type of the captured state.
    pub fn type_code(&self) -> &TypeCode {
        &self.type_code
    }

    /// Encoded state members.
    pub fn state_bytes(&self) -> &[u8] {
        self.state.remaining_bytes()
    }
}

impl CorbaValue for OpaqueValue {
    fn repository_id(&self) -> &str {
        &self.repository_id
    }

    fn marshal(&self, out: &mut CdrOutputStream) -> Result<()> {
        let mut state = self.state.clone();
        self.type_code.copy_value_state(&mut state, out)
    }

    fn value_eq(&self, other: &dyn CorbaValue) -> bool {
        other
            .as_any()
            .downcast_ref::<OpaqueValue>()
            .is_some_and(|other| {
                self.repository_id == other.repository_id
                    && self.state.is_little_endian() == other.state.is_little_endian()
                    && self.state_bytes() == other.state_bytes()
            })
    }

    fn as_any(&self) -> &dyn StdAny {
        self
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("repository_id", &self.repository_id)
            .field("state", &hex::encode(self.state_bytes()))
            .finish()
    }
}

/// Decoded value header.
pub(crate) enum ValueHeader {
    Null,
    Instance { repository_id: Option<String> },
}

pub(crate) fn read_value_header(input: &mut CdrInputStream) -> Result<ValueHeader> {
    let position = input.position();
    let tag = input.read_ulong()?;
    if tag == NULL_VALUE_TAG {
        return Ok(ValueHeader::Null);
    }
    if tag & VALUE_TAG_MASK != VALUE_TAG_NO_TYPE_INFO {
        return Err(OrbError::unsupported(format!(
            "value tag {tag:#010x} at position {position}"
        )));
    }
    if tag & CHUNKED_BIT != 0 {
        return Err(OrbError::unsupported("chunked value encoding"));
    }
    if tag & CODEBASE_BIT != 0 {
        input.read_string()?;
    }
    let repository_id = match tag & TYPE_INFO_BITS {
        0 => None,
        0x02 => Some(input.read_string()?),
        _ => return Err(OrbError::unsupported("truncatable value repository ids")),
    };
    Ok(ValueHeader::Instance { repository_id })
}

pub(crate) fn write_value_header(out: &mut CdrOutputStream, repository_id: &str) -> Result<()> {
    out.write_ulong(VALUE_TAG_SINGLE_ID)?;
    out.write_string(repository_id)?;
    Ok(())
}

/// Write a (possibly null) value.
pub(crate) fn write_value(
    out: &mut CdrOutputStream,
    value: Option<&Arc<dyn CorbaValue>>,
) -> Result<()> {
    match value {
        None => {
            out.write_ulong(NULL_VALUE_TAG)?;
        }
        Some(value) => {
            write_value_header(out, value.repository_id())?;
            value.marshal(out)?;
        }
    }
    Ok(())
}

/// Read a (possibly null) value of type `type_code`.
pub(crate) fn read_value(
    input: &mut CdrInputStream,
    type_code: &TypeCode,
) -> Result<Option<Arc<dyn CorbaValue>>> {
    let repository_id = match read_value_header(input)? {
        ValueHeader::Null => return Ok(None),
        ValueHeader::Instance { repository_id } => match repository_id {
            Some(id) => id,
            None => type_code.id()?,
        },
    };
    let orb = input.orb().clone();
    let registered = orb
        .lookup_type_code(&repository_id)
        .filter(|tc| matches!(tc.kind(), TypeKind::Value | TypeKind::ValueBox));
    if let Some(factory) = orb.value_factory(&repository_id) {
        let actual = registered.as_ref().unwrap_or(type_code);
        return factory.read_value(actual, input).map(Some);
    }
    let actual = match registered {
        Some(tc) => tc,
        None if type_code.kind() != TypeKind::AbstractInterface => type_code.clone(),
        None => {
            return Err(OrbError::unsupported(format!(
                "value '{repository_id}' in abstract interface has no registered type"
            )))
        }
    };
    trace!(id = %repository_id, "no value factory; keeping opaque state");
    let value: Arc<dyn CorbaValue> = Arc::new(OpaqueValue::read(repository_id, &actual, input)?);
    Ok(Some(value))
}
