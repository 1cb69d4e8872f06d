// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # orbcodec
//!
//! CORBA TypeCodes and Anys over CDR streams.
//!
//! This library provides the self-describing value layer of a CORBA ORB:
//! - **TypeCodes** in [`typecode`]: construction, accessors, equality and
//!   equivalence, recursive types, and the wire encoding with indirections
//! - **Anys** in [`any`]: typed insertion and extraction, marshaling, and
//!   type-driven copy and comparison of encoded values
//! - **CDR streams** in [`encoding::cdr`]: aligned primitives, strings in
//!   both code sets, encapsulations
//! - **Values** in [`value`]: fixed-point decimals, object references and
//!   value type instances
//!
//! ## Architecture
//!
//! There is no process-wide state. An [`Orb`] owns the configuration, the
//! repository id registry and the primitive TypeCodes, and creates every
//! TypeCode, Any and stream.
//!
//! ## Example: Marshaling a struct
//!
//! ```rust
//! # fn main() -> orbcodec::Result<()> {
//! use orbcodec::{Orb, StructMember, TypeKind};
//!
//! let orb = Orb::default();
//! let float = orb.primitive_tc(TypeKind::Float)?;
//! let point = orb.create_struct_tc(
//!     "IDL:Point:1.0",
//!     "Point",
//!     vec![StructMember::new("x", float.clone()), StructMember::new("y", float)],
//! );
//!
//! let mut any = orb.create_any();
//! let mut out = any.create_output_stream();
//! out.write_float(1.5)?;
//! out.write_float(-2.25)?;
//! any.read_value_from_output(out, &point)?;
//!
//! let mut wire = orb.create_output_stream();
//! wire.write_any(&any)?;
//! let decoded = orb.create_input_stream(wire.finish()?).read_any()?;
//! assert!(decoded.equal(&any)?);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    CharCodeSet, ErrorCategory, GiopVersion, OrbConfig, OrbError, Result, TypeCodeRegistry,
};

// CDR streams
pub mod encoding;

pub use encoding::cdr::{CdrInputStream, CdrOutputStream};

// TypeCodes
pub mod typecode;

pub use typecode::{
    ParamCategory, StructMember, TypeCode, TypeKind, UnionMember, ValueMember, Visibility,
    WeakTypeCode, CORBA_OBJECT_ID,
};

// Boxed values
pub mod value;

pub use value::{CorbaValue, FixedDecimal, ObjectRef, OpaqueValue, TaggedProfile, ValueFactory};

// Anys
pub mod any;

pub use any::Any;

mod orb;

pub use orb::Orb;
