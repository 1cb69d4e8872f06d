// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Boxed values an Any can hold besides scalars and encoded regions.
//!
//! - [`FixedDecimal`] - Fixed-point decimals with packed-BCD encoding
//! - [`ObjectRef`] - Object references in IOR form
//! - [`CorbaValue`] / [`ValueFactory`] - Value type instances

pub mod fixed;
pub mod object;
pub mod valuetype;

pub use fixed::FixedDecimal;
pub use object::{ObjectRef, TaggedProfile, TAG_INTERNET_IOP, TAG_MULTIPLE_COMPONENTS};
pub use valuetype::{CorbaValue, OpaqueValue, ValueFactory};
