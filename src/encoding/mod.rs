// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire encodings.
//!
//! - [`cdr`] - CDR (Common Data Representation) streams

pub mod cdr;

pub use cdr::{CdrInputStream, CdrOutputStream};
