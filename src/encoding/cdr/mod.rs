// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) streams.
//!
//! Primitives are aligned to their size relative to the stream origin, which
//! restarts at every encapsulation. Output streams write in either byte
//! order; input streams read the byte order they were created with or that
//! an encapsulation declares.

mod cursor;
mod encoder;

pub use cursor::CdrInputStream;
pub use encoder::CdrOutputStream;
