// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout orbcodec.
//!
//! This module provides the foundational types for the library:
//! - [`OrbError`] - Error handling shared by every layer
//! - [`OrbConfig`] - Encoding parameters inherited by streams
//! - [`TypeCodeRegistry`] - Repository id to TypeCode map

pub mod config;
pub mod error;
pub mod registry;

pub use config::{CharCodeSet, GiopVersion, OrbConfig};
pub use error::{ErrorCategory, OrbError, Result};
pub use registry::TypeCodeRegistry;
