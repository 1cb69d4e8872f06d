// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ORB configuration.
//!
//! [`OrbConfig`] carries the encoding parameters every stream created by an
//! [`Orb`](crate::Orb) inherits: GIOP version, byte order, the negotiated
//! narrow-character code set, and TypeCode behaviour switches. It can be built
//! in code or loaded from a TOML file:
//!
//! ```toml
//! giop_version = "1.1"
//! little_endian = true
//! char_codeset = "utf-8"
//! typecode_caching = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{OrbError, Result};

/// Default sanity cap on decoded sequence lengths.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: u32 = 16 * 1024 * 1024;

/// GIOP protocol version; selects the wide-character encoding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GiopVersion {
    /// GIOP 1.0
    #[serde(rename = "1.0")]
    V1_0,
    /// GIOP 1.1
    #[serde(rename = "1.1")]
    V1_1,
    /// GIOP 1.2
    #[serde(rename = "1.2")]
    V1_2,
}

impl GiopVersion {
    /// Whether wide strings carry an octet length and no terminator.
    #[inline]
    pub const fn has_octet_counted_wstrings(self) -> bool {
        matches!(self, GiopVersion::V1_2)
    }

    /// `(major, minor)` pair as written in GIOP headers.
    pub const fn as_pair(self) -> (u8, u8) {
        match self {
            GiopVersion::V1_0 => (1, 0),
            GiopVersion::V1_1 => (1, 1),
            GiopVersion::V1_2 => (1, 2),
        }
    }
}

impl Default for GiopVersion {
    fn default() -> Self {
        GiopVersion::V1_2
    }
}

/// Transmission code set for `char` and `string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharCodeSet {
    /// ISO 8859-1 (Latin-1), the CORBA default
    #[default]
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
    /// UTF-8
    #[serde(rename = "utf-8")]
    Utf8,
}

/// ORB-wide settings for TypeCode and Any marshaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    /// GIOP version used by streams created from the ORB
    pub giop_version: GiopVersion,
    /// Byte order of streams created from the ORB
    pub little_endian: bool,
    /// Narrow character code set
    pub char_codeset: CharCodeSet,
    /// Enable the output-byte cache on newly built complex TypeCodes
    pub typecode_caching: bool,
    /// Resolve recursive TypeCode placeholders through the registry
    pub recursive_typecodes: bool,
    /// Upper limit on decoded sequence and string lengths
    pub max_sequence_length: u32,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            giop_version: GiopVersion::default(),
            little_endian: false,
            char_codeset: CharCodeSet::default(),
            typecode_caching: false,
            recursive_typecodes: true,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
        }
    }
}

impl OrbConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: OrbConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OrbError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Serialize this configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| OrbError::config(e.to_string()))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_sequence_length == 0 {
            return Err(OrbError::config("max_sequence_length must be positive"));
        }
        Ok(())
    }
}
