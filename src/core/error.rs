// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for orbcodec.
//!
//! Every failure raised by the TypeCode, Any and CDR stream layers is a
//! variant of [`OrbError`]. Variants mirror the CORBA system exceptions the
//! request layer ultimately reports (`BAD_OPERATION`, `BAD_KIND`, `MARSHAL`,
//! ...), and [`OrbError::category`] groups them into the four classes callers
//! usually branch on.

use std::fmt;

/// Broad classification of an [`OrbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Operation invalid in the current object state.
    State,
    /// A value or parameter does not match the type it is used with.
    TypeMismatch,
    /// Malformed or out-of-range data on the wire.
    WireFormat,
    /// Operation without defined semantics in this runtime.
    Unsupported,
    /// Configuration could not be loaded.
    Configuration,
}

/// Errors raised by TypeCode, Any and stream operations.
#[derive(Debug, Clone)]
pub enum OrbError {
    /// Operation invalid for the current state of an Any
    BadOperation {
        /// Operation that was attempted
        operation: String,
        /// Why it was rejected
        reason: String,
    },

    /// Structural TypeCode accessor invoked on a kind that lacks it
    BadKind {
        /// Accessor name
        operation: String,
        /// Kind of the TypeCode the accessor was invoked on
        kind: String,
    },

    /// Member index out of range
    Bounds {
        /// Requested index
        index: usize,
        /// Number of members
        count: usize,
    },

    /// Operation invoked with arguments in an invalid order or relation
    BadInvOrder {
        /// Error message
        message: String,
    },

    /// Invalid construction parameter
    BadParam {
        /// Error message
        message: String,
    },

    /// Recursive or indirect TypeCode that cannot be resolved
    BadTypeCode {
        /// Error message
        message: String,
    },

    /// Value cannot be represented in the target type or code set
    DataConversion {
        /// Error message
        message: String,
    },

    /// Wire format violation during marshaling or unmarshaling
    Marshal {
        /// What was being (un)marshaled
        context: String,
        /// Error message
        message: String,
    },

    /// Buffer too short for requested read
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Unsupported type or feature
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// Configuration loading or parsing error
    Config {
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl OrbError {
    /// Create a bad operation error.
    pub fn bad_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        OrbError::BadOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a bad kind error.
    pub fn bad_kind(operation: impl Into<String>, kind: impl fmt::Display) -> Self {
        OrbError::BadKind {
            operation: operation.into(),
            kind: kind.to_string(),
        }
    }

    /// Create a bounds error.
    pub fn bounds(index: usize, count: usize) -> Self {
        OrbError::Bounds { index, count }
    }

    /// Create a bad invocation order error.
    pub fn bad_inv_order(message: impl Into<String>) -> Self {
        OrbError::BadInvOrder {
            message: message.into(),
        }
    }

    /// Create a bad parameter error.
    pub fn bad_param(message: impl Into<String>) -> Self {
        OrbError::BadParam {
            message: message.into(),
        }
    }

    /// Create a bad type code error.
    pub fn bad_typecode(message: impl Into<String>) -> Self {
        OrbError::BadTypeCode {
            message: message.into(),
        }
    }

    /// Create a data conversion error.
    pub fn data_conversion(message: impl Into<String>) -> Self {
        OrbError::DataConversion {
            message: message.into(),
        }
    }

    /// Create a marshal error.
    pub fn marshal(context: impl Into<String>, message: impl Into<String>) -> Self {
        OrbError::Marshal {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        OrbError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        OrbError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        OrbError::Config {
            message: message.into(),
        }
    }

    /// The error class this variant belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrbError::BadOperation { .. }
            | OrbError::BadKind { .. }
            | OrbError::Bounds { .. }
            | OrbError::BadInvOrder { .. } => ErrorCategory::State,
            OrbError::BadParam { .. } => ErrorCategory::TypeMismatch,
            OrbError::DataConversion { .. }
            | OrbError::Marshal { .. }
            | OrbError::BufferTooShort { .. } => ErrorCategory::WireFormat,
            OrbError::BadTypeCode { .. } | OrbError::Unsupported { .. } => {
                ErrorCategory::Unsupported
            }
            OrbError::Config { .. } => ErrorCategory::Configuration,
            OrbError::Other(_) => ErrorCategory::State,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            OrbError::BadOperation { operation, reason } => {
                vec![("operation", operation.clone()), ("reason", reason.clone())]
            }
            OrbError::BadKind { operation, kind } => {
                vec![("operation", operation.clone()), ("kind", kind.clone())]
            }
            OrbError::Bounds { index, count } => vec![
                ("index", index.to_string()),
                ("count", count.to_string()),
            ],
            OrbError::BadInvOrder { message }
            | OrbError::BadParam { message }
            | OrbError::BadTypeCode { message }
            | OrbError::DataConversion { message }
            | OrbError::Config { message } => vec![("message", message.clone())],
            OrbError::Marshal { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            OrbError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            OrbError::Unsupported { feature } => vec![("feature", feature.clone())],
            OrbError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for OrbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbError::BadOperation { operation, reason } => {
                write!(f, "Bad operation '{operation}': {reason}")
            }
            OrbError::BadKind { operation, kind } => {
                write!(f, "Bad kind: '{operation}' is not defined for {kind}")
            }
            OrbError::Bounds { index, count } => {
                write!(f, "Bounds: index {index} out of range for {count} members")
            }
            OrbError::BadInvOrder { message } => write!(f, "Bad invocation order: {message}"),
            OrbError::BadParam { message } => write!(f, "Bad parameter: {message}"),
            OrbError::BadTypeCode { message } => write!(f, "Bad type code: {message}"),
            OrbError::DataConversion { message } => write!(f, "Data conversion: {message}"),
            OrbError::Marshal { context, message } => {
                write!(f, "Marshal error in {context}: {message}")
            }
            OrbError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
            ),
            OrbError::Unsupported { feature } => {
                write!(f, "Unsupported feature: '{feature}'")
            }
            OrbError::Config { message } => write!(f, "Configuration error: {message}"),
            OrbError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for OrbError {}

impl From<std::io::Error> for OrbError {
    fn from(err: std::io::Error) -> Self {
        OrbError::Config {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for OrbError {
    fn from(err: toml::de::Error) -> Self {
        OrbError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for orbcodec operations.
pub type Result<T> = std::result::Result<T, OrbError>;
