// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for SDS operations.
//!
//! Every fallible operation returns [`Result`]; there are no panics on user
//! input and no process aborts. Each variant maps to one historical status
//! code, available as a stable mnemonic via [`SdsError::code_name`] for
//! user-facing reporting.

use std::fmt;

/// Errors returned by SDS operations.
///
/// # Example
///
/// ```rust
/// use sds::{Sds, SdsError, SdsType};
///
/// let mut sds = Sds::new();
/// let top = sds.create(None, "top", SdsType::Struct, &[], &[]).unwrap();
/// let item = sds.create(Some(top), "reading", SdsType::Int32, &[], &[]).unwrap();
///
/// // Created but never written: reading it is UNDEFINED, not NOITEM.
/// let mut buf = [0u8; 4];
/// match sds.get(item, 0, &mut buf) {
///     Err(SdsError::Undefined) => {}
///     other => panic!("expected Undefined, got {:?}", other),
/// }
/// ```
#[derive(Debug)]
pub enum SdsError {
    // ========================================================================
    // Handle Errors
    // ========================================================================
    /// Unknown, freed, or stale identifier (BADID).
    InvalidId,
    /// Mutation attempted on a node backed by an external buffer (EXTERN).
    External,

    // ========================================================================
    // Structure Errors
    // ========================================================================
    /// A primitive node was used where a structure is required (NOTSTRUCT).
    NotStruct,
    /// A structure node was used where a primitive is required (NOTPRIM).
    NotPrimitive,
    /// The node is not a structure array (NOTARRAY).
    NotArray,
    /// The node already has a parent; only independent roots can be inserted (NOTTOP).
    NotTopLevel,
    /// The node cannot be deleted or detached in place, e.g. an array cell (ILLDEL).
    IllegalDelete,
    /// A direct sibling with this name already exists (DUPNAME).
    DuplicateName(String),
    /// No item with this name under the given structure (NOITEM).
    NoItem(String),
    /// Cell index outside the array extents, or wrong index count (INDEXERR).
    IndexOutOfRange { index: u32, extent: u32 },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Item name empty, too long, or containing a NUL byte (LONGNAME).
    LongName(String),
    /// Extra-data block exceeds the per-node limit (EXTRA).
    ExtraTooLong { len: usize, max: usize },
    /// Type code outside the defined range (INVCODE).
    InvalidType(u8),
    /// Dimension count or extents invalid (INVDIMS).
    InvalidDims { ndims: usize },
    /// Data write past the end of the payload (TOOLONG).
    DataTooLong {
        offset: usize,
        len: usize,
        capacity: usize,
    },
    /// The primitive exists but has never been written (UNDEFINED).
    Undefined,

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// The buffer does not carry the SDS magic tag or is malformed (NOTSDS).
    NotSds,
    /// Recognized SDS stream with an unsupported encoding version (VERSION).
    Version(u16),
    /// Caller-supplied buffer smaller than the serialized size (TOOSMALL).
    BufferTooSmall { need: usize, have: usize },
    /// Stream ended mid-record while decoding (TRUNCATED).
    Truncated { offset: usize },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File read/write failure from the persistence layer (IOERR).
    Io(std::io::Error),
}

impl fmt::Display for SdsError {
    // @audit-ok: Simple pattern matching (cyclo 21, cogni 1) - error message dispatch table
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Handle
            SdsError::InvalidId => write!(f, "Invalid or stale identifier"),
            SdsError::External => write!(f, "Object is external and cannot be modified"),
            // Structure
            SdsError::NotStruct => write!(f, "Object is not a structure"),
            SdsError::NotPrimitive => write!(f, "Object is not a primitive item"),
            SdsError::NotArray => write!(f, "Object is not a structure array"),
            SdsError::NotTopLevel => write!(f, "Object is not a top-level object"),
            SdsError::IllegalDelete => write!(f, "Object cannot be deleted or detached in place"),
            SdsError::DuplicateName(name) => {
                write!(f, "An item named '{}' already exists here", name)
            }
            SdsError::NoItem(name) => write!(f, "No item named '{}'", name),
            SdsError::IndexOutOfRange { index, extent } => {
                write!(f, "Cell index {} outside extent {}", index, extent)
            }
            // Validation
            SdsError::LongName(name) => write!(f, "Invalid item name '{}'", name),
            SdsError::ExtraTooLong { len, max } => {
                write!(f, "Extra data of {} bytes exceeds the {} byte limit", len, max)
            }
            SdsError::InvalidType(code) => write!(f, "Invalid type code {:#04x}", code),
            SdsError::InvalidDims { ndims } => {
                write!(f, "Invalid dimension specification ({} dims)", ndims)
            }
            SdsError::DataTooLong {
                offset,
                len,
                capacity,
            } => write!(
                f,
                "Write of {} bytes at offset {} past payload of {} bytes",
                len, offset, capacity
            ),
            SdsError::Undefined => write!(f, "Item exists but no value has been written"),
            // Serialization
            SdsError::NotSds => write!(f, "Buffer does not contain an SDS stream"),
            SdsError::Version(v) => write!(f, "Unsupported SDS encoding version {}", v),
            SdsError::BufferTooSmall { need, have } => {
                write!(f, "Buffer too small: need {} bytes, have {}", need, have)
            }
            SdsError::Truncated { offset } => {
                write!(f, "Stream truncated at offset {}", offset)
            }
            // I/O
            SdsError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SdsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SdsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SdsError {
    fn from(e: std::io::Error) -> Self {
        SdsError::Io(e)
    }
}

impl SdsError {
    /// Stable mnemonic for the underlying status code.
    ///
    /// Intended for user-facing diagnostics where the historical short names
    /// are expected ("BADID", "NOTSDS", ...).
    pub const fn code_name(&self) -> &'static str {
        match self {
            SdsError::InvalidId => "BADID",
            SdsError::External => "EXTERN",
            SdsError::NotStruct => "NOTSTRUCT",
            SdsError::NotPrimitive => "NOTPRIM",
            SdsError::NotArray => "NOTARRAY",
            SdsError::NotTopLevel => "NOTTOP",
            SdsError::IllegalDelete => "ILLDEL",
            SdsError::DuplicateName(_) => "DUPNAME",
            SdsError::NoItem(_) => "NOITEM",
            SdsError::IndexOutOfRange { .. } => "INDEXERR",
            SdsError::LongName(_) => "LONGNAME",
            SdsError::ExtraTooLong { .. } => "EXTRA",
            SdsError::InvalidType(_) => "INVCODE",
            SdsError::InvalidDims { .. } => "INVDIMS",
            SdsError::DataTooLong { .. } => "TOOLONG",
            SdsError::Undefined => "UNDEFINED",
            SdsError::NotSds => "NOTSDS",
            SdsError::Version(_) => "VERSION",
            SdsError::BufferTooSmall { .. } => "TOOSMALL",
            SdsError::Truncated { .. } => "TRUNCATED",
            SdsError::Io(_) => "IOERR",
        }
    }
}

/// Convenient alias for API results using the public [`SdsError`] type.
pub type Result<T> = std::result::Result<T, SdsError>;
