// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # SDS - Self-Defining Data System
//!
//! Hierarchical, self-describing binary data containers for exchanging
//! typed, nested, array-capable structures between processes and storing
//! them to disk, independent of host byte order or word size.
//!
//! ## Quick Start
//!
//! ```rust
//! use sds::{Sds, SdsType, Result};
//!
//! fn main() -> Result<()> {
//!     let mut sds = Sds::new();
//!
//!     // Build a tree of named, typed items.
//!     let top = sds.create(None, "pointing", SdsType::Struct, &[], &[])?;
//!     let ra = sds.create(Some(top), "ra", SdsType::Float64, &[], &[])?;
//!     sds.put(ra, 0, &1.57f64.to_ne_bytes())?;
//!
//!     // Flatten to a portable stream and rebuild an independent copy.
//!     let bytes = sds.export_vec(top)?;
//!     let copy = sds.import(&bytes)?;
//!
//!     let item = sds.find(copy, "ra")?;
//!     let mut value = [0u8; 8];
//!     assert_eq!(sds.get(item, 0, &mut value)?, 8);
//!     assert_eq!(f64::from_ne_bytes(value), 1.57);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                      Persistence Layer                       |
//! |              write / read / read_mapped (files)              |
//! +--------------------------------------------------------------+
//! |                    Serialization Engine                      |
//! |   size / export (flatten) | import (copy) | access (map)     |
//! +--------------------------------------------------------------+
//! |                Node Graph + Mutation Engine                  |
//! |  create, insert/extract, delete, rename, resize, fill_array  |
//! +--------------------------------------------------------------+
//! |                    Arena / Handle Table                      |
//! |        generation-tagged ids, refcounts, O(1) resolve        |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Sds`] | The container: arena, tree operations, serialization |
//! | [`SdsId`] | Opaque handle to one node |
//! | [`SdsType`] | Primitive and structure type codes |
//! | [`NodeInfo`] | Shallow description of a node |
//! | [`SdsError`] | Status codes of every fallible operation |
//!
//! ## Two handle domains
//!
//! Handles address either arena-owned nodes (fully mutable) or nodes mapped
//! onto an external buffer by [`Sds::access`] / [`Sds::read_mapped`]. Mapped
//! trees are read/navigate-only: every mutation fails
//! [`SdsError::External`], while `get`, `find`, `cell`, `info`, `export`
//! and [`Sds::copy`] work unchanged. Payload bytes of a mapped tree are
//! shared with the buffer, never copied, and foreign byte order is
//! normalized per element at read time.
//!
//! The engine is single-threaded by design: no internal locking, plain
//! integer reference counts, synchronous operations throughout.

mod arena;
mod file;
mod node;
mod tree;
mod wire;

/// Error taxonomy and the crate-wide [`Result`] alias.
pub mod error;
/// Portable 64-bit integers as (high, low) 32-bit pairs.
pub mod pair64;
/// Type codes and the dimension model.
pub mod types;

pub use arena::SdsId;
pub use error::{Result, SdsError};
pub use pair64::{I64Pair, U64Pair};
pub use tree::{NodeInfo, Sds};
pub use types::{SdsType, MAX_DIMS, MAX_EXTRA_LEN, NAME_LEN};
