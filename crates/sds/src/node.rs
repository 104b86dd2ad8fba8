// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node records of the object graph.
//!
//! A node is either arena-owned (mutable, payload inline) or mapped onto an
//! external buffer produced by `export` (read/navigate-only, payload a span
//! into the shared bytes). The two origins are an explicit tag, not an
//! overloaded handle value; mutation paths dispatch on it and reject mapped
//! nodes.

use std::rc::Rc;

use crate::arena::SdsId;
use crate::types::{self, SdsType};
use crate::wire::ByteOrder;

/// Where a node's storage lives.
pub(crate) enum Origin {
    /// Arena-owned, fully mutable.
    Arena,
    /// Mapped onto an external stream; shares the buffer, never copies it.
    Mapped { bytes: Rc<[u8]>, order: ByteOrder },
}

/// Primitive payload storage.
pub(crate) enum PrimData {
    /// Arena-owned bytes in host order.
    Inline(Vec<u8>),
    /// Span into a mapped buffer, in stream order.
    Span { offset: usize, len: usize },
}

/// Kind-specific part of a node.
pub(crate) enum Body {
    /// Scalar or array of a primitive type. `None` until first written.
    Primitive { data: Option<PrimData> },
    /// Structure: ordered named children.
    Struct { children: Vec<SdsId> },
    /// Structure array: row-major cells, `None` until filled.
    StructArray { cells: Vec<Option<SdsId>> },
}

/// One element of the tree.
pub(crate) struct Node {
    pub name: String,
    pub code: SdsType,
    pub dims: Vec<u32>,
    pub parent: Option<SdsId>,
    pub extra: Vec<u8>,
    pub origin: Origin,
    pub body: Body,
}

impl Node {
    /// Fresh arena-owned node; the body follows from code and dims.
    pub fn new_owned(name: &str, code: SdsType, dims: &[u32], cells: usize) -> Self {
        let body = if code.is_struct() {
            if dims.is_empty() {
                Body::Struct {
                    children: Vec::new(),
                }
            } else {
                Body::StructArray {
                    cells: vec![None; cells],
                }
            }
        } else {
            Body::Primitive { data: None }
        };
        Self {
            name: name.to_string(),
            code,
            dims: dims.to_vec(),
            parent: None,
            extra: Vec::new(),
            origin: Origin::Arena,
            body,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.origin, Origin::Mapped { .. })
    }

    pub fn is_struct_scalar(&self) -> bool {
        matches!(self.body, Body::Struct { .. })
    }

    pub fn is_struct_array(&self) -> bool {
        matches!(self.body, Body::StructArray { .. })
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.body, Body::Primitive { .. })
    }

    /// Whether a primitive holds a value. Structures are never "defined".
    pub fn is_defined(&self) -> bool {
        matches!(&self.body, Body::Primitive { data: Some(_) })
    }

    /// Payload capacity in bytes. Zero for structures.
    ///
    /// Dims were validated at construction, so the product cannot overflow.
    pub fn byte_capacity(&self) -> usize {
        match self.code.size() {
            Some(_) => types::byte_size(self.code, &self.dims).unwrap_or(0),
            None => 0,
        }
    }

    /// Direct children of a scalar structure.
    pub fn children(&self) -> Option<&[SdsId]> {
        match &self.body {
            Body::Struct { children } => Some(children),
            _ => None,
        }
    }

    /// Cells of a structure array.
    pub fn cells(&self) -> Option<&[Option<SdsId>]> {
        match &self.body {
            Body::StructArray { cells } => Some(cells),
            _ => None,
        }
    }
}
