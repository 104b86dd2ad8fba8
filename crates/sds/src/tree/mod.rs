// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The container and read-side navigation.
//!
//! [`Sds`] owns the arena and is the entry point for every operation.
//! Navigation works uniformly on arena-owned and mapped trees; structural
//! mutation lives in `mutate`, payload access in `data`.

mod data;
mod mutate;

use crate::arena::{Arena, SdsId};
use crate::error::{Result, SdsError};
use crate::node::Node;
use crate::types::SdsType;

/// Shallow description of a node, as returned by [`Sds::info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Item name (cells report their array's name).
    pub name: String,
    /// Type code.
    pub code: SdsType,
    /// Array extents, empty for a scalar. `dims[0]` is slowest-varying.
    pub dims: Vec<u32>,
    /// Length of the attached extra-data block.
    pub extra_len: usize,
    /// True for nodes mapped onto an external buffer.
    pub external: bool,
    /// True for a primitive that holds a value.
    pub defined: bool,
}

/// A self-defining data container.
///
/// Handles ([`SdsId`]) issued by one container are meaningless to another.
/// The container is single-threaded by design: no internal locking, plain
/// integer reference counts, and all operations complete synchronously.
pub struct Sds {
    pub(crate) arena: Arena,
}

impl Sds {
    /// Empty container.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    /// Empty container with room for `capacity` nodes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
        }
    }

    /// Number of live nodes across all trees in this container.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True if no nodes are live.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub(crate) fn node(&self, id: SdsId) -> Result<&Node> {
        self.arena.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: SdsId) -> Result<&mut Node> {
        self.arena.get_mut(id)
    }

    /// Direct child of a structure, by name.
    pub fn find(&self, parent: SdsId, name: &str) -> Result<SdsId> {
        let node = self.node(parent)?;
        let children = node.children().ok_or(SdsError::NotStruct)?;
        for &child in children {
            if self.node(child)?.name == name {
                return Ok(child);
            }
        }
        Err(SdsError::NoItem(name.to_string()))
    }

    /// Direct child of a structure, by position.
    pub fn index(&self, parent: SdsId, position: usize) -> Result<SdsId> {
        let node = self.node(parent)?;
        let children = node.children().ok_or(SdsError::NotStruct)?;
        children
            .get(position)
            .copied()
            .ok_or(SdsError::IndexOutOfRange {
                index: position as u32,
                extent: children.len() as u32,
            })
    }

    /// Number of direct children (structure) or cells (structure array).
    pub fn item_count(&self, id: SdsId) -> Result<usize> {
        let node = self.node(id)?;
        if let Some(children) = node.children() {
            return Ok(children.len());
        }
        if let Some(cells) = node.cells() {
            return Ok(cells.len());
        }
        Err(SdsError::NotStruct)
    }

    /// One element of a structure array, by row-major index.
    ///
    /// An in-range but never-filled cell fails [`SdsError::Undefined`].
    pub fn cell(&self, array: SdsId, indices: &[u32]) -> Result<SdsId> {
        let node = self.node(array)?;
        let cells = node.cells().ok_or(SdsError::NotArray)?;
        let linear = linear_index(&node.dims, indices)?;
        cells[linear].ok_or(SdsError::Undefined)
    }

    /// Recursive-descent lookup along a dot-separated path.
    ///
    /// A segment may carry row-major cell indices to descend through a
    /// structure array: `"targets.field[1,2].ra"`. The empty path names the
    /// root itself.
    pub fn find_by_path(&self, root: SdsId, path: &str) -> Result<SdsId> {
        if path.is_empty() {
            self.node(root)?;
            return Ok(root);
        }
        let mut current = root;
        for segment in path.split('.') {
            let (name, indices) = parse_segment(segment)?;
            current = self.find(current, name)?;
            if let Some(indices) = indices {
                current = self.cell(current, &indices)?;
            }
        }
        Ok(current)
    }

    /// Shallow description of a node.
    pub fn info(&self, id: SdsId) -> Result<NodeInfo> {
        let node = self.node(id)?;
        Ok(NodeInfo {
            name: node.name.clone(),
            code: node.code,
            dims: node.dims.clone(),
            extra_len: node.extra.len(),
            external: node.is_external(),
            defined: node.is_defined(),
        })
    }

    /// Parent of a node, `None` for an independent root.
    pub fn parent(&self, id: SdsId) -> Result<Option<SdsId>> {
        Ok(self.node(id)?.parent)
    }
}

impl Default for Sds {
    fn default() -> Self {
        Self::new()
    }
}

/// Row-major linear index into `dims`; `indices[0]` is slowest-varying.
pub(crate) fn linear_index(dims: &[u32], indices: &[u32]) -> Result<usize> {
    if indices.len() != dims.len() {
        return Err(SdsError::IndexOutOfRange {
            index: indices.len() as u32,
            extent: dims.len() as u32,
        });
    }
    let mut linear: usize = 0;
    for (&index, &extent) in indices.iter().zip(dims) {
        if index >= extent {
            return Err(SdsError::IndexOutOfRange { index, extent });
        }
        linear = linear * extent as usize + index as usize;
    }
    Ok(linear)
}

/// Split a path segment into its name and optional cell indices.
fn parse_segment(segment: &str) -> Result<(&str, Option<Vec<u32>>)> {
    let Some(open) = segment.find('[') else {
        return Ok((segment, None));
    };
    let rest = &segment[open + 1..];
    let Some(close) = rest.find(']') else {
        return Err(SdsError::NoItem(segment.to_string()));
    };
    if close != rest.len() - 1 || open == 0 {
        return Err(SdsError::NoItem(segment.to_string()));
    }
    let mut indices = Vec::new();
    for part in rest[..close].split(',') {
        let index = part
            .trim()
            .parse::<u32>()
            .map_err(|_| SdsError::NoItem(segment.to_string()))?;
        indices.push(index);
    }
    Ok((&segment[..open], Some(indices)))
}
