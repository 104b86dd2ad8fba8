// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural mutation: create, insert, extract, delete, rename, resize,
//! handle cloning, and structure-array population.
//!
//! Every operation here rejects nodes mapped onto an external buffer with
//! [`SdsError::External`]; mapped trees are read/navigate-only.

use log::debug;

use crate::arena::SdsId;
use crate::error::{Result, SdsError};
use crate::node::{Body, Node, Origin, PrimData};
use crate::tree::{linear_index, Sds};
use crate::types::{self, SdsType, MAX_EXTRA_LEN};
use crate::wire;

impl Sds {
    /// Create a node.
    ///
    /// With `parent = None` the node becomes an independent root; otherwise
    /// it is appended to the given structure's children. A struct code with
    /// non-empty `dims` creates a structure array whose cells start empty
    /// (see [`Sds::fill_array`] and [`Sds::insert_cell`]).
    pub fn create(
        &mut self,
        parent: Option<SdsId>,
        name: &str,
        code: SdsType,
        dims: &[u32],
        extra: &[u8],
    ) -> Result<SdsId> {
        types::validate_name(name)?;
        types::validate_dims(dims)?;
        if extra.len() > MAX_EXTRA_LEN {
            return Err(SdsError::ExtraTooLong {
                len: extra.len(),
                max: MAX_EXTRA_LEN,
            });
        }
        // Sizing is validated up front so later payload math cannot overflow.
        let cells = if code.is_struct() {
            types::element_count(dims)?
        } else {
            types::byte_size(code, dims)?;
            0
        };
        if let Some(parent_id) = parent {
            let parent_node = self.node(parent_id)?;
            if parent_node.is_external() {
                return Err(SdsError::External);
            }
            let children = parent_node.children().ok_or(SdsError::NotStruct)?;
            self.check_sibling_name(children, name)?;
        }

        let mut node = Node::new_owned(name, code, dims, cells);
        node.extra = extra.to_vec();
        node.parent = parent;
        let id = self.arena.insert(node);
        if let Some(parent_id) = parent {
            if let Body::Struct { children } = &mut self.node_mut(parent_id)?.body {
                children.push(id);
            }
        }
        Ok(id)
    }

    /// Attach an independent root as a new child of a structure.
    ///
    /// The child keeps its payload and descendants; only ownership moves.
    /// Inserting a node into its own subtree fails [`SdsError::NotTopLevel`].
    pub fn insert(&mut self, parent: SdsId, child: SdsId) -> Result<()> {
        let parent_node = self.node(parent)?;
        if parent_node.is_external() {
            return Err(SdsError::External);
        }
        parent_node.children().ok_or(SdsError::NotStruct)?;
        let child_node = self.node(child)?;
        if child_node.is_external() {
            return Err(SdsError::External);
        }
        if child_node.parent.is_some() {
            return Err(SdsError::NotTopLevel);
        }
        if self.is_ancestor(child, parent)? {
            return Err(SdsError::NotTopLevel);
        }
        let name = child_node.name.clone();
        let children = self.node(parent)?.children().ok_or(SdsError::NotStruct)?;
        self.check_sibling_name(children, &name)?;

        self.node_mut(child)?.parent = Some(parent);
        if let Body::Struct { children } = &mut self.node_mut(parent)?.body {
            children.push(child);
        }
        Ok(())
    }

    /// Detach a node from its parent, making it an independent root.
    ///
    /// Array cells are not detachable, and a root cannot be extracted again;
    /// both fail [`SdsError::IllegalDelete`].
    pub fn extract(&mut self, id: SdsId) -> Result<()> {
        let node = self.node(id)?;
        if node.is_external() {
            return Err(SdsError::External);
        }
        let parent = node.parent.ok_or(SdsError::IllegalDelete)?;
        match &mut self.node_mut(parent)?.body {
            Body::Struct { children } => {
                children.retain(|&c| c != id);
            }
            // A cell only exists inside its array.
            Body::StructArray { .. } => return Err(SdsError::IllegalDelete),
            Body::Primitive { .. } => return Err(SdsError::NotStruct),
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Destroy a node and all of its descendants.
    ///
    /// Any identifier into the subtree, cloned or not, goes stale. Array
    /// cells cannot be deleted individually.
    pub fn delete(&mut self, id: SdsId) -> Result<()> {
        let node = self.node(id)?;
        if node.is_external() {
            return Err(SdsError::External);
        }
        if let Some(parent) = node.parent {
            match &mut self.node_mut(parent)?.body {
                Body::Struct { children } => {
                    children.retain(|&c| c != id);
                }
                Body::StructArray { .. } => return Err(SdsError::IllegalDelete),
                Body::Primitive { .. } => return Err(SdsError::NotStruct),
            }
        }
        let removed = self.destroy_subtree(id)?;
        debug!("[tree] deleted subtree of {} nodes", removed);
        Ok(())
    }

    /// Rename a node in place.
    ///
    /// The new name must respect the length limit and stay unique among the
    /// node's direct siblings. Cells of a structure array track the array's
    /// name and cannot be renamed.
    pub fn rename(&mut self, id: SdsId, name: &str) -> Result<()> {
        types::validate_name(name)?;
        let node = self.node(id)?;
        if node.is_external() {
            return Err(SdsError::External);
        }
        if let Some(parent) = node.parent {
            let parent_node = self.node(parent)?;
            match &parent_node.body {
                Body::Struct { children } => {
                    for &sibling in children {
                        if sibling != id && self.node(sibling)?.name == name {
                            return Err(SdsError::DuplicateName(name.to_string()));
                        }
                    }
                }
                Body::StructArray { .. } => return Err(SdsError::IllegalDelete),
                Body::Primitive { .. } => return Err(SdsError::NotStruct),
            }
        }
        self.node_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Change the extents of an array node.
    ///
    /// Primitive arrays keep the common prefix of their payload and zero-fill
    /// growth; structure arrays keep the common row-major prefix of their
    /// cells and destroy the rest. Scalars fail [`SdsError::NotArray`].
    pub fn resize(&mut self, id: SdsId, dims: &[u32]) -> Result<()> {
        types::validate_dims(dims)?;
        let node = self.node(id)?;
        if node.is_external() {
            return Err(SdsError::External);
        }
        if node.dims.is_empty() || dims.is_empty() {
            return Err(SdsError::NotArray);
        }
        match &node.body {
            Body::Primitive { .. } => {
                let capacity = types::byte_size(node.code, dims)?;
                let node = self.node_mut(id)?;
                node.dims = dims.to_vec();
                if let Body::Primitive { data: Some(PrimData::Inline(bytes)) } = &mut node.body {
                    bytes.resize(capacity, 0);
                }
                Ok(())
            }
            Body::StructArray { .. } => {
                let count = types::element_count(dims)?;
                let mut dropped = Vec::new();
                {
                    let node = self.node_mut(id)?;
                    node.dims = dims.to_vec();
                    if let Body::StructArray { cells } = &mut node.body {
                        if count < cells.len() {
                            dropped = cells.split_off(count).into_iter().flatten().collect();
                        } else {
                            cells.resize(count, None);
                        }
                    }
                }
                for cell in dropped {
                    self.destroy_subtree(cell)?;
                }
                Ok(())
            }
            Body::Struct { .. } => Err(SdsError::NotArray),
        }
    }

    /// Second handle to the same node, without duplicating storage.
    ///
    /// The node (and, for a root, its subtree) stays alive until every
    /// handle has been passed to [`Sds::free`]. Works on mapped trees, so
    /// several consumers can navigate one accessed buffer independently.
    pub fn clone_id(&mut self, id: SdsId) -> Result<SdsId> {
        self.arena.add_ref(id)?;
        Ok(id)
    }

    /// Release one handle.
    ///
    /// Dropping the last handle of an independent root destroys the subtree:
    /// arena-owned trees reclaim their storage, mapped trees release their
    /// index records and their reference on the shared buffer. Dropping the
    /// last handle of an attached node fails [`SdsError::IllegalDelete`];
    /// the parent owns it.
    pub fn free(&mut self, id: SdsId) -> Result<()> {
        if self.arena.refs(id)? > 1 {
            self.arena.dec_ref(id)?;
            return Ok(());
        }
        let node = self.node(id)?;
        if node.parent.is_some() {
            return Err(SdsError::IllegalDelete);
        }
        let removed = self.destroy_subtree(id)?;
        debug!("[tree] freed root, {} nodes released", removed);
        Ok(())
    }

    /// Replicate `template`'s structure into every empty cell of a
    /// structure array.
    ///
    /// Cells that are already filled are left untouched, so a partially
    /// populated array can be completed without clobbering data. The
    /// template itself is not consumed; each cell receives a deep copy.
    pub fn fill_array(&mut self, array: SdsId, template: SdsId) -> Result<()> {
        let array_node = self.node(array)?;
        if array_node.is_external() {
            return Err(SdsError::External);
        }
        if !array_node.is_struct_array() {
            return Err(SdsError::NotArray);
        }
        let template_node = self.node(template)?;
        if !template_node.is_struct_scalar() {
            return Err(SdsError::NotStruct);
        }
        let cell_count = array_node.cells().map_or(0, |cells| cells.len());
        let array_name = array_node.name.clone();
        let template_children: Vec<SdsId> =
            template_node.children().unwrap_or_default().to_vec();

        for index in 0..cell_count {
            let occupied = match self.node(array)?.cells() {
                Some(cells) => cells[index].is_some(),
                None => true,
            };
            if occupied {
                continue;
            }
            let cell = self.new_cell(array, &array_name, &template_children)?;
            if let Body::StructArray { cells } = &mut self.node_mut(array)?.body {
                cells[index] = Some(cell);
            }
        }
        Ok(())
    }

    /// Attach an independent root structure as one cell of a structure
    /// array.
    ///
    /// The cell must be empty (a filled cell cannot be replaced in place,
    /// [`SdsError::IllegalDelete`]); the child takes the array's name.
    pub fn insert_cell(&mut self, array: SdsId, indices: &[u32], child: SdsId) -> Result<()> {
        let array_node = self.node(array)?;
        if array_node.is_external() {
            return Err(SdsError::External);
        }
        if !array_node.is_struct_array() {
            return Err(SdsError::NotArray);
        }
        let linear = linear_index(&array_node.dims, indices)?;
        let array_name = array_node.name.clone();

        let child_node = self.node(child)?;
        if child_node.is_external() {
            return Err(SdsError::External);
        }
        if !child_node.is_struct_scalar() {
            return Err(SdsError::NotStruct);
        }
        if child_node.parent.is_some() {
            return Err(SdsError::NotTopLevel);
        }
        if self.is_ancestor(child, array)? {
            return Err(SdsError::NotTopLevel);
        }
        let occupied = match self.node(array)?.cells() {
            Some(cells) => cells[linear].is_some(),
            None => true,
        };
        if occupied {
            return Err(SdsError::IllegalDelete);
        }

        let child_mut = self.node_mut(child)?;
        child_mut.parent = Some(array);
        child_mut.name = array_name;
        if let Body::StructArray { cells } = &mut self.node_mut(array)?.body {
            cells[linear] = Some(child);
        }
        Ok(())
    }

    /// Deep copy of a (sub)tree into a fresh independent root.
    ///
    /// Works on mapped trees too: the copy is always arena-owned, mutable,
    /// and holds its payloads in host order. This is the escape hatch from a
    /// read-only accessed buffer to a tree that can be modified.
    pub fn copy(&mut self, id: SdsId) -> Result<SdsId> {
        self.copy_subtree(id, None, None)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// A fresh empty cell structure populated from the template's children.
    fn new_cell(
        &mut self,
        array: SdsId,
        array_name: &str,
        template_children: &[SdsId],
    ) -> Result<SdsId> {
        let mut cell = Node::new_owned(array_name, SdsType::Struct, &[], 0);
        cell.parent = Some(array);
        let cell_id = self.arena.insert(cell);
        for &child in template_children {
            let copy = self.copy_subtree(child, Some(cell_id), None)?;
            if let Body::Struct { children } = &mut self.node_mut(cell_id)?.body {
                children.push(copy);
            }
        }
        Ok(cell_id)
    }

    /// True if `ancestor` is on `node`'s parent chain (or is the node).
    fn is_ancestor(&self, ancestor: SdsId, node: SdsId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.node(id)?.parent;
        }
        Ok(false)
    }

    fn check_sibling_name(&self, children: &[SdsId], name: &str) -> Result<()> {
        for &child in children {
            if self.node(child)?.name == name {
                return Err(SdsError::DuplicateName(name.to_string()));
            }
        }
        Ok(())
    }

    /// Reclaim a subtree; returns the number of nodes removed.
    pub(crate) fn destroy_subtree(&mut self, id: SdsId) -> Result<usize> {
        let node = self.arena.remove(id)?;
        let mut removed = 1;
        match node.body {
            Body::Struct { children } => {
                for child in children {
                    removed += self.destroy_subtree(child)?;
                }
            }
            Body::StructArray { cells } => {
                for cell in cells.into_iter().flatten() {
                    removed += self.destroy_subtree(cell)?;
                }
            }
            Body::Primitive { .. } => {}
        }
        Ok(removed)
    }

    /// Recursive deep copy. `rename_to` overrides the copied node's name.
    fn copy_subtree(
        &mut self,
        src: SdsId,
        parent: Option<SdsId>,
        rename_to: Option<&str>,
    ) -> Result<SdsId> {
        let src_node = self.node(src)?;
        let name = rename_to.unwrap_or(&src_node.name).to_string();
        let code = src_node.code;
        let dims = src_node.dims.clone();
        let extra = src_node.extra.clone();

        enum Plan {
            Primitive(Option<Vec<u8>>),
            Struct(Vec<SdsId>),
            Cells(Vec<Option<SdsId>>),
        }
        let plan = match &src_node.body {
            Body::Primitive { data } => Plan::Primitive(match data {
                None => None,
                Some(PrimData::Inline(bytes)) => Some(bytes.clone()),
                Some(PrimData::Span { offset, len }) => {
                    let width = code.size().unwrap_or(1);
                    match &src_node.origin {
                        Origin::Mapped { bytes, order } => {
                            Some(wire::normalized(&bytes[*offset..*offset + *len], width, *order))
                        }
                        Origin::Arena => unreachable!("span payload on an arena node"),
                    }
                }
            }),
            Body::Struct { children } => Plan::Struct(children.clone()),
            Body::StructArray { cells } => Plan::Cells(cells.clone()),
        };

        let cell_count = match &plan {
            Plan::Cells(cells) => cells.len(),
            _ => 0,
        };
        let mut node = Node::new_owned(&name, code, &dims, cell_count);
        node.extra = extra;
        node.parent = parent;
        let id = self.arena.insert(node);

        match plan {
            Plan::Primitive(bytes) => {
                if let Some(bytes) = bytes {
                    if let Body::Primitive { data } = &mut self.node_mut(id)?.body {
                        *data = Some(PrimData::Inline(bytes));
                    }
                }
            }
            Plan::Struct(children) => {
                for child in children {
                    let copy = self.copy_subtree(child, Some(id), None)?;
                    if let Body::Struct { children } = &mut self.node_mut(id)?.body {
                        children.push(copy);
                    }
                }
            }
            Plan::Cells(cells) => {
                for (index, cell) in cells.into_iter().enumerate() {
                    if let Some(cell) = cell {
                        let copy = self.copy_subtree(cell, Some(id), Some(&name))?;
                        if let Body::StructArray { cells } = &mut self.node_mut(id)?.body {
                            cells[index] = Some(copy);
                        }
                    }
                }
            }
        }
        Ok(id)
    }
}
