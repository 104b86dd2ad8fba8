// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive payload and extra-data access.
//!
//! Payloads are addressed at byte granularity with an offset, the way the
//! structure compiler writes fields incrementally. Callers always see host
//! byte order; foreign-order mapped payloads are normalized per element at
//! read time.

use crate::arena::SdsId;
use crate::error::{Result, SdsError};
use crate::node::{Body, Origin, PrimData};
use crate::tree::Sds;
use crate::types::MAX_EXTRA_LEN;
use crate::wire::{self, ByteOrder};

impl Sds {
    /// Write payload bytes at `offset`.
    ///
    /// The first write allocates the full payload zero-filled and marks the
    /// item defined; later writes overlay it. Writing past the payload
    /// fails [`SdsError::DataTooLong`] without touching the node.
    pub fn put(&mut self, id: SdsId, offset: usize, data: &[u8]) -> Result<()> {
        let node = self.node(id)?;
        if node.is_external() {
            return Err(SdsError::External);
        }
        if !node.is_primitive() {
            return Err(SdsError::NotPrimitive);
        }
        let capacity = node.byte_capacity();
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= capacity)
            .ok_or(SdsError::DataTooLong {
                offset,
                len: data.len(),
                capacity,
            })?;

        let node = self.node_mut(id)?;
        if let Body::Primitive { data: slot } = &mut node.body {
            let bytes = match slot {
                Some(PrimData::Inline(bytes)) => bytes,
                _ => {
                    *slot = Some(PrimData::Inline(vec![0; capacity]));
                    match slot {
                        Some(PrimData::Inline(bytes)) => bytes,
                        _ => unreachable!("just stored inline payload"),
                    }
                }
            };
            bytes[offset..end].copy_from_slice(data);
        }
        Ok(())
    }

    /// Read payload bytes from `offset` into `buf`.
    ///
    /// Returns the number of bytes actually copied, which is smaller than
    /// `buf.len()` when the payload ends first. A created-but-never-written
    /// item fails [`SdsError::Undefined`], distinct from a missing item.
    pub fn get(&self, id: SdsId, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let node = self.node(id)?;
        let data = match &node.body {
            Body::Primitive { data } => data.as_ref().ok_or(SdsError::Undefined)?,
            _ => return Err(SdsError::NotPrimitive),
        };
        let capacity = node.byte_capacity();
        if offset >= capacity {
            return Ok(0);
        }
        let count = buf.len().min(capacity - offset);
        match data {
            PrimData::Inline(bytes) => {
                buf[..count].copy_from_slice(&bytes[offset..offset + count]);
            }
            PrimData::Span { offset: start, len } => {
                let (bytes, order) = match &node.origin {
                    Origin::Mapped { bytes, order } => (bytes, *order),
                    Origin::Arena => unreachable!("span payload on an arena node"),
                };
                let raw = &bytes[*start..*start + *len];
                let width = node.code.size().unwrap_or(1);
                if order == ByteOrder::host() || width == 1 {
                    buf[..count].copy_from_slice(&raw[offset..offset + count]);
                } else {
                    let normalized = wire::normalized(raw, width, order);
                    buf[..count].copy_from_slice(&normalized[offset..offset + count]);
                }
            }
        }
        Ok(count)
    }

    /// Whether a primitive holds a value.
    pub fn is_defined(&self, id: SdsId) -> Result<bool> {
        let node = self.node(id)?;
        if !node.is_primitive() {
            return Err(SdsError::NotPrimitive);
        }
        Ok(node.is_defined())
    }

    /// The node's extra-data block (empty if none was attached).
    pub fn get_extra(&self, id: SdsId) -> Result<&[u8]> {
        Ok(&self.node(id)?.extra)
    }

    /// Replace the node's extra-data block.
    pub fn put_extra(&mut self, id: SdsId, extra: &[u8]) -> Result<()> {
        if extra.len() > MAX_EXTRA_LEN {
            return Err(SdsError::ExtraTooLong {
                len: extra.len(),
                max: MAX_EXTRA_LEN,
            });
        }
        let node = self.node_mut(id)?;
        if node.is_external() {
            return Err(SdsError::External);
        }
        node.extra = extra.to_vec();
        Ok(())
    }
}
