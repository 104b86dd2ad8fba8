// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rebuilding a tree from a portable stream.
//!
//! `import` materializes an independent, mutable, arena-owned copy with all
//! payloads normalized to host order. `access` maps read/navigate-only nodes
//! straight onto the caller's buffer: structure is indexed, payload bytes are
//! never copied. Both share one record parser; a partially-built tree is torn
//! down before an error is returned, so a malformed stream never leaks nodes.

use std::rc::Rc;

use log::{debug, warn};

use super::{ByteOrder, Reader, HEADER_LEN, MAGIC, MAX_DEPTH, RECORD_ALIGN, VERSION};
use crate::arena::SdsId;
use crate::error::{Result, SdsError};
use crate::node::{Body, Node, Origin, PrimData};
use crate::tree::Sds;
use crate::types::{self, SdsType, MAX_DIMS, MAX_EXTRA_LEN, NAME_LEN};

/// Smallest possible node record: name, fixed prologue, extra length.
const MIN_RECORD: usize = NAME_LEN + 4 + 4;

/// How the parsed nodes hold their payloads.
enum Mode<'a> {
    /// Copy and normalize into arena-owned storage.
    Copy,
    /// Reference spans of the shared buffer.
    Map(&'a Rc<[u8]>),
}

impl Sds {
    /// Rebuild a fully independent, mutable tree from an exported stream.
    ///
    /// Multi-byte values are byte-swapped to host order when the stream was
    /// written on a foreign-order platform.
    pub fn import(&mut self, buf: &[u8]) -> Result<SdsId> {
        let (order, total) = parse_header(buf)?;
        let mut reader = Reader::at(&buf[..total], HEADER_LEN, order);
        let root = self.load_record(&mut reader, None, &Mode::Copy, 0)?;
        self.finish_load(&mut reader, root, total)?;
        debug!("[import] {} bytes, {:?} order", total, order);
        Ok(root)
    }

    /// Map a stream into read/navigate-only handles without copying payloads.
    ///
    /// The buffer is shared, not copied: every mapped node keeps a reference
    /// on it, and it is released only when the last handle is freed. All
    /// mutation operations on the resulting tree fail
    /// [`SdsError::External`].
    pub fn access(&mut self, bytes: Rc<[u8]>) -> Result<SdsId> {
        let (order, total) = parse_header(&bytes)?;
        let mut reader = Reader::at(&bytes[..total], HEADER_LEN, order);
        let root = self.load_record(&mut reader, None, &Mode::Map(&bytes), 0)?;
        self.finish_load(&mut reader, root, total)?;
        debug!("[access] {} bytes mapped, {:?} order", total, order);
        Ok(root)
    }

    /// Reject trailing garbage inside the declared stream length.
    fn finish_load(&mut self, reader: &mut Reader<'_>, root: SdsId, total: usize) -> Result<()> {
        if reader.offset() != total {
            warn!(
                "[import] stream length {} disagrees with records ending at {}",
                total,
                reader.offset()
            );
            self.destroy_subtree(root)?;
            return Err(SdsError::NotSds);
        }
        Ok(())
    }

    /// Parse one node record, attach it under `parent`, recurse into its
    /// children. Cleans up its own partial subtree on failure.
    fn load_record(
        &mut self,
        reader: &mut Reader<'_>,
        parent: Option<SdsId>,
        mode: &Mode<'_>,
        depth: usize,
    ) -> Result<SdsId> {
        if depth > MAX_DEPTH {
            return Err(SdsError::NotSds);
        }
        reader.align(RECORD_ALIGN)?;
        let name = parse_name(reader.read_bytes(NAME_LEN)?)?;
        let code_byte = reader.read_u8()?;
        let code = SdsType::from_u8(code_byte).ok_or(SdsError::InvalidType(code_byte))?;
        let ndims = reader.read_u8()? as usize;
        if ndims > MAX_DIMS {
            return Err(SdsError::InvalidDims { ndims });
        }
        let flags = reader.read_u8()?;
        let _reserved = reader.read_u8()?;
        let mut dims = Vec::with_capacity(ndims);
        for _ in 0..ndims {
            let dim = reader.read_u32()?;
            if dim == 0 {
                return Err(SdsError::InvalidDims { ndims });
            }
            dims.push(dim);
        }
        let extra = read_extra(reader)?;
        let stream_order = reader.order();

        if !code.is_struct() {
            let capacity = types::byte_size(code, &dims)?;
            let width = code.size().unwrap_or(1);
            let data = if flags & 1 != 0 {
                reader.align(width.min(8))?;
                let start = reader.offset();
                let raw = reader.read_bytes(capacity)?;
                Some(match mode {
                    Mode::Copy => PrimData::Inline(super::normalized(raw, width, stream_order)),
                    Mode::Map(_) => PrimData::Span {
                        offset: start,
                        len: capacity,
                    },
                })
            } else {
                None
            };
            let node = Node {
                name,
                code,
                dims,
                parent,
                extra,
                origin: make_origin(mode, stream_order),
                body: Body::Primitive { data },
            };
            return Ok(self.arena.insert(node));
        }

        if dims.is_empty() {
            let node = Node {
                name,
                code,
                dims,
                parent,
                extra,
                origin: make_origin(mode, stream_order),
                body: Body::Struct {
                    children: Vec::new(),
                },
            };
            let id = self.arena.insert(node);
            if let Err(e) = self.load_children(reader, id, mode, depth) {
                self.destroy_subtree(id).ok();
                return Err(e);
            }
            return Ok(id);
        }

        // Structure array: row-major cell blocks.
        let cell_count = types::element_count(&dims)?;
        if cell_count > reader.remaining() {
            return Err(SdsError::NotSds);
        }
        let array_name = name.clone();
        let node = Node {
            name,
            code,
            dims,
            parent,
            extra,
            origin: make_origin(mode, stream_order),
            body: Body::StructArray {
                cells: vec![None; cell_count],
            },
        };
        let id = self.arena.insert(node);
        if let Err(e) = self.load_cells(reader, id, &array_name, cell_count, mode, depth) {
            self.destroy_subtree(id).ok();
            return Err(e);
        }
        Ok(id)
    }

    fn load_children(
        &mut self,
        reader: &mut Reader<'_>,
        parent: SdsId,
        mode: &Mode<'_>,
        depth: usize,
    ) -> Result<()> {
        let count = reader.read_u32()? as usize;
        if count > reader.remaining() / MIN_RECORD + 1 {
            return Err(SdsError::NotSds);
        }
        for _ in 0..count {
            let child = self.load_record(reader, Some(parent), mode, depth + 1)?;
            if let Body::Struct { children } = &mut self.node_mut(parent)?.body {
                children.push(child);
            }
        }
        Ok(())
    }

    fn load_cells(
        &mut self,
        reader: &mut Reader<'_>,
        array: SdsId,
        array_name: &str,
        cell_count: usize,
        mode: &Mode<'_>,
        depth: usize,
    ) -> Result<()> {
        for index in 0..cell_count {
            reader.align(RECORD_ALIGN)?;
            let present = reader.read_u8()?;
            match present {
                0 => {}
                1 => {
                    reader.align(RECORD_ALIGN)?;
                    let order = reader.order();
                    let extra = read_extra(reader)?;
                    let cell = Node {
                        name: array_name.to_string(),
                        code: SdsType::Struct,
                        dims: Vec::new(),
                        parent: Some(array),
                        extra,
                        origin: make_origin(mode, order),
                        body: Body::Struct {
                            children: Vec::new(),
                        },
                    };
                    let cell_id = self.arena.insert(cell);
                    if let Err(e) = self.load_children(reader, cell_id, mode, depth + 1) {
                        self.destroy_subtree(cell_id).ok();
                        return Err(e);
                    }
                    if let Body::StructArray { cells } = &mut self.node_mut(array)?.body {
                        cells[index] = Some(cell_id);
                    }
                }
                _ => return Err(SdsError::NotSds),
            }
        }
        Ok(())
    }
}

fn make_origin(mode: &Mode<'_>, order: ByteOrder) -> Origin {
    match mode {
        Mode::Copy => Origin::Arena,
        Mode::Map(bytes) => Origin::Mapped {
            bytes: Rc::clone(bytes),
            order,
        },
    }
}

/// Validate the header; returns the stream order and total length.
fn parse_header(buf: &[u8]) -> Result<(ByteOrder, usize)> {
    if buf.len() < 4 || buf[..4] != MAGIC {
        return Err(SdsError::NotSds);
    }
    if buf.len() < HEADER_LEN {
        return Err(SdsError::Truncated { offset: buf.len() });
    }
    let order = ByteOrder::from_flag(buf[6]).ok_or(SdsError::NotSds)?;
    let mut reader = Reader::new(buf, order);
    let _magic = reader.read_bytes(4)?;
    let version = reader.read_u16()?;
    if version != VERSION {
        return Err(SdsError::Version(version));
    }
    let _order_flag = reader.read_u8()?;
    let _reserved = reader.read_u8()?;
    let total = reader.read_u32()? as usize;
    if total < HEADER_LEN {
        return Err(SdsError::NotSds);
    }
    if total > buf.len() {
        return Err(SdsError::Truncated { offset: buf.len() });
    }
    Ok((order, total))
}

/// Name field: NUL-padded, must decode to a valid item name.
fn parse_name(raw: &[u8]) -> Result<String> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    if raw[end..].iter().any(|&b| b != 0) {
        return Err(SdsError::NotSds);
    }
    let name = std::str::from_utf8(&raw[..end]).map_err(|_| SdsError::NotSds)?;
    types::validate_name(name).map_err(|_| SdsError::NotSds)?;
    Ok(name.to_string())
}

/// Extra-data block: u32 length, raw bytes, padded to record alignment.
fn read_extra(reader: &mut Reader<'_>) -> Result<Vec<u8>> {
    let len = reader.read_u32()? as usize;
    if len > MAX_EXTRA_LEN {
        return Err(SdsError::ExtraTooLong {
            len,
            max: MAX_EXTRA_LEN,
        });
    }
    let extra = reader.read_bytes(len)?.to_vec();
    reader.align(RECORD_ALIGN)?;
    Ok(extra)
}
