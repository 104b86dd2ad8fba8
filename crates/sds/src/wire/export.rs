// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Flattening a tree into a portable stream.
//!
//! One traversal drives both sizing and writing through the [`Sink`] trait,
//! so [`Sds::size`] and [`Sds::export`] cannot drift apart.

use log::debug;

use super::{ByteOrder, Writer, HEADER_LEN, MAGIC, RECORD_ALIGN, VERSION};
use crate::arena::SdsId;
use crate::error::{Result, SdsError};
use crate::node::{Body, Origin, PrimData};
use crate::tree::Sds;
use crate::types::NAME_LEN;

/// Receiver of the depth-first encoding: either a byte counter or a real
/// writer.
trait Sink {
    fn align(&mut self, alignment: usize) -> Result<()>;
    fn bytes(&mut self, data: &[u8]) -> Result<()>;
    fn u8(&mut self, value: u8) -> Result<()>;
    fn u32(&mut self, value: u32) -> Result<()>;
    /// Payload elements of `width` bytes, converted from `from` order to the
    /// stream's order.
    fn payload(&mut self, raw: &[u8], width: usize, from: ByteOrder) -> Result<()>;
}

/// Dry-run sink: counts bytes without writing any.
struct Counter {
    len: usize,
}

impl Sink for Counter {
    fn align(&mut self, alignment: usize) -> Result<()> {
        if alignment > 1 {
            let mask = alignment - 1;
            self.len = (self.len + mask) & !mask;
        }
        Ok(())
    }

    fn bytes(&mut self, data: &[u8]) -> Result<()> {
        self.len += data.len();
        Ok(())
    }

    fn u8(&mut self, _value: u8) -> Result<()> {
        self.len += 1;
        Ok(())
    }

    fn u32(&mut self, _value: u32) -> Result<()> {
        self.len += 4;
        Ok(())
    }

    fn payload(&mut self, raw: &[u8], _width: usize, _from: ByteOrder) -> Result<()> {
        self.len += raw.len();
        Ok(())
    }
}

/// Writing sink over a caller-supplied buffer.
struct BufSink<'a> {
    writer: Writer<'a>,
}

impl Sink for BufSink<'_> {
    fn align(&mut self, alignment: usize) -> Result<()> {
        self.writer.align(alignment)
    }

    fn bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_bytes(data)
    }

    fn u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)
    }

    fn u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32(value)
    }

    fn payload(&mut self, raw: &[u8], width: usize, from: ByteOrder) -> Result<()> {
        if width <= 1 || from == self.writer.order() {
            return self.writer.write_bytes(raw);
        }
        let mut element = [0u8; 8];
        for chunk in raw.chunks_exact(width) {
            element[..width].copy_from_slice(chunk);
            element[..width].reverse();
            self.writer.write_bytes(&element[..width])?;
        }
        Ok(())
    }
}

impl Sds {
    /// Exact serialized size of a (sub)tree, header included.
    pub fn size(&self, id: SdsId) -> Result<usize> {
        let mut counter = Counter { len: HEADER_LEN };
        self.emit_tree(id, &mut counter)?;
        Ok(counter.len)
    }

    /// Serialize a (sub)tree into `buf`, in host byte order.
    ///
    /// Returns the number of bytes written; fails
    /// [`SdsError::BufferTooSmall`] without writing if `buf` cannot hold the
    /// stream. The resulting bytes are a self-contained stream for
    /// [`Sds::import`] or [`Sds::access`] on any supported platform.
    pub fn export(&self, id: SdsId, buf: &mut [u8]) -> Result<usize> {
        self.export_ordered(id, ByteOrder::host(), buf)
    }

    /// Serialize a (sub)tree into a fresh exactly-sized vector.
    pub fn export_vec(&self, id: SdsId) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size(id)?];
        self.export(id, &mut buf)?;
        Ok(buf)
    }

    pub(crate) fn export_ordered(
        &self,
        id: SdsId,
        order: ByteOrder,
        buf: &mut [u8],
    ) -> Result<usize> {
        let need = self.size(id)?;
        if buf.len() < need {
            return Err(SdsError::BufferTooSmall {
                need,
                have: buf.len(),
            });
        }
        // The header length field is 32-bit on the wire.
        let total = u32::try_from(need).map_err(|_| SdsError::DataTooLong {
            offset: 0,
            len: need,
            capacity: u32::MAX as usize,
        })?;

        let mut writer = Writer::new(&mut buf[..need], order);
        writer.write_bytes(&MAGIC)?;
        writer.write_u16(VERSION)?;
        writer.write_u8(order.flag())?;
        writer.write_u8(0)?;
        writer.write_u32(total)?;

        let mut sink = BufSink { writer };
        self.emit_tree(id, &mut sink)?;
        debug_assert_eq!(sink.writer.offset(), need);
        debug!("[export] {} bytes, root {:?}", need, id);
        Ok(need)
    }

    /// Depth-first record encoding shared by sizing and writing.
    fn emit_tree<S: Sink>(&self, id: SdsId, sink: &mut S) -> Result<()> {
        let node = self.node(id)?;

        sink.align(RECORD_ALIGN)?;
        let mut name = [0u8; NAME_LEN];
        name[..node.name.len()].copy_from_slice(node.name.as_bytes());
        sink.bytes(&name)?;
        sink.u8(node.code.to_u8())?;
        sink.u8(node.dims.len() as u8)?;
        sink.u8(u8::from(node.is_defined()))?;
        sink.u8(0)?;
        for &dim in &node.dims {
            sink.u32(dim)?;
        }
        sink.u32(node.extra.len() as u32)?;
        sink.bytes(&node.extra)?;
        sink.align(RECORD_ALIGN)?;

        match &node.body {
            Body::Primitive { data } => {
                let Some(data) = data else { return Ok(()) };
                let width = node.code.size().unwrap_or(1);
                sink.align(width.min(8))?;
                match data {
                    PrimData::Inline(bytes) => sink.payload(bytes, width, ByteOrder::host())?,
                    PrimData::Span { offset, len } => match &node.origin {
                        Origin::Mapped { bytes, order } => {
                            sink.payload(&bytes[*offset..*offset + *len], width, *order)?;
                        }
                        Origin::Arena => unreachable!("span payload on an arena node"),
                    },
                }
            }
            Body::Struct { children } => {
                sink.u32(children.len() as u32)?;
                for &child in children {
                    self.emit_tree(child, sink)?;
                }
            }
            Body::StructArray { cells } => {
                for cell in cells {
                    sink.align(RECORD_ALIGN)?;
                    match cell {
                        None => sink.u8(0)?,
                        Some(cell) => {
                            sink.u8(1)?;
                            self.emit_cell(*cell, sink)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Cell encoding: extra data and children only; the name is the array's.
    fn emit_cell<S: Sink>(&self, id: SdsId, sink: &mut S) -> Result<()> {
        let node = self.node(id)?;
        let children = node.children().ok_or(SdsError::NotStruct)?;
        sink.align(RECORD_ALIGN)?;
        sink.u32(node.extra.len() as u32)?;
        sink.bytes(&node.extra)?;
        sink.align(RECORD_ALIGN)?;
        sink.u32(children.len() as u32)?;
        for &child in children {
            self.emit_tree(child, sink)?;
        }
        Ok(())
    }
}
