// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! File persistence: thin glue over the serialization engine.
//!
//! Synchronous I/O, errors propagated as [`crate::SdsError::Io`]. No format
//! of its own; a file is exactly one exported stream.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::debug;

use crate::arena::SdsId;
use crate::error::Result;
use crate::tree::Sds;

impl Sds {
    /// Serialize a (sub)tree and write it to `path`, replacing any existing
    /// file.
    pub fn write(&self, id: SdsId, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.export_vec(id)?;
        fs::write(path, &bytes)?;
        debug!("[file] wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Read a file into a fully independent, mutable tree.
    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<SdsId> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        debug!("[file] read {} bytes from {}", bytes.len(), path.display());
        self.import(&bytes)
    }

    /// Read a file and map it as a read/navigate-only tree.
    ///
    /// The file's bytes are loaded once and shared by the mapped nodes;
    /// payloads are not copied again.
    pub fn read_mapped(&mut self, path: impl AsRef<Path>) -> Result<SdsId> {
        let path = path.as_ref();
        let bytes: Rc<[u8]> = Rc::from(fs::read(path)?);
        debug!("[file] mapped {} bytes from {}", bytes.len(), path.display());
        self.access(bytes)
    }
}
