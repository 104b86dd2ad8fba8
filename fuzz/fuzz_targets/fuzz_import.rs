// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for stream decoding.
//!
//! Feeds arbitrary bytes to import and access. Neither may panic on any
//! input; a successful parse must yield a tree that can be walked, exported,
//! and deleted again without leaving nodes behind.

#![no_main]

use std::rc::Rc;

use libfuzzer_sys::fuzz_target;
use sds::Sds;

fuzz_target!(|data: &[u8]| {
    // ----------------------------------------------------------------
    // 1. import of arbitrary bytes - must not panic, must not leak
    // ----------------------------------------------------------------
    {
        let mut sds = Sds::new();
        if let Ok(root) = sds.import(data) {
            let _ = sds.info(root);
            let _ = sds.item_count(root);
            let _ = sds.export_vec(root);
            let _ = sds.delete(root);
        }
        assert!(sds.is_empty());
    }

    // ----------------------------------------------------------------
    // 2. access of the same bytes - must not panic, must not leak
    // ----------------------------------------------------------------
    {
        let mut sds = Sds::new();
        let bytes: Rc<[u8]> = Rc::from(data.to_vec());
        if let Ok(root) = sds.access(bytes) {
            let _ = sds.info(root);
            if let Ok(copy) = sds.copy(root) {
                let _ = sds.delete(copy);
            }
            let _ = sds.free(root);
        }
        assert!(sds.is_empty());
    }
});
