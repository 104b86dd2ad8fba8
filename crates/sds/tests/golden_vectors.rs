// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Golden vectors: byte-exact reference streams locking the wire layout.
//
// Each test builds a small deterministic tree, exports it, and compares the
// stream against in-source expected bytes. A layout regression (header field
// order, name padding, prologue, alignment, payload placement) fails here
// even when every round-trip test still passes, since round-trips cannot see
// a symmetric format change.
//
// Streams are written in host order, so the expected bytes below assume a
// little-endian host.

#![cfg(target_endian = "little")]

use sds::{Sds, SdsType};

#[test]
fn golden_scalar_int() {
    let mut sds = Sds::new();
    let top = sds.create(None, "top", SdsType::Struct, &[], &[]).unwrap();
    let item = sds
        .create(Some(top), "item", SdsType::Int32, &[], &[])
        .unwrap();
    sds.put(item, 0, &(-2_147_483_647i32).to_ne_bytes()).unwrap();

    #[rustfmt::skip]
    let expected: [u8; 68] = [
        // header: magic, version, order flag, reserved, total length
        0x53, 0x44, 0x53, 0x42,
        0x01, 0x00,
        0x00,
        0x00,
        0x44, 0x00, 0x00, 0x00,
        // root record: "top", struct, no dims, no flags
        0x74, 0x6F, 0x70, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x10, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, // extra length
        0x01, 0x00, 0x00, 0x00, // child count
        // child record: "item", int, defined
        0x69, 0x74, 0x65, 0x6D, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x06, 0x00, 0x01, 0x00,
        0x00, 0x00, 0x00, 0x00, // extra length
        0x01, 0x00, 0x00, 0x80, // -2147483647
    ];

    let bytes = sds.export_vec(top).unwrap();
    assert_eq!(sds.size(top).unwrap(), expected.len());
    assert_eq!(bytes, expected);

    // Decode and re-encode must reproduce the stream bit for bit.
    let copy = sds.import(&bytes).unwrap();
    assert_eq!(sds.export_vec(copy).unwrap(), expected);
}

#[test]
fn golden_primitive_array_with_dims() {
    let mut sds = Sds::new();
    let top = sds.create(None, "grid", SdsType::Struct, &[], &[]).unwrap();
    let arr = sds
        .create(Some(top), "arr", SdsType::UShort, &[3], &[])
        .unwrap();
    sds.put(arr, 0, &[0x01, 0x00, 0x02, 0x00, 0x03, 0x00]).unwrap();

    #[rustfmt::skip]
    let expected: [u8; 74] = [
        // header
        0x53, 0x44, 0x53, 0x42,
        0x01, 0x00,
        0x00,
        0x00,
        0x4A, 0x00, 0x00, 0x00,
        // root record: "grid"
        0x67, 0x72, 0x69, 0x64, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x10, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, // extra length
        0x01, 0x00, 0x00, 0x00, // child count
        // child record: "arr", ushort, 1 dim of 3, defined
        0x61, 0x72, 0x72, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x05, 0x01, 0x01, 0x00,
        0x03, 0x00, 0x00, 0x00, // dims[0]
        0x00, 0x00, 0x00, 0x00, // extra length
        0x01, 0x00, 0x02, 0x00, 0x03, 0x00, // payload
    ];

    let bytes = sds.export_vec(top).unwrap();
    assert_eq!(bytes, expected);
    let copy = sds.import(&bytes).unwrap();
    assert_eq!(sds.export_vec(copy).unwrap(), expected);
}

#[test]
fn golden_empty_structure_array() {
    let mut sds = Sds::new();
    let arr = sds.create(None, "pair", SdsType::Struct, &[2], &[]).unwrap();

    #[rustfmt::skip]
    let expected: [u8; 45] = [
        // header
        0x53, 0x44, 0x53, 0x42,
        0x01, 0x00,
        0x00,
        0x00,
        0x2D, 0x00, 0x00, 0x00,
        // record: "pair", struct, 1 dim of 2
        0x70, 0x61, 0x69, 0x72, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x10, 0x01, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00, // dims[0]
        0x00, 0x00, 0x00, 0x00, // extra length
        // two empty cells, each aligned to 4
        0x00,
        0x00, 0x00, 0x00,
        0x00,
    ];

    let bytes = sds.export_vec(arr).unwrap();
    assert_eq!(bytes, expected);
    let copy = sds.import(&bytes).unwrap();
    assert_eq!(sds.export_vec(copy).unwrap(), expected);
}

#[test]
fn golden_extra_data_padding() {
    let mut sds = Sds::new();
    // Five extra bytes force three bytes of padding before the payload.
    let item = sds
        .create(None, "t", SdsType::UByte, &[2], b"notes")
        .unwrap();
    sds.put(item, 0, &[0xAA, 0xBB]).unwrap();

    #[rustfmt::skip]
    let expected: [u8; 50] = [
        // header
        0x53, 0x44, 0x53, 0x42,
        0x01, 0x00,
        0x00,
        0x00,
        0x32, 0x00, 0x00, 0x00,
        // record: "t", ubyte, 1 dim of 2, defined
        0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x03, 0x01, 0x01, 0x00,
        0x02, 0x00, 0x00, 0x00, // dims[0]
        0x05, 0x00, 0x00, 0x00, // extra length
        0x6E, 0x6F, 0x74, 0x65, 0x73, // "notes"
        0x00, 0x00, 0x00,       // pad to 4
        0xAA, 0xBB,             // payload
    ];

    let bytes = sds.export_vec(item).unwrap();
    assert_eq!(bytes, expected);
    let copy = sds.import(&bytes).unwrap();
    assert_eq!(sds.export_vec(copy).unwrap(), expected);
}
