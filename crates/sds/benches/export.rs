// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization throughput benchmark.
//!
//! Measures size/export/import over trees of growing width: a flat structure
//! of float arrays, and a structure array of small cells. Isolates codec
//! overhead without file I/O.

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sds::{Sds, SdsId, SdsType};
use std::hint::black_box as bb;

/// Flat structure with `fields` float arrays of `elems` elements each.
fn build_flat(sds: &mut Sds, fields: usize, elems: u32) -> SdsId {
    let top = sds.create(None, "bench", SdsType::Struct, &[], &[]).unwrap();
    let payload: Vec<u8> = (0..elems as usize * 8).map(|i| i as u8).collect();
    for f in 0..fields {
        let name = format!("f{}", f);
        let item = sds
            .create(Some(top), &name, SdsType::Float64, &[elems], &[])
            .unwrap();
        sds.put(item, 0, &payload).unwrap();
    }
    top
}

/// Structure array of `cells` cells with two scalar fields each.
fn build_cells(sds: &mut Sds, cells: u32) -> SdsId {
    let arr = sds
        .create(None, "cells", SdsType::Struct, &[cells], &[])
        .unwrap();
    let tpl = sds.create(None, "tpl", SdsType::Struct, &[], &[]).unwrap();
    let a = sds.create(Some(tpl), "a", SdsType::Int32, &[], &[]).unwrap();
    sds.put(a, 0, &1i32.to_ne_bytes()).unwrap();
    let b = sds.create(Some(tpl), "b", SdsType::Float64, &[], &[]).unwrap();
    sds.put(b, 0, &2.5f64.to_ne_bytes()).unwrap();
    sds.fill_array(arr, tpl).unwrap();
    sds.delete(tpl).unwrap();
    arr
}

fn bench_export_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_flat");
    for fields in [4usize, 64, 256] {
        let mut sds = Sds::new();
        let top = build_flat(&mut sds, fields, 128);
        let mut buf = vec![0u8; sds.size(top).unwrap()];
        group.bench_with_input(BenchmarkId::from_parameter(fields), &fields, |bench, _| {
            bench.iter(|| bb(sds.export(bb(top), &mut buf).unwrap()));
        });
    }
    group.finish();
}

fn bench_import_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_flat");
    for fields in [4usize, 64, 256] {
        let mut sds = Sds::new();
        let top = build_flat(&mut sds, fields, 128);
        let bytes = sds.export_vec(top).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(fields), &fields, |bench, _| {
            bench.iter(|| {
                let mut fresh = Sds::new();
                bb(fresh.import(bb(&bytes)).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_structure_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure_array");
    for cells in [16u32, 256] {
        let mut sds = Sds::new();
        let arr = build_cells(&mut sds, cells);
        let bytes = sds.export_vec(arr).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(cells), &cells, |bench, _| {
            bench.iter(|| {
                let mut fresh = Sds::new();
                bb(fresh.import(bb(&bytes)).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_size(c: &mut Criterion) {
    let mut sds = Sds::new();
    let top = build_flat(&mut sds, 64, 128);
    c.bench_function("size_flat_64", |bench| {
        bench.iter(|| bb(sds.size(bb(top)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_export_flat,
    bench_import_flat,
    bench_structure_array,
    bench_size
);
criterion_main!(benches);
