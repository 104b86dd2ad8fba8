// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Mapped (accessed) trees are read/navigate-only: every mutation fails with
// the external-object error while reads and navigation keep working. Handle
// cloning and freeing follow the same reference counting as owned trees.

use std::rc::Rc;

use sds::{Sds, SdsError, SdsId, SdsType};

fn mapped_fixture(sds: &mut Sds) -> SdsId {
    let top = sds.create(None, "fixture", SdsType::Struct, &[], &[]).unwrap();
    let value = sds
        .create(Some(top), "value", SdsType::Int32, &[], b"meta")
        .unwrap();
    sds.put(value, 0, &77i32.to_ne_bytes()).unwrap();
    let arr = sds
        .create(Some(top), "arr", SdsType::Struct, &[2], &[])
        .unwrap();
    let tpl = sds.create(None, "tpl", SdsType::Struct, &[], &[]).unwrap();
    sds.create(Some(tpl), "x", SdsType::Float32, &[], &[]).unwrap();
    sds.fill_array(arr, tpl).unwrap();
    let bytes = sds.export_vec(top).unwrap();

    // Tear down the source so the mapped tree stands alone.
    sds.delete(top).unwrap();
    sds.delete(tpl).unwrap();
    assert!(sds.is_empty());

    sds.access(Rc::from(bytes)).unwrap()
}

#[test]
fn test_navigation_and_reads_work() {
    let mut sds = Sds::new();
    let root = mapped_fixture(&mut sds);

    assert!(sds.info(root).unwrap().external);
    assert_eq!(sds.item_count(root).unwrap(), 2);

    let value = sds.find(root, "value").unwrap();
    assert!(sds.is_defined(value).unwrap());
    assert_eq!(sds.get_extra(value).unwrap(), b"meta");
    let mut buf = [0u8; 4];
    assert_eq!(sds.get(value, 0, &mut buf).unwrap(), 4);
    assert_eq!(i32::from_ne_bytes(buf), 77);

    let x = sds.find_by_path(root, "arr[1].x").unwrap();
    assert!(sds.info(x).unwrap().external);
    assert_eq!(sds.info(x).unwrap().code, SdsType::Float32);

    // size/export work on mapped trees as well.
    let bytes = sds.export_vec(root).unwrap();
    assert_eq!(bytes.len(), sds.size(root).unwrap());
}

#[test]
fn test_every_mutation_fails_external() {
    let mut sds = Sds::new();
    let root = mapped_fixture(&mut sds);
    let value = sds.find(root, "value").unwrap();
    let arr = sds.find(root, "arr").unwrap();

    assert!(matches!(
        sds.create(Some(root), "new", SdsType::Int32, &[], &[]),
        Err(SdsError::External)
    ));
    assert!(matches!(sds.delete(value), Err(SdsError::External)));
    assert!(matches!(sds.delete(root), Err(SdsError::External)));
    assert!(matches!(sds.extract(value), Err(SdsError::External)));
    assert!(matches!(sds.rename(value, "v2"), Err(SdsError::External)));
    assert!(matches!(sds.resize(arr, &[4]), Err(SdsError::External)));
    assert!(matches!(
        sds.put(value, 0, &[0; 4]),
        Err(SdsError::External)
    ));
    assert!(matches!(
        sds.put_extra(value, b"x"),
        Err(SdsError::External)
    ));

    // Mapped nodes cannot be attached to or detached from owned trees.
    let owned = sds.create(None, "owned", SdsType::Struct, &[], &[]).unwrap();
    assert!(matches!(sds.insert(root, owned), Err(SdsError::External)));

    let tpl = sds.create(None, "tpl", SdsType::Struct, &[], &[]).unwrap();
    assert!(matches!(sds.fill_array(arr, tpl), Err(SdsError::External)));
    let member = sds.create(None, "member", SdsType::Struct, &[], &[]).unwrap();
    assert!(matches!(
        sds.insert_cell(arr, &[0], member),
        Err(SdsError::External)
    ));

    // After all the failed attempts the data is still intact.
    let mut buf = [0u8; 4];
    sds.get(value, 0, &mut buf).unwrap();
    assert_eq!(i32::from_ne_bytes(buf), 77);
}

#[test]
fn test_clone_free_on_mapped_root() {
    let mut sds = Sds::new();
    let root = mapped_fixture(&mut sds);
    let nodes = sds.len();
    assert!(nodes > 1);

    let alias = sds.clone_id(root).unwrap();
    sds.free(root).unwrap();
    assert_eq!(sds.len(), nodes);
    assert!(sds.info(alias).is_ok());

    sds.free(alias).unwrap();
    assert!(sds.is_empty());
    assert!(matches!(sds.info(root), Err(SdsError::InvalidId)));
}

#[test]
fn test_free_attached_mapped_node_is_illegal() {
    let mut sds = Sds::new();
    let root = mapped_fixture(&mut sds);
    let value = sds.find(root, "value").unwrap();
    assert!(matches!(sds.free(value), Err(SdsError::IllegalDelete)));
}

#[test]
fn test_copy_escapes_to_mutable_tree() {
    let mut sds = Sds::new();
    let root = mapped_fixture(&mut sds);

    let copy = sds.copy(root).unwrap();
    assert!(!sds.info(copy).unwrap().external);

    // Copying a mapped tree is equivalent to importing its stream.
    assert_eq!(
        sds.export_vec(copy).unwrap(),
        sds.export_vec(root).unwrap()
    );

    // The copy is mutable and carries the same data.
    let value = sds.find(copy, "value").unwrap();
    let mut buf = [0u8; 4];
    sds.get(value, 0, &mut buf).unwrap();
    assert_eq!(i32::from_ne_bytes(buf), 77);
    sds.put(value, 0, &88i32.to_ne_bytes()).unwrap();
    sds.rename(value, "renamed").unwrap();

    // The mapped original is untouched.
    let original = sds.find(root, "value").unwrap();
    sds.get(original, 0, &mut buf).unwrap();
    assert_eq!(i32::from_ne_bytes(buf), 77);
}

#[test]
fn test_mapped_trees_are_independent_per_access() {
    let mut sds = Sds::new();
    let root1 = mapped_fixture(&mut sds);
    let bytes = sds.export_vec(root1).unwrap();
    let root2 = sds.access(Rc::from(bytes)).unwrap();

    assert_ne!(root1, root2);
    // Freeing one view leaves the other alive.
    sds.free(root1).unwrap();
    let value = sds.find(root2, "value").unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(sds.get(value, 0, &mut buf).unwrap(), 4);
    assert_eq!(i32::from_ne_bytes(buf), 77);
}
