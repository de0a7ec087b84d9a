//! Mapping file durability and locking

use std::fs;
use tempfile::TempDir;
use veil::config::secret_string;
use veil::domain::{Category, StoreError};
use veil::pseudonymization::digest::digest;
use veil::pseudonymization::{MappingLock, PseudonymStore, Pseudonymizer, ReverseLookup, StoreSet};

#[test]
fn test_missing_files_are_created_with_header() {
    let dir = TempDir::new().unwrap();

    let stores = StoreSet::load(dir.path(), ReverseLookup::OnDemand).unwrap();

    assert_eq!(stores.total_len(), 0);
    for category in Category::ALL {
        let contents = fs::read_to_string(dir.path().join(category.file_name())).unwrap();
        assert_eq!(contents.trim_end(), "Origin,Transformed");
    }
}

#[test]
fn test_legacy_headerless_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("device.csv");
    fs::write(&path, "dev-1,aaaa\r\ndev-2,bbbb\r\n").unwrap();

    let mut store = PseudonymStore::load(Category::Device, &path, ReverseLookup::Indexed).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.lookup_forward("dev-2"), Some("bbbb"));
    assert_eq!(store.lookup_reverse("aaaa").unwrap(), Some("dev-1"));

    // Rewriting restores the header
    store.upsert("dev-3".to_string(), "cccc".to_string());
    store.flush().unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("Origin,Transformed\n"));
}

#[test]
fn test_conflicting_rows_are_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ip.csv");
    fs::write(&path, "Origin,Transformed\n1.1.1.1,aaaa\n1.1.1.1,bbbb\n").unwrap();

    let err = PseudonymStore::load(Category::Ip, &path, ReverseLookup::OnDemand).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { line: 3, .. }));
}

#[test]
fn test_flush_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let stores = StoreSet::load(dir.path(), ReverseLookup::OnDemand).unwrap();
    let mut pseudonymizer = Pseudonymizer::new(secret_string("s".to_string()), stores);

    for i in 0..50 {
        pseudonymizer.pseudonymize(Category::Ip, &format!("10.0.{}.{}", i / 10, i % 10));
    }
    assert_eq!(pseudonymizer.flush_dirty().unwrap(), vec![Category::Ip]);
    assert!(pseudonymizer.flush_dirty().unwrap().is_empty());

    let names = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 2, "unexpected files: {names:?}");

    let reloaded = StoreSet::load(dir.path(), ReverseLookup::OnDemand).unwrap();
    assert_eq!(reloaded.get(Category::Ip).len(), 50);
    assert_eq!(
        reloaded.get(Category::Ip).lookup_forward("10.0.4.2"),
        Some(digest("10.0.4.2", "s").as_str())
    );
}

#[test]
fn test_salt_rotation_keeps_recorded_pseudonyms() {
    let dir = TempDir::new().unwrap();
    let stores = StoreSet::load(dir.path(), ReverseLookup::OnDemand).unwrap();
    let mut old = Pseudonymizer::new(secret_string("old".to_string()), stores);
    let recorded = old.pseudonymize(Category::Device, "dev-1");
    old.flush_dirty().unwrap();

    let stores = StoreSet::load(dir.path(), ReverseLookup::OnDemand).unwrap();
    let mut new = Pseudonymizer::new(secret_string("new".to_string()), stores);

    assert_eq!(new.pseudonymize(Category::Device, "dev-1"), recorded);
    assert_eq!(
        new.pseudonymize(Category::Device, "dev-2"),
        digest("dev-2", "new")
    );
}

#[test]
fn test_mapping_lock_is_exclusive() {
    let dir = TempDir::new().unwrap();

    let lock = MappingLock::acquire(dir.path()).unwrap();
    assert!(matches!(
        MappingLock::acquire(dir.path()),
        Err(StoreError::Locked { .. })
    ));

    drop(lock);
    assert!(MappingLock::acquire(dir.path()).is_ok());
}
