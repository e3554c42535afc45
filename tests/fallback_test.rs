use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let orders = common::single_order("R1", "P1", "10.00").unwrap();
    let notifications = common::notifications(&[("P1", "paid")]).unwrap();

    let mut cmd = Command::new(cargo_bin!("mollie-gateway"));
    cmd.arg("reconcile")
        .arg(notifications.path())
        .arg("--orders")
        .arg(orders.path())
        .arg("--db-path")
        .arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."))
        .stdout(predicate::str::contains("R1,P1,completed,complete"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let orders = common::single_order("R1", "P1", "10.00").unwrap();
    let notifications = common::notifications(&[("P1", "paid")]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("mollie-gateway"));
    cmd.arg("reconcile")
        .arg(notifications.path())
        .arg("--orders")
        .arg(orders.path())
        .arg("--db-path")
        .arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
