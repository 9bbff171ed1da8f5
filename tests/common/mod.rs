//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use capyflows_store::{FileStorage, Store};
use tempfile::TempDir;

pub const ALICE: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const TOKEN: &str = "0xABC0000000000000000000000000000000000123";

/// A fresh data directory plus the file storage opened on it.
pub fn temp_storage() -> (TempDir, FileStorage) {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::open(dir.path().join("data")).expect("open storage");
    (dir, storage)
}

/// A new store on the same directory, as after an application restart.
pub fn reopen(storage: &FileStorage) -> Store<FileStorage> {
    Store::new(FileStorage::open(storage.dir()).expect("reopen storage"))
}

/// Run the `capyflows` binary with an isolated home and data dir.
pub fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_capyflows"))
        .env("HOME", home)
        .env_remove("CAPYFLOWS_DATA_DIR")
        .env("RUST_LOG", "warn")
        .arg("--data-dir")
        .arg(home.join("data"))
        .args(args)
        .output()
        .expect("run capyflows")
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "capyflows failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}
