//! Store behaviour across restarts on real files

use std::fs;

use capyflows_store::{
    Address, DEFAULT_TOKEN, Hydration, Profile, ProfileInput, STORAGE_KEY, StateStorage, Store,
};

use crate::common::{ALICE, TOKEN, reopen, temp_storage};

#[test]
fn first_run_uses_defaults() {
    let (_dir, storage) = temp_storage();
    let store = Store::new(storage);

    assert_eq!(store.hydration(), Hydration::Fresh);
    assert_eq!(store.token().as_str(), DEFAULT_TOKEN);
    assert_eq!(*store.profile(), Profile::default());
}

#[test]
fn token_survives_restart() {
    let (_dir, storage) = temp_storage();
    let mut store = Store::new(storage.clone());
    store.set_token(TOKEN);

    let restarted = reopen(&storage);
    assert_eq!(restarted.hydration(), Hydration::Restored);
    assert_eq!(restarted.token().as_str(), TOKEN);
}

#[test]
fn profile_survives_restart_and_clear_is_persisted() {
    let (_dir, storage) = temp_storage();
    let mut store = Store::new(storage.clone());
    store.set_current_profile(ProfileInput::new("alice", ALICE));

    let mut restarted = reopen(&storage);
    assert_eq!(restarted.profile().name(), "alice");
    assert_eq!(restarted.profile().id(), Some(&Address::from(ALICE)));

    restarted.clear_current_profile();
    assert!(reopen(&storage).profile().is_empty());
}

#[test]
fn corrupt_slot_falls_back_to_defaults() {
    let (_dir, storage) = temp_storage();
    let path = storage.slot_path(STORAGE_KEY).expect("slot path");
    fs::write(&path, "{\"state\": {").expect("write corrupt");

    let store = Store::new(storage);
    assert_eq!(store.hydration(), Hydration::Corrupt);
    assert_eq!(store.token().as_str(), DEFAULT_TOKEN);
    assert!(store.profile().is_empty());
}

#[test]
fn corrupt_slot_is_overwritten_by_next_mutation() {
    let (_dir, storage) = temp_storage();
    storage.set_item(STORAGE_KEY, "garbage").expect("seed");

    let mut store = Store::new(storage.clone());
    store.set_token(TOKEN);

    assert_eq!(reopen(&storage).hydration(), Hydration::Restored);
}

#[test]
fn slot_layout_is_state_plus_version() {
    let (_dir, storage) = temp_storage();
    let mut store = Store::new(storage.clone());
    store.set_current_profile(ProfileInput::new("alice", ALICE));

    let raw = storage
        .get_item(STORAGE_KEY)
        .expect("read")
        .expect("slot written");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(
        value,
        serde_json::json!({
            "state": {
                "profile": { "name": "alice", "id": ALICE },
                "token": DEFAULT_TOKEN,
            },
            "version": 0,
        })
    );
}

#[cfg(unix)]
#[test]
fn slot_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, storage) = temp_storage();
    let mut store = Store::new(storage.clone());
    store.set_token(TOKEN);

    let path = storage.slot_path(STORAGE_KEY).expect("slot path");
    let mode = fs::metadata(path).expect("metadata").permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}
