//! End-to-end runs of the `capyflows` binary

use std::fs;

use capyflows_store::DEFAULT_TOKEN;

use crate::common::{ALICE, TOKEN, run_cli, stdout_json};

#[test]
fn show_prints_defaults_on_first_run() {
    let home = tempfile::tempdir().expect("tempdir");
    let state = stdout_json(&run_cli(home.path(), &["show"]));

    assert_eq!(state["token"], DEFAULT_TOKEN);
    assert_eq!(state["profile"]["name"], "");
    assert!(state["profile"]["id"].is_null());
}

#[test]
fn mutations_persist_between_invocations() {
    let home = tempfile::tempdir().expect("tempdir");

    stdout_json(&run_cli(home.path(), &["set-token", TOKEN]));
    stdout_json(&run_cli(home.path(), &["set-profile", "alice", ALICE]));

    let state = stdout_json(&run_cli(home.path(), &["show"]));
    assert_eq!(state["token"], TOKEN);
    assert_eq!(state["profile"]["name"], "alice");
    assert_eq!(state["profile"]["id"], ALICE);

    let cleared = stdout_json(&run_cli(home.path(), &["clear-profile"]));
    assert!(cleared["profile"]["id"].is_null());
    assert_eq!(cleared["token"], TOKEN);
}

#[test]
fn malformed_token_is_accepted() {
    let home = tempfile::tempdir().expect("tempdir");
    let state = stdout_json(&run_cli(home.path(), &["set-token", "not-hex"]));
    assert_eq!(state["token"], "not-hex");
}

#[test]
fn clear_storage_resets_next_run() {
    let home = tempfile::tempdir().expect("tempdir");
    stdout_json(&run_cli(home.path(), &["set-token", TOKEN]));
    stdout_json(&run_cli(home.path(), &["clear-storage"]));

    let state = stdout_json(&run_cli(home.path(), &["show"]));
    assert_eq!(state["token"], DEFAULT_TOKEN);
}

#[test]
fn metadata_resolves_urls() {
    let home = tempfile::tempdir().expect("tempdir");
    let meta = stdout_json(&run_cli(home.path(), &["metadata"]));

    assert_eq!(meta["title"], "CapyFlows");
    assert_eq!(meta["description"], "Onchain trust distribution");
    assert_eq!(meta["launch"], "https://capyflows.vercel.app/trust");
    assert_eq!(
        meta["open_graph_image"],
        "https://capyflows.vercel.app/capyflows-og.png"
    );
}

#[test]
fn unreadable_config_is_a_host_error() {
    let home = tempfile::tempdir().expect("tempdir");
    let config_dir = home.path().join(".capyflows");
    fs::create_dir_all(&config_dir).expect("mkdir");
    fs::write(config_dir.join("config.toml"), "[storage\n").expect("write");

    let output = run_cli(home.path(), &["show"]);
    assert!(!output.status.success());
}
