//! CLI integration tests for wstate-replay

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to escape path for TOML on Windows
fn escape_path_for_toml(path: &str) -> String {
    path.replace('\\', "\\\\")
}

fn replay() -> Command {
    let mut cmd = Command::cargo_bin("wstate-replay").unwrap();
    cmd.env_remove("WALLETSTATE_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag_output() {
    replay()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Replay JSON-lines actions"))
        .stdout(predicate::str::contains("--each"))
        .stdout(predicate::str::contains("--slot"))
        .stdout(predicate::str::contains("--hydrate"));
}

#[test]
fn test_replay_from_stdin_prints_final_slot() {
    let input = concat!(
        r#"{"type":"keyboard/shown","payload":{"height":291.0}}"#,
        "\n",
        r#"{"type":"keyboard/hidden"}"#,
        "\n"
    );

    replay()
        .args(["--slot", "keyboard"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""visible":false"#))
        .stdout(predicate::str::contains(r#""last_known_height":291.0"#));
}

#[test]
fn test_each_prints_one_snapshot_per_action() {
    let input = concat!(
        r#"{"type":"modal/opened"}"#,
        "\n",
        r#"{"type":"modal/closed"}"#,
        "\n",
        r#"{"type":"modal/opened"}"#,
        "\n"
    );

    let output = replay()
        .args(["--each", "--slot", "modal"])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![r#"{"visible":true}"#, r#"{"visible":false}"#, r#"{"visible":true}"#]
    );
}

#[test]
fn test_unrecognized_actions_are_reported_not_fatal() {
    let input = concat!(
        r#"{"type":"gas/prices_updated","payload":{"fast":40}}"#,
        "\n",
        r#"{"type":"readiness/wallet_ready_changed","payload":true}"#,
        "\n",
        r#"{"type":"gas/prices_updated"}"#,
        "\n"
    );

    replay()
        .args(["--slot", "readiness"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""wallet_ready":true"#))
        .stderr(predicate::str::contains("Unrecognized action: gas/prices_updated (2)"));
}

#[test]
fn test_malformed_line_exits_with_input_error() {
    replay()
        .write_stdin("{\"type\":\"modal/opened\"}\n{not json\n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_unknown_slot_exits_with_input_error() {
    replay()
        .args(["--slot", "gas"])
        .write_stdin("")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unknown slot"));
}

#[test]
fn test_missing_input_file_fails() {
    replay()
        .arg("/nonexistent/actions.jsonl")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_hydrate_reads_file_backend() {
    let temp_dir = TempDir::new().unwrap();
    let storage_path = temp_dir.path().join("storage.json");
    let config_path = temp_dir.path().join("config.toml");

    fs::write(
        &storage_path,
        r#"{"language":{"data":"ko_KR","storageVersion":"0.1.0"},"chainId":{"data":4,"storageVersion":"0.1.0"}}"#,
    )
    .unwrap();
    fs::write(
        &config_path,
        format!(
            "[storage]\nbackend = \"file\"\npath = \"{}\"\n",
            escape_path_for_toml(&storage_path.to_string_lossy())
        ),
    )
    .unwrap();

    replay()
        .args(["--hydrate", "--slot", "settings", "--config"])
        .arg(&config_path)
        .write_stdin(r#"{"type":"settings/testnets_pref_changed","payload":true}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""language":"ko_KR""#))
        .stdout(predicate::str::contains(r#""network":"rinkeby""#))
        .stdout(predicate::str::contains(r#""testnets_enabled":true"#));
}

#[test]
fn test_wallets_slot() {
    replay()
        .args(["--slot", "wallets"])
        .write_stdin(r#"{"type":"wallets/loading_set","payload":"backing_up"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""is_wallet_loading":"backing_up""#))
        .stdout(predicate::str::contains(r#""wallets":null"#));
}

#[test]
fn test_pretty_format() {
    replay()
        .args(["--format", "pretty", "--slot", "swipe"])
        .write_stdin(r#"{"type":"swipe/velocity_updated","payload":2.5}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"velocity\": 2.5"));
}
