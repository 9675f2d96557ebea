//! Integration tests for the okr-board CLI.
//!
//! None of these reach a real Goals-OKR service.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: [&str; 5] = [
    "OKR_BOARD_API_URL",
    "OKR_BOARD_TOKEN",
    "OKR_BOARD_USER_ID",
    "OKR_BOARD_LANGUAGE",
    "OKR_BOARD_LOG",
];

/// Command isolated from the caller's environment and config.
fn board(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("okr-board");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir.path())
        .arg("--config-dir")
        .arg(dir.path().join("config"));
    cmd
}

/// Temp dir with a board.toml whose data dir lives inside it.
fn configured_dir(extra: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = dir.path().join("data");
    let content = format!(
        r#"
[api]
base_url = "http://127.0.0.1:9"
timeout_secs = 2

[storage]
data_dir = "{}"
{}
"#,
        data_dir.display().to_string().replace('\\', "\\\\"),
        extra
    );
    fs::write(config_dir.join("board.toml"), content).unwrap();
    dir
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        cargo_bin_cmd!("okr-board")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("show"))
            .stdout(predicate::str::contains("limits"));
    }

    #[test]
    fn test_version() {
        cargo_bin_cmd!("okr-board").arg("--version").assert().success();
    }

    #[test]
    fn test_move_requires_a_target() {
        let dir = configured_dir("");
        board(&dir).args(["move", "5"]).assert().failure();
    }

    #[test]
    fn test_invalid_column_rejected() {
        let dir = configured_dir("");
        board(&dir)
            .args(["move", "5", "--column", "BACKLOG"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("BACKLOG"));
    }

    #[test]
    fn test_show_without_user_fails_with_hint() {
        let dir = configured_dir("");
        board(&dir)
            .arg("show")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No user id configured"));
    }

    #[test]
    fn test_show_with_unreachable_service_fails() {
        let dir = configured_dir("[board]\nuser_id = 1\n");
        board(&dir)
            .arg("show")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load the progress board"));
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = TempDir::new().unwrap();
        board(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No board.toml found"))
            .stdout(predicate::str::contains("http://localhost:8080"))
            .stdout(predicate::str::contains("/api/v2/goals-okr"));
    }

    #[test]
    fn test_config_init_creates_toml() {
        let dir = TempDir::new().unwrap();
        board(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created board.toml"));

        let content = fs::read_to_string(dir.path().join("config/board.toml")).unwrap();
        assert!(content.contains("[api]"));
        assert!(content.contains("base_url"));

        board(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_validate_warns_on_bad_values() {
        let dir = configured_dir("[board]\nlanguage = \"fr\"\n");
        board(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Unknown language 'fr'"))
            .stdout(predicate::str::contains("No board.user_id configured"));
    }

    #[test]
    fn test_config_validate_clean() {
        let dir = configured_dir("[board]\nuser_id = 7\nlanguage = \"nl\"\n");
        board(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid."));
    }

    #[test]
    fn test_env_and_cli_overrides() {
        let dir = configured_dir("[board]\nuser_id = 7\n");
        board(&dir)
            .env("OKR_BOARD_USER_ID", "8")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("user_id = 8"));

        board(&dir)
            .env("OKR_BOARD_USER_ID", "8")
            .args(["--user", "9", "--lang", "nl", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("user_id = 9"))
            .stdout(predicate::str::contains("language = \"nl\""));
    }

    #[test]
    fn test_token_is_masked() {
        let dir = configured_dir("");
        board(&dir)
            .env("OKR_BOARD_TOKEN", "s3cret")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("****"))
            .stdout(predicate::str::contains("s3cret").not());
    }
}

// =============================================================================
// WIP Limit Tests
// =============================================================================

mod limits {
    use super::*;

    #[test]
    fn test_limits_empty() {
        let dir = configured_dir("");
        board(&dir)
            .arg("limits")
            .assert()
            .success()
            .stdout(predicate::str::contains("No WIP limits configured"));
    }

    #[test]
    fn test_limits_set_show_unset() {
        let dir = configured_dir("");
        board(&dir)
            .args(["limits", "set", "life", "IN_PROGRESS", "2"])
            .assert()
            .success();

        let stored = dir.path().join("data/goals-okr.kanban.wip-limits.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&stored).unwrap()).unwrap();
        assert_eq!(json["life"]["IN_PROGRESS"], 2);

        board(&dir)
            .args(["limits", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("life"))
            .stdout(predicate::str::contains("IN_PROGRESS"));

        board(&dir)
            .args(["limits", "unset", "life", "in-progress"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed limit 2"));

        board(&dir)
            .arg("limits")
            .assert()
            .success()
            .stdout(predicate::str::contains("No WIP limits configured"));
    }

    #[test]
    fn test_limits_clear() {
        let dir = configured_dir("");
        board(&dir)
            .args(["limits", "set", "business", "TODO", "5"])
            .assert()
            .success();
        board(&dir).args(["limits", "clear"]).assert().success();
        assert!(!dir.path().join("data/goals-okr.kanban.wip-limits.json").exists());
    }

    #[test]
    fn test_corrupt_limits_file_reads_as_empty() {
        let dir = configured_dir("");
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/goals-okr.kanban.wip-limits.json"), "{not json").unwrap();
        board(&dir)
            .arg("limits")
            .assert()
            .success()
            .stdout(predicate::str::contains("No WIP limits configured"));
    }

    #[test]
    fn test_limits_rejects_unknown_wheel() {
        let dir = configured_dir("");
        board(&dir)
            .args(["limits", "set", "work", "TODO", "1"])
            .assert()
            .failure();
    }
}
