mod common;

use common::{clear_config_env, run_cli};
use serde_json::Value;
use serial_test::serial;

#[test]
#[serial]
fn defaults_are_reported_as_default() {
    clear_config_env();
    let res = run_cli(&["cfg"], "");
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    let json: Value = serde_json::from_str(&res.stdout).unwrap();

    assert_eq!(json["players"]["value"][0], "Alice");
    assert_eq!(json["players"]["value"].as_array().unwrap().len(), 4);
    assert_eq!(json["small_blind"]["value"], 10);
    assert_eq!(json["big_blind"]["value"], 20);
    assert_eq!(json["seed"]["value"], Value::Null);
    assert_eq!(json["ai"]["value"], "baseline");
    for field in ["players", "small_blind", "big_blind", "seed", "ai", "log_dir"] {
        assert_eq!(json[field]["source"], "default", "{}", field);
    }
}

#[test]
#[serial]
fn environment_beats_file() {
    clear_config_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rivertable.toml");
    std::fs::write(
        &path,
        "seed = 456\nsmall_blind = 5\nbig_blind = 10\nplayers = [\"Ann\", \"Ben\"]\n",
    )
    .unwrap();
    unsafe {
        std::env::set_var("RIVERTABLE_CONFIG", &path);
        std::env::set_var("RIVERTABLE_SEED", "9");
    }

    let res = run_cli(&["cfg"], "");
    clear_config_env();
    assert_eq!(res.code, 0, "stderr: {}", res.stderr);
    let json: Value = serde_json::from_str(&res.stdout).unwrap();
    assert_eq!(json["seed"]["value"], 9);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["small_blind"]["value"], 5);
    assert_eq!(json["small_blind"]["source"], "file");
    assert_eq!(json["players"]["value"][1], "Ben");
    assert_eq!(json["starting_balance"]["source"], "default");
}

#[test]
#[serial]
fn malformed_values_fail_with_exit_code_two() {
    clear_config_env();
    unsafe {
        std::env::set_var("RIVERTABLE_SEED", "abc");
    }
    let res = run_cli(&["cfg"], "");
    clear_config_env();
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("Invalid seed"));

    unsafe {
        std::env::set_var("RIVERTABLE_SMALL_BLIND", "40");
    }
    let res = run_cli(&["cfg"], "");
    clear_config_env();
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("0 < small <= big"));
}

#[test]
#[serial]
fn unknown_file_keys_are_rejected() {
    clear_config_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rivertable.toml");
    std::fs::write(&path, "level = 3\n").unwrap();
    unsafe {
        std::env::set_var("RIVERTABLE_CONFIG", &path);
    }
    let res = run_cli(&["cfg"], "");
    clear_config_env();
    assert_eq!(res.code, 2);
    assert!(res.stderr.contains("cannot parse config file"));
}
