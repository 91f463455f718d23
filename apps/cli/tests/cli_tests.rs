//! simple-pid 命令行端到端测试

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const WITHIN_TOLERANCE: &str = "Process variable is within tolerance of set value. Stopping...";

/// 隔离用户配置目录，避免读到本机的配置文件
fn simple_pid(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("simple-pid").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_simulate_converges() {
    let home = TempDir::new().unwrap();

    simple_pid(&home)
        .args(["simulate", "--sv", "2", "--pv", "0", "--interval-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"{"sv":2.0,"pv":"0.10","p":"2.40","i":"2.00","d":"0.02"}"#,
        ))
        .stdout(predicate::str::ends_with(format!("{WITHIN_TOLERANCE}\n")));
}

#[test]
fn test_simulate_accepts_negative_values() {
    let home = TempDir::new().unwrap();

    simple_pid(&home)
        .args(["simulate", "--sv", "-0.5", "--pv", "0", "--interval-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"{"sv":-0.5,"pv":"-0.10""#))
        .stdout(predicate::str::contains(WITHIN_TOLERANCE));
}

#[test]
fn test_simulate_stops_at_max_steps() {
    let home = TempDir::new().unwrap();

    simple_pid(&home)
        .args([
            "simulate",
            "--sv",
            "10",
            "--pv",
            "0",
            "--max-steps",
            "3",
            "--interval-ms",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped after 3 of 3 steps"))
        .stdout(predicate::str::contains(WITHIN_TOLERANCE).not());
}

#[test]
fn test_simulate_rejects_non_finite_gain() {
    let home = TempDir::new().unwrap();

    simple_pid(&home)
        .args(["simulate", "--sv", "1", "--pv", "0", "--kp", "nan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_simulate_rejects_zero_dt() {
    let home = TempDir::new().unwrap();

    simple_pid(&home)
        .args(["simulate", "--sv", "1", "--pv", "0", "--dt", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pid.dt must be non-zero"));
}

#[test]
fn test_config_init_and_show() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("nested").join("config.toml");
    let path_arg = path.to_str().unwrap();

    simple_pid(&home)
        .args(["config", "init", "--path", path_arg])
        .assert()
        .success();
    assert!(path.exists());

    simple_pid(&home)
        .args(["config", "show", "--path", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("k_p = 1.2"))
        .stdout(predicate::str::contains("max_steps = 500"));

    // 已存在时需要 --force
    simple_pid(&home)
        .args(["config", "init", "--path", path_arg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    simple_pid(&home)
        .args(["config", "init", "--path", path_arg, "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_file_drives_simulation() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");
    fs::write(
        &path,
        "[pid]\nk_p = 2.0\nk_i = 0.0\nk_d = 0.0\n\n[simulation]\ninterval_ms = 0\nmax_steps = 1\n",
    )
    .unwrap();

    simple_pid(&home)
        .args(["simulate", "--sv", "1", "--pv", "0", "--config", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"{"sv":1.0,"pv":"0.10","p":"2.00","i":"0.00","d":"0.00"}"#,
        ))
        .stdout(predicate::str::contains("Stopped after 1 of 1 steps"));
}

#[test]
fn test_config_file_with_zero_dt_is_rejected() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");
    fs::write(&path, "[pid]\ndt = 0.0\n").unwrap();

    simple_pid(&home)
        .args(["simulate", "--sv", "1", "--pv", "0", "--config", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pid.dt must be non-zero"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("absent.toml");

    simple_pid(&home)
        .args(["config", "show", "--path", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_tolerance_rejects_non_numeric_input() {
    let home = TempDir::new().unwrap();

    simple_pid(&home)
        .arg("tolerance")
        .write_stdin("ten\n0\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input. Please enter numbers only."));
}
