// ABOUTME: Integration tests for the ecs-runtime CLI commands.
// ABOUTME: Validates --help, init, and client commands against a served manager.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Stdio};

fn ecs_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ecs-runtime"))
}

#[test]
fn help_shows_commands() {
    ecs_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("undeploy"))
        .stdout(predicate::str::contains("state"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ecs-runtime.yml");

    ecs_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--resource-id", "edge-1"])
        .assert()
        .success();

    assert!(config_path.exists(), "ecs-runtime.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("resource_id: edge-1"));
    assert!(content.contains("namespace: ecsRuntime"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ecs-runtime.yml");

    fs::write(&config_path, "namespace: mine").unwrap();

    ecs_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ecs_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn invalid_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("ecs-runtime.yml"), "listen: nowhere\n").unwrap();

    ecs_cmd()
        .current_dir(temp_dir.path())
        .args(["state", "c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn unknown_resource_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("ecs-runtime.yml"), "resource_id: edge-1\n").unwrap();

    ecs_cmd()
        .current_dir(temp_dir.path())
        .args(["--resource", "edge-9", "state", "c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("edge-9"));
}

/// Kills the served manager when the test ends.
struct Served(Child);

impl Drop for Served {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Start `serve` on an ephemeral port and write a client config pointing at it.
fn serve(dir: &Path) -> Served {
    let server_dir = dir.join("server");
    fs::create_dir(&server_dir).unwrap();
    fs::write(server_dir.join("ecs-runtime.yml"), "resource_id: edge-srv\n").unwrap();

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin!("ecs-runtime"))
        .current_dir(&server_dir)
        .args(["--quiet", "serve", "--listen", "127.0.0.1:0"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut addr = String::new();
    BufReader::new(stdout).read_line(&mut addr).unwrap();
    let addr = addr.trim().to_string();
    assert!(!addr.is_empty(), "serve should print its address");

    fs::write(
        dir.join("ecs-runtime.yml"),
        format!("resource_id: cli\nrequest_timeout: 5s\nresources:\n  edge-srv: {addr}\n"),
    )
    .unwrap();
    Served(child)
}

#[test]
fn client_commands_drive_a_served_manager() {
    let temp_dir = tempfile::tempdir().unwrap();
    let _served = serve(temp_dir.path());
    fs::write(
        temp_dir.path().join("demo.yml"),
        "id: c1\nname: demo\nversion: 1.0.0\n",
    )
    .unwrap();

    let client = |args: &[&str]| {
        let mut cmd = ecs_cmd();
        cmd.current_dir(temp_dir.path())
            .args(["--resource", "edge-srv"])
            .args(args);
        cmd
    };

    client(&["-q", "add", "demo.yml"])
        .assert()
        .success()
        .stdout("c1\n");
    client(&["-q", "state", "c1"])
        .assert()
        .success()
        .stdout("AVAILABLE\n");
    client(&["start", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started container c1"));
    client(&["-q", "state", "--poll", "c1"])
        .assert()
        .success()
        .stdout("DEPLOYED\n");
    client(&["undeploy", "c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPLOYED"));
    client(&["stop", "c1"]).assert().success();
    client(&["--json", "undeploy", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"success""#));
    client(&["-q", "state", "c1"])
        .assert()
        .success()
        .stdout("UNKNOWN\n");
    client(&["-q", "info"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("simulated "));
}
