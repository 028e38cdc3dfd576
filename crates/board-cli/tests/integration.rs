use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mboard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mboard").unwrap();
    cmd.current_dir(dir.path()).env("MBOARD_ROOT", dir.path());
    cmd
}

fn init_board(dir: &TempDir) {
    mboard(dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// mboard init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_board_directory() {
    let dir = TempDir::new().unwrap();
    mboard(&dir).arg("init").assert().success();

    assert!(dir.path().join(".board").is_dir());
    assert!(dir.path().join(".board/config.yaml").exists());
    assert!(dir.path().join(".board/data.json").exists());
}

#[test]
fn init_twice_fails() {
    let dir = TempDir::new().unwrap();
    mboard(&dir).arg("init").assert().success();
    mboard(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn commands_before_init_fail() {
    let dir = TempDir::new().unwrap();
    mboard(&dir)
        .args(["profile", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// profiles
// ---------------------------------------------------------------------------

#[test]
fn profile_create_and_duplicate_email() {
    let dir = TempDir::new().unwrap();
    init_board(&dir);

    mboard(&dir)
        .args(["profile", "create", "Ada", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ada@example.com"));

    mboard(&dir)
        .args(["profile", "create", "Imposter", "ada@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email already exists"));

    mboard(&dir)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("Imposter").not());
}

// ---------------------------------------------------------------------------
// missions
// ---------------------------------------------------------------------------

#[test]
fn mission_lifecycle_awards_points() {
    let dir = TempDir::new().unwrap();
    init_board(&dir);

    // Create a profile and sign in.
    let out = mboard(&dir)
        .args(["-j", "profile", "create", "Ada", "ada@example.com"])
        .output()
        .unwrap();
    let profile: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let id = profile["id"].as_str().unwrap();
    mboard(&dir).args(["use", id]).assert().success();

    let out = mboard(&dir)
        .args(["-j", "mission", "add", "Run", "5k", "--points", "20"])
        .output()
        .unwrap();
    let mission: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(mission["title"], "Run 5k");
    let mission_id = mission["id"].as_str().unwrap();

    mboard(&dir)
        .args(["mission", "toggle", mission_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("+20 pts"));

    mboard(&dir)
        .args(["mission", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run 5k"));

    mboard(&dir)
        .args(["profile", "leaderboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("20"));
}

#[test]
fn toggling_a_progress_completed_recurring_mission_reopens_it() {
    let dir = TempDir::new().unwrap();
    init_board(&dir);

    let out = mboard(&dir)
        .args([
            "-j", "mission", "add", "Run", "--recurrence", "daily", "--user", "u1",
        ])
        .output()
        .unwrap();
    let mission: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let id = mission["id"].as_str().unwrap();

    // Reaching 100% completes without rolling the due date over.
    mboard(&dir)
        .args(["mission", "progress", id, "100", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100%"));

    // Toggling back is a reopen, not another completion.
    mboard(&dir)
        .args(["mission", "toggle", id, "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reopened"))
        .stdout(predicate::str::contains("due again").not());
}

#[test]
fn mission_commands_require_an_owner() {
    let dir = TempDir::new().unwrap();
    init_board(&dir);

    mboard(&dir)
        .args(["mission", "add", "Run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no user selected"));

    mboard(&dir)
        .args(["mission", "add", "Run", "--user", "u1"])
        .assert()
        .success();
}

#[test]
fn dashboard_shows_points_and_notifications() {
    let dir = TempDir::new().unwrap();
    init_board(&dir);

    mboard(&dir)
        .args(["mission", "add", "Stretch", "--user", "u1"])
        .assert()
        .success();

    let out = mboard(&dir)
        .args(["-j", "mission", "list", "--user", "u1"])
        .output()
        .unwrap();
    let missions: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let id = missions[0]["id"].as_str().unwrap();

    mboard(&dir)
        .args(["mission", "toggle", id, "--user", "u1"])
        .assert()
        .success();

    mboard(&dir)
        .args(["dashboard", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10 pts"))
        .stdout(predicate::str::contains("Notifications"));

    mboard(&dir)
        .args(["notify", "list", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));
}
