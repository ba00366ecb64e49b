use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn tt_pack() -> Command {
    let mut cmd = Command::cargo_bin("tt_pack").expect("binary");
    cmd.env_remove("TT_CLI_CFG");
    cmd
}

#[test]
fn test_requires_package_type() {
    tt_pack()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect combination of command parameters"));
}

#[test]
fn test_rejects_extra_positional_arguments() {
    tt_pack().args(["tgz", "rpm"]).assert().failure();
}

#[test]
fn test_unknown_package_type() {
    let dir = tempfile::tempdir().expect("tempdir");
    tt_pack()
        .current_dir(dir.path())
        .arg("zip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect type of package: 'zip'"));
}

#[test]
fn test_packs_tarball() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = dir.path().join("instances.enabled/myapp");
    fs::create_dir_all(&app).expect("create app dir");
    fs::write(app.join("init.lua"), "box.cfg{}\n").expect("write init.lua");

    tt_pack()
        .current_dir(dir.path())
        .args(["tgz", "--name", "myapp", "--version", "1.0", "--without-binaries", "--deps", "tarantool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("myapp-1.0.tar.gz"))
        .stderr(predicate::str::contains("You specified the --deps flag"));

    assert!(dir.path().join("myapp-1.0.tar.gz").is_file());
}

#[test]
fn test_missing_preinst_fails_without_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("instances.enabled/myapp")).expect("create app dir");

    tt_pack()
        .current_dir(dir.path())
        .args(["rpm", "--name", "myapp", "--version", "1.0", "--without-binaries"])
        .args(["--preinst", "/nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to pack"));

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .collect();
    assert!(leftovers.is_empty());
}
