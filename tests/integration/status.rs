//! Integration tests for `status`.

use predicates::prelude::*;

use crate::common::TestInstall;

#[test]
fn test_status_reports_without_changes() {
    let install = TestInstall::new().unwrap();
    install.write("qrprint.toml", "interpreters = [\"qrprint-no-such-python\"]\n").unwrap();

    install
        .launcher()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Checkout: not a git checkout"))
        .stdout(predicate::str::contains("Environment: absent"))
        .stdout(predicate::str::contains("Entry point: gui_qr_print_service.py (missing)"))
        .stdout(predicate::str::contains("Interpreter: not found"));

    assert!(!install.path().join(".venv").exists());
}

#[test]
fn test_status_reports_broken_environment() {
    let install = TestInstall::new().unwrap();
    install.write_entry_point().unwrap();
    std::fs::create_dir(install.path().join(".venv")).unwrap();

    install
        .launcher()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment: broken (missing pyvenv.cfg)"))
        .stdout(predicate::str::contains("Entry point: gui_qr_print_service.py (found)"));
}

#[test]
fn test_missing_install_dir_is_an_error() {
    let install = TestInstall::new().unwrap();

    crate::common::launcher_cmd()
        .arg("status")
        .arg("--install-dir")
        .arg(install.root().join("does-not-exist"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist"));
}
