//! Integration tests for the bootstrap sequence (`run`, the default command).

use predicates::prelude::*;
use qrprint_launcher::utils::venv_python_path;

use crate::common::TestInstall;

/// Mark `.venv` as ready without a runnable interpreter.
fn write_placeholder_venv(install: &TestInstall) {
    let venv = install.path().join(".venv");
    let python = venv_python_path(&venv);
    std::fs::create_dir_all(python.parent().unwrap()).unwrap();
    std::fs::write(&python, "").unwrap();
    std::fs::write(venv.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();
}

#[test]
fn test_missing_entry_point_exits_with_error() {
    let install = TestInstall::new().unwrap();
    write_placeholder_venv(&install);

    install
        .launcher()
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Not a git repository, skipping update check"))
        .stdout(predicate::str::contains("Virtual environment already exists"))
        .stdout(predicate::str::contains("Installing dependencies").not())
        .stderr(predicate::str::contains("Entry point not found"))
        .stderr(predicate::str::contains("gui_qr_print_service.py"));
}

#[test]
fn test_broken_environment_is_not_deleted() {
    let install = TestInstall::new().unwrap();
    install.write_entry_point().unwrap();
    std::fs::create_dir(install.path().join(".venv")).unwrap();

    install
        .launcher()
        .arg("run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("incomplete"))
        .stderr(predicate::str::contains("Delete"));

    assert!(install.path().join(".venv").is_dir());
}

#[test]
fn test_missing_interpreter_exits_with_error() {
    let install = TestInstall::new().unwrap();
    install.write_entry_point().unwrap();
    install.write("qrprint.toml", "interpreters = [\"qrprint-no-such-python\"]\n").unwrap();

    install
        .launcher()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Python was not found"))
        .stderr(predicate::str::contains("qrprint-no-such-python"));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let install = TestInstall::new().unwrap();
    install.write("qrprint.toml", "venv_dir = \n").unwrap();

    install
        .launcher()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_quiet_hides_progress_lines() {
    let install = TestInstall::new().unwrap();
    write_placeholder_venv(&install);

    install
        .launcher()
        .arg("--quiet")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Not a git repository").not())
        .stderr(predicate::str::contains("Entry point not found"));
}

/// A `git` on `PATH` that only logs its arguments.
#[cfg(unix)]
fn write_git_stub(install: &TestInstall) -> (std::path::PathBuf, std::path::PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let bin = install.root().join("stub-bin");
    let log = install.root().join("git-calls.log");
    std::fs::create_dir_all(&bin).unwrap();
    let git = bin.join("git");
    std::fs::write(&git, format!("#!/bin/sh\necho \"$*\" >> \"{}\"\nexit 1\n", log.display())).unwrap();
    std::fs::set_permissions(&git, std::fs::Permissions::from_mode(0o755)).unwrap();
    (bin, log)
}

#[cfg(unix)]
#[test]
fn test_no_checkout_marker_never_invokes_git() {
    let install = TestInstall::new().unwrap();
    write_placeholder_venv(&install);
    let (bin, log) = write_git_stub(&install);

    install
        .launcher()
        .env("PATH", &bin)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Not a git repository, skipping update check"));

    assert!(!log.exists(), "git was invoked: {:?}", std::fs::read_to_string(&log));
}

#[cfg(unix)]
#[test]
fn test_checkout_marker_consults_git_on_path() {
    let install = TestInstall::new().unwrap();
    write_placeholder_venv(&install);
    std::fs::create_dir(install.path().join(".git")).unwrap();
    let (bin, log) = write_git_stub(&install);

    install
        .launcher()
        .env("PATH", &bin)
        .assert()
        .failure()
        .stdout(predicate::str::contains("skipping update check"));

    let calls = std::fs::read_to_string(&log).unwrap();
    assert_eq!(calls.lines().next(), Some("--version"));
}

#[cfg(unix)]
mod with_interpreter {
    use super::*;
    use qrprint_launcher::test_utils::FakePython;

    #[test]
    fn test_fallback_dependency_and_launch() {
        let install = TestInstall::new().unwrap();
        install.write_entry_point().unwrap();
        let fake = FakePython::new(install.root().join("calls.log")).app_exit(7);
        fake.write_venv(&install.path().join(".venv")).unwrap();

        install
            .launcher()
            .assert()
            .success()
            .stdout(predicate::str::contains("Virtual environment already exists"))
            .stdout(predicate::str::contains("Dependencies installed"))
            .stdout(predicate::str::contains("application started"))
            .stdout(predicate::str::contains("QR Print Client has closed."));

        let calls = fake.calls();
        assert_eq!(calls.len(), 3, "unexpected calls: {calls:?}");
        assert_eq!(calls[0], "-m pip install --upgrade pip");
        assert_eq!(calls[1], "-m pip install requests");
        assert!(calls[2].ends_with("gui_qr_print_service.py"));
    }

    #[test]
    fn test_requirements_manifest_is_installed() {
        let install = TestInstall::new().unwrap();
        install.write_entry_point().unwrap();
        install.write("requirements.txt", "requests>=2.31.0\n").unwrap();
        let fake = FakePython::new(install.root().join("calls.log"));
        fake.write_venv(&install.path().join(".venv")).unwrap();

        install.launcher().assert().success();

        let calls = fake.calls();
        assert!(calls[1].starts_with("-m pip install -r"));
        assert!(calls[1].ends_with("requirements.txt"));
    }

    #[test]
    fn test_pip_failure_does_not_stop_launch() {
        let install = TestInstall::new().unwrap();
        install.write_entry_point().unwrap();
        let fake = FakePython::new(install.root().join("calls.log")).pip_exit(1);
        fake.write_venv(&install.path().join(".venv")).unwrap();

        install
            .launcher()
            .assert()
            .success()
            .stdout(predicate::str::contains("pip upgrade failed (exit code 1)"))
            .stdout(predicate::str::contains("Dependencies installed").not())
            .stdout(predicate::str::contains("application started"));
    }

    #[test]
    fn test_second_run_reuses_environment() {
        let install = TestInstall::new().unwrap();
        install.write_entry_point().unwrap();
        let fake = FakePython::new(install.root().join("calls.log"));
        let base = fake.write(&install.root().join("base-python")).unwrap();
        install.write("qrprint.toml", &format!("interpreters = [\"{}\"]\n", base.display())).unwrap();

        install
            .launcher()
            .assert()
            .success()
            .stdout(predicate::str::contains("Virtual environment created with Python 3.11.4"));

        install
            .launcher()
            .assert()
            .success()
            .stdout(predicate::str::contains("Virtual environment already exists"));

        let venv_calls = fake.calls().iter().filter(|c| c.starts_with("-m venv")).count();
        assert_eq!(venv_calls, 1);
    }

    #[test]
    fn test_too_old_interpreter_exits_with_error() {
        let install = TestInstall::new().unwrap();
        install.write_entry_point().unwrap();
        let base = FakePython::new(install.root().join("calls.log"))
            .version("3.6.15")
            .write(&install.root().join("old-python"))
            .unwrap();
        install.write("qrprint.toml", &format!("interpreters = [\"{}\"]\n", base.display())).unwrap();

        install
            .launcher()
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("3.6.15"))
            .stderr(predicate::str::contains("too old"));

        assert!(!install.path().join(".venv").exists());
    }

    /// Ctrl-C in a terminal reaches the whole process group. The application
    /// handles it and exits; the launcher must outlive it and close normally.
    #[test]
    fn test_interrupt_lets_application_close_cleanly() {
        use std::os::unix::fs::PermissionsExt;
        use std::os::unix::process::CommandExt;
        use std::process::{Command, Stdio};
        use std::time::{Duration, Instant};

        let install = TestInstall::new().unwrap();
        install.write_entry_point().unwrap();
        let ready = install.root().join("app-ready");
        let venv = install.path().join(".venv");
        let python = venv_python_path(&venv);
        std::fs::create_dir_all(python.parent().unwrap()).unwrap();
        std::fs::write(venv.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();
        let script = format!(
            r#"#!/bin/sh
case "$1" in
  -m) exit 0 ;;
esac
trap 'echo "application interrupted"; exit 0' INT
touch "{ready}"
while :; do sleep 0.1; done
"#,
            ready = ready.display()
        );
        std::fs::write(&python, script).unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        let child = Command::new(env!("CARGO_BIN_EXE_qrprint-launcher"))
            .arg("--install-dir")
            .arg(install.path())
            .env("NO_COLOR", "1")
            .env("QRPRINT_NO_PROGRESS", "1")
            .env_remove("QRPRINT_INSTALL_DIR")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(30);
        while !ready.exists() {
            assert!(Instant::now() < deadline, "application never started");
            std::thread::sleep(Duration::from_millis(50));
        }
        std::thread::sleep(Duration::from_millis(200));

        let kill = Command::new("sh")
            .arg("-c")
            .arg(format!("kill -s INT -- -{}", child.id()))
            .status()
            .unwrap();
        assert!(kill.success());

        let output = child.wait_with_output().unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success(), "launcher exited with {:?}\n{stdout}", output.status);
        assert!(stdout.contains("application interrupted"));
        assert!(stdout.contains("QR Print Client has closed."));
    }
}
