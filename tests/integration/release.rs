//! Integration tests for `release`.

use predicates::prelude::*;
use std::fs::File;

use crate::common::TestInstall;

#[test]
fn test_release_packages_present_files() {
    let install = TestInstall::new().unwrap();
    install.write_entry_point().unwrap();
    install.write("install.sh", "#!/bin/sh\n").unwrap();
    install.write("requirements.txt", "requests>=2.31.0\n").unwrap();
    let output = install.root().join("dist");

    install
        .launcher()
        .arg("release")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Copied gui_qr_print_service.py"))
        .stdout(predicate::str::contains("⚠ Warning: README.md not found"))
        .stdout(predicate::str::contains("✓ Added install.sh to ZIP"))
        .stdout(predicate::str::contains("Release created"));

    let archive = zip::ZipArchive::new(File::open(output.join("qr-print-client.zip")).unwrap()).unwrap();
    let mut entries: Vec<&str> = archive.file_names().collect();
    entries.sort_unstable();
    assert_eq!(entries, vec!["gui_qr_print_service.py", "install.sh", "requirements.txt"]);

    assert!(output.join("release").join("install.sh").is_file());
    let checksum = std::fs::read_to_string(output.join("qr-print-client.zip.sha256")).unwrap();
    assert!(checksum.ends_with("  qr-print-client.zip\n"));
}

#[test]
fn test_release_with_nothing_to_package_fails() {
    let install = TestInstall::new().unwrap();

    install
        .launcher()
        .arg("release")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No release files found"));
}
