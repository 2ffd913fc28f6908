//! Release packaging
//!
//! Builds the distributable archive of an installation:
//!
//! 1. recreate `<output>/release/`
//! 2. copy each configured release file into it, warning about missing ones
//! 3. zip the directory into `<output>/qr-print-client.zip` with deflate
//! 4. write `<output>/qr-print-client.zip.sha256` in `sha256sum` format

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::constants::{RELEASE_DIR_NAME, RELEASE_ZIP_NAME};
use crate::core::LauncherError;
use crate::utils::report::StatusReporter;

/// Files produced by a release build.
#[derive(Debug, Clone)]
pub struct ReleaseArtifact {
    /// The archive
    pub zip_path: PathBuf,
    /// The staging directory the archive was built from
    pub release_dir: PathBuf,
    /// Archive entry names, in archive order
    pub files: Vec<String>,
    /// Hex SHA-256 of the archive
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

impl ReleaseArtifact {
    /// Path of the checksum file next to the archive.
    #[must_use]
    pub fn checksum_path(&self) -> PathBuf {
        let mut name = self.zip_path.as_os_str().to_owned();
        name.push(".sha256");
        PathBuf::from(name)
    }
}

/// Copies and archives release files.
pub struct ReleasePackager {
    source_dir: PathBuf,
    output_dir: PathBuf,
    files: Vec<String>,
}

impl ReleasePackager {
    pub fn new(source_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>, files: Vec<String>) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            files,
        }
    }

    #[must_use]
    pub fn release_dir(&self) -> PathBuf {
        self.output_dir.join(RELEASE_DIR_NAME)
    }

    #[must_use]
    pub fn zip_path(&self) -> PathBuf {
        self.output_dir.join(RELEASE_ZIP_NAME)
    }

    /// Run all four steps.
    pub fn package(&self, reporter: &StatusReporter) -> Result<ReleaseArtifact> {
        let release_dir = self.release_dir();
        self.stage(&release_dir, reporter)?;

        let zip_path = self.zip_path();
        let files = write_zip(&release_dir, &zip_path, reporter)?;

        let sha256 = compute_sha256(&zip_path)?;
        let artifact = ReleaseArtifact {
            zip_path,
            release_dir,
            files,
            sha256,
            created_at: Utc::now(),
        };

        let zip_name = artifact
            .zip_path
            .file_name()
            .map_or_else(|| RELEASE_ZIP_NAME.to_string(), |n| n.to_string_lossy().into_owned());
        std::fs::write(artifact.checksum_path(), format!("{}  {}\n", artifact.sha256, zip_name))
            .with_context(|| format!("Failed to write {}", artifact.checksum_path().display()))?;

        tracing::info!(
            "Release {} built at {} ({} files, sha256 {})",
            artifact.zip_path.display(),
            artifact.created_at.to_rfc3339(),
            artifact.files.len(),
            artifact.sha256
        );
        reporter.success(format!("🎉 Release created: {}", artifact.zip_path.display()));
        reporter.info(format!("📁 Release files also available in: {}", artifact.release_dir.display()));
        Ok(artifact)
    }

    /// Recreate the staging directory and copy the present files into it.
    fn stage(&self, release_dir: &Path, reporter: &StatusReporter) -> Result<()> {
        if release_dir.exists() {
            std::fs::remove_dir_all(release_dir)
                .with_context(|| format!("Failed to remove {}", release_dir.display()))?;
        }
        std::fs::create_dir_all(release_dir)
            .with_context(|| format!("Failed to create {}", release_dir.display()))?;

        let mut copied = 0usize;
        for name in &self.files {
            let src = self.source_dir.join(name);
            if !src.is_file() {
                reporter.warn(format!("⚠ Warning: {name} not found"));
                continue;
            }

            let dest = release_dir.join(name);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&src, &dest)
                .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
            reporter.info(format!("✓ Copied {name}"));
            copied += 1;
        }

        if copied == 0 {
            return Err(LauncherError::NothingToPackage {
                dir: self.source_dir.display().to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Zip every file under `release_dir` with names relative to it.
fn write_zip(release_dir: &Path, zip_path: &Path, reporter: &StatusReporter) -> Result<Vec<String>> {
    if zip_path.exists() {
        std::fs::remove_file(zip_path).with_context(|| format!("Failed to remove {}", zip_path.display()))?;
    }

    let file = File::create(zip_path).with_context(|| format!("Failed to create {}", zip_path.display()))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut names = Vec::new();
    for entry in WalkDir::new(release_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", release_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(release_dir)?;
        // Archive names always use forward slashes
        let name = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");

        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {name} to {}", zip_path.display()))?;
        let mut src = File::open(entry.path())?;
        std::io::copy(&mut src, &mut writer)?;

        reporter.info(format!("✓ Added {name} to ZIP"));
        names.push(name);
    }

    writer.finish().with_context(|| format!("Failed to finish {}", zip_path.display()))?;
    Ok(names)
}

/// Hex SHA-256 of a file's contents.
pub fn compute_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
