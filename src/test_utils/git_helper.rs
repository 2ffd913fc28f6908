//! Git test helper utilities
//!
//! Thin synchronous wrapper over the git CLI for building fixture repositories:
//! a bare `origin`, the install checkout cloned from it, and a second clone
//! used to publish upstream commits.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs git commands inside one fixture repository.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<std::process::Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(output)
    }

    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// `git init` on a fixed `main` branch, independent of `init.defaultBranch`.
    pub fn init(&self) -> Result<()> {
        self.run_git_command(&["init"], "Failed to initialize git repository")?;
        self.run_git_command(&["symbolic-ref", "HEAD", "refs/heads/main"], "Failed to set HEAD to main")?;
        Ok(())
    }

    pub fn init_bare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.repo_path)?;
        self.run_git_command(&["init", "--bare"], "Failed to initialize bare git repository")?;
        self.run_git_command(&["symbolic-ref", "HEAD", "refs/heads/main"], "Failed to set HEAD to main")?;
        Ok(())
    }

    pub fn config_user(&self) -> Result<()> {
        self.run_git_command(
            &["config", "user.email", "test@qrprint.example"],
            "Failed to configure git user email",
        )?;
        self.run_git_command(&["config", "user.name", "Test User"], "Failed to configure git user name")?;
        Ok(())
    }

    pub fn add_all(&self) -> Result<()> {
        self.run_git_command(&["add", "."], "Failed to add files to git")?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run_git_command(&["commit", "-m", message], "Failed to create git commit")?;
        Ok(())
    }

    /// Write `relative` with `content`, stage everything and commit.
    pub fn commit_file(&self, relative: &str, content: &str, message: &str) -> Result<()> {
        let path = self.repo_path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content).with_context(|| format!("Failed to write {relative}"))?;
        self.add_all()?;
        self.commit(message)
    }

    pub fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        self.run_git_command(&["remote", "add", name, url], &format!("Failed to add remote: {name}"))?;
        Ok(())
    }

    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run_git_command(&["push", "-u", remote, branch], &format!("Failed to push {branch}"))?;
        Ok(())
    }

    pub fn checkout(&self, ref_name: &str) -> Result<()> {
        self.run_git_command(&["checkout", ref_name], &format!("Failed to checkout: {ref_name}"))?;
        Ok(())
    }

    pub fn rev_parse_head(&self) -> Result<String> {
        let output = self.run_git_command(&["rev-parse", "HEAD"], "Failed to get current commit SHA")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Clone `source` into `target` and configure the committer identity.
    pub fn clone_from(source: &Path, target: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("clone")
            .arg(source)
            .arg(target)
            .output()
            .context("Failed to run git clone")?;
        if !output.status.success() {
            bail!("git clone failed: {}", String::from_utf8_lossy(&output.stderr));
        }
        let repo = Self::new(target);
        repo.config_user()?;
        Ok(repo)
    }
}

/// A bare origin, the install checkout and a second clone that publishes
/// upstream commits.
pub struct UpstreamFixture {
    pub origin: PathBuf,
    pub install: TestGit,
    pub publisher: TestGit,
}

impl UpstreamFixture {
    /// Create the three repositories under `root`, with one initial commit
    /// containing `files` present in both clones.
    pub fn create(root: &Path, files: &[(&str, &str)]) -> Result<Self> {
        let origin = root.join("origin.git");
        TestGit::new(&origin).init_bare()?;

        let seed = TestGit::new(root.join("seed"));
        std::fs::create_dir_all(seed.repo_path())?;
        seed.init()?;
        seed.config_user()?;
        for (name, content) in files {
            std::fs::write(seed.repo_path().join(name), content)?;
        }
        seed.add_all()?;
        seed.commit("Initial commit")?;
        seed.remote_add("origin", &origin.display().to_string())?;
        seed.push("origin", "main")?;

        let install = TestGit::clone_from(&origin, &root.join("install"))?;
        let publisher = TestGit::clone_from(&origin, &root.join("publisher"))?;

        Ok(Self {
            origin,
            install,
            publisher,
        })
    }

    /// Commit a file in the publisher clone and push it to origin.
    pub fn publish(&self, relative: &str, content: &str, message: &str) -> Result<()> {
        self.publisher.commit_file(relative, content, message)?;
        self.publisher.push("origin", "main")
    }
}
