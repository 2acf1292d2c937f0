//! Local git working copy setup
//!
//! Handles:
//! - Detection of an existing working copy via the .git marker
//! - First-time init, default branch rename, origin registration
//!
//! As with the terraform wrapper, the working directory is handed to
//! every child process explicitly.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Handle on a local working copy location.
pub struct Git {
    program: PathBuf,
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("git"),
            dir: dir.into(),
        }
    }

    /// Use an alternative git binary (tests point this at a fake)
    pub fn with_program(program: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dir: dir.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.dir);
        cmd
    }

    /// Check for the .git marker that signals an initialized working copy
    pub fn is_initialized(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// Initialize the working copy and point origin at the remote.
    ///
    /// A directory that already carries a .git marker is left alone,
    /// including its existing remote registration.
    pub fn ensure_repo(&self, remote_url: &str) -> Result<()> {
        if self.is_initialized() {
            println!("Git repository already initialized.");
            return Ok(());
        }

        self.init()?;
        self.rename_current_branch("main")?;
        self.add_remote("origin", remote_url)?;

        println!("✓ Initialized git repository and added remote origin {remote_url}");
        Ok(())
    }

    fn init(&self) -> Result<()> {
        let output = self
            .command()
            .arg("init")
            .output()
            .context("Failed to run git init")?;

        if !output.status.success() {
            anyhow::bail!(
                "Failed to initialize repository: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(())
    }

    fn rename_current_branch(&self, name: &str) -> Result<()> {
        let output = self
            .command()
            .args(["branch", "-M", name])
            .output()
            .context("Failed to rename branch")?;

        if !output.status.success() {
            anyhow::bail!(
                "Failed to rename branch: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        let output = self
            .command()
            .args(["remote", "add", name, url])
            .output()
            .context("Failed to add remote")?;

        if !output.status.success() {
            anyhow::bail!(
                "Failed to add remote: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(())
    }
}
