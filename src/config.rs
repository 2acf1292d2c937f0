//! Configuration loading for repoforge
//!
//! `config.yaml` in the working directory names the base directory for
//! local checkouts and the repository to provision.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Relative path the configuration is read from.
pub const CONFIG_FILE: &str = "config.yaml";

/// Validated configuration for one provisioning run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory local working copies are created under
    pub local_repo_base_dir: PathBuf,
    /// Name of the repository to provision
    pub repo_name: String,
    /// Description applied to the provisioned repository
    pub repo_description: String,
}

/// On-disk shape of config.yaml. Missing keys are parse errors, so a
/// bad file fails here instead of deep inside the provisioning run.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "LOCAL_REPO_BASE_DIR")]
    local_repo_base_dir: String,
    #[serde(rename = "REPO_NAME")]
    repo_name: String,
    #[serde(rename = "REPO_DESCRIPTION")]
    repo_description: String,
}

impl Config {
    /// Load configuration from config.yaml in the current directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        let raw: RawConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if raw.repo_name.trim().is_empty() {
            anyhow::bail!("REPO_NAME must not be empty");
        }
        if raw.repo_name.contains(['/', '\\']) {
            anyhow::bail!("REPO_NAME must not contain path separators: {}", raw.repo_name);
        }

        Ok(Self {
            local_repo_base_dir: expand_tilde(&raw.local_repo_base_dir),
            repo_name: raw.repo_name,
            repo_description: raw.repo_description,
        })
    }

    /// Local working copy for the configured repository
    pub fn repo_path(&self) -> PathBuf {
        self.local_repo_base_dir.join(&self.repo_name)
    }

    /// Terraform definitions inside the working copy
    pub fn terraform_path(&self) -> PathBuf {
        self.repo_path().join("terraform")
    }
}

/// Expand a leading `~` to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
