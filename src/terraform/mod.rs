//! Terraform orchestration for repository provisioning
//!
//! Handles:
//! - Conditional `terraform init` based on local state markers
//! - Plan classification (no-op, pending changes, anything else)
//! - Apply with auto-approval and repository URL scraping
//! - Destroy with auto-approval
//!
//! Every invocation is given its working directory explicitly; the
//! process-wide current directory is never touched.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Marker terraform prints when the plan has nothing to do.
const NO_CHANGES_MARKER: &str = "no changes are needed.";

/// Exit code terraform uses to signal a non-empty plan.
const PLAN_PENDING_CHANGES: i32 = 2;

/// Output variable holding the provisioned repository URL.
const REPOSITORY_URL_OUTPUT: &str = "repository_url";

/// Result of one provisioning run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    /// Apply ran and the repository URL was scraped from its output
    Applied(String),
    /// Plan reported nothing to do; URL read back from terraform outputs
    UpToDate(String),
    /// Plan or apply failed, or apply produced no repository URL
    Failed(String),
}

/// Classification of a dry-run plan.
#[derive(Debug, PartialEq)]
pub enum PlanStatus {
    /// Plan output contained the no-op marker
    NoChanges,
    /// Plan exited with the pending-changes code
    ChangesPending,
    /// Any other exit status, with the captured output
    Unrecognized {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
}

/// Handle on a terraform working directory.
pub struct Terraform {
    program: PathBuf,
    dir: PathBuf,
}

impl Terraform {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("terraform"),
            dir: dir.into(),
        }
    }

    /// Use an alternative terraform binary (tests point this at a fake)
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

    /// Terraform has local state when both the .terraform marker and the
    /// state file exist; either one missing means init must run again.
    pub fn is_initialized(&self) -> bool {
        self.dir.join(".terraform").exists() && self.dir.join("terraform.tfstate").exists()
    }

    /// Run `terraform init`, streaming its output to the terminal
    pub fn init(&self) -> Result<()> {
        println!("Running terraform init...");
        let status = self
            .command()
            .arg("init")
            .status()
            .context("Failed to run terraform init")?;

        if !status.success() {
            anyhow::bail!("terraform init failed with {status}");
        }

        Ok(())
    }

    /// Run `terraform plan` and classify its result.
    ///
    /// The plan's exit status is never fatal here; an unrecognized
    /// combination is reported through [`PlanStatus::Unrecognized`] so
    /// the caller can decide. Err is reserved for spawn failures.
    pub fn plan(&self) -> Result<PlanStatus> {
        println!("Running terraform plan...");
        let output = self
            .command()
            .arg("plan")
            .output()
            .context("Failed to run terraform plan")?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if stdout.contains(NO_CHANGES_MARKER) {
            return Ok(PlanStatus::NoChanges);
        }
        if output.status.code() == Some(PLAN_PENDING_CHANGES) {
            return Ok(PlanStatus::ChangesPending);
        }

        Ok(PlanStatus::Unrecognized {
            status: output.status,
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Read a single output variable, stripped of surrounding whitespace
    pub fn output(&self, name: &str) -> Result<String> {
        let output = self
            .command()
            .args(["output", name])
            .output()
            .with_context(|| format!("Failed to run terraform output {name}"))?;

        if !output.status.success() {
            anyhow::bail!(
                "terraform output {} failed: {}",
                name,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run `terraform destroy -auto-approve`, streaming its output
    pub fn destroy(&self) -> Result<()> {
        println!("Running terraform destroy...");
        let status = self
            .command()
            .args(["destroy", "-auto-approve"])
            .status()
            .context("Failed to run terraform destroy")?;

        if !status.success() {
            anyhow::bail!("terraform destroy failed with {status}");
        }

        Ok(())
    }

    /// Drive the full init/plan/apply sequence.
    ///
    /// Init failures are fatal. Plan and apply failures are reported
    /// through [`ProvisionOutcome::Failed`] instead of an Err, so the
    /// caller can tell a broken run apart from an up-to-date one.
    pub fn provision(&self) -> Result<ProvisionOutcome> {
        if self.is_initialized() {
            println!("Terraform is already initialized, skipping terraform init.");
        } else {
            self.init()?;
        }

        match self.plan()? {
            PlanStatus::NoChanges => {
                println!("No changes detected. Your infrastructure matches the configuration.");
                match self.output(REPOSITORY_URL_OUTPUT) {
                    Ok(url) => Ok(ProvisionOutcome::UpToDate(url)),
                    Err(err) => Ok(ProvisionOutcome::Failed(format!("{err:#}"))),
                }
            }
            PlanStatus::ChangesPending => {
                println!("Changes detected. Proceeding with terraform apply.");
                self.apply()
            }
            PlanStatus::Unrecognized {
                status,
                stdout,
                stderr,
            } => {
                println!("Terraform plan returned an unexpected result. Details:");
                println!("{stdout}");
                eprintln!("{stderr}");
                Ok(ProvisionOutcome::Failed(format!(
                    "terraform plan finished with {status} without a recognized outcome"
                )))
            }
        }
    }

    /// Run `terraform apply -auto-approve` and scrape the repository URL
    fn apply(&self) -> Result<ProvisionOutcome> {
        println!("Running terraform apply...");
        let output = self
            .command()
            .args(["apply", "-auto-approve"])
            .output()
            .context("Failed to run terraform apply")?;

        if !output.status.success() {
            println!("{}", String::from_utf8_lossy(&output.stdout));
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            return Ok(ProvisionOutcome::Failed(format!(
                "terraform apply failed with {}",
                output.status
            )));
        }

        match scrape_repository_url(&String::from_utf8_lossy(&output.stdout)) {
            Some(url) => Ok(ProvisionOutcome::Applied(url)),
            None => Ok(ProvisionOutcome::Failed(format!(
                "terraform apply succeeded but its output did not include {REPOSITORY_URL_OUTPUT}"
            ))),
        }
    }
}

/// Pull the repository URL out of apply's human-readable output.
///
/// Takes everything after the ` = ` separator on the first line that
/// mentions the output variable.
pub fn scrape_repository_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|line| line.contains("repository_url ="))
        .and_then(|line| line.splitn(2, " = ").nth(1))
        .map(|value| value.trim().to_string())
}
