use anyhow::Result;
use repoforge::config::Config;
use repoforge::git::Git;
use repoforge::terraform::{ProvisionOutcome, Terraform};
use repoforge::{layout, preflight};

pub fn execute() -> Result<()> {
    let config = Config::load()?;
    preflight::ensure_tools(&["terraform", "git"])?;

    layout::ensure_layout(
        &config.local_repo_base_dir,
        &config.repo_name,
        &config.repo_description,
    )?;

    let terraform = Terraform::new(config.terraform_path());
    match terraform.provision()? {
        ProvisionOutcome::Applied(url) | ProvisionOutcome::UpToDate(url) => {
            println!("Repository URL: {url}");
            Git::new(config.repo_path()).ensure_repo(&url)?;
            Ok(())
        }
        ProvisionOutcome::Failed(reason) => {
            anyhow::bail!("Provisioning failed: {reason}")
        }
    }
}
