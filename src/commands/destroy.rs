use anyhow::Result;
use repoforge::config::Config;
use repoforge::terraform::Terraform;
use repoforge::{layout, preflight};

pub fn execute() -> Result<()> {
    let config = Config::load()?;
    preflight::ensure_tools(&["terraform"])?;

    // Keep the layout in place so destroy always has definitions to run
    // against, even on a fresh checkout.
    layout::ensure_layout(
        &config.local_repo_base_dir,
        &config.repo_name,
        &config.repo_description,
    )?;

    Terraform::new(config.terraform_path()).destroy()?;

    println!("✓ Repository destroyed.");
    Ok(())
}
