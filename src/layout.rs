//! Local repository layout
//!
//! Creates `<base>/<repo_name>/terraform` and materializes the bundled
//! Terraform templates into it.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const MAIN_TF: &str = include_str!("../resources/templates/terraform/main.tf.tmpl");
const VARIABLES_TF: &str = include_str!("../resources/templates/terraform/variables.tf.tmpl");

/// Ensure the local directory tree exists and write the two Terraform
/// files. Both files are overwritten on every run so they always match
/// the bundled templates.
pub fn ensure_layout(base_dir: &Path, repo_name: &str, repo_description: &str) -> Result<()> {
    let terraform_dir = base_dir.join(repo_name).join("terraform");
    if !terraform_dir.exists() {
        fs::create_dir_all(&terraform_dir)
            .with_context(|| format!("Failed to create directory {}", terraform_dir.display()))?;
        println!("Created directory {}", terraform_dir.display());
    }

    fs::write(terraform_dir.join("main.tf"), MAIN_TF)
        .with_context(|| format!("Failed to write main.tf to {}", terraform_dir.display()))?;

    let variables = VARIABLES_TF
        .replace("{{.repo_name}}", repo_name)
        .replace("{{.repo_description}}", repo_description);
    fs::write(terraform_dir.join("variables.tf"), variables)
        .with_context(|| format!("Failed to write variables.tf to {}", terraform_dir.display()))?;

    println!(
        "Copied Terraform main.tf and rendered variables.tf to {}",
        terraform_dir.display()
    );

    Ok(())
}
