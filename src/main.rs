use anyhow::Result;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Provision a source-control repository with Terraform and wire up the local checkout", long_about = None)]
struct Cli {
    /// Destroy the provisioned repository instead of creating or updating it
    #[arg(long)]
    destroy: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.destroy {
        commands::destroy::execute()?;
    } else {
        commands::provision::execute()?;
    }

    Ok(())
}
