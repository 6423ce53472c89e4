use anyhow::Result;
use cidash::cli::Cli;
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting cidash - GitLab CI dashboard");
    cli.execute().await?;

    Ok(())
}
