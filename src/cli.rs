use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::config::Config;
use crate::{output, server};

#[derive(Parser, Debug)]
#[command(name = "cidash")]
#[command(author, version, about = "GitLab CI pipeline dashboard", long_about = None)]
pub struct Cli {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(short, long, env = "CIDASH_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Template directory, overrides the configured one
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Port to listen on, overrides the configured one
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config)?;

        if let Some(templates) = &self.templates {
            config.templates.clone_from(templates);
        }
        if let Some(port) = self.port {
            config.port = port;
        }

        Ok(config)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        info!(
            "Loaded configuration from {} for project {}",
            self.config.display(),
            config.id
        );

        output::print_banner(&config.server_addr());
        server::serve(&config).await
    }
}
