pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jobseekers")]
#[command(about = "JobSeekers API - job board backend with cookie-based sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Create document store tables and indexes")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::config::config().clone();

    match cli.command {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
