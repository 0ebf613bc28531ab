pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "supplyctl")]
#[command(about = "supplyctl - maintenance commands for the Supply Chain API database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Load the bundled node and product fixtures")]
    Fixtures {
        #[command(subcommand)]
        cmd: commands::fixture::FixtureCommands,
    },

    #[command(about = "Demo users and administrator accounts")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UsersCommands,
    },

    #[command(about = "Supply network maintenance")]
    Nodes {
        #[command(subcommand)]
        cmd: commands::nodes::NodesCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&config, output_format).await,
        Commands::Fixtures { cmd } => {
            let state = connect(config).await?;
            commands::fixture::handle(cmd, &state, output_format).await
        }
        Commands::Users { cmd } => {
            let state = connect(config).await?;
            commands::users::handle(cmd, &state, output_format).await
        }
        Commands::Nodes { cmd } => {
            let state = connect(config).await?;
            commands::nodes::handle(cmd, &state, output_format).await
        }
    }
}

/// Every command works on the persistent store; an in-memory one would be
/// discarded on exit.
async fn connect(config: AppConfig) -> anyhow::Result<AppState> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set for supplyctl");
    }
    AppState::connect(config).await.context("failed to connect to the database")
}
