pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::records::{Feedback, Improvement};

#[derive(Parser)]
#[command(name = "feedback")]
#[command(about = "Maintenance tooling for the house feedback database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Import a JSON array of records (all validated before any insert)")]
    Import {
        #[command(subcommand)]
        cmd: commands::import::ImportCommands,
    },

    #[command(about = "Add one feedback entry per student listed in a house roster file")]
    Roster {
        #[arg(help = "Roster JSON file: {house, rating?, comment?, students: [...]}")]
        file: std::path::PathBuf,
    },

    #[command(about = "Remove a house's feedback by student name")]
    Remove(commands::remove::RemoveArgs),

    #[command(about = "List stored records, newest first")]
    List {
        #[command(subcommand)]
        cmd: commands::list::ListCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Both collections, opened against the configured database
pub struct Collections {
    pub feedback: PgStore<Feedback>,
    pub improvements: PgStore<Improvement>,
}

impl Collections {
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let (feedback, improvements) = DatabaseManager::open_collections(&config.database)
            .await
            .context("failed to open feedback database")?;
        Ok(Self {
            feedback,
            improvements,
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();
    let collections = Collections::open(config).await?;

    match cli.command {
        Commands::Import { cmd } => commands::import::handle(cmd, &collections, output_format).await,
        Commands::Roster { file } => commands::import::handle_roster(file, &collections, output_format).await,
        Commands::Remove(args) => commands::remove::handle(args, &collections, output_format).await,
        Commands::List { cmd } => commands::list::handle(cmd, &collections, output_format).await,
    }
}
