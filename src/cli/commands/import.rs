use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::{output_success, read_json_file};
use crate::cli::{Collections, OutputFormat};
use crate::records::{Feedback, FeedbackDraft, Improvement, ImprovementDraft};
use crate::services::{self, BatchError, Roster};

#[derive(Subcommand)]
pub enum ImportCommands {
    #[command(about = "Import feedback records")]
    Feedback {
        #[arg(help = "JSON file containing an array of feedback objects")]
        file: PathBuf,
    },

    #[command(about = "Import improvement records")]
    Improvements {
        #[arg(help = "JSON file containing an array of improvement objects")]
        file: PathBuf,
    },
}

pub async fn handle(
    cmd: ImportCommands,
    collections: &Collections,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let imported = match cmd {
        ImportCommands::Feedback { file } => {
            let drafts: Vec<FeedbackDraft> = read_json_file(&file)?;
            services::import::<Feedback, _>(&collections.feedback, drafts)
                .await
                .map(|stored| stored.len())
        }
        ImportCommands::Improvements { file } => {
            let drafts: Vec<ImprovementDraft> = read_json_file(&file)?;
            services::import::<Improvement, _>(&collections.improvements, drafts)
                .await
                .map(|stored| stored.len())
        }
    };

    report(imported, &output_format)
}

pub async fn handle_roster(
    file: PathBuf,
    collections: &Collections,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let roster: Roster = read_json_file(&file)?;
    let imported = services::import::<Feedback, _>(&collections.feedback, roster.drafts())
        .await
        .map(|stored| stored.len());

    report(imported, &output_format)
}

fn report(imported: Result<usize, BatchError>, output_format: &OutputFormat) -> anyhow::Result<()> {
    match imported {
        Ok(count) => output_success(
            output_format,
            &format!("Imported {} record(s)", count),
            Some(json!({ "imported": count })),
        ),
        Err(BatchError::Invalid { total, failures }) => {
            for (index, err) in &failures {
                eprintln!("  record {}: {}", index, err);
            }
            anyhow::bail!("{} of {} records failed validation; nothing imported", failures.len(), total)
        }
        Err(BatchError::Store(e)) => Err(e.into()),
    }
}
