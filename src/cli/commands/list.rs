use clap::Subcommand;

use crate::cli::utils::output_records;
use crate::cli::{Collections, OutputFormat};
use crate::database::RecordStore;

#[derive(Subcommand)]
pub enum ListCommands {
    #[command(about = "List feedback")]
    Feedback,

    #[command(about = "List improvements")]
    Improvements,
}

pub async fn handle(
    cmd: ListCommands,
    collections: &Collections,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ListCommands::Feedback => {
            let records = collections.feedback.list_all().await?;
            output_records(&output_format, &records, |r| {
                format!(
                    "{}  {:<10} {}/5  {}",
                    r.timestamp.format("%Y-%m-%d %H:%M"),
                    r.fields.house,
                    r.fields.rating,
                    r.fields.student_name
                )
            })
        }
        ListCommands::Improvements => {
            let records = collections.improvements.list_all().await?;
            output_records(&output_format, &records, |r| {
                format!(
                    "{}  {}: {} (by {})",
                    r.timestamp.format("%Y-%m-%d %H:%M"),
                    r.fields.problem,
                    r.fields.solution,
                    r.fields.submitted_by
                )
            })
        }
    }
}
