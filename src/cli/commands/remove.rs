use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{Collections, OutputFormat};
use crate::database::NameMatch;
use crate::records::House;
use crate::services;

#[derive(Args)]
pub struct RemoveArgs {
    #[arg(long, help = "House to remove from (Bhairav, Bhageshree, Megh)")]
    pub house: House,

    #[arg(long, help = "Match names by case-insensitive prefix instead of whole name")]
    pub prefix: bool,

    #[arg(required = true, help = "Student names")]
    pub names: Vec<String>,
}

pub async fn handle(
    args: RemoveArgs,
    collections: &Collections,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mode = if args.prefix {
        NameMatch::Prefix
    } else {
        NameMatch::Exact
    };

    let report =
        services::remove_students(&collections.feedback, args.house, &args.names, mode).await?;

    if let OutputFormat::Text = output_format {
        for (name, removed) in &report {
            println!("Removed {} feedback(s) for: {}", removed, name);
        }
    }

    let total: u64 = report.iter().map(|(_, removed)| removed).sum();
    let per_name: serde_json::Map<String, serde_json::Value> = report
        .into_iter()
        .map(|(name, removed)| (name, json!(removed)))
        .collect();

    output_success(
        &output_format,
        &format!("Removed {} feedback(s) from {} house", total, args.house),
        Some(json!({ "removed": per_name, "total": total })),
    )
}
