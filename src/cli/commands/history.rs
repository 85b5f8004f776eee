use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;
use crate::services::history_service::{HistoryItem, HistoryOutcome};
use crate::services::HistoryService;

#[derive(Subcommand)]
pub enum HistoryCommands {
    #[command(about = "List the most recent audit entries")]
    List {
        #[arg(long, help = "Only entries written by this user")]
        user: Option<Uuid>,
        #[arg(long, help = "Number of entries (max 100)")]
        limit: Option<i64>,
    },

    #[command(about = "Undo the most recent mutation")]
    Undo {
        #[arg(long, help = "Act as this user; without it the whole log is used")]
        user: Option<Uuid>,
    },

    #[command(about = "Redo the most recently undone mutation")]
    Redo {
        #[arg(long, help = "Act as this user; without it the whole log is used")]
        user: Option<Uuid>,
    },
}

pub async fn handle(cmd: HistoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let settings = config::config();
    let pool = DatabaseManager::connect(&settings.database)
        .await
        .context("failed to connect to database")?;
    let history = HistoryService::new(pool, settings.history.clone());

    match cmd {
        HistoryCommands::List { user, limit } => {
            let entries = history.list(user, limit).await?;
            output_rows(output_format, "entries", &entries, describe_entry)
        }
        HistoryCommands::Undo { user } => {
            let outcome = history.undo(user).await?;
            report(output_format, "Undo", &outcome)
        }
        HistoryCommands::Redo { user } => {
            let outcome = history.redo(user).await?;
            report(output_format, "Redo", &outcome)
        }
    }
}

fn describe_entry(entry: &HistoryItem) -> String {
    let origin = match entry.compensates {
        Some(target) => format!("{} of #{}", entry.origin, target),
        None => entry.origin.clone(),
    };
    format!(
        "#{:<6} {} {:<6} {:<8} {} ({})",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.action,
        entry.table_name,
        entry.row_id,
        origin
    )
}

fn report(output_format: OutputFormat, verb: &str, outcome: &HistoryOutcome) -> anyhow::Result<()> {
    output_success(
        output_format,
        &format!(
            "{} of #{} applied as {} on {} {} (#{})",
            verb, outcome.compensates, outcome.action, outcome.table, outcome.row_id, outcome.entry_id
        ),
        Some(json!({ "outcome": outcome })),
    )
}
