pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "weekplan")]
#[command(about = "Weekplan CLI - run the API server and operate on its database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve,

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Inspect the audit log and undo or redo mutations")]
    History {
        #[command(subcommand)]
        cmd: commands::history::HistoryCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

    match cli.command {
        Commands::Serve => commands::serve::handle().await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::History { cmd } => commands::history::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_history_undo_for_user() {
        let cli = Cli::parse_from([
            "weekplan",
            "--json",
            "history",
            "undo",
            "--user",
            "00000000-0000-0000-0000-000000000001",
        ]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::History { cmd: commands::history::HistoryCommands::Undo { user } } => {
                assert_eq!(user.map(|u| u.as_u128()), Some(1));
            }
            _ => panic!("expected history undo"),
        }
    }

    #[test]
    fn text_is_the_default_format() {
        let cli = Cli::parse_from(["weekplan", "migrate"]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }
}
