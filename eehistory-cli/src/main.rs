//! EasyEquities history CLI - reconstruct trades from a transaction export

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{config, inspect, logs, parse};

/// eeh - turn an EasyEquities transaction history into trades and fees
#[derive(Parser)]
#[command(name = "eeh", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an export into transaction records
    Parse {
        /// Path to the .xlsx or .csv export
        file: PathBuf,
        /// Worksheet to read (xlsx only)
        #[arg(long)]
        sheet: Option<String>,
        /// Schema cutoff date (YYYY-MM-DD)
        #[arg(long)]
        cutoff: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how every row of an export is classified
    Inspect {
        /// Path to the .xlsx or .csv export
        file: PathBuf,
        /// Worksheet to read (xlsx only)
        #[arg(long)]
        sheet: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse { file, sheet, cutoff, json } => {
            parse::run(&file, sheet, cutoff.as_deref(), json)
        }
        Commands::Inspect { file, sheet, json } => inspect::run(&file, sheet, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
