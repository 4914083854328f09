//! Config command - view and change settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{get_data_dir, get_logger, log_event};
use crate::output;
use eehistory_core::config::{parse_cutoff, Config, CUTOFF_DATE_ENV};
use eehistory_core::LogEvent;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change settings
    Set {
        /// Worksheet read from xlsx exports
        #[arg(long)]
        sheet: Option<String>,
        /// Schema cutoff date (YYYY-MM-DD)
        #[arg(long)]
        cutoff: Option<String>,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&data_dir)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
                return Ok(());
            }

            println!("{}", "Settings".bold());
            let mut table = output::create_table();
            table.add_row(vec!["Sheet name".to_string(), config.sheet_name.clone()]);
            table.add_row(vec!["Cutoff date".to_string(), config.cutoff_date.to_string()]);
            table.add_row(vec![
                "Data directory".to_string(),
                data_dir.display().to_string(),
            ]);
            println!("{}", table);

            if std::env::var(CUTOFF_DATE_ENV).is_ok() {
                output::info(&format!("Cutoff date set by {}", CUTOFF_DATE_ENV));
            }
        }
        ConfigCommands::Set { sheet, cutoff } => {
            if sheet.is_none() && cutoff.is_none() {
                output::warning("Nothing to change. Pass --sheet and/or --cutoff.");
                return Ok(());
            }

            let mut config = Config::load(&data_dir)?;
            if let Some(sheet) = sheet {
                config.sheet_name = sheet;
            }
            if let Some(cutoff) = cutoff {
                config.cutoff_date = parse_cutoff(&cutoff)?;
            }
            config.save(&data_dir)?;

            log_event(
                &get_logger(),
                LogEvent::new("command_executed").with_command("config set"),
            );
            output::success("Settings saved");
        }
    }

    Ok(())
}
