//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "parsing": { "sheetName": "Transaction History", "cutoffDate": "2018-01-01" }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::adapters::xlsx::DEFAULT_SHEET_NAME;
use crate::domain::default_cutoff_date;
use crate::domain::result::{Error, Result};
use crate::services::ParseOptions;

/// Environment variable that overrides the configured cutoff date
pub const CUTOFF_DATE_ENV: &str = "EEHISTORY_CUTOFF_DATE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    parsing: ParsingSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cutoff_date: Option<NaiveDate>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Resolved configuration (settings file plus environment overrides)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Worksheet read from xlsx exports
    pub sheet_name: String,
    /// Boundary between the two recurring purchase templates
    pub cutoff_date: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cutoff_date: default_cutoff_date(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The cutoff date can be overridden with `EEHISTORY_CUTOFF_DATE`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let defaults = Self::default();

        let cutoff_date = match std::env::var(CUTOFF_DATE_ENV).ok() {
            Some(value) => parse_cutoff(&value)?,
            None => raw.parsing.cutoff_date.unwrap_or(defaults.cutoff_date),
        };

        Ok(Self {
            sheet_name: raw.parsing.sheet_name.unwrap_or(defaults.sheet_name),
            cutoff_date,
        })
    }

    /// Save config to the data directory
    /// Keeps settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.parsing.sheet_name = Some(self.sheet_name.clone());
        settings.parsing.cutoff_date = Some(self.cutoff_date);

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join("settings.json"), content)?;
        Ok(())
    }

    /// Parse options for the history service
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            cutoff_date: self.cutoff_date,
        }
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::config(format!("invalid {}: {}", settings_path.display(), e)))
}

/// Parse an ISO `YYYY-MM-DD` cutoff date
pub fn parse_cutoff(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::config(format!("invalid cutoff date {:?}, expected YYYY-MM-DD", value)))
}
