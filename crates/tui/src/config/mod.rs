use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/salvadanaio.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gateway web-app endpoint (the spreadsheet API).
    pub api_url: String,
    /// CORS relay endpoint; every request is wrapped through it.
    pub relay_url: String,
    /// Tenant identifier: the spreadsheet the Gateway should operate on.
    pub sheet_id: String,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            relay_url: String::new(),
            sheet_id: String::new(),
            log_file: "salvadanaio_tui.log".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "salvadanaio_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override Gateway endpoint URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Override relay endpoint URL.
    #[arg(long)]
    relay_url: Option<String>,
    /// Override spreadsheet id.
    #[arg(long)]
    sheet_id: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SALVADANAIO_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(relay_url) = args.relay_url {
        settings.relay_url = relay_url;
    }
    if let Some(sheet_id) = args.sheet_id {
        settings.sheet_id = sheet_id;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    validate(&settings)?;
    Ok(settings)
}

/// Routing parameters are required up front: without them every request
/// would fail, so refuse to start instead of failing one call at a time.
fn validate(settings: &AppConfig) -> Result<()> {
    let mut missing = Vec::new();
    if settings.api_url.trim().is_empty() {
        missing.push("api_url");
    }
    if settings.relay_url.trim().is_empty() {
        missing.push("relay_url");
    }
    if settings.sheet_id.trim().is_empty() {
        missing.push("sheet_id");
    }
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::InvalidConfig(format!(
        "missing required settings: {} (set them in {DEFAULT_CONFIG_PATH}, via SALVADANAIO_TUI_* or flags)",
        missing.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_routing_parameters() {
        let config = AppConfig::default();
        let err = validate(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("api_url"));
        assert!(message.contains("relay_url"));
        assert!(message.contains("sheet_id"));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let config = AppConfig {
            api_url: "https://gateway.example/exec".to_string(),
            relay_url: "https://relay.example/proxy".to_string(),
            sheet_id: "sheet-1".to_string(),
            ..AppConfig::default()
        };
        assert!(validate(&config).is_ok());
    }
}
