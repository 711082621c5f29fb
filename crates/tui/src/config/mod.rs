use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    /// Directory receiving `sobra-<month>.csv` and `.pdf` exports.
    pub export_dir: PathBuf,
    /// IANA zone deciding which month is "current".
    pub timezone: String,
    pub dark: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            username: String::new(),
            export_dir: PathBuf::from("."),
            timezone: "America/Sao_Paulo".to_string(),
            dark: false,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sobra_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    username: Option<String>,
    /// Override the export directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Start in dark mode.
    #[arg(long)]
    dark: bool,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let settings: AppConfig = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("SOBRA_TUI"))
        .build()?
        .try_deserialize()?;

    Ok(apply_args(settings, args))
}

fn apply_args(mut settings: AppConfig, args: Args) -> AppConfig {
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(export_dir) = args.export_dir {
        settings.export_dir = export_dir;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    settings.dark |= args.dark;
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let args = Args::parse_from([
            "sobra_tui",
            "--username",
            "alice",
            "--export-dir",
            "/tmp/out",
            "--dark",
        ]);
        let settings = apply_args(AppConfig::default(), args);

        assert_eq!(settings.username, "alice");
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/out"));
        assert!(settings.dark);
        assert_eq!(settings.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn dark_flag_does_not_turn_dark_mode_off() {
        let file = AppConfig {
            dark: true,
            ..AppConfig::default()
        };
        let settings = apply_args(file, Args::parse_from(["sobra_tui"]));
        assert!(settings.dark);
    }
}
