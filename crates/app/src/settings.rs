//! Settings for the `sobra` binary.
//!
//! Read from `settings.toml` in the working directory when present, then
//! overridden by `SOBRA__*` environment variables (for instance
//! `SOBRA__SERVER__PORT=3001`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! database = { sqlite = "sobra.db" }
//! bind = "127.0.0.1"
//! port = 3000
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("settings")
    }

    fn from_file(name: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("SOBRA").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .set_default("app.level", "info")
            .unwrap()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn sqlite_server_section() {
        let settings = parse(
            r#"
            [server]
            database = { sqlite = "sobra.db" }
            port = 3000
            "#,
        );
        assert_eq!(settings.app.level, "info");
        let server = settings.server.unwrap();
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "sobra.db"));
        assert_eq!(server.port, 3000);
        assert_eq!(server.bind, None);
    }

    #[test]
    fn memory_database() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            database = "memory"
            bind = "0.0.0.0"
            port = 8080
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }

    #[test]
    fn server_is_optional() {
        let settings = parse("");
        assert!(settings.server.is_none());
    }
}
