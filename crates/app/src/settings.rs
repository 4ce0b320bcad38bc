//! Settings for the `splitease` binary.
//!
//! Read from `settings.toml` (or the file named by `SPLITEASE_SETTINGS`) and
//! overridden by `SPLITEASE__SECTION__KEY` environment variables. See
//! `settings.example.toml`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";
const DEFAULT_MIRROR_URL: &str = "https://secure.splitwise.com/api/v3.0";

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    #[serde(default)]
    pub friends_from_mirror: bool,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Sync {
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct Mirror {
    #[serde(default = "default_mirror_url")]
    pub base_url: String,
    pub api_key: String,
    pub group_id: i64,
    #[serde(default = "default_currency")]
    pub currency_code: String,
}

fn default_mirror_url() -> String {
    DEFAULT_MIRROR_URL.to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub identity: Identity,
    pub sync: Sync,
    pub mirror: Option<Mirror>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("SPLITEASE_SETTINGS")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("SPLITEASE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    const BASE: &str = r#"
        [server]
        port = 3000
        database = "memory"

        [identity]
        url = "http://localhost:54321"
        anon_key = "anon"

        [sync]
        secret = "s3cret"
    "#;

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = parse(BASE).unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.database, Database::Memory);
        assert!(!settings.server.friends_from_mirror);
        assert!(settings.mirror.is_none());
    }

    #[test]
    fn sqlite_database_and_mirror() {
        let toml = format!(
            "{BASE}\n[mirror]\napi_key = \"k\"\ngroup_id = 42\n",
        )
        .replace("database = \"memory\"", "database = { sqlite = \"splitease.db\" }");
        let settings = parse(&toml).unwrap();
        assert_eq!(
            settings.server.database,
            Database::Sqlite("splitease.db".to_string())
        );
        let mirror = settings.mirror.unwrap();
        assert_eq!(mirror.base_url, DEFAULT_MIRROR_URL);
        assert_eq!(mirror.currency_code, "USD");
        assert_eq!(mirror.group_id, 42);
    }

    #[test]
    fn missing_identity_is_an_error() {
        let toml = BASE.replace("[identity]", "[other]");
        assert!(parse(&toml).is_err());
    }
}
