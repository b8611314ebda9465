use duo_core::engine::EngineConfig;
use duo_core::recurrence::DEFAULT_EXPANSION_LIMIT;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use uuid::Uuid;

const CONFIG_FILE: &str = "duo.toml";

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// SQLite file, created on first use
    pub database_path: String,
    /// Couple used when `--couple` is not given
    pub default_couple: Option<Uuid>,
    /// `tracing` filter directive; `RUST_LOG` takes precedence
    pub log_filter: String,
    pub engine: EngineSettings,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct EngineSettings {
    pub expansion_limit: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "duo.db".to_string(),
            default_couple: None,
            log_filter: "warn".to_string(),
            engine: EngineSettings::default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
        }
    }
}

impl From<EngineSettings> for EngineConfig {
    fn from(settings: EngineSettings) -> Self {
        EngineConfig {
            expansion_limit: settings.expansion_limit.max(1),
        }
    }
}

impl Config {
    /// Reads `duo.toml` (or the file named by `DUO_CONFIG`), then `DUO_*`
    /// environment variables. Nested keys use `__`, e.g.
    /// `DUO_ENGINE__EXPANSION_LIMIT`.
    pub fn new() -> Result<Self, figment::Error> {
        let file = std::env::var("DUO_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        Figment::new()
            .merge(Toml::file(file))
            .merge(Env::prefixed("DUO_").ignore(&["config"]).split("__"))
            .extract()
    }
}
