use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub holds: HoldsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Redis,
    /// Single-process only; holds are not shared between replicas.
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LedgerConfig {
    #[serde(default)]
    pub backend: LedgerBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HoldsConfig {
    #[serde(default = "default_hold_duration_ms")]
    pub hold_duration_ms: u64,
}

impl HoldsConfig {
    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }
}

impl Default for HoldsConfig {
    fn default() -> Self {
        Self { hold_duration_ms: default_hold_duration_ms() }
    }
}

fn default_hold_duration_ms() -> u64 { 15 * 60 * 1000 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `MARQUEE__HOLDS__HOLD_DURATION_MS=1000`
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
