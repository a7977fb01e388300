mod application;
mod basic;

pub use application::ApplicationConfig;
pub use basic::BasicConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Application identity used in alert headers (see `application` table in config.toml).
    #[serde(default)]
    pub application: ApplicationConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "MYAPP_";

impl Config {
    /// Builds a Figment that merges defaults, a config TOML file, and `MYAPP_*` env vars.
    ///
    /// Env keys split tables on `__`, e.g. `MYAPP_BASIC__LISTEN_PORT=9000`.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration by merging defaults, `config.toml` if present, and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        let cfg: Self = Self::figment().extract()?;
        if cfg.application.name.trim().is_empty() {
            return Err(figment::Error::from(
                "application.name must be set and non-empty".to_string(),
            ));
        }
        Ok(cfg)
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|err| panic!("failed to extract configuration: {err}"))
});
