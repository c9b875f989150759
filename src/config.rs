use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use validator::Validate;

use crate::domain::{AggregationPolicy, HourConvention};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub outlook: OutlookConfig,
    pub db: DbConfig,
    #[validate(nested)]
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
    #[validate(nested)]
    #[serde(default)]
    pub comparisons: Vec<ComparisonConfig>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OutlookConfig {
    /// Days covered by a catalog report
    #[validate(range(min = 1, max = 31))]
    pub window_days: u32,
    /// Market zone used when a series does not name its own
    pub default_zone: Tz,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: usize,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_connect_attempts() -> usize {
    5
}

/// One stored series and how its rows must be read.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SeriesConfig {
    #[validate(length(min = 1))]
    pub key: String,
    pub convention: HourConvention,
    pub policy: AggregationPolicy,
    #[serde(default)]
    pub zone: Option<Tz>,
    /// Forecast series belong to a scenario; realized series do not
    #[serde(default)]
    pub scenario_scoped: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ComparisonConfig {
    #[validate(length(min = 1))]
    pub name: String,
    pub forecast: String,
    pub actual: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("OUTLOOK__").split("__"));
        let cfg: Self = figment.extract().context("loading configuration")?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let cfg: Self = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .context("parsing configuration")?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Field validation plus catalog cross-references
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let mut keys = HashSet::new();
        for s in &self.series {
            if !keys.insert(s.key.as_str()) {
                bail!("series '{}' declared twice", s.key);
            }
        }

        let mut names = HashSet::new();
        for c in &self.comparisons {
            if !names.insert(c.name.as_str()) {
                bail!("comparison '{}' declared twice", c.name);
            }
            for side in [&c.forecast, &c.actual] {
                if self.series(side).is_none() {
                    bail!("comparison '{}' references unknown series '{}'", c.name, side);
                }
            }
        }
        Ok(())
    }

    pub fn series(&self, key: &str) -> Option<&SeriesConfig> {
        self.series.iter().find(|s| s.key == key)
    }
}
