use crate::config::*;
use crate::error::{Error, Result};
use crate::relayer::policy::DeviationPolicy;
use crate::types::fixed::Fixed18;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub aggregator: AggregatorConfig,
    pub relayer: RelayerConfig,
    pub keeper: KeeperConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("ORACLE_RELAY").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let app: AppConfig = toml::from_str(source)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed.max_valid_age_secs == 0 {
            return Err(Error::InvalidParameter("feed.max_valid_age_secs must be > 0".to_string()));
        }

        match self.relayer.default_policy {
            DeviationPolicy::Percentage { bps } if bps.value() == 0 => {
                return Err(Error::InvalidParameter("relayer percentage threshold must be > 0 bps".to_string()));
            }
            DeviationPolicy::Absolute { value } if value <= Fixed18::ZERO => {
                return Err(Error::InvalidParameter("relayer absolute threshold must be > 0".to_string()));
            }
            _ => {}
        }

        // Checked even when disabled; a zero period cannot drive a ticker
        if self.keeper.interval_secs == 0 {
            return Err(Error::InvalidParameter("keeper.interval_secs must be > 0".to_string()));
        }

        Ok(())
    }
}
