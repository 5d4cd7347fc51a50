use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::relayer::policy::DeviationPolicy;
use crate::types::fixed::Fixed18;
use crate::types::ratio::SmoothingFactor;

pub mod loader;

pub use loader::AppConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub min_update_interval_secs: u64,
    pub max_valid_age_secs: u64,
    pub smoothing_factor: SmoothingFactor,
}

impl FeedConfig {
    pub fn min_update_interval(&self) -> Duration {
        Duration::from_secs(self.min_update_interval_secs)
    }

    pub fn max_valid_age(&self) -> Duration {
        Duration::from_secs(self.max_valid_age_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            min_update_interval_secs: 100,
            max_valid_age_secs: 3600,  // 1 hour
            smoothing_factor: SmoothingFactor::one(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    // 0 means any single valid reading suffices
    pub required_valid_values: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayerConfig {
    pub default_policy: DeviationPolicy,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        RelayerConfig {
            default_policy: DeviationPolicy::Absolute {
                value: Fixed18::from_raw(100_000_000_000_000),  // 1e14
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct KeeperConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl KeeperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        KeeperConfig {
            enabled: true,
            interval_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}
