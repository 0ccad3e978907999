//! # Tracker configuration
//!
//! [`TrackerConfig`] gathers every setting of a tracking session and is handed to
//! [`Tracker::new`](crate::tracker::Tracker::new). Every field has a default, so a JSON file only
//! needs the keys it changes:
//!
//! ```json
//! {
//!   "opmode": "prod",
//!   "shard_count": 16,
//!   "log_sat_updates": true,
//!   "style_overrides": { "HST": { "color": 16711680, "radius": 30.0 } }
//! }
//! ```
//!
//! Op modes
//! -----------------
//! * `dev` – element sets are read from `local_sources` (files on disk).
//! * `prod` – element sets are downloaded from `remote_sources` (Celestrak `gp.php` queries).
use std::collections::HashMap;

use camino::Utf8Path;
use serde::Deserialize;

use crate::{
    catalog::source::CatalogSource,
    constants::DEFAULT_SHARD_COUNT,
    satcat_errors::SatcatError,
    visual::{MarkerStyle, StyleOverrides},
};

/// Where element sets are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpMode {
    /// Local files.
    #[default]
    Dev,
    /// Remote provider.
    Prod,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub opmode: OpMode,
    /// Number of scheduler shards, at least 1.
    pub shard_count: usize,
    pub local_sources: Vec<String>,
    pub remote_sources: Vec<String>,
    /// Global timeout of remote fetches, in seconds.
    pub http_timeout_secs: u64,
    pub default_style: MarkerStyle,
    pub style_overrides: HashMap<String, MarkerStyle>,
    /// Dump the state of `logged_names` objects each time they are propagated.
    pub log_sat_updates: bool,
    pub logged_names: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            opmode: OpMode::Dev,
            shard_count: DEFAULT_SHARD_COUNT,
            local_sources: vec!["TLEs/visual.json".into(), "TLEs/stations.json".into()],
            remote_sources: vec![
                "https://celestrak.org/NORAD/elements/gp.php?GROUP=visual&FORMAT=json".into(),
                "https://celestrak.org/NORAD/elements/gp.php?GROUP=stations&FORMAT=json".into(),
            ],
            http_timeout_secs: 10,
            default_style: MarkerStyle::default(),
            style_overrides: HashMap::from([
                (
                    "ISS (ZARYA)".to_string(),
                    MarkerStyle {
                        color: 0xffffff,
                        radius: 50.0,
                    },
                ),
                (
                    "CSS (TIANHE)".to_string(),
                    MarkerStyle {
                        color: 0xff4040,
                        radius: 50.0,
                    },
                ),
            ]),
            log_sat_updates: false,
            logged_names: vec!["ISS (ZARYA)".into()],
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Errors
    /// ------
    /// * [`SatcatError::IoError`] / [`SatcatError::JsonError`] if the file cannot be read or decoded,
    /// * [`SatcatError::InvalidConfig`] if a value is out of range.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, SatcatError> {
        let content = std::fs::read_to_string(path)?;
        let config: TrackerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot check.
    pub fn validate(&self) -> Result<(), SatcatError> {
        if self.shard_count == 0 {
            return Err(SatcatError::InvalidShardCount(0));
        }
        if self.http_timeout_secs == 0 {
            return Err(SatcatError::InvalidConfig(
                "http_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Source descriptors of the active op mode.
    pub fn active_sources(&self) -> &[String] {
        match self.opmode {
            OpMode::Dev => &self.local_sources,
            OpMode::Prod => &self.remote_sources,
        }
    }

    /// Resolve the active source descriptors.
    pub fn sources(&self) -> Result<Vec<CatalogSource>, SatcatError> {
        self.active_sources()
            .iter()
            .map(|s| CatalogSource::try_from(s.as_str()))
            .collect()
    }

    pub fn style_overrides(&self) -> StyleOverrides {
        StyleOverrides::new(self.default_style, self.style_overrides.clone())
    }

    /// Names whose updates are logged, empty unless `log_sat_updates` is set.
    pub fn logged_names(&self) -> Vec<String> {
        if self.log_sat_updates {
            self.logged_names.clone()
        } else {
            Vec::new()
        }
    }
}
