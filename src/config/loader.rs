//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings, the rate table and the holiday calendar from a directory of
//! YAML files, and for seeding a fresh record store from them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::holidays::HolidayCalendar;
use crate::models::Actor;
use crate::rates::RateCatalog;
use crate::store::RecordStore;

use super::types::{EngineSettings, HolidaySeed, HolidaysConfig, RateSeed, RatesConfig};

/// Loads and provides access to a provisioning configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── settings.yaml   # Region, flat tax rate, UTC offset
/// ├── rates.yaml      # Base rate, surcharges, fixed rates
/// └── holidays.yaml   # Holiday rows per region and year
/// ```
///
/// # Example
///
/// ```no_run
/// use timeclock_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// assert!(!loader.settings().region.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: EngineSettings,
    rates: Vec<RateSeed>,
    holidays: Vec<HolidaySeed>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails with [`EngineError::Configuration`] when a file is missing or
    /// contains invalid YAML, and with [`EngineError::Validation`] when the
    /// settings are out of range. The rate table must contain exactly one
    /// base rate.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("settings.yaml"))?;
        settings.validate()?;

        let rates_config = Self::load_yaml::<RatesConfig>(&path.join("rates.yaml"))?;
        let base_count = rates_config
            .rates
            .iter()
            .filter(|rate| rate.is_base_rate)
            .count();
        if base_count != 1 {
            return Err(EngineError::configuration(format!(
                "rates.yaml must define exactly one base rate, found {base_count}"
            )));
        }

        let holidays_config = Self::load_yaml::<HolidaysConfig>(&path.join("holidays.yaml"))?;

        Ok(ConfigLoader {
            settings,
            rates: rates_config.rates,
            holidays: holidays_config.holidays,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| {
            EngineError::configuration(format!("configuration file not found: {path_str}"))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            EngineError::configuration(format!("failed to parse '{path_str}': {e}"))
        })
    }

    /// The loaded engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Writes the loaded rate table and holiday calendar into a store.
    ///
    /// Seeding goes through the catalog and calendar mutations, so the
    /// same validation and uniqueness rules apply as for any administrator
    /// edit. The acting administrator is recorded in the audit log.
    pub fn seed_store<S: RecordStore>(&self, store: &Arc<S>, actor: &Actor) -> EngineResult<()> {
        let catalog = RateCatalog::new(Arc::clone(store));
        for seed in &self.rates {
            catalog.create_rate(actor, seed.clone().into_rate())?;
        }

        let calendar = HolidayCalendar::new(Arc::clone(store));
        for seed in &self.holidays {
            calendar.add_holiday(actor, seed.clone().into_holiday())?;
        }

        info!(
            rates = self.rates.len(),
            holidays = self.holidays.len(),
            "store seeded from configuration"
        );
        Ok(())
    }
}
