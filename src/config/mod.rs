//! Engine settings and YAML provisioning.
//!
//! Settings carry the region code, the illustrative flat tax rate and the
//! UTC offset used for local-time classification. [`ConfigLoader`] reads a
//! directory of YAML files and can seed a fresh store with a rate table and
//! holiday calendar.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineSettings, HolidaySeed, HolidaysConfig, RateSeed, RatesConfig};
