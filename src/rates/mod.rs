//! Rate catalog: definitions, lookups, and surcharge resolution.
//!
//! The catalog stores the base hourly rate, the multiplier surcharges with
//! their time windows, and the fixed amount/hours entries used for absences
//! and the monthly bonus. Surcharge precedence lives in [`surcharge`] as a
//! named algorithm.

mod catalog;
pub mod surcharge;

pub use catalog::{FixedRate, RateCatalog};
pub use surcharge::{SurchargeClass, SurchargeMatch, resolve};
