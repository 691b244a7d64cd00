//! Type definitions for the car price estimator

pub mod estimate;
pub mod record;

pub use estimate::{format_currency, PriceEstimate};
pub use record::VehicleRecord;
