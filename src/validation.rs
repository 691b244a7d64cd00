//! Input validation at the record boundary.
//!
//! Rejects records the model was never meant to see before any feature is
//! computed. Bounds default to the ranges the input form offers.

use crate::error::EstimateError;
use crate::types::record::VehicleRecord;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str, value: f64) -> Result<(), EstimateError> {
        if !value.is_finite() {
            return Err(EstimateError::InvalidInput {
                field,
                reason: format!("{} is not a finite number", value),
            });
        }
        if value < self.min || value > self.max {
            return Err(EstimateError::InvalidInput {
                field,
                reason: format!("{} is outside [{}, {}]", value, self.min, self.max),
            });
        }
        Ok(())
    }
}

/// Accepted range for every numeric record field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBounds {
    pub year: Bound,
    pub km_driven: Bound,
    pub engine_cc: Bound,
    pub max_power: Bound,
    pub seats: Bound,
    pub mileage: Bound,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            year: Bound::new(2000.0, 2025.0),
            km_driven: Bound::new(0.0, 1_000_000.0),
            engine_cc: Bound::new(600.0, 8000.0),
            max_power: Bound::new(30.0, 1000.0),
            seats: Bound::new(2.0, 10.0),
            mileage: Bound::new(5.0, 50.0),
        }
    }
}

/// Check a record against the bounds, reporting the first violation
pub fn validate(record: &VehicleRecord, bounds: &InputBounds) -> Result<(), EstimateError> {
    // Guards power_per_seat even if the configured range admits zero
    if record.seats == 0 {
        return Err(EstimateError::InvalidInput {
            field: "seats",
            reason: "must be at least 1".to_string(),
        });
    }

    bounds.year.check("year", f64::from(record.year))?;
    bounds.km_driven.check("km_driven", record.km_driven as f64)?;
    bounds.engine_cc.check("engine_cc", record.engine_cc)?;
    bounds.max_power.check("max_power", record.max_power)?;
    bounds.seats.check("seats", f64::from(record.seats))?;
    bounds.mileage.check("mileage", record.mileage)?;

    for (field, label) in [
        ("name", &record.name),
        ("fuel", &record.fuel),
        ("seller_type", &record.seller_type),
        ("transmission", &record.transmission),
        ("owner", &record.owner),
        ("mileage_unit", &record.mileage_unit),
    ] {
        if label.trim().is_empty() {
            return Err(EstimateError::InvalidInput {
                field,
                reason: "must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
