//! Price inference over the loaded artifacts

use crate::error::EstimateError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::loader::Assets;
use crate::types::estimate::PriceEstimate;
use crate::types::record::VehicleRecord;
use crate::validation::{self, InputBounds};
use tracing::debug;

/// Runs the full estimate for one record at a time.
///
/// Holds no mutable state; any number of estimates may share one instance.
pub struct PriceEstimator<'a> {
    assets: &'a Assets,
    extractor: FeatureExtractor,
    bounds: Option<InputBounds>,
}

impl<'a> PriceEstimator<'a> {
    /// Create an estimator measuring vehicle age against `reference_year`
    pub fn new(assets: &'a Assets, reference_year: i32) -> Self {
        Self {
            assets,
            extractor: FeatureExtractor::new(reference_year),
            bounds: None,
        }
    }

    /// Validate every record against `bounds` before estimating
    pub fn with_bounds(mut self, bounds: InputBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Ordered, encoded, unscaled feature vector for a record
    pub fn feature_vector(&self, record: &VehicleRecord) -> Result<Vec<f64>, EstimateError> {
        self.extractor.extract(
            record,
            self.assets.encoders(),
            self.assets.feature_columns(),
        )
    }

    /// Estimate the selling price of a vehicle
    pub fn estimate_price(&self, record: &VehicleRecord) -> Result<PriceEstimate, EstimateError> {
        if let Some(bounds) = &self.bounds {
            validation::validate(record, bounds)?;
        }

        let derived = self.extractor.derive(record)?;
        let row = self
            .extractor
            .build_row(record, &derived, self.assets.encoders())?;
        let ordered = row.select(self.assets.feature_columns())?;
        let scaled = self.assets.scaler().transform(&ordered)?;

        let input: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let model = self.assets.model();
        let price = model.predict(&input)?;

        if !price.is_finite() {
            return Err(EstimateError::Model(format!(
                "model {} returned a non-finite price ({})",
                model.name(),
                price
            )));
        }

        debug!(
            model = %model.name(),
            age = derived.age,
            power_per_seat = derived.power_per_seat,
            price = price,
            "Estimate complete"
        );

        Ok(PriceEstimate::new(price, derived, model.name()))
    }
}
