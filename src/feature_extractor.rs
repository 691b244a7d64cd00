//! Feature extraction for the resale price model.
//!
//! Rebuilds the single-row feature table the model was trained on: raw record
//! fields under their training column names, the derived features, and the
//! label-encoded categorical columns.

use crate::error::EstimateError;
use crate::models::encoders::EncoderSet;
use crate::types::record::VehicleRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Training-time column names.
pub mod columns {
    pub const NAME: &str = "name";
    pub const KM_DRIVEN: &str = "km_driven";
    pub const FUEL: &str = "fuel";
    pub const SELLER_TYPE: &str = "seller_type";
    pub const TRANSMISSION: &str = "transmission";
    pub const OWNER: &str = "owner";
    pub const SEATS: &str = "seats";
    pub const MAX_POWER: &str = "max_power (in bph)";
    pub const MILEAGE: &str = "Mileage";
    pub const ENGINE: &str = "Engine (CC)";
    pub const MILEAGE_UNIT: &str = "Mileage Unit";
    pub const YEAR: &str = "year";
    pub const AGE: &str = "age";
    pub const PRICE_PER_KM: &str = "price_per_km";
    pub const POWER_PER_SEAT: &str = "power_per_seat";
}

/// Columns that pass through a label encoder before scaling.
pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    columns::NAME,
    columns::FUEL,
    columns::SELLER_TYPE,
    columns::TRANSMISSION,
    columns::OWNER,
    columns::MILEAGE_UNIT,
];

/// Value the model was trained with for `price_per_km`.
///
/// Not a function of distance: the training notebook filled the column with a
/// constant and the fitted model and scaler expect exactly this value.
pub const PRICE_PER_KM_PLACEHOLDER: f64 = 1.0;

/// Features computed from a record by fixed formulas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// `reference_year - year`
    pub age: i32,
    /// Constant placeholder, see [`PRICE_PER_KM_PLACEHOLDER`]
    pub price_per_km: f64,
    /// `max_power / seats`
    pub power_per_seat: f64,
}

/// One fully numeric feature row, keyed by training column name
#[derive(Debug, Clone, Default)]
pub struct FeatureRow {
    values: HashMap<&'static str, f64>,
}

impl FeatureRow {
    fn insert(&mut self, column: &'static str, value: f64) {
        self.values.insert(column, value);
    }

    /// Value of a column, if present
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Select columns in the given order.
    ///
    /// Extra columns in the row are ignored; a requested column the row does
    /// not carry is a schema mismatch.
    pub fn select(&self, feature_columns: &[String]) -> Result<Vec<f64>, EstimateError> {
        feature_columns
            .iter()
            .map(|column| {
                self.get(column).ok_or_else(|| {
                    EstimateError::SchemaMismatch(format!(
                        "expected column {:?} is not produced by the feature extractor",
                        column
                    ))
                })
            })
            .collect()
    }
}

/// Turns vehicle records into model input rows.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    reference_year: i32,
}

impl FeatureExtractor {
    /// Create an extractor that computes `age` against `reference_year`.
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Compute the derived features of a record.
    ///
    /// Fails when `seats` is zero, since `power_per_seat` has no value then.
    pub fn derive(&self, record: &VehicleRecord) -> Result<DerivedFeatures, EstimateError> {
        if record.seats == 0 {
            return Err(EstimateError::InvalidInput {
                field: "seats",
                reason: "must be at least 1".to_string(),
            });
        }

        let power_per_seat = record.max_power / f64::from(record.seats);
        if !power_per_seat.is_finite() {
            return Err(EstimateError::InvalidInput {
                field: "max_power",
                reason: format!("power per seat is not finite ({})", power_per_seat),
            });
        }

        let age = self
            .reference_year
            .checked_sub(record.year)
            .ok_or_else(|| EstimateError::InvalidInput {
                field: "year",
                reason: format!(
                    "{} is too far from reference year {}",
                    record.year, self.reference_year
                ),
            })?;

        Ok(DerivedFeatures {
            age,
            price_per_km: PRICE_PER_KM_PLACEHOLDER,
            power_per_seat,
        })
    }

    /// Build the encoded feature row for a record.
    pub fn build_row(
        &self,
        record: &VehicleRecord,
        derived: &DerivedFeatures,
        encoders: &EncoderSet,
    ) -> Result<FeatureRow, EstimateError> {
        let mut row = FeatureRow::default();

        // Raw numeric fields
        row.insert(columns::KM_DRIVEN, record.km_driven as f64);
        row.insert(columns::SEATS, f64::from(record.seats));
        row.insert(columns::MAX_POWER, record.max_power);
        row.insert(columns::MILEAGE, record.mileage);
        row.insert(columns::ENGINE, record.engine_cc);
        row.insert(columns::YEAR, f64::from(record.year));

        // Engineered
        row.insert(columns::AGE, f64::from(derived.age));
        row.insert(columns::PRICE_PER_KM, derived.price_per_km);
        row.insert(columns::POWER_PER_SEAT, derived.power_per_seat);

        // Categorical
        for (column, label) in Self::categorical_values(record) {
            let code = encoders.encode(column, label)?;
            row.insert(column, code as f64);
        }

        Ok(row)
    }

    /// Extract the ordered, unscaled feature vector for a record.
    pub fn extract(
        &self,
        record: &VehicleRecord,
        encoders: &EncoderSet,
        feature_columns: &[String],
    ) -> Result<Vec<f64>, EstimateError> {
        let derived = self.derive(record)?;
        self.build_row(record, &derived, encoders)?
            .select(feature_columns)
    }

    fn categorical_values(record: &VehicleRecord) -> [(&'static str, &str); 6] {
        [
            (columns::NAME, record.name.as_str()),
            (columns::FUEL, record.fuel.as_str()),
            (columns::SELLER_TYPE, record.seller_type.as_str()),
            (columns::TRANSMISSION, record.transmission.as_str()),
            (columns::OWNER, record.owner.as_str()),
            (columns::MILEAGE_UNIT, record.mileage_unit.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swift() -> VehicleRecord {
        VehicleRecord {
            name: "Maruti Swift".to_string(),
            year: 2018,
            km_driven: 50000,
            fuel: "Petrol".to_string(),
            seller_type: "Individual".to_string(),
            transmission: "Manual".to_string(),
            owner: "First Owner".to_string(),
            seats: 5,
            max_power: 100.0,
            mileage: 18.0,
            engine_cc: 1200.0,
            mileage_unit: "kmpl".to_string(),
        }
    }

    fn encoders() -> EncoderSet {
        let mut classes: HashMap<String, Vec<String>> = HashMap::new();
        classes.insert("name".to_string(), vec!["Hyundai i20".into(), "Maruti Swift".into()]);
        classes.insert("fuel".to_string(), vec!["Diesel".into(), "Petrol".into()]);
        classes.insert("seller_type".to_string(), vec!["Dealer".into(), "Individual".into()]);
        classes.insert("transmission".to_string(), vec!["Automatic".into(), "Manual".into()]);
        classes.insert("owner".to_string(), vec!["First Owner".into(), "Second Owner".into()]);
        classes.insert("Mileage Unit".to_string(), vec!["km/kg".into(), "kmpl".into()]);
        EncoderSet::from_classes(classes).unwrap()
    }

    #[test]
    fn test_derived_features() {
        let extractor = FeatureExtractor::new(2025);
        let derived = extractor.derive(&swift()).unwrap();

        assert_eq!(derived.age, 7);
        assert_eq!(derived.price_per_km, 1.0);
        assert_eq!(derived.power_per_seat, 20.0);
    }

    #[test]
    fn test_age_tracks_reference_year() {
        let record = swift();
        for year in 2000..=2025 {
            let record = VehicleRecord { year, ..record.clone() };
            let derived = FeatureExtractor::new(2025).derive(&record).unwrap();
            assert_eq!(derived.age, 2025 - year);
        }
    }

    #[test]
    fn test_power_per_seat_across_seat_counts() {
        let extractor = FeatureExtractor::new(2025);
        for seats in 1..=10u32 {
            let record = VehicleRecord {
                seats,
                max_power: 117.3,
                ..swift()
            };
            let derived = extractor.derive(&record).unwrap();
            let expected = 117.3 / f64::from(seats);
            assert!(
                (derived.power_per_seat - expected).abs() < 1e-12,
                "seats = {}: {} != {}",
                seats,
                derived.power_per_seat,
                expected
            );
        }
    }

    #[test]
    fn test_extreme_year_rejected() {
        let extractor = FeatureExtractor::new(2025);
        for year in [i32::MIN, i32::MIN + 2025] {
            let record = VehicleRecord { year, ..swift() };
            let err = extractor.derive(&record).unwrap_err();
            assert!(matches!(err, EstimateError::InvalidInput { field: "year", .. }));
        }

        // Largest distance that still fits
        let record = VehicleRecord {
            year: i32::MIN + 2026,
            ..swift()
        };
        assert_eq!(extractor.derive(&record).unwrap().age, i32::MAX);
    }

    #[test]
    fn test_zero_seats_rejected() {
        let record = VehicleRecord { seats: 0, ..swift() };
        let err = FeatureExtractor::new(2025).derive(&record).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_build_row_encodes_categoricals() {
        let extractor = FeatureExtractor::new(2025);
        let record = swift();
        let derived = extractor.derive(&record).unwrap();
        let row = extractor.build_row(&record, &derived, &encoders()).unwrap();

        assert_eq!(row.get(columns::AGE), Some(7.0));
        assert_eq!(row.get(columns::PRICE_PER_KM), Some(1.0));
        assert_eq!(row.get(columns::POWER_PER_SEAT), Some(20.0));
        assert_eq!(row.get(columns::NAME), Some(1.0));
        assert_eq!(row.get(columns::FUEL), Some(1.0));
        assert_eq!(row.get(columns::TRANSMISSION), Some(1.0));
        assert_eq!(row.get(columns::OWNER), Some(0.0));
        assert_eq!(row.get(columns::MILEAGE_UNIT), Some(1.0));
        assert_eq!(row.get(columns::ENGINE), Some(1200.0));
    }

    #[test]
    fn test_select_follows_column_order() {
        let extractor = FeatureExtractor::new(2025);
        let order: Vec<String> = vec!["power_per_seat".into(), "age".into(), "fuel".into()];

        let first = extractor.extract(&swift(), &encoders(), &order).unwrap();
        let second = extractor.extract(&swift(), &encoders(), &order).unwrap();

        assert_eq!(first, vec![20.0, 7.0, 1.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_missing_column() {
        let extractor = FeatureExtractor::new(2025);
        let order: Vec<String> = vec!["age".into(), "torque".into()];

        let err = extractor.extract(&swift(), &encoders(), &order).unwrap_err();
        assert!(matches!(err, EstimateError::SchemaMismatch(_)));
    }

    #[test]
    fn test_unknown_fuel() {
        let record = VehicleRecord {
            fuel: "Hybrid".to_string(),
            ..swift()
        };
        let order: Vec<String> = vec!["fuel".into()];

        let err = FeatureExtractor::new(2025)
            .extract(&record, &encoders(), &order)
            .unwrap_err();

        assert_eq!(
            err,
            EstimateError::UnknownCategory {
                column: "fuel".to_string(),
                value: "Hybrid".to_string(),
            }
        );
    }
}
