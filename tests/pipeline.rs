//! End-to-end estimates over artifacts written to disk

use car_price_estimator::config::{AppConfig, ArtifactsConfig, ModelFormat};
use car_price_estimator::validation::InputBounds;
use car_price_estimator::{Assets, EstimateError, PriceEstimator, VehicleRecord};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FEATURE_COLUMNS: [&str; 15] = [
    "name",
    "year",
    "km_driven",
    "fuel",
    "seller_type",
    "transmission",
    "owner",
    "seats",
    "max_power (in bph)",
    "Mileage",
    "Engine (CC)",
    "Mileage Unit",
    "age",
    "price_per_km",
    "power_per_seat",
];

fn write_artifacts(dir: &Path) {
    fs::write(
        dir.join("feature_columns.json"),
        serde_json::to_string(&FEATURE_COLUMNS).unwrap(),
    )
    .unwrap();

    let encoders = json!({
        "name": ["Honda City", "Hyundai i20", "Maruti Swift", "Toyota Innova"],
        "fuel": ["CNG", "Diesel", "LPG", "Petrol"],
        "seller_type": ["Dealer", "Individual", "Trustmark Dealer"],
        "transmission": ["Automatic", "Manual"],
        "owner": ["First Owner", "Fourth & Above Owner", "Second Owner", "Test Drive Car", "Third Owner"],
        "Mileage Unit": ["km/kg", "kmpl"]
    });
    fs::write(dir.join("label_encoders.json"), encoders.to_string()).unwrap();

    let scaler = json!({
        "mean": [1.5, 2014.0, 70000.0, 2.0, 1.0, 0.8, 1.0, 5.2, 90.0, 19.0, 1450.0, 0.9, 11.0, 1.0, 17.0],
        "scale": [1.1, 4.0, 55000.0, 1.2, 0.5, 0.4, 1.3, 0.9, 35.0, 4.0, 500.0, 0.3, 4.0, 0.0, 6.0],
        "feature_names_in": FEATURE_COLUMNS
    });
    fs::write(dir.join("scaler.json"), scaler.to_string()).unwrap();

    let model = json!({
        "intercept": 600000.0,
        "coefficients": [
            5000.0, 30000.0, -40000.0, 10000.0, -5000.0, -60000.0, -20000.0, 8000.0,
            150000.0, 5000.0, 40000.0, 1000.0, -30000.0, 0.0, 20000.0
        ]
    });
    fs::write(dir.join("car_price_model.json"), model.to_string()).unwrap();
}

fn artifacts_config(dir: &Path) -> ArtifactsConfig {
    ArtifactsConfig {
        dir: dir.display().to_string(),
        model_file: "car_price_model.json".to_string(),
        model_format: ModelFormat::Linear,
        ..ArtifactsConfig::default()
    }
}

fn load() -> (TempDir, Assets) {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let assets = Assets::load(&artifacts_config(dir.path())).unwrap();
    (dir, assets)
}

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

#[test]
fn test_swift_scenario() {
    let (_dir, assets) = load();
    let estimator = PriceEstimator::new(&assets, 2025).with_bounds(InputBounds::default());

    let estimate = estimator.estimate_price(&swift()).unwrap();

    assert_eq!(estimate.derived.age, 7);
    assert_eq!(estimate.derived.power_per_seat, 20.0);
    assert_eq!(estimate.derived.price_per_km, 1.0);
    assert!(estimate.price.is_finite());
    assert!(estimate.price > 0.0);
    assert_eq!(estimate.model, "car_price_model");
    assert!(estimate.formatted("₹").starts_with("₹ "));
}

#[test]
fn test_hybrid_fuel_is_unknown_category() {
    let (_dir, assets) = load();
    let estimator = PriceEstimator::new(&assets, 2025);
    let record = VehicleRecord {
        fuel: "Hybrid".to_string(),
        ..swift()
    };

    let err = estimator.estimate_price(&record).unwrap_err();

    assert_eq!(
        err,
        EstimateError::UnknownCategory {
            column: "fuel".to_string(),
            value: "Hybrid".to_string(),
        }
    );
}

#[test]
fn test_every_vocabulary_label_estimates() {
    let (_dir, assets) = load();
    let estimator = PriceEstimator::new(&assets, 2025);

    for column in ["name", "fuel", "seller_type", "transmission", "owner", "Mileage Unit"] {
        for label in assets.vocabulary(column).unwrap() {
            let mut record = swift();
            match column {
                "name" => record.name = label.clone(),
                "fuel" => record.fuel = label.clone(),
                "seller_type" => record.seller_type = label.clone(),
                "transmission" => record.transmission = label.clone(),
                "owner" => record.owner = label.clone(),
                _ => record.mileage_unit = label.clone(),
            }

            let estimate = estimator
                .estimate_price(&record)
                .unwrap_or_else(|e| panic!("{} = {:?} failed: {}", column, label, e));
            assert!(estimate.price.is_finite());
        }
    }
}

#[test]
fn test_same_record_same_price() {
    let (_dir, assets) = load();
    let estimator = PriceEstimator::new(&assets, 2025);

    let first = estimator.estimate_price(&swift()).unwrap();
    let second = estimator.estimate_price(&swift()).unwrap();

    assert_eq!(first.price.to_bits(), second.price.to_bits());
    assert_eq!(
        estimator.feature_vector(&swift()).unwrap(),
        estimator.feature_vector(&swift()).unwrap()
    );
    assert_eq!(
        estimator.feature_vector(&swift()).unwrap().len(),
        assets.feature_columns().len()
    );
}

#[test]
fn test_encoding_ignores_other_fields() {
    let (_dir, assets) = load();
    let estimator = PriceEstimator::new(&assets, 2025);
    let fuel_index = assets
        .feature_columns()
        .iter()
        .position(|c| c == "fuel")
        .unwrap();

    let other = VehicleRecord {
        name: "Toyota Innova".to_string(),
        year: 2010,
        seats: 7,
        transmission: "Automatic".to_string(),
        ..swift()
    };

    let a = estimator.feature_vector(&swift()).unwrap();
    let b = estimator.feature_vector(&other).unwrap();
    assert_eq!(a[fuel_index], 3.0);
    assert_eq!(a[fuel_index], b[fuel_index]);
}

#[test]
fn test_schema_mismatch_is_fatal_at_load() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    fs::write(
        dir.path().join("feature_columns.json"),
        r#"["name", "year", "torque"]"#,
    )
    .unwrap();

    let result = Assets::load(&artifacts_config(dir.path()));
    assert!(result.is_err());
}

#[test]
fn test_corrupt_artifact_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    fs::write(dir.path().join("scaler.json"), "{ not json").unwrap();

    let err = Assets::load(&artifacts_config(dir.path())).err().unwrap();
    assert!(format!("{:#}", err).contains("scaler.json"));
}

#[test]
fn test_config_file_drives_loading() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[artifacts]
dir = "{}"
model_file = "car_price_model.json"
model_format = "linear"

[pipeline]
reference_year = 2025
"#,
            dir.path().display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();

    let config = AppConfig::load_from_path(&config_path).unwrap();
    let assets = Assets::load(&config.artifacts).unwrap();
    let estimator = PriceEstimator::new(&assets, config.pipeline.reference_year())
        .with_bounds(config.validation.clone());

    assert!(estimator.estimate_price(&swift()).is_ok());
}
