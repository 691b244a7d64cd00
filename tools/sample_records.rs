//! Sample Record Generator
//!
//! Generates random vehicle records from the fitted vocabularies and prints
//! them as newline-delimited JSON, ready to pipe into the estimator.

use car_price_estimator::models::EncoderSet;
use car_price_estimator::validation::{Bound, InputBounds};
use car_price_estimator::VehicleRecord;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::io::{self, Write};
use tracing::{info, warn};

/// Fuel label no fitted vocabulary contains
const OUT_OF_VOCABULARY_FUEL: &str = "Hydrogen";

/// Record generator for testing
struct RecordGenerator {
    rng: ThreadRng,
    encoders: EncoderSet,
    bounds: InputBounds,
}

impl RecordGenerator {
    fn new(encoders: EncoderSet, bounds: InputBounds) -> Self {
        Self {
            rng: rand::thread_rng(),
            encoders,
            bounds,
        }
    }

    /// Generate a record the estimator accepts
    fn generate_valid(&mut self) -> VehicleRecord {
        let year = self.int_in(self.bounds.year) as i32;
        let seats = self.int_in(self.bounds.seats).max(1) as u32;
        let km_driven = self.int_in(self.bounds.km_driven) as u64;
        let engine_cc = self.int_in(self.bounds.engine_cc) as f64;
        let max_power = self.float_in(self.bounds.max_power);
        let mileage = self.float_in(self.bounds.mileage);

        VehicleRecord {
            name: self.label("name"),
            year,
            km_driven,
            fuel: self.label("fuel"),
            seller_type: self.label("seller_type"),
            transmission: self.label("transmission"),
            owner: self.label("owner"),
            seats,
            max_power,
            mileage,
            engine_cc,
            mileage_unit: self.label("Mileage Unit"),
        }
    }

    /// Generate a record whose fuel label is outside the vocabulary
    fn generate_invalid(&mut self) -> VehicleRecord {
        VehicleRecord {
            fuel: OUT_OF_VOCABULARY_FUEL.to_string(),
            ..self.generate_valid()
        }
    }

    fn label(&mut self, column: &str) -> String {
        match self.encoders.get(column) {
            Some(encoder) => {
                let classes = encoder.classes();
                classes[self.rng.gen_range(0..classes.len())].clone()
            }
            None => String::new(),
        }
    }

    fn int_in(&mut self, bound: Bound) -> i64 {
        self.rng
            .gen_range(bound.min.ceil() as i64..=bound.max.floor() as i64)
    }

    fn float_in(&mut self, bound: Bound) -> f64 {
        let value: f64 = self.rng.gen_range(bound.min..=bound.max);
        (value * 10.0).round() / 10.0
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_records=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let encoders_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("artifacts/label_encoders.json");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
    let invalid_rate: f64 = args
        .get(3)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    info!(
        encoders = %encoders_path,
        count = count,
        invalid_rate = invalid_rate,
        "Configuration loaded"
    );

    let encoders = EncoderSet::from_file(encoders_path)?;
    if encoders
        .get("fuel")
        .is_some_and(|e| e.transform(OUT_OF_VOCABULARY_FUEL).is_ok())
    {
        warn!(
            fuel = OUT_OF_VOCABULARY_FUEL,
            "Fuel vocabulary contains the out-of-vocabulary marker; invalid records will be accepted"
        );
    }

    let mut generator = RecordGenerator::new(encoders, InputBounds::default());
    let mut rng = rand::thread_rng();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut invalid_count = 0;

    for _ in 0..count {
        let record = if rng.gen_bool(invalid_rate) {
            invalid_count += 1;
            generator.generate_invalid()
        } else {
            generator.generate_valid()
        };

        writeln!(out, "{}", serde_json::to_string(&record)?)?;
    }

    info!(
        "Completed! Generated {} records ({} valid, {} out-of-vocabulary)",
        count,
        count - invalid_count,
        invalid_count
    );

    Ok(())
}
