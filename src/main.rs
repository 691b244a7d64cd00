//! Car Price Estimator - Main Entry Point
//!
//! Loads the fitted artifacts once, then reads newline-delimited JSON vehicle
//! records from stdin (or `CAR_PRICE_INPUT`) and prints one estimate per record.

use anyhow::{Context, Result};
use car_price_estimator::{
    config::{AppConfig, LoggingConfig, OutputFormat},
    feature_extractor::CATEGORICAL_COLUMNS,
    metrics::EstimatorMetrics,
    models::{Assets, PriceEstimator},
    types::VehicleRecord,
};
use serde_json::json;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::time::Instant;
use tracing::{debug, error, info, warn};

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("car_price_estimator={}", logging.level).parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn open_input() -> Result<Box<dyn BufRead>> {
    match std::env::var("CAR_PRICE_INPUT") {
        Ok(path) => {
            let file = File::open(&path).with_context(|| format!("Failed to open input {}", path))?;
            info!(path = %path, "Reading records from file");
            Ok(Box::new(BufReader::new(file)))
        }
        Err(_) => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    init_logging(&config.logging)?;
    info!("Starting Car Price Estimator");

    let reference_year = config.pipeline.reference_year();
    info!(
        reference_year = reference_year,
        artifacts_dir = %config.artifacts.dir,
        model_format = ?config.artifacts.model_format,
        "Configuration loaded successfully"
    );

    // Without every artifact no estimate can be produced
    let assets = match Assets::shared(&config.artifacts) {
        Ok(assets) => assets,
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "Required artifacts could not be loaded");
            return Err(e.context("Required artifacts could not be loaded"));
        }
    };

    for column in CATEGORICAL_COLUMNS {
        if let Some(vocabulary) = assets.vocabulary(column) {
            info!(column = %column, choices = vocabulary.len(), "Fitted vocabulary");
        }
    }

    let estimator =
        PriceEstimator::new(assets, reference_year).with_bounds(config.validation.clone());
    let metrics = EstimatorMetrics::new();

    let input = open_input()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;
        let start_time = Instant::now();

        let record: VehicleRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no, error = %e, "Failed to deserialize vehicle record");
                metrics.record_failure("malformed_record");
                write_error(&mut out, &config.display.format, "malformed_record", &e.to_string())?;
                continue;
            }
        };

        match estimator.estimate_price(&record) {
            Ok(estimate) => {
                let processing_time = start_time.elapsed();
                metrics.record_estimate(processing_time, estimate.price);

                match config.display.format {
                    OutputFormat::Text => {
                        writeln!(out, "{}", estimate.formatted(&config.display.currency_symbol))?
                    }
                    OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&estimate)?)?,
                }

                debug!(
                    line = line_no,
                    estimate_id = %estimate.estimate_id,
                    price = estimate.price,
                    processing_time_us = processing_time.as_micros(),
                    "Estimate served"
                );
            }
            Err(e) => {
                warn!(line = line_no, name = %record.name, error = %e, "Estimate failed");
                metrics.record_failure(e.kind());
                write_error(&mut out, &config.display.format, e.kind(), &e.to_string())?;
            }
        }
        out.flush()?;
    }

    info!("Input exhausted, shutting down...");
    metrics.print_summary();

    Ok(())
}

fn write_error(out: &mut impl Write, format: &OutputFormat, kind: &str, message: &str) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "error: {}", message)?,
        OutputFormat::Json => writeln!(out, "{}", json!({ "error": message, "kind": kind }))?,
    }
    Ok(())
}
