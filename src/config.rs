//! Configuration management for the car price estimator

use crate::validation::InputBounds;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, overridable with `CAR_PRICE_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Serialization format of the regression model artifact
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// ONNX graph run with ONNX Runtime
    #[default]
    Onnx,
    /// JSON intercept and coefficients
    Linear,
}

/// How estimates are written to stdout
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Currency-formatted price only
    #[default]
    Text,
    /// Full estimate as JSON
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub validation: InputBounds,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Location and names of the fitted artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory containing the artifacts
    pub dir: String,
    /// Regression model file name
    pub model_file: String,
    /// Regression model format
    pub model_format: ModelFormat,
    /// Scaler file name
    pub scaler_file: String,
    /// Label encoders file name
    pub encoders_file: String,
    /// Ordered feature column list file name
    pub feature_columns_file: String,
    /// Number of threads for ONNX inference
    pub onnx_threads: usize,
}

impl ArtifactsConfig {
    /// Path of an artifact inside the artifacts directory
    pub fn path(&self, file: &str) -> PathBuf {
        Path::new(&self.dir).join(file)
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: "artifacts".to_string(),
            model_file: "car_price_rf_model.onnx".to_string(),
            model_format: ModelFormat::Onnx,
            scaler_file: "scaler.json".to_string(),
            encoders_file: "label_encoders.json".to_string(),
            feature_columns_file: "feature_columns.json".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Feature engineering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Year `age` is measured against; the current UTC year when unset
    pub reference_year: Option<i32>,
}

impl PipelineConfig {
    /// Resolve the reference year
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Utc::now().year())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        // The shipped model was trained against 2025
        Self {
            reference_year: Some(2025),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Symbol printed before the price
    pub currency_symbol: String,
    /// Output format
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            format: OutputFormat::Text,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `CAR_PRICE_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("CAR_PRICE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path.
    ///
    /// `CAR_PRICE__<SECTION>__<KEY>` environment variables override the file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CAR_PRICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
