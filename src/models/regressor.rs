//! Regression models that turn a scaled feature row into a price

use crate::error::EstimateError;
use anyhow::{bail, Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// A fitted regressor over a fixed-width feature row.
pub trait PriceModel: Send + Sync {
    /// Model name, used in logs and estimates
    fn name(&self) -> &str;

    /// Expected row width, when the artifact declares one
    fn input_width(&self) -> Option<usize>;

    /// Predict the price for a single scaled row
    fn predict(&self, features: &[f32]) -> Result<f64, EstimateError>;
}

/// Regressor exported to ONNX and run with ONNX Runtime
pub struct OnnxModel {
    name: String,
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    pub(crate) fn new(
        name: String,
        session: Session,
        input_name: String,
        output_name: String,
    ) -> Self {
        Self {
            name,
            session: Mutex::new(session),
            input_name,
            output_name,
        }
    }

    fn model_error(&self, context: &str, err: impl std::fmt::Display) -> EstimateError {
        EstimateError::Model(format!("{} ({}): {}", context, self.name, err))
    }
}

impl PriceModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> Option<usize> {
        None
    }

    fn predict(&self, features: &[f32]) -> Result<f64, EstimateError> {
        // Shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| self.model_error("Failed to create input tensor", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| self.model_error("Lock error", e))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| self.model_error("Session run failed", e))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            self.model_error("Missing output", format!("no output named {:?}", self.output_name))
        })?;

        // Regressors export float outputs unless converted with double precision
        let value = if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            data.first().map(|&v| f64::from(v))
        } else {
            let (_, data) = output
                .try_extract_tensor::<f64>()
                .map_err(|e| self.model_error("Unsupported output type", e))?;
            data.first().copied()
        };

        let price = value.ok_or_else(|| self.model_error("Empty output", "no values"))?;
        debug!(model = %self.name, price = price, "ONNX inference complete");
        Ok(price)
    }
}

/// On-disk layout of a linear coefficient export
#[derive(Debug, Deserialize)]
struct LinearModelFile {
    intercept: f64,
    coefficients: Vec<f64>,
}

/// Linear regressor: `intercept + Σ coefficient_i * x_i`
#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(name: impl Into<String>, intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            bail!("Linear model has no coefficients");
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            bail!("Linear model parameters must be finite");
        }
        Ok(Self {
            name: name.into(),
            intercept,
            coefficients,
        })
    }

    /// Load a linear model from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read linear model from {}", path.display()))?;
        let raw: LinearModelFile = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse linear model in {}", path.display()))?;

        Self::new(name, raw.intercept, raw.coefficients)
            .with_context(|| format!("Invalid linear model in {}", path.display()))
    }
}

impl PriceModel for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict(&self, features: &[f32]) -> Result<f64, EstimateError> {
        if features.len() != self.coefficients.len() {
            return Err(EstimateError::SchemaMismatch(format!(
                "model {} expects {} features, got {}",
                self.name,
                self.coefficients.len(),
                features.len()
            )));
        }

        Ok(self.intercept
            + features
                .iter()
                .zip(&self.coefficients)
                .map(|(&x, c)| f64::from(x) * c)
                .sum::<f64>())
    }
}
