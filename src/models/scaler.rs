//! Fitted standard scaler

use crate::error::EstimateError;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// On-disk layout of the scaler artifact
#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names_in: Option<Vec<String>>,
}

/// Per-column standardization fitted at training time: `(x - mean) / scale`.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    feature_names_in: Option<Vec<String>>,
}

impl StandardScaler {
    /// Create a scaler from fitted statistics.
    ///
    /// A zero scale marks a constant training column and is replaced by 1.0,
    /// which is what the fitting side does as well.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            bail!(
                "Scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            );
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            bail!("Scaler statistics must be finite");
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self {
            mean,
            scale,
            feature_names_in: None,
        })
    }

    /// Record the column names the scaler was fitted on
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.mean.len() {
            bail!(
                "Scaler lists {} feature names for {} columns",
                names.len(),
                self.mean.len()
            );
        }
        self.feature_names_in = Some(names);
        Ok(self)
    }

    /// Load a scaler from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler from {}", path.display()))?;
        let raw: ScalerFile = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scaler in {}", path.display()))?;

        let scaler = Self::new(raw.mean, raw.scale)
            .with_context(|| format!("Invalid scaler in {}", path.display()))?;
        match raw.feature_names_in {
            Some(names) => scaler
                .with_feature_names(names)
                .with_context(|| format!("Invalid scaler in {}", path.display())),
            None => Ok(scaler),
        }
    }

    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Check the scaler against the model's feature column order
    pub fn check_columns(&self, feature_columns: &[String]) -> Result<()> {
        if self.n_features() != feature_columns.len() {
            bail!(
                "Scaler was fitted on {} columns but the feature list has {}",
                self.n_features(),
                feature_columns.len()
            );
        }
        if let Some(names) = &self.feature_names_in {
            if let Some((i, (fitted, expected))) = names
                .iter()
                .zip(feature_columns)
                .enumerate()
                .find(|(_, (fitted, expected))| fitted != expected)
            {
                bail!(
                    "Scaler column {} is {:?} but the feature list expects {:?}",
                    i,
                    fitted,
                    expected
                );
            }
        }
        Ok(())
    }

    /// Scale one ordered feature row
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, EstimateError> {
        if row.len() != self.n_features() {
            return Err(EstimateError::SchemaMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}
