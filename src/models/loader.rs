//! Artifact loading

use crate::config::{ArtifactsConfig, ModelFormat};
use crate::feature_extractor::CATEGORICAL_COLUMNS;
use crate::models::encoders::EncoderSet;
use crate::models::regressor::{LinearModel, OnnxModel, PriceModel};
use crate::models::scaler::StandardScaler;
use anyhow::{bail, Context, Result};
use once_cell::sync::OnceCell;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

static SHARED_ASSETS: OnceCell<Assets> = OnceCell::new();

/// Loader for regression models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self { onnx_threads }
    }

    /// Load a model in the given format
    pub fn load<P: AsRef<Path>>(&self, path: P, format: &ModelFormat) -> Result<Box<dyn PriceModel>> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        match format {
            ModelFormat::Onnx => Ok(Box::new(self.load_onnx(path, &name)?)),
            ModelFormat::Linear => {
                info!(model = %name, path = %path.display(), "Loading linear model");
                Ok(Box::new(LinearModel::from_file(path, &name)?))
            }
        }
    }

    /// Load an ONNX regressor
    pub fn load_onnx<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<OnnxModel> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // Exported regressors name their single output "variable"
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("variable") || o.name.contains("output"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(OnnxModel::new(name.to_string(), session, input_name, output_name))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

/// Read the ordered feature column list
pub fn load_feature_columns<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature columns from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse feature columns in {}", path.display()))
}

/// Initialize `cell` with `load` at most once, however many threads race
fn load_once<'c>(
    cell: &'c OnceCell<Assets>,
    load: impl FnOnce() -> Result<Assets>,
) -> Result<&'c Assets> {
    cell.get_or_try_init(load)
}

/// The four fitted artifacts, read-only once loaded
pub struct Assets {
    model: Box<dyn PriceModel>,
    scaler: StandardScaler,
    encoders: EncoderSet,
    feature_columns: Vec<String>,
}

impl Assets {
    /// Assemble assets and check that they agree with each other
    pub fn new(
        model: Box<dyn PriceModel>,
        scaler: StandardScaler,
        encoders: EncoderSet,
        feature_columns: Vec<String>,
    ) -> Result<Self> {
        if feature_columns.is_empty() {
            bail!("Feature column list is empty");
        }

        let mut seen = HashSet::with_capacity(feature_columns.len());
        if let Some(duplicate) = feature_columns.iter().find(|c| !seen.insert(c.as_str())) {
            bail!("Feature column {:?} is listed more than once", duplicate);
        }

        scaler.check_columns(&feature_columns)?;
        if encoders.is_empty() {
            bail!("No label encoders loaded");
        }
        encoders.require(&CATEGORICAL_COLUMNS)?;

        if let Some(width) = model.input_width() {
            if width != feature_columns.len() {
                bail!(
                    "Model {} expects {} features but the feature list has {}",
                    model.name(),
                    width,
                    feature_columns.len()
                );
            }
        }

        Ok(Self {
            model,
            scaler,
            encoders,
            feature_columns,
        })
    }

    /// Load all four artifacts named in the configuration
    pub fn load(config: &ArtifactsConfig) -> Result<Self> {
        let feature_columns = load_feature_columns(config.path(&config.feature_columns_file))?;
        let encoders = EncoderSet::from_file(config.path(&config.encoders_file))?;
        let scaler = StandardScaler::from_file(config.path(&config.scaler_file))?;
        let model = ModelLoader::with_threads(config.onnx_threads)
            .load(config.path(&config.model_file), &config.model_format)?;

        let assets = Self::new(model, scaler, encoders, feature_columns)
            .with_context(|| format!("Artifacts in {} are inconsistent", config.dir))?;

        info!(
            dir = %config.dir,
            model = %assets.model.name(),
            features = assets.feature_columns.len(),
            encoders = assets.encoders.len(),
            "Artifacts loaded"
        );

        Ok(assets)
    }

    /// Process-wide assets, loaded on first use.
    ///
    /// Concurrent first callers block until a single load finishes. A failed
    /// load leaves the cell empty so the next call retries. Later calls return
    /// the stored assets and ignore `config`.
    pub fn shared(config: &ArtifactsConfig) -> Result<&'static Assets> {
        load_once(&SHARED_ASSETS, || Self::load(config))
    }

    pub fn model(&self) -> &dyn PriceModel {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Valid labels for a categorical column
    pub fn vocabulary(&self, column: &str) -> Option<&[String]> {
        self.encoders.get(column).map(|e| e.classes())
    }
}
