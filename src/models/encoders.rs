//! Label encoders for categorical columns

use crate::error::EstimateError;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Fitted label encoder for one column.
///
/// The code of a label is its position in the fitted class list.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build an encoder from its fitted class list
    pub fn new(column: impl Into<String>, classes: Vec<String>) -> Result<Self> {
        let column = column.into();

        if classes.is_empty() {
            bail!("Encoder for column {:?} has an empty vocabulary", column);
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), code).is_some() {
                bail!(
                    "Encoder for column {:?} lists class {:?} more than once",
                    column,
                    label
                );
            }
        }

        // Fitted class lists come out sorted; anything else usually means the
        // export reordered them and every code downstream is shifted.
        if classes.windows(2).any(|pair| pair[0] > pair[1]) {
            warn!(column = %column, "Encoder classes are not sorted");
        }

        Ok(Self {
            column,
            classes,
            codes,
        })
    }

    /// Encode a label
    pub fn transform(&self, label: &str) -> Result<usize, EstimateError> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| EstimateError::UnknownCategory {
                column: self.column.clone(),
                value: label.to_string(),
            })
    }

    /// Fitted vocabulary, in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Encoders for every categorical column, keyed by column name
#[derive(Debug, Clone, Default)]
pub struct EncoderSet {
    encoders: HashMap<String, LabelEncoder>,
}

impl EncoderSet {
    /// Build encoders from `{column: [class, ...]}`
    pub fn from_classes(classes: HashMap<String, Vec<String>>) -> Result<Self> {
        let encoders = classes
            .into_iter()
            .map(|(column, classes)| {
                LabelEncoder::new(column.clone(), classes).map(|encoder| (column, encoder))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { encoders })
    }

    /// Load encoders from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read label encoders from {}", path.display()))?;
        let classes: HashMap<String, Vec<String>> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse label encoders in {}", path.display()))?;

        let encoders = Self::from_classes(classes)
            .with_context(|| format!("Invalid label encoders in {}", path.display()))?;

        debug!(
            path = %path.display(),
            columns = encoders.len(),
            "Label encoders loaded"
        );

        Ok(encoders)
    }

    /// Fail unless every listed column has an encoder
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|column| !self.encoders.contains_key(*column))
            .collect();

        if !missing.is_empty() {
            bail!("No label encoder for categorical columns {:?}", missing);
        }
        Ok(())
    }

    /// Encode a label for a column
    pub fn encode(&self, column: &str, label: &str) -> Result<usize, EstimateError> {
        self.encoders
            .get(column)
            .ok_or_else(|| {
                EstimateError::SchemaMismatch(format!("no label encoder for column {:?}", column))
            })?
            .transform(label)
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
