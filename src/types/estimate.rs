//! Price estimate output

use crate::feature_extractor::DerivedFeatures;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a single valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Unique estimate identifier
    pub estimate_id: String,

    /// Estimated selling price, in the currency the model was trained on
    pub price: f64,

    /// Derived features fed to the model
    pub derived: DerivedFeatures,

    /// Name of the model that produced the price
    pub model: String,

    /// Estimate generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl PriceEstimate {
    /// Create a new estimate
    pub fn new(price: f64, derived: DerivedFeatures, model: impl Into<String>) -> Self {
        Self {
            estimate_id: uuid::Uuid::new_v4().to_string(),
            price,
            derived,
            model: model.into(),
            timestamp: Utc::now(),
        }
    }

    /// Price rendered with the given currency symbol
    pub fn formatted(&self, currency_symbol: &str) -> String {
        format_currency(self.price, currency_symbol)
    }
}

/// Format an amount with two decimals and comma thousands separators.
///
/// `format_currency(1234567.891, "₹")` yields `"₹ 1,234,567.89"`.
pub fn format_currency(value: f64, currency_symbol: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    if currency_symbol.is_empty() {
        format!("{sign}{grouped}.{frac_part}")
    } else {
        format!("{currency_symbol} {sign}{grouped}.{frac_part}")
    }
}
