//! Car Price Estimator Library
//!
//! Estimates the resale price of a used car by replaying the training-time
//! feature engineering over a single record and running a pre-fit regressor.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod types;
pub mod validation;

pub use config::AppConfig;
pub use error::EstimateError;
pub use feature_extractor::{DerivedFeatures, FeatureExtractor};
pub use models::{Assets, PriceEstimator};
pub use types::{estimate::PriceEstimate, record::VehicleRecord};
