//! Fitted artifacts and price inference

pub mod encoders;
pub mod inference;
pub mod loader;
pub mod regressor;
pub mod scaler;

pub use encoders::{EncoderSet, LabelEncoder};
pub use inference::PriceEstimator;
pub use loader::{Assets, ModelLoader};
pub use regressor::{LinearModel, OnnxModel, PriceModel};
pub use scaler::StandardScaler;
