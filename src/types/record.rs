//! Vehicle record submitted for valuation

use serde::{Deserialize, Serialize};

/// Raw attributes of one vehicle, as collected from the user.
///
/// Every field is required. Aliases accept the column names used by the
/// training data so exported rows can be replayed directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Brand and model label (e.g. "Maruti Swift")
    pub name: String,

    /// Year of manufacture
    pub year: i32,

    /// Total kilometers driven
    pub km_driven: u64,

    /// Fuel type label
    pub fuel: String,

    /// Seller type label (e.g. "Individual", "Dealer")
    pub seller_type: String,

    /// Transmission label
    pub transmission: String,

    /// Ownership history label (e.g. "First Owner")
    pub owner: String,

    /// Seat count
    pub seats: u32,

    /// Max power rating in bhp
    #[serde(alias = "max_power (in bph)")]
    pub max_power: f64,

    /// Fuel efficiency, in `mileage_unit`
    #[serde(alias = "Mileage")]
    pub mileage: f64,

    /// Engine displacement in cc
    #[serde(alias = "Engine (CC)")]
    pub engine_cc: f64,

    /// Unit label for `mileage` (e.g. "kmpl", "km/kg")
    #[serde(alias = "Mileage Unit")]
    pub mileage_unit: String,
}
