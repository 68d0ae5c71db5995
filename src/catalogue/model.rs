//! Device catalogue models

use serde::{Deserialize, Serialize};

/// Lendable device type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub total_count: u32,
    pub available_count: u32,
}

impl Device {
    pub fn new(
        id: &str,
        brand: &str,
        model: &str,
        category: &str,
        total_count: u32,
        available_count: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            brand: brand.to_string(),
            model: model.to_string(),
            category: category.to_string(),
            total_count,
            available_count,
        }
    }
}

/// Response body for `GET /api/devices`
#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}
