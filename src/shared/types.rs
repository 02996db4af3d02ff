use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::core::features::unit_converter::registry::Category;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConvertUnitsRequest {
    pub amount: f64,
    pub from_unit: String,
    pub to_unit: String,
    /// Inferred from the units when absent
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConvertUnitsResponse {
    pub result: f64,
    pub formatted_result: String,
    pub from_unit: String,
    pub to_unit: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParseUnitResponse {
    pub amount: f64,
    pub unit: String,
    pub category: Category,
    pub target_unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GetUnitsResponse {
    pub units: Vec<UnitDTO>,
}

// Rich Unit Data Transfer Object for frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitDTO {
    pub id: String,       // Unit symbol (e.g., "m", "kg")
    pub label: String,    // Display name (e.g., "Meters", "Kilograms")
    pub category: String, // Category key (e.g., "length", "mass")
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryDTO {
    pub key: String,
    pub label: String,
    pub linear: bool,
    pub units: Vec<UnitDTO>,
}

/// One line of conversion history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoryEntry {
    #[ts(type = "string")]
    pub id: Uuid,
    /// "{value} {from} = {formatted} {to}"
    pub line: String,
    pub from_unit: String,
    pub to_unit: String,
    pub input: f64,
    pub output: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        line: String,
        from_unit: impl Into<String>,
        to_unit: impl Into<String>,
        input: f64,
        output: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            line,
            from_unit: from_unit.into(),
            to_unit: to_unit.into(),
            input,
            output,
            created_at: Utc::now(),
        }
    }
}
