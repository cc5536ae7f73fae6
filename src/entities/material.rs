//! Materials ordered from exporters

use crate::core::store::constraints;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    /// Mercosur common nomenclature, eight digits
    pub ncm: String,
    pub unit_price: Decimal,
    /// Unit price refers to a thousand units
    pub price_per_thousand: bool,
    pub pre_shipment_license: bool,
    pub planning: String,
    pub ncm_description: Option<String>,
}

crate::impl_entity!(Material, "material", "Material", [constraints::MATERIAL_CODE => code]);

/// Sortable material properties, by wire name
pub fn sort_field(property: &str) -> Option<&'static str> {
    match property {
        "" | "id" => Some("id"),
        "code" => Some("code"),
        "description" => Some("description"),
        "ncm" => Some("ncm"),
        "planning" => Some("planning"),
        _ => None,
    }
}
