use crate::core::validation::validators;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Postal address of an exporter or importer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(custom(function = "validators::not_blank"))]
    pub street: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub city: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub zip_code: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub country: String,
}
