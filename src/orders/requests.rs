//! Validated inputs of the order operations
//!
//! Identifiers stay strings until validation passes so that a malformed id
//! is reported next to every other invalid field.

use crate::core::validation::validators;
use crate::entities::Modal;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct NewOrderItem {
    #[validate(custom(function = "validators::uuid"))]
    pub material_id: String,
    #[validate(
        required(message = "must not be null"),
        custom(function = "validators::positive")
    )]
    pub quantity: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct NewOrder {
    #[validate(custom(function = "validators::not_blank"))]
    pub origin: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub destination: String,
    #[validate(custom(function = "validators::uuid"))]
    pub exporter_id: String,
    #[validate(
        length(min = 1, message = "size must be between 1 and 2147483647"),
        nested
    )]
    pub items: Vec<NewOrderItem>,
    #[validate(
        custom(function = "validators::not_blank"),
        length(max = 10, message = "size must be between 0 and 10")
    )]
    pub number: String,
    #[validate(custom(function = "validators::uuid"))]
    pub importer_id: String,
    #[validate(
        required(message = "must not be null"),
        custom(function = "validators::past_or_present")
    )]
    pub date: Option<NaiveDate>,
    #[validate(custom(function = "validators::uuid"))]
    pub responsible_id: String,
    #[validate(required(message = "must not be null"))]
    pub modal: Option<Modal>,
    #[validate(required(message = "must not be null"))]
    pub necessity: Option<NaiveDate>,
    #[validate(required(message = "must not be null"))]
    pub deadline: Option<NaiveDate>,
    #[validate(length(max = 1000, message = "size must be between 0 and 1000"))]
    pub observation: String,
    /// Blank when the order has no delivery place yet
    #[validate(custom(function = "validators::optional_uuid"))]
    pub delivery_place_id: String,
    /// Blank means no route; otherwise the route service is notified
    pub route: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateOrder {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(custom(function = "validators::optional_uuid"))]
    pub delivery_place_id: String,
    #[validate(required(message = "must not be null"))]
    pub modal: Option<Modal>,
    #[validate(required(message = "must not be null"))]
    pub necessity: Option<NaiveDate>,
    #[validate(custom(function = "validators::uuid"))]
    pub responsible_id: String,
    #[validate(required(message = "must not be null"))]
    pub deadline: Option<NaiveDate>,
    pub route: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateObservation {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    /// Blank clears the observation
    #[validate(length(max = 1000, message = "size must be between 0 and 1000"))]
    pub observation: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateReference {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(
        custom(function = "validators::not_blank"),
        length(max = 20, message = "size must be between 0 and 20")
    )]
    pub reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate;
    use chrono::{Days, Local};

    fn valid() -> NewOrder {
        let today = Local::now().date_naive();
        NewOrder {
            origin: "EUA".to_string(),
            destination: "Brazil".to_string(),
            exporter_id: "0b5d4a4e-9f0a-4f63-8a8e-1b4c1e3d2a10".to_string(),
            items: vec![NewOrderItem {
                material_id: "7f1c2d3e-4b5a-4c6d-8e7f-9a0b1c2d3e4f".to_string(),
                quantity: Some(Decimal::from(1000)),
            }],
            number: "4200212121".to_string(),
            importer_id: "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d".to_string(),
            date: Some(today),
            responsible_id: "2b3c4d5e-6f7a-4b8c-9d0e-1f2a3b4c5d6e".to_string(),
            modal: Some(Modal::Sea),
            necessity: Some(today),
            deadline: Some(today),
            ..NewOrder::default()
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn test_future_date_and_missing_modal() {
        let request = NewOrder {
            date: Local::now().date_naive().checked_add_days(Days::new(1)),
            modal: None,
            ..valid()
        };
        let violations = validate(&request).unwrap_err().violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "date");
        assert_eq!(violations[0].message, "must be a date in the past or in the present");
        assert_eq!(violations[1].field, "modal");
        assert_eq!(violations[1].message, "must not be null");
    }

    #[test]
    fn test_item_quantity_must_be_positive() {
        let mut request = valid();
        request.items[0].quantity = Some(Decimal::ZERO);
        let violations = validate(&request).unwrap_err().violations();
        assert_eq!(violations[0].field, "items[0].quantity");
        assert_eq!(violations[0].message, "must be greater than 0");
    }

    #[test]
    fn test_blank_reference() {
        let request = UpdateReference {
            id: "0b5d4a4e-9f0a-4f63-8a8e-1b4c1e3d2a10".to_string(),
            reference: "   ".to_string(),
        };
        let violations = validate(&request).unwrap_err().violations();
        assert_eq!(violations[0].field, "reference");
    }
}
