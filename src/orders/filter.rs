//! Read-side dispatch
//!
//! A read request sets at most one search field. [`OrderFilter::from_search`]
//! validates that field and turns it into exactly one query, so nothing
//! reaches storage with a blank or malformed value.

use crate::core::error::{ComexResult, FieldValidationError, StorageResult, ValidationError};
use crate::core::query::{Page, PageRequest};
use crate::core::store::OrderStore;
use crate::entities::Order;
use uuid::Uuid;

/// Orders are looked up by number only with a complete number
const MIN_NUMBER_LEN: usize = 10;

/// The search field a read request carries, exactly as received
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderSearch {
    Destination(String),
    Origin(String),
    Number(String),
    ExporterId(String),
    ImporterId(String),
    #[default]
    None,
}

/// A validated read query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFilter {
    ByDestination(String),
    ByOrigin(String),
    ByNumber(String),
    ByExporter(Uuid),
    ByImporter(Uuid),
    Neutral,
}

fn violation(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::FieldErrors(vec![FieldValidationError::new(field, message)])
}

fn not_blank(field: &str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(violation(field, "must not be blank"))
    } else {
        Ok(value)
    }
}

fn id(field: &str, value: String) -> Result<Uuid, ValidationError> {
    let value = not_blank(field, value)?;
    Uuid::parse_str(value.trim()).map_err(|_| violation(field, "must be a valid UUID"))
}

impl OrderFilter {
    pub fn from_search(search: OrderSearch) -> Result<Self, ValidationError> {
        let filter = match search {
            OrderSearch::Destination(value) => {
                OrderFilter::ByDestination(not_blank("destination", value)?)
            }
            OrderSearch::Origin(value) => OrderFilter::ByOrigin(not_blank("origin", value)?),
            OrderSearch::Number(value) => {
                let value = not_blank("number", value)?;
                if value.chars().count() < MIN_NUMBER_LEN {
                    return Err(violation(
                        "number",
                        format!("size must be between {} and 2147483647", MIN_NUMBER_LEN),
                    ));
                }
                OrderFilter::ByNumber(value)
            }
            OrderSearch::ExporterId(value) => OrderFilter::ByExporter(id("exporterId", value)?),
            OrderSearch::ImporterId(value) => OrderFilter::ByImporter(id("importerId", value)?),
            OrderSearch::None => OrderFilter::Neutral,
        };
        Ok(filter)
    }

    /// Run the query this filter stands for; paging is passed through untouched
    pub async fn execute(
        &self,
        store: &dyn OrderStore,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        match self {
            OrderFilter::ByDestination(destination) => {
                store.find_by_destination(destination, page).await
            }
            OrderFilter::ByOrigin(origin) => store.find_by_origin(origin, page).await,
            OrderFilter::ByNumber(number) => store.find_by_number(number, page).await,
            OrderFilter::ByExporter(id) => store.find_by_exporter_id(id, page).await,
            OrderFilter::ByImporter(id) => store.find_by_importer_id(id, page).await,
            OrderFilter::Neutral => store.find_all(page).await,
        }
    }
}

/// Validate a search and run it
pub async fn search(
    store: &dyn OrderStore,
    search: OrderSearch,
    page: &PageRequest,
) -> ComexResult<Page<Order>> {
    let filter = OrderFilter::from_search(search)?;
    tracing::debug!(?filter, page = page.page, size = page.size, "Reading orders");
    Ok(filter.execute(store, page).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch() {
        assert_eq!(
            OrderFilter::from_search(OrderSearch::Destination("Brazil".to_string())).unwrap(),
            OrderFilter::ByDestination("Brazil".to_string())
        );
        assert_eq!(
            OrderFilter::from_search(OrderSearch::Number("4200212121".to_string())).unwrap(),
            OrderFilter::ByNumber("4200212121".to_string())
        );
        let exporter = Uuid::new_v4();
        assert_eq!(
            OrderFilter::from_search(OrderSearch::ExporterId(exporter.to_string())).unwrap(),
            OrderFilter::ByExporter(exporter)
        );
        assert_eq!(
            OrderFilter::from_search(OrderSearch::None).unwrap(),
            OrderFilter::Neutral
        );
    }

    #[test]
    fn test_blank_values_are_rejected() {
        let err = OrderFilter::from_search(OrderSearch::Origin("  ".to_string())).unwrap_err();
        assert_eq!(
            err.violations(),
            vec![FieldValidationError::new("origin", "must not be blank")]
        );

        let err = OrderFilter::from_search(OrderSearch::ImporterId(String::new())).unwrap_err();
        assert_eq!(err.violations()[0].field, "importerId");
        assert_eq!(err.violations()[0].message, "must not be blank");
    }

    #[test]
    fn test_short_number_and_bad_id() {
        let err = OrderFilter::from_search(OrderSearch::Number("42002".to_string())).unwrap_err();
        assert_eq!(
            err.violations()[0].message,
            "size must be between 10 and 2147483647"
        );

        let err = OrderFilter::from_search(OrderSearch::ExporterId("abc".to_string())).unwrap_err();
        assert_eq!(
            err.violations(),
            vec![FieldValidationError::new("exporterId", "must be a valid UUID")]
        );
    }
}
