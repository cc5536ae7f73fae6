//! Storage traits
//!
//! Services only talk to storage through these traits. Backends live in
//! [`crate::storage`].

use crate::core::entity::Entity;
use crate::core::error::StorageResult;
use crate::core::query::{Page, PageRequest};
use crate::entities::order::Order;
use async_trait::async_trait;
use uuid::Uuid;

/// Names of the unique constraints enforced by every backend
pub mod constraints {
    pub const EXPORTER_CODE: &str = "exporter_code_uk";
    pub const IMPORTER_PLANT: &str = "importer_plant_uk";
    pub const MATERIAL_CODE: &str = "material_code_uk";
    pub const USER_EMAIL: &str = "user_email_uk";
    pub const DELIVERY_PLACE_NAME: &str = "delivery_place_name_uk";
    pub const OPERATION_COUNTRY_TYPE: &str = "operation_country_type_uk";
    pub const PROCESS_NAME: &str = "process_name_uk";
    pub const POINT_NAME: &str = "point_name_uk";
    pub const PROCESS_RESPONSIBLE: &str = "process_responsible_fk";
    pub const PROCESS_OPERATION: &str = "process_operation_fk";
    pub const ORDER_NUMBER: &str = "order_number_uk";
    pub const ORDER_BROKER_REFERENCE: &str = "order_broker_reference_uk";
}

/// How a field filter compares values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Contains,
}

/// Filter on one serialized field of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: &'static str,
    pub value: String,
    pub mode: MatchMode,
}

impl FieldFilter {
    pub fn exact(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            mode: MatchMode::Exact,
        }
    }

    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            mode: MatchMode::Contains,
        }
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        match (candidate, self.mode) {
            (Some(c), MatchMode::Exact) => c == self.value,
            (Some(c), MatchMode::Contains) => c.contains(self.value.as_str()),
            (None, _) => false,
        }
    }
}

/// Storage for one type of reference entity
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Insert a new entity, failing on unique-key conflicts and dangling references
    async fn insert(&self, entity: T) -> StorageResult<T>;

    /// Get an entity by ID
    async fn get(&self, id: &Uuid) -> StorageResult<Option<T>>;

    /// List all entities of this type
    async fn list(&self) -> StorageResult<Vec<T>>;

    /// Replace a stored entity; `None` when the id is unknown
    async fn update(&self, entity: T) -> StorageResult<Option<T>>;

    /// Remove an entity, failing while orders or other entities still reference it
    async fn delete(&self, id: &Uuid) -> StorageResult<Option<T>>;

    /// Entities whose field matches the filter
    async fn search(&self, filter: &FieldFilter) -> StorageResult<Vec<T>>;

    /// One page of entities, optionally filtered, sorted by a serialized field
    async fn search_page(
        &self,
        filter: Option<&FieldFilter>,
        sort_field: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<T>>;

    /// Whether any entity matches the filter
    async fn exists(&self, filter: &FieldFilter) -> StorageResult<bool> {
        Ok(!self.search(filter).await?.is_empty())
    }
}

/// Storage for the order aggregate (order, items and event)
///
/// Orders are written by reference id and read back fully hydrated.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn exists_by_number(&self, number: &str) -> StorageResult<bool>;

    async fn exists_by_broker_reference(&self, reference: &str) -> StorageResult<bool>;

    /// Persist the order, its items and its event atomically
    async fn insert(&self, order: &Order) -> StorageResult<()>;

    /// Persist the mutable columns of an existing order; `false` when the
    /// order is gone
    async fn update(&self, order: &Order) -> StorageResult<bool>;

    async fn get(&self, id: &Uuid) -> StorageResult<Option<Order>>;

    /// Delete the order with its items and event; `false` when absent
    async fn delete(&self, id: &Uuid) -> StorageResult<bool>;

    async fn find_all(&self, page: &PageRequest) -> StorageResult<Page<Order>>;

    async fn find_by_destination(
        &self,
        destination: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>>;

    async fn find_by_origin(&self, origin: &str, page: &PageRequest)
    -> StorageResult<Page<Order>>;

    async fn find_by_number(&self, number: &str, page: &PageRequest)
    -> StorageResult<Page<Order>>;

    async fn find_by_exporter_id(
        &self,
        exporter_id: &Uuid,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>>;

    async fn find_by_importer_id(
        &self,
        importer_id: &Uuid,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>>;
}
