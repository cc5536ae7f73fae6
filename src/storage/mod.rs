//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use crate::core::store::{EntityStore, OrderStore};
use crate::entities::{
    DeliveryPlace, Exporter, Importer, Material, Operation, Point, Process, User,
};
use std::sync::Arc;

/// Handles on every store, as consumed by the services
///
/// Built once at startup and cloned into each service.
#[derive(Clone)]
pub struct Repositories {
    pub exporters: Arc<dyn EntityStore<Exporter>>,
    pub importers: Arc<dyn EntityStore<Importer>>,
    pub materials: Arc<dyn EntityStore<Material>>,
    pub users: Arc<dyn EntityStore<User>>,
    pub delivery_places: Arc<dyn EntityStore<DeliveryPlace>>,
    pub operations: Arc<dyn EntityStore<Operation>>,
    pub processes: Arc<dyn EntityStore<Process>>,
    pub points: Arc<dyn EntityStore<Point>>,
    pub orders: Arc<dyn OrderStore>,
}

impl Repositories {
    /// Point every repository at one backend
    pub fn from_backend<S>(backend: S) -> Self
    where
        S: OrderStore
            + EntityStore<Exporter>
            + EntityStore<Importer>
            + EntityStore<Material>
            + EntityStore<User>
            + EntityStore<DeliveryPlace>
            + EntityStore<Operation>
            + EntityStore<Process>
            + EntityStore<Point>
            + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            exporters: backend.clone(),
            importers: backend.clone(),
            materials: backend.clone(),
            users: backend.clone(),
            delivery_places: backend.clone(),
            operations: backend.clone(),
            processes: backend.clone(),
            points: backend.clone(),
            orders: backend,
        }
    }

    /// Fresh in-memory repositories
    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryStore::new())
    }
}
