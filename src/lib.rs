//! # comex
//!
//! gRPC backend for foreign-trade orders.
//!
//! An order ties an exporter, an importer plant, a responsible user and a set
//! of materials together and follows the shipment through its milestones.
//! Besides the order workflow the crate serves the reference data orders are
//! built from.
//!
//! ## Layout
//!
//! - [`entities`]: domain types, including the [`Order`](entities::Order) aggregate
//! - [`services`]: reference-data registries (exporters, importers, materials,
//!   users, delivery places, operations, processes, points)
//! - [`orders`]: order create/update/delete and the read filter dispatcher
//! - [`storage`]: in-memory and PostgreSQL backends behind the traits of [`core::store`]
//! - [`clients`]: the route service collaborator
//! - [`server`]: gRPC exposure and the [`ServerBuilder`](server::ServerBuilder)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use comex::prelude::*;
//!
//! ServerBuilder::new()
//!     .with_repositories(Repositories::in_memory())
//!     .with_route_notifier(NoopRouteNotifier)
//!     .serve("0.0.0.0:50051")
//!     .await?;
//! ```

pub mod clients;
pub mod config;
pub mod core;
pub mod entities;
pub mod orders;
pub mod server;
pub mod services;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::clients::{
        GrpcRouteNotifier, NoopRouteNotifier, RouteNotification, RouteNotifier,
    };
    pub use crate::config::AppConfig;
    pub use crate::core::{
        ComexError, ComexResult, Entity, EntityStore, OrderStore, Page, PageRequest,
        SortDirection,
    };
    pub use crate::entities::{
        DeliveryPlace, Exporter, Importer, Material, Modal, Operation, OperationType, Order,
        OrderStatus, Point, Process, User,
    };
    pub use crate::orders::{OrderFilter, OrderSearch, OrderService};
    pub use crate::server::{ServerBuilder, ServerHost};
    pub use crate::storage::{InMemoryStore, Repositories};

    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;
}
