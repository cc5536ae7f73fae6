//! Transport-agnostic server state
//!
//! The host owns one handle per service. Exposures borrow what they need
//! from it; nothing else is shared between requests.

use crate::clients::RouteNotifier;
use crate::orders::OrderService;
use crate::services::{
    DeliveryPlaceService, ExporterService, ImporterService, MaterialService, OperationService,
    PointService, ProcessService, UserService,
};
use crate::storage::Repositories;
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerHost {
    pub exporters: ExporterService,
    pub importers: ImporterService,
    pub materials: MaterialService,
    pub users: UserService,
    pub delivery_places: DeliveryPlaceService,
    pub operations: OperationService,
    pub processes: ProcessService,
    pub points: PointService,
    pub orders: OrderService,
}

impl ServerHost {
    /// Wire every service onto the given repositories
    pub fn new(repositories: Repositories, notifier: Arc<dyn RouteNotifier>) -> Self {
        Self {
            exporters: ExporterService::new(repositories.exporters.clone()),
            importers: ImporterService::new(repositories.importers.clone()),
            materials: MaterialService::new(repositories.materials.clone()),
            users: UserService::new(repositories.users.clone()),
            delivery_places: DeliveryPlaceService::new(repositories.delivery_places.clone()),
            operations: OperationService::new(repositories.operations.clone()),
            processes: ProcessService::new(
                repositories.processes.clone(),
                repositories.users.clone(),
                repositories.operations.clone(),
            ),
            points: PointService::new(repositories.points.clone()),
            orders: OrderService::new(repositories, notifier),
        }
    }
}
