//! gRPC API exposure
//!
//! The services declared in `proto/comex.proto` are implemented on top of a
//! [`ServerHost`] and mounted on an axum router through tonic's axum interop.
//!
//! ## Services
//!
//! - **ExporterService**, **ImporterService**, **MaterialService**,
//!   **UserService**, **DeliveryPlaceService**, **OperationService**,
//!   **ProcessService**, **PointService**: reference data
//! - **ManageOrderService**: create, update, observation, broker reference, delete
//! - **ReadOrderService**: paged, filtered order reads
//!
//! `RouteService` is only consumed, through [`crate::clients::GrpcRouteNotifier`].

pub mod convert;
pub mod order_service;
pub mod reference_service;
pub mod status;

/// Code generated from `proto/comex.proto`
pub mod proto {
    tonic::include_proto!("comex");
}

use crate::server::host::ServerHost;
use axum::Router;
use std::sync::Arc;

pub struct GrpcExposure;

impl GrpcExposure {
    /// Build the router serving every comex gRPC service
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        use order_service::{ManageOrderServiceImpl, ReadOrderServiceImpl};
        use proto::delivery_place_service_server::DeliveryPlaceServiceServer;
        use proto::exporter_service_server::ExporterServiceServer;
        use proto::importer_service_server::ImporterServiceServer;
        use proto::manage_order_service_server::ManageOrderServiceServer;
        use proto::material_service_server::MaterialServiceServer;
        use proto::operation_service_server::OperationServiceServer;
        use proto::point_service_server::PointServiceServer;
        use proto::process_service_server::ProcessServiceServer;
        use proto::read_order_service_server::ReadOrderServiceServer;
        use proto::user_service_server::UserServiceServer;
        use reference_service::*;
        use tonic::service::Routes;

        let mut builder = Routes::builder();
        builder
            .add_service(ExporterServiceServer::new(ExporterServiceImpl::new(
                host.exporters.clone(),
            )))
            .add_service(ImporterServiceServer::new(ImporterServiceImpl::new(
                host.importers.clone(),
            )))
            .add_service(MaterialServiceServer::new(MaterialServiceImpl::new(
                host.materials.clone(),
            )))
            .add_service(UserServiceServer::new(UserServiceImpl::new(
                host.users.clone(),
            )))
            .add_service(DeliveryPlaceServiceServer::new(
                DeliveryPlaceServiceImpl::new(host.delivery_places.clone()),
            ))
            .add_service(OperationServiceServer::new(OperationServiceImpl::new(
                host.operations.clone(),
            )))
            .add_service(ProcessServiceServer::new(ProcessServiceImpl::new(
                host.processes.clone(),
            )))
            .add_service(PointServiceServer::new(PointServiceImpl::new(
                host.points.clone(),
            )))
            .add_service(ManageOrderServiceServer::new(ManageOrderServiceImpl::new(
                host.orders.clone(),
            )))
            .add_service(ReadOrderServiceServer::new(ReadOrderServiceImpl::new(
                host.orders.clone(),
            )));

        tracing::debug!("gRPC services mounted");
        builder.routes().into_axum_router()
    }
}
