//! Route notifications
//!
//! When an order names a route, the routing service is told which exporter
//! and importer plant travel on it. Notifications are sent after the order
//! is committed and their failure never undoes the order; see
//! [`crate::orders::OrderService`].

use crate::core::error::NotificationError;
use crate::entities::OperationType;
use crate::entities::order::Order;
use crate::server::exposure::grpc::proto;
use crate::server::exposure::grpc::proto::route_service_client::RouteServiceClient;
use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// What the routing service is told about an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNotification {
    pub exporter_code: String,
    pub importer_plant: String,
    pub route_name: String,
    pub operation_type: OperationType,
}

impl RouteNotification {
    /// Notification for an order travelling on `route_name`
    pub fn for_order(order: &Order, route_name: &str) -> Self {
        Self {
            exporter_code: order.exporter.code.clone(),
            importer_plant: order.importer.plant.clone(),
            route_name: route_name.to_string(),
            operation_type: OperationType::Import,
        }
    }
}

/// Sink for route notifications
#[async_trait]
pub trait RouteNotifier: Send + Sync {
    async fn notify(&self, notification: &RouteNotification) -> Result<(), NotificationError>;
}

/// Used when no routing service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRouteNotifier;

#[async_trait]
impl RouteNotifier for NoopRouteNotifier {
    async fn notify(&self, notification: &RouteNotification) -> Result<(), NotificationError> {
        tracing::debug!(
            route = %notification.route_name,
            "No route service configured, notification dropped"
        );
        Ok(())
    }
}

/// Calls `RouteService.Notify` over gRPC
///
/// The channel connects lazily, so a routing service that is down at startup
/// only shows up as failed notifications.
#[derive(Clone)]
pub struct GrpcRouteNotifier {
    client: RouteServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcRouteNotifier {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, NotificationError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| NotificationError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?
            .connect_timeout(timeout)
            .connect_lazy();

        Ok(Self {
            client: RouteServiceClient::new(channel),
            timeout,
        })
    }
}

#[async_trait]
impl RouteNotifier for GrpcRouteNotifier {
    async fn notify(&self, notification: &RouteNotification) -> Result<(), NotificationError> {
        let request = proto::NotifyRouteRequest {
            exporter_code: notification.exporter_code.clone(),
            importer_plant: notification.importer_plant.clone(),
            name: notification.route_name.clone(),
            operation_type: proto::OperationType::from(notification.operation_type) as i32,
        };

        let mut client = self.client.clone();
        match tokio::time::timeout(self.timeout, client.notify(request)).await {
            Err(_) => Err(NotificationError::Timeout(self.timeout)),
            Ok(Err(status)) => Err(NotificationError::Rejected {
                code: status.code(),
                message: status.message().to_string(),
            }),
            Ok(Ok(_)) => {
                tracing::debug!(
                    route = %notification.route_name,
                    exporter = %notification.exporter_code,
                    plant = %notification.importer_plant,
                    "Route service notified"
                );
                Ok(())
            }
        }
    }
}
