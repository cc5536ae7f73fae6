//! ServerBuilder for fluent construction of the gRPC server

use super::exposure::GrpcExposure;
use super::host::ServerHost;
use crate::clients::{NoopRouteNotifier, RouteNotifier};
use crate::storage::Repositories;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the comex server
///
/// Storage defaults to fresh in-memory repositories and the route notifier
/// to one that drops every notification.
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_repositories(Repositories::in_memory())
///     .with_route_notifier(GrpcRouteNotifier::new("http://routes:50051", timeout)?)
///     .serve("0.0.0.0:50051")
///     .await?;
/// ```
pub struct ServerBuilder {
    repositories: Option<Repositories>,
    notifier: Option<Arc<dyn RouteNotifier>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            repositories: None,
            notifier: None,
        }
    }

    /// Set the storage every service reads and writes
    pub fn with_repositories(mut self, repositories: Repositories) -> Self {
        self.repositories = Some(repositories);
        self
    }

    /// Set the collaborator told about order routes
    pub fn with_route_notifier(mut self, notifier: impl RouteNotifier + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Same as [`with_route_notifier`](Self::with_route_notifier) for an already shared notifier
    pub fn with_shared_route_notifier(mut self, notifier: Arc<dyn RouteNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> ServerHost {
        let repositories = self.repositories.unwrap_or_else(|| {
            tracing::warn!("No repositories configured, using in-memory storage");
            Repositories::in_memory()
        });
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(NoopRouteNotifier));
        ServerHost::new(repositories, notifier)
    }

    /// Build the router with every gRPC service mounted and request tracing
    pub fn build(self) -> Router {
        GrpcExposure::build_router(Arc::new(self.build_host())).layer(TraceLayer::new_for_grpc())
    }

    /// Bind `addr` and serve until Ctrl+C or SIGTERM
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_listener(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C or SIGTERM
    pub async fn serve_with_listener(self, listener: TcpListener) -> Result<()> {
        let app = self.build();
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
