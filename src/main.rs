//! comex gRPC server
//!
//! Usage: `comex-server [--config <path>]`. See [`comex::config`] for the
//! file format and the environment variables that override it.

use anyhow::{Context, Result, bail};
use comex::clients::{GrpcRouteNotifier, NoopRouteNotifier, RouteNotifier};
use comex::config::AppConfig;
use comex::server::ServerBuilder;
use comex::storage::Repositories;
use comex::telemetry;
use std::sync::Arc;

fn config_path() -> Result<Option<String>> {
    let mut args = std::env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (None, _) => Ok(None),
        (Some("--config" | "-c"), Some(path)) => Ok(Some(path)),
        (Some(other), _) => bail!("unexpected argument '{}', usage: comex-server [--config <path>]", other),
    }
}

async fn repositories(config: &AppConfig) -> Result<Repositories> {
    let Some(url) = config.database.url.as_deref() else {
        tracing::info!("Using in-memory storage");
        return Ok(Repositories::in_memory());
    };

    #[cfg(feature = "postgres")]
    {
        use comex::storage::PostgresStore;

        let store = PostgresStore::connect(url, config.database.max_connections)
            .await
            .context("connecting to PostgreSQL and creating the schema")?;
        tracing::info!(max_connections = config.database.max_connections, "Using PostgreSQL storage");
        Ok(Repositories::from_backend(store))
    }

    #[cfg(not(feature = "postgres"))]
    {
        let _ = url;
        bail!("a database URL is configured but this binary was built without the 'postgres' feature")
    }
}

fn route_notifier(config: &AppConfig) -> Result<Arc<dyn RouteNotifier>> {
    match config.route_service.endpoint.as_deref() {
        Some(endpoint) => {
            let notifier = GrpcRouteNotifier::new(endpoint, config.route_service.timeout())
                .context("configuring the route service client")?;
            tracing::info!(endpoint, "Route notifications enabled");
            Ok(Arc::new(notifier))
        }
        None => {
            tracing::info!("No route service configured, route notifications are dropped");
            Ok(Arc::new(NoopRouteNotifier))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(config_path()?.as_deref())?;
    telemetry::init(&config.logging)?;

    let repositories = repositories(&config).await?;
    let notifier = route_notifier(&config)?;

    ServerBuilder::new()
        .with_repositories(repositories)
        .with_shared_route_notifier(notifier)
        .serve(&config.server.bind_addr)
        .await
}
