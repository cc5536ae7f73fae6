//! Clients for collaborators running outside this service

pub mod route;

pub use route::{GrpcRouteNotifier, NoopRouteNotifier, RouteNotification, RouteNotifier};
