//! API exposure
//!
//! gRPC is the only transport. Its router is a plain axum `Router`, so other
//! routes can be merged next to it.

pub mod grpc;

pub use grpc::GrpcExposure;
