//! Server assembly
//!
//! [`ServerBuilder`] wires storage and the route notifier into a
//! [`ServerHost`], and the gRPC exposure mounts the host's services on an
//! axum router.

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use host::ServerHost;
