//! The order workflow
//!
//! [`OrderService`] creates and mutates the order aggregate, while
//! [`OrderFilter`] picks the one query a read request asks for.

pub mod filter;
pub mod requests;
pub mod service;

pub use filter::{OrderFilter, OrderSearch};
pub use requests::{NewOrder, NewOrderItem, UpdateObservation, UpdateOrder, UpdateReference};
pub use service::OrderService;
