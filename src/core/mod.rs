//! Core module containing the traits and types shared by every service

pub mod entity;
pub mod error;
pub mod query;
pub mod store;
pub mod validation;

pub use entity::{Entity, EntityRef, UniqueKey};
pub use error::{
    ComexError, ComexResult, ConfigError, EntityError, FieldValidationError, NotificationError,
    StorageError, StorageResult, ValidationError,
};
pub use query::{Page, PageRequest, SortDirection};
pub use store::{EntityStore, FieldFilter, MatchMode, OrderStore};
