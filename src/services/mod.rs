//! Reference-data services
//!
//! Each service owns the business rules of one entity (uniqueness, existence)
//! on top of an [`EntityStore`]. The order workflow lives in
//! [`crate::orders`].

pub mod delivery_place;
pub mod exporter;
pub mod importer;
pub mod material;
pub mod operation;
pub mod point;
pub mod process;
pub mod user;

pub use delivery_place::DeliveryPlaceService;
pub use exporter::ExporterService;
pub use importer::ImporterService;
pub use material::MaterialService;
pub use operation::OperationService;
pub use point::PointService;
pub use process::{ProcessDetails, ProcessService};
pub use user::UserService;

use crate::core::entity::Entity;
use crate::core::error::{ComexError, ComexResult, EntityError, StorageError};
use crate::core::store::EntityStore;
use uuid::Uuid;

/// Load an entity or fail with "<Entity> not found with id X"
pub(crate) async fn fetch<T: Entity>(store: &dyn EntityStore<T>, id: &Uuid) -> ComexResult<T> {
    tracing::debug!(entity = T::entity_type(), %id, "Looking up entity");
    store
        .get(id)
        .await?
        .ok_or_else(|| ComexError::not_found(T::display_name(), id))
}

/// Map a storage unique violation on `constraint` to the caller-facing conflict
pub(crate) fn conflict(
    err: StorageError,
    constraint: &str,
    message: impl FnOnce() -> String,
) -> ComexError {
    match err {
        StorageError::UniqueViolation { constraint: ref c } if c == constraint => {
            ComexError::already_exists(message())
        }
        other => other.into(),
    }
}

/// Delete an entity, reporting missing ids and entities still referenced
pub(crate) async fn remove<T: Entity>(store: &dyn EntityStore<T>, id: &Uuid) -> ComexResult<T> {
    match store.delete(id).await {
        Ok(Some(entity)) => {
            tracing::info!(entity = T::entity_type(), %id, "Entity deleted");
            Ok(entity)
        }
        Ok(None) => Err(ComexError::not_found(T::display_name(), id)),
        Err(StorageError::ForeignKeyViolation { .. }) => Err(EntityError::StillReferenced {
            entity_type: T::display_name().to_string(),
            id: *id,
        }
        .into()),
        Err(other) => Err(other.into()),
    }
}

/// Store an updated entity, failing when it disappeared meanwhile
pub(crate) async fn replace<T: Entity>(
    store: &dyn EntityStore<T>,
    entity: T,
) -> Result<T, StorageOrMissing> {
    let id = entity.id();
    match store.update(entity).await {
        Ok(Some(updated)) => Ok(updated),
        Ok(None) => Err(StorageOrMissing::Missing(ComexError::not_found(
            T::display_name(),
            id,
        ))),
        Err(err) => Err(StorageOrMissing::Storage(err)),
    }
}

/// Outcome of [`replace`] that still needs constraint mapping
pub(crate) enum StorageOrMissing {
    Storage(StorageError),
    Missing(ComexError),
}

impl StorageOrMissing {
    pub(crate) fn into_error(
        self,
        constraint: &str,
        message: impl FnOnce() -> String,
    ) -> ComexError {
        match self {
            StorageOrMissing::Storage(err) => conflict(err, constraint, message),
            StorageOrMissing::Missing(err) => err,
        }
    }
}
