//! Delivery places an order can be routed to

use super::{conflict, fetch, remove};
use crate::core::error::{ComexError, ComexResult};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{parse_id, validate, validators};
use crate::entities::DeliveryPlace;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewDeliveryPlace {
    #[validate(custom(function = "validators::not_blank"))]
    pub name: String,
}

fn duplicate_name(name: &str) -> String {
    format!("Delivery Place already exists with name {}", name)
}

#[derive(Clone)]
pub struct DeliveryPlaceService {
    store: Arc<dyn EntityStore<DeliveryPlace>>,
}

impl DeliveryPlaceService {
    pub fn new(store: Arc<dyn EntityStore<DeliveryPlace>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewDeliveryPlace) -> ComexResult<DeliveryPlace> {
        validate(&request)?;

        let name = request.name.clone();
        if self.store.exists(&FieldFilter::exact("name", name.as_str())).await? {
            return Err(ComexError::already_exists(duplicate_name(&name)));
        }

        let place = self
            .store
            .insert(DeliveryPlace {
                id: Uuid::new_v4(),
                name: request.name,
            })
            .await
            .map_err(|e| conflict(e, constraints::DELIVERY_PLACE_NAME, || duplicate_name(&name)))?;
        tracing::info!(delivery_place_id = %place.id, name = %place.name, "Delivery place created");
        Ok(place)
    }

    pub async fn read(&self) -> ComexResult<Vec<DeliveryPlace>> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<DeliveryPlace> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn delete(&self, id: &str) -> ComexResult<DeliveryPlace> {
        let id = parse_id("id", id)?;
        remove(self.store.as_ref(), &id).await
    }
}
