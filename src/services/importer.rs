//! Importer (receiving plant) registry

use super::{conflict, fetch, remove, replace};
use crate::core::error::{ComexError, ComexResult};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{parse_id, required, validate, validators};
use crate::entities::{Address, Importer};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewImporter {
    #[validate(
        custom(function = "validators::not_blank"),
        length(max = 4, message = "size must be between 0 and 4")
    )]
    pub plant: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub fiscal_name: String,
    #[validate(custom(function = "validators::cnpj"))]
    pub fiscal_number: String,
    #[validate(required(message = "must not be null"), nested)]
    pub address: Option<Address>,
}

/// Only the address of an importer can change
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateImporter {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(required(message = "must not be null"), nested)]
    pub address: Option<Address>,
}

fn duplicate_plant(plant: &str) -> String {
    format!("Importer already exists with plant {}", plant)
}

#[derive(Clone)]
pub struct ImporterService {
    store: Arc<dyn EntityStore<Importer>>,
}

impl ImporterService {
    pub fn new(store: Arc<dyn EntityStore<Importer>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewImporter) -> ComexResult<Importer> {
        validate(&request)?;

        let plant = request.plant.clone();
        if self.store.exists(&FieldFilter::exact("plant", plant.as_str())).await? {
            return Err(ComexError::already_exists(duplicate_plant(&plant)));
        }

        let importer = Importer {
            id: Uuid::new_v4(),
            plant: request.plant,
            fiscal_name: request.fiscal_name,
            fiscal_number: request.fiscal_number,
            address: required("address", request.address)?,
        };

        let importer = self
            .store
            .insert(importer)
            .await
            .map_err(|e| conflict(e, constraints::IMPORTER_PLANT, || duplicate_plant(&plant)))?;
        tracing::info!(importer_id = %importer.id, plant = %importer.plant, "Importer created");
        Ok(importer)
    }

    /// Importers of one plant; a blank plant lists them all
    pub async fn read(&self, plant: &str) -> ComexResult<Vec<Importer>> {
        tracing::debug!(plant, "Reading importers");
        let importers = if plant.trim().is_empty() {
            self.store.list().await?
        } else {
            self.store.search(&FieldFilter::exact("plant", plant)).await?
        };
        Ok(importers)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<Importer> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn update(&self, request: UpdateImporter) -> ComexResult<Importer> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let mut importer = fetch(self.store.as_ref(), &id).await?;
        importer.address = required("address", request.address)?;

        let plant = importer.plant.clone();
        let importer = replace(self.store.as_ref(), importer)
            .await
            .map_err(|e| e.into_error(constraints::IMPORTER_PLANT, || duplicate_plant(&plant)))?;
        tracing::info!(importer_id = %importer.id, "Importer address updated");
        Ok(importer)
    }

    pub async fn delete(&self, id: &str) -> ComexResult<Importer> {
        let id = parse_id("id", id)?;
        remove(self.store.as_ref(), &id).await
    }
}
