//! Exporter registry

use super::{conflict, fetch, remove, replace};
use crate::core::error::{ComexError, ComexResult};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{parse_id, required, validate, validators};
use crate::entities::{Address, Currency, Exporter, Incoterm, LeadTimes, PaymentTerms};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Input of [`ExporterService::create`]
#[derive(Debug, Clone, Default, Validate)]
pub struct NewExporter {
    #[validate(
        custom(function = "validators::not_blank"),
        length(max = 8, message = "size must be between 0 and 8")
    )]
    pub code: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub name: String,
    #[validate(required(message = "must not be null"))]
    pub payment_terms: Option<PaymentTerms>,
    #[validate(required(message = "must not be null"), nested)]
    pub address: Option<Address>,
    #[validate(required(message = "must not be null"))]
    pub incoterm: Option<Incoterm>,
    #[validate(required(message = "must not be null"))]
    pub currency: Option<Currency>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub availability_lt: Option<i32>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub departure_lt: Option<i32>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub arrival_lt: Option<i32>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub total_lt: Option<i32>,
}

/// Input of [`ExporterService::update`]; the code never changes
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateExporter {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub name: String,
    #[validate(required(message = "must not be null"))]
    pub payment_terms: Option<PaymentTerms>,
    #[validate(required(message = "must not be null"), nested)]
    pub address: Option<Address>,
    #[validate(required(message = "must not be null"))]
    pub incoterm: Option<Incoterm>,
    #[validate(required(message = "must not be null"))]
    pub currency: Option<Currency>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub availability_lt: Option<i32>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub departure_lt: Option<i32>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub arrival_lt: Option<i32>,
    #[validate(
        required(message = "must not be null"),
        range(min = 0, message = "must be greater than or equal to 0")
    )]
    pub total_lt: Option<i32>,
}

fn lead_times(
    availability: Option<i32>,
    departure: Option<i32>,
    arrival: Option<i32>,
    total: Option<i32>,
) -> ComexResult<LeadTimes> {
    Ok(LeadTimes {
        availability: required("availabilityLt", availability)?,
        departure: required("departureLt", departure)?,
        arrival: required("arrivalLt", arrival)?,
        total: required("totalLt", total)?,
    })
}

fn duplicate_code(code: &str) -> String {
    format!("Exporter already exists with code {}", code)
}

#[derive(Clone)]
pub struct ExporterService {
    store: Arc<dyn EntityStore<Exporter>>,
}

impl ExporterService {
    pub fn new(store: Arc<dyn EntityStore<Exporter>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewExporter) -> ComexResult<Exporter> {
        validate(&request)?;

        let code = request.code.clone();
        if self.store.exists(&FieldFilter::exact("code", code.as_str())).await? {
            return Err(ComexError::already_exists(duplicate_code(&code)));
        }

        let exporter = Exporter {
            id: Uuid::new_v4(),
            code: request.code,
            name: request.name,
            payment_terms: required("paymentTerms", request.payment_terms)?,
            address: required("address", request.address)?,
            incoterm: required("incoterm", request.incoterm)?,
            currency: required("currency", request.currency)?,
            lead_times: lead_times(
                request.availability_lt,
                request.departure_lt,
                request.arrival_lt,
                request.total_lt,
            )?,
        };

        let exporter = self
            .store
            .insert(exporter)
            .await
            .map_err(|e| conflict(e, constraints::EXPORTER_CODE, || duplicate_code(&code)))?;
        tracing::info!(exporter_id = %exporter.id, code = %exporter.code, "Exporter created");
        Ok(exporter)
    }

    /// Exporters with exactly this name; a blank name lists them all
    pub async fn read(&self, name: &str) -> ComexResult<Vec<Exporter>> {
        tracing::debug!(name, "Reading exporters");
        let exporters = if name.trim().is_empty() {
            self.store.list().await?
        } else {
            self.store.search(&FieldFilter::exact("name", name)).await?
        };
        Ok(exporters)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<Exporter> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn update(&self, request: UpdateExporter) -> ComexResult<Exporter> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let mut exporter = fetch(self.store.as_ref(), &id).await?;
        exporter.name = request.name;
        exporter.payment_terms = required("paymentTerms", request.payment_terms)?;
        exporter.address = required("address", request.address)?;
        exporter.incoterm = required("incoterm", request.incoterm)?;
        exporter.currency = required("currency", request.currency)?;
        exporter.lead_times = lead_times(
            request.availability_lt,
            request.departure_lt,
            request.arrival_lt,
            request.total_lt,
        )?;

        let code = exporter.code.clone();
        let exporter = replace(self.store.as_ref(), exporter)
            .await
            .map_err(|e| e.into_error(constraints::EXPORTER_CODE, || duplicate_code(&code)))?;
        tracing::info!(exporter_id = %exporter.id, "Exporter updated");
        Ok(exporter)
    }

    pub async fn delete(&self, id: &str) -> ComexResult<Exporter> {
        let id = parse_id("id", id)?;
        remove(self.store.as_ref(), &id).await
    }
}
