//! Material catalogue
//!
//! Materials are read page by page, filtered by exact code, exact NCM or a
//! fragment of the description.

use super::{conflict, fetch, remove, replace};
use crate::core::error::{ComexError, ComexResult, FieldValidationError, ValidationError};
use crate::core::query::{Page, PageRequest};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{parse_id, required, validate, validators};
use crate::entities::Material;
use crate::entities::material::sort_field;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewMaterial {
    #[validate(custom(function = "validators::not_blank"))]
    pub code: String,
    #[validate(
        custom(function = "validators::not_blank"),
        length(max = 100, message = "size must be between 0 and 100")
    )]
    pub description: String,
    #[validate(custom(function = "validators::ncm"))]
    pub ncm: String,
    #[validate(
        required(message = "must not be null"),
        custom(function = "validators::positive")
    )]
    pub unit_price: Option<Decimal>,
    pub price_per_thousand: bool,
    pub pre_shipment_license: bool,
    #[validate(custom(function = "validators::not_blank"))]
    pub planning: String,
}

/// Everything but the code can change
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateMaterial {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(
        custom(function = "validators::not_blank"),
        length(max = 100, message = "size must be between 0 and 100")
    )]
    pub description: String,
    #[validate(custom(function = "validators::ncm"))]
    pub ncm: String,
    #[validate(
        required(message = "must not be null"),
        custom(function = "validators::positive")
    )]
    pub unit_price: Option<Decimal>,
    pub price_per_thousand: bool,
    pub pre_shipment_license: bool,
    #[validate(custom(function = "validators::not_blank"))]
    pub planning: String,
}

/// Which materials a paged read returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialSearch {
    Code(String),
    Ncm(String),
    Description(String),
    All,
}

impl MaterialSearch {
    fn filter(&self) -> Result<Option<FieldFilter>, ValidationError> {
        let (field, value, filter) = match self {
            MaterialSearch::All => return Ok(None),
            MaterialSearch::Code(code) => ("code", code, FieldFilter::exact("code", code.as_str())),
            MaterialSearch::Ncm(ncm) => ("ncm", ncm, FieldFilter::exact("ncm", ncm.as_str())),
            MaterialSearch::Description(text) => (
                "description",
                text,
                FieldFilter::contains("description", text.as_str()),
            ),
        };
        if value.trim().is_empty() {
            return Err(ValidationError::FieldError {
                field: field.to_string(),
                message: "must not be blank".to_string(),
            });
        }
        Ok(Some(filter))
    }
}

fn duplicate_code(code: &str) -> String {
    format!("Material with code {} already exists", code)
}

#[derive(Clone)]
pub struct MaterialService {
    store: Arc<dyn EntityStore<Material>>,
}

impl MaterialService {
    pub fn new(store: Arc<dyn EntityStore<Material>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewMaterial) -> ComexResult<Material> {
        validate(&request)?;

        let code = request.code.clone();
        if self.store.exists(&FieldFilter::exact("code", code.as_str())).await? {
            return Err(ComexError::already_exists(duplicate_code(&code)));
        }

        let material = Material {
            id: Uuid::new_v4(),
            code: request.code,
            description: request.description,
            ncm: request.ncm,
            unit_price: required("unitPrice", request.unit_price)?,
            price_per_thousand: request.price_per_thousand,
            pre_shipment_license: request.pre_shipment_license,
            planning: request.planning,
            ncm_description: None,
        };

        let material = self
            .store
            .insert(material)
            .await
            .map_err(|e| conflict(e, constraints::MATERIAL_CODE, || duplicate_code(&code)))?;
        tracing::info!(material_id = %material.id, code = %material.code, "Material created");
        Ok(material)
    }

    pub async fn read(&self, search: MaterialSearch, page: &PageRequest) -> ComexResult<Page<Material>> {
        let filter = search.filter()?;
        let sort = sort_field(page.sort.trim()).ok_or_else(|| {
            ValidationError::FieldErrors(vec![FieldValidationError::new(
                "pageable.orderBy",
                format!("unknown sort property '{}'", page.sort),
            )])
        })?;

        tracing::debug!(?search, page = page.page, size = page.size, "Reading materials");
        Ok(self.store.search_page(filter.as_ref(), sort, page).await?)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<Material> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn update(&self, request: UpdateMaterial) -> ComexResult<Material> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let mut material = fetch(self.store.as_ref(), &id).await?;
        material.description = request.description;
        material.ncm = request.ncm;
        material.unit_price = required("unitPrice", request.unit_price)?;
        material.price_per_thousand = request.price_per_thousand;
        material.pre_shipment_license = request.pre_shipment_license;
        material.planning = request.planning;

        let code = material.code.clone();
        let material = replace(self.store.as_ref(), material)
            .await
            .map_err(|e| e.into_error(constraints::MATERIAL_CODE, || duplicate_code(&code)))?;
        tracing::info!(material_id = %material.id, "Material updated");
        Ok(material)
    }

    pub async fn delete(&self, id: &str) -> ComexResult<Material> {
        let id = parse_id("id", id)?;
        remove(self.store.as_ref(), &id).await
    }
}
