//! Import and export operations per country

use super::{conflict, fetch, remove};
use crate::core::error::{ComexError, ComexResult};
use crate::core::store::{EntityStore, constraints};
use crate::core::validation::{parse_id, required, validate, validators};
use crate::entities::{Operation, OperationType};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewOperation {
    #[validate(custom(function = "validators::not_blank"))]
    pub country: String,
    #[validate(required(message = "must not be null"))]
    pub operation_type: Option<OperationType>,
}

fn duplicate(country: &str, operation_type: OperationType) -> String {
    format!(
        "Operation with country {} and type {} already exists",
        country, operation_type
    )
}

#[derive(Clone)]
pub struct OperationService {
    store: Arc<dyn EntityStore<Operation>>,
}

impl OperationService {
    pub fn new(store: Arc<dyn EntityStore<Operation>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewOperation) -> ComexResult<Operation> {
        validate(&request)?;
        let operation_type = required("operationType", request.operation_type)?;
        let country = request.country;

        let taken = self
            .store
            .list()
            .await?
            .iter()
            .any(|op| op.country == country && op.operation_type == operation_type);
        if taken {
            return Err(ComexError::already_exists(duplicate(&country, operation_type)));
        }

        let operation = self
            .store
            .insert(Operation {
                id: Uuid::new_v4(),
                country: country.clone(),
                operation_type,
            })
            .await
            .map_err(|e| {
                conflict(e, constraints::OPERATION_COUNTRY_TYPE, || {
                    duplicate(&country, operation_type)
                })
            })?;
        tracing::info!(
            operation_id = %operation.id,
            country = %operation.country,
            operation_type = %operation.operation_type,
            "Operation created"
        );
        Ok(operation)
    }

    pub async fn read(&self) -> ComexResult<Vec<Operation>> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<Operation> {
        fetch(self.store.as_ref(), id).await
    }

    pub async fn delete(&self, id: &str) -> ComexResult<Operation> {
        let id = parse_id("id", id)?;
        remove(self.store.as_ref(), &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn new_operation(country: &str, operation_type: OperationType) -> NewOperation {
        NewOperation {
            country: country.to_string(),
            operation_type: Some(operation_type),
        }
    }

    #[tokio::test]
    async fn test_country_and_type_pair_is_unique() {
        let service = OperationService::new(Arc::new(InMemoryStore::new()));
        service.create(new_operation("Germany", OperationType::Import)).await.unwrap();
        service.create(new_operation("Germany", OperationType::Export)).await.unwrap();

        let err = service
            .create(new_operation("Germany", OperationType::Import))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation with country Germany and type IMPORT already exists"
        );
        assert_eq!(service.read().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_type() {
        let service = OperationService::new(Arc::new(InMemoryStore::new()));
        let err = service
            .create(NewOperation {
                country: "Japan".to_string(),
                operation_type: None,
            })
            .await
            .unwrap_err();
        let ComexError::Validation(validation) = err else {
            panic!("expected validation error, got {:?}", err);
        };
        assert_eq!(validation.violations()[0].field, "operationType");
        assert_eq!(validation.violations()[0].message, "must not be null");
    }
}
