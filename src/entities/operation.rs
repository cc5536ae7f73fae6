//! Operations: which countries the company trades with, and in which direction

use crate::core::entity::{Entity, UniqueKey};
use crate::core::store::constraints;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

crate::text_enum!(
    /// Direction of a foreign-trade operation
    OperationType {
        Import => "IMPORT",
        Export => "EXPORT",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub country: String,
    pub operation_type: OperationType,
}

impl Entity for Operation {
    fn entity_type() -> &'static str {
        "operation"
    }

    fn display_name() -> &'static str {
        "Operation"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            constraints::OPERATION_COUNTRY_TYPE,
            format!("{}|{}", self.country, self.operation_type),
        )]
    }
}
