use crate::core::store::constraints;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person responsible for orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

crate::impl_entity!(User, "user", "User", [constraints::USER_EMAIL => email]);
