use crate::core::store::constraints;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named stop a shipping route can pass through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub id: Uuid,
    pub name: String,
}

crate::impl_entity!(Point, "point", "Point", [constraints::POINT_NAME => name]);
