use crate::core::store::constraints;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the goods of an order are delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPlace {
    pub id: Uuid,
    pub name: String,
}

crate::impl_entity!(
    DeliveryPlace,
    "delivery_place",
    "Delivery place",
    [constraints::DELIVERY_PLACE_NAME => name]
);
