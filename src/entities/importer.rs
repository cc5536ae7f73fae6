//! Importers: the receiving plants

use crate::core::store::constraints;
use crate::entities::address::Address;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Importer {
    pub id: Uuid,
    /// Plant identifier, at most four characters
    pub plant: String,
    pub fiscal_name: String,
    /// CNPJ of the plant
    pub fiscal_number: String,
    pub address: Address,
}

crate::impl_entity!(Importer, "importer", "Importer", [constraints::IMPORTER_PLANT => plant]);
