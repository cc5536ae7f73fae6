//! Exporters: foreign suppliers shipping goods to the importer plants

use crate::core::store::constraints;
use crate::entities::address::Address;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

crate::text_enum!(
    /// Payment terms agreed with an exporter
    PaymentTerms {
        Advance => "ADVANCE",
        E30 => "E30",
        E60 => "E60",
        E90 => "E90",
        E120 => "E120",
    }
);

crate::text_enum!(
    /// Incoterms 2020 rules
    Incoterm {
        Exw => "EXW",
        Fca => "FCA",
        Fas => "FAS",
        Fob => "FOB",
        Cfr => "CFR",
        Cif => "CIF",
        Cpt => "CPT",
        Cip => "CIP",
        Dap => "DAP",
        Dpu => "DPU",
        Ddp => "DDP",
    }
);

crate::text_enum!(
    /// Invoice currency
    Currency {
        Brl => "BRL",
        Usd => "USD",
        Eur => "EUR",
        Gbp => "GBP",
        Jpy => "JPY",
        Cny => "CNY",
    }
);

/// Lead times in days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimes {
    pub availability: i32,
    pub departure: i32,
    pub arrival: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exporter {
    pub id: Uuid,
    /// Supplier code, immutable once created
    pub code: String,
    pub name: String,
    pub payment_terms: PaymentTerms,
    pub address: Address,
    pub incoterm: Incoterm,
    pub currency: Currency,
    pub lead_times: LeadTimes,
}

crate::impl_entity!(Exporter, "exporter", "Exporter", [constraints::EXPORTER_CODE => code]);
