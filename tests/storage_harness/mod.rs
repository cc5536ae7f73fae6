//! Shared test harness for storage backend testing
//!
//! Provides builders for every reference entity and for complete orders, plus
//! the contract suites `entity_store_tests!` and `order_store_tests!` that
//! every backend must pass.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! entity_store_tests!(Repositories::in_memory());
//! order_store_tests!(Repositories::in_memory());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod entity_store_tests;
#[macro_use]
pub mod order_store_tests;

use chrono::{Local, NaiveDate};
use comex::entities::{
    Address, Currency, DeliveryPlace, Exporter, Importer, Incoterm, LeadTimes, Material, Modal,
    Operation, OperationType, Order, OrderDraft, PaymentTerms, Point, Process, User,
};
use comex::storage::Repositories;
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn address() -> Address {
    Address {
        street: "Avenida Paulista 1000".to_string(),
        city: "Sao Paulo".to_string(),
        zip_code: "01310-100".to_string(),
        country: "Brazil".to_string(),
    }
}

pub fn exporter(code: &str, name: &str) -> Exporter {
    Exporter {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: name.to_string(),
        payment_terms: PaymentTerms::E60,
        address: address(),
        incoterm: Incoterm::Fob,
        currency: Currency::Usd,
        lead_times: LeadTimes {
            availability: 5,
            departure: 10,
            arrival: 30,
            total: 45,
        },
    }
}

pub fn importer(plant: &str) -> Importer {
    Importer {
        id: Uuid::new_v4(),
        plant: plant.to_string(),
        fiscal_name: "Comex Industria Ltda".to_string(),
        fiscal_number: "11.222.333/0001-81".to_string(),
        address: address(),
    }
}

pub fn user(email: &str, name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: name.to_string(),
    }
}

pub fn material(code: &str, description: &str) -> Material {
    Material {
        id: Uuid::new_v4(),
        code: code.to_string(),
        description: description.to_string(),
        ncm: "84821010".to_string(),
        unit_price: Decimal::new(1250, 2),
        price_per_thousand: false,
        pre_shipment_license: false,
        planning: "P01".to_string(),
        ncm_description: None,
    }
}

pub fn operation(country: &str, operation_type: OperationType) -> Operation {
    Operation {
        id: Uuid::new_v4(),
        country: country.to_string(),
        operation_type,
    }
}

pub fn process(name: &str, responsible: &User, operation: &Operation) -> Process {
    Process {
        id: Uuid::new_v4(),
        name: name.to_string(),
        responsible_id: responsible.id,
        operation_id: operation.id,
    }
}

pub fn point(name: &str) -> Point {
    Point {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

pub fn delivery_place(name: &str) -> DeliveryPlace {
    DeliveryPlace {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

/// Reference data stored once per test
pub struct Seed {
    pub exporter: Exporter,
    pub importer: Importer,
    pub user: User,
    pub material: Material,
    pub delivery_place: DeliveryPlace,
}

impl Seed {
    pub async fn store(repos: &Repositories) -> Self {
        Self {
            exporter: repos
                .exporters
                .insert(exporter("EXP001", "Acme Export"))
                .await
                .unwrap(),
            importer: repos.importers.insert(importer("BR01")).await.unwrap(),
            user: repos
                .users
                .insert(user("jane@comex.com", "Jane"))
                .await
                .unwrap(),
            material: repos
                .materials
                .insert(material("MAT-1", "Ball bearing"))
                .await
                .unwrap(),
            delivery_place: repos
                .delivery_places
                .insert(delivery_place("Port of Santos"))
                .await
                .unwrap(),
        }
    }

    /// A new, unsaved order over the seeded references
    pub fn order(&self, number: &str, destination: &str) -> Order {
        Order::new(OrderDraft {
            origin: "EUA".to_string(),
            destination: destination.to_string(),
            exporter: self.exporter.clone(),
            importer: self.importer.clone(),
            number: number.to_string(),
            date: today(),
            responsible: self.user.clone(),
            modal: Modal::Sea,
            necessity: today(),
            deadline: today(),
            observation: None,
            delivery_place: Some(self.delivery_place.clone()),
            route: None,
            items: vec![(self.material.clone(), Decimal::new(1000, 0))],
        })
        .unwrap()
    }
}
