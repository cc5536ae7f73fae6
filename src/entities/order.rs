//! The order aggregate
//!
//! An [`Order`] exclusively owns its [`Item`] lines and its [`Event`]
//! milestones. Items carry no pointer back to their order; code that needs
//! the owning order goes through the aggregate root.

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::query::SortDirection;
use crate::entities::delivery_place::DeliveryPlace;
use crate::entities::exporter::Exporter;
use crate::entities::importer::Importer;
use crate::entities::material::Material;
use crate::entities::user::User;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use uuid::Uuid;

crate::text_enum!(
    /// Mode of transport
    Modal {
        Sea => "SEA",
        Air => "AIR",
        Road => "ROAD",
        Rail => "RAIL",
    }
);

crate::text_enum!(
    /// Follow-up status of an order. Orders start as `PendingApproval`;
    /// nothing in this crate moves them further.
    OrderStatus {
        PendingApproval => "PENDING_APPROVAL",
        PendingDocumentation => "PENDING_DOCUMENTATION",
        WorkingOn => "WORKING_ON",
        Future => "FUTURE",
        PendingDepartureConfirmation => "PENDING_DEPARTURE_CONFIRMATION",
        PendingArrivalConfirmation => "PENDING_ARRIVAL_CONFIRMATION",
        PendingCustomsClearance => "PENDING_CUSTOMS_CLEARANCE",
        PendingSapCheck => "PENDING_SAP_CHECK",
        PendingMatters => "PENDING_MATTERS",
        PendingFinalization => "PENDING_FINALIZATION",
        Concluded => "CONCLUDED",
    }
);

/// One order line
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub material: Material,
    pub quantity: Decimal,
}

impl Item {
    pub fn new(material: Material, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            material,
            quantity,
        }
    }
}

/// Shipment milestones, created empty together with the order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub availability: Option<NaiveDate>,
    pub estimated_departure: Option<NaiveDate>,
    pub real_departure: Option<NaiveDate>,
    pub estimated_arrival: Option<NaiveDate>,
    pub real_arrival: Option<NaiveDate>,
    pub pre_alert: Option<NaiveDate>,
    pub wrong_necessity_alert: Option<NaiveDate>,
}

impl Event {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            ..Self::default()
        }
    }
}

/// Everything needed to build a new order, references already resolved
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub origin: String,
    pub destination: String,
    pub exporter: Exporter,
    pub importer: Importer,
    pub number: String,
    pub date: NaiveDate,
    pub responsible: User,
    pub modal: Modal,
    pub necessity: NaiveDate,
    pub deadline: NaiveDate,
    pub observation: Option<String>,
    pub delivery_place: Option<DeliveryPlace>,
    pub route: Option<String>,
    pub items: Vec<(Material, Decimal)>,
}

/// New values for the mutable part of an order
#[derive(Debug, Clone)]
pub struct OrderChanges {
    pub delivery_place: Option<DeliveryPlace>,
    pub modal: Modal,
    pub necessity: NaiveDate,
    pub responsible: User,
    pub deadline: NaiveDate,
    pub route: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub exporter: Exporter,
    pub importer: Importer,
    pub number: String,
    pub date: NaiveDate,
    pub responsible: User,
    pub modal: Modal,
    pub necessity: NaiveDate,
    pub deadline: NaiveDate,
    pub observation: Option<String>,
    pub delivery_place: Option<DeliveryPlace>,
    pub broker_reference: Option<String>,
    pub route: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<Item>,
    pub event: Event,
}

impl Order {
    /// Build a new aggregate with a fresh id, an empty event and the initial status.
    ///
    /// An order without items is rejected.
    pub fn new(draft: OrderDraft) -> Result<Self, ValidationError> {
        if draft.items.is_empty() {
            return Err(ValidationError::FieldError {
                field: "items".to_string(),
                message: "size must be between 1 and 2147483647".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            origin: draft.origin,
            destination: draft.destination,
            exporter: draft.exporter,
            importer: draft.importer,
            number: draft.number,
            date: draft.date,
            responsible: draft.responsible,
            modal: draft.modal,
            necessity: draft.necessity,
            deadline: draft.deadline,
            observation: draft.observation,
            delivery_place: draft.delivery_place,
            broker_reference: None,
            route: draft.route,
            status: OrderStatus::PendingApproval,
            items: draft
                .items
                .into_iter()
                .map(|(material, quantity)| Item::new(material, quantity))
                .collect(),
            event: Event::empty(),
        })
    }

    /// Apply an update. Only the mutable fields are touched.
    ///
    /// A missing delivery place or route keeps the current value.
    pub fn apply(&mut self, changes: OrderChanges) {
        if let Some(place) = changes.delivery_place {
            self.delivery_place = Some(place);
        }
        self.modal = changes.modal;
        self.necessity = changes.necessity;
        self.responsible = changes.responsible;
        self.deadline = changes.deadline;
        if changes.route.is_some() {
            self.route = changes.route;
        }
    }
}

/// Properties an order page can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortKey {
    Id,
    Number,
    Date,
    Origin,
    Destination,
    Necessity,
    Deadline,
    Modal,
    Status,
    BrokerReference,
}

impl OrderSortKey {
    /// Parse a wire property name; blank means `id`
    pub fn parse(property: &str) -> Option<Self> {
        let key = match property.trim() {
            "" | "id" => OrderSortKey::Id,
            "number" => OrderSortKey::Number,
            "date" => OrderSortKey::Date,
            "origin" => OrderSortKey::Origin,
            "destination" => OrderSortKey::Destination,
            "necessity" => OrderSortKey::Necessity,
            "deadline" => OrderSortKey::Deadline,
            "modal" => OrderSortKey::Modal,
            "status" => OrderSortKey::Status,
            "brokerReference" | "broker_reference" => OrderSortKey::BrokerReference,
            _ => return None,
        };
        Some(key)
    }

    /// Column of the `order_processes` table
    pub fn column(&self) -> &'static str {
        match self {
            OrderSortKey::Id => "id",
            OrderSortKey::Number => "number",
            OrderSortKey::Date => "date",
            OrderSortKey::Origin => "origin",
            OrderSortKey::Destination => "destination",
            OrderSortKey::Necessity => "necessity",
            OrderSortKey::Deadline => "deadline",
            OrderSortKey::Modal => "modal",
            OrderSortKey::Status => "status",
            OrderSortKey::BrokerReference => "broker_reference",
        }
    }

    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self {
            OrderSortKey::Id => a.id.cmp(&b.id),
            OrderSortKey::Number => a.number.cmp(&b.number),
            OrderSortKey::Date => a.date.cmp(&b.date),
            OrderSortKey::Origin => a.origin.cmp(&b.origin),
            OrderSortKey::Destination => a.destination.cmp(&b.destination),
            OrderSortKey::Necessity => a.necessity.cmp(&b.necessity),
            OrderSortKey::Deadline => a.deadline.cmp(&b.deadline),
            OrderSortKey::Modal => a.modal.as_str().cmp(b.modal.as_str()),
            OrderSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
            OrderSortKey::BrokerReference => a.broker_reference.cmp(&b.broker_reference),
        }
    }

    /// Sort in place, ties broken by id so pages are stable
    pub fn sort(&self, orders: &mut [Order], direction: SortDirection) {
        orders.sort_by(|a, b| {
            let ordering = self.compare(a, b).then_with(|| a.id.cmp(&b.id));
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

/// Validate a sort property before any query runs
pub fn validate_sort(property: &str) -> Result<OrderSortKey, ValidationError> {
    OrderSortKey::parse(property).ok_or_else(|| {
        ValidationError::FieldErrors(vec![FieldValidationError::new(
            "pageable.orderBy",
            format!("unknown sort property '{}'", property),
        )])
    })
}
