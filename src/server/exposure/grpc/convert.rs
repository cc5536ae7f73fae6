//! Conversions between the generated protobuf messages and the domain
//!
//! Wire enums are decoded with a total mapping: the `*_UNSPECIFIED` value and
//! integers this build does not know both decode to `None`, which the request
//! validation then reports as a missing field. Text fields carrying dates and
//! decimals are parsed here; a value that does not parse is reported against
//! its wire field name.

use super::proto;
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::query::{Page, PageRequest, SortDirection};
use crate::core::validation::parse_date;
use crate::entities::{
    Address, Currency, DeliveryPlace, Event, Exporter, Importer, Incoterm, Item, Material, Modal,
    Operation, OperationType, Order, OrderStatus, PaymentTerms, Point, User,
};
use crate::orders::{
    NewOrder, NewOrderItem, OrderSearch, UpdateObservation, UpdateOrder, UpdateReference,
};
use crate::services::exporter::{NewExporter, UpdateExporter};
use crate::services::importer::{NewImporter, UpdateImporter};
use crate::services::material::{MaterialSearch, NewMaterial, UpdateMaterial};
use crate::services::operation::NewOperation;
use crate::services::point::NewPoint;
use crate::services::process::{NewProcess, ProcessDetails, UpdateProcess};
use crate::services::user::{NewUser, UpdateUser, UserSearch};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

macro_rules! wire_enum {
    ($domain:ident, $decode:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$domain> for proto::$domain {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => proto::$domain::$variant,)+
                }
            }
        }

        pub fn $decode(value: i32) -> Option<$domain> {
            match proto::$domain::try_from(value).ok()? {
                $(proto::$domain::$variant => Some($domain::$variant),)+
                proto::$domain::Unspecified => None,
            }
        }
    };
}

wire_enum!(PaymentTerms, payment_terms, [Advance, E30, E60, E90, E120]);
wire_enum!(Incoterm, incoterm, [Exw, Fca, Fas, Fob, Cfr, Cif, Cpt, Cip, Dap, Dpu, Ddp]);
wire_enum!(Currency, currency, [Brl, Usd, Eur, Gbp, Jpy, Cny]);
wire_enum!(OperationType, operation_type, [Import, Export]);
wire_enum!(Modal, modal, [Sea, Air, Road, Rail]);
wire_enum!(
    OrderStatus,
    order_status,
    [
        PendingApproval,
        PendingDocumentation,
        WorkingOn,
        Future,
        PendingDepartureConfirmation,
        PendingArrivalConfirmation,
        PendingCustomsClearance,
        PendingSapCheck,
        PendingMatters,
        PendingFinalization,
        Concluded,
    ]
);

/// Parse failures collected while decoding one request
#[derive(Default)]
struct Decoder {
    violations: Vec<FieldValidationError>,
}

impl Decoder {
    fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        parse_date(field, value).unwrap_or_else(|e| {
            self.violations.extend(e.violations());
            None
        })
    }

    /// Blank decodes to `None` so that validation reports it as missing
    fn decimal(&mut self, field: &str, value: &str) -> Option<Decimal> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match Decimal::from_str(value) {
            Ok(decimal) => Some(decimal),
            Err(_) => {
                self.violations.push(FieldValidationError::new(
                    field,
                    format!("could not parse '{}' as a decimal number", value),
                ));
                None
            }
        }
    }

    fn finish<T>(mut self, value: T) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            self.violations.sort();
            Err(ValidationError::FieldErrors(self.violations))
        }
    }
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// =============================================================================
// Shared
// =============================================================================

impl From<proto::Address> for Address {
    fn from(address: proto::Address) -> Self {
        Self {
            street: address.street,
            city: address.city,
            zip_code: address.zip_code,
            country: address.country,
        }
    }
}

impl From<Address> for proto::Address {
    fn from(address: Address) -> Self {
        Self {
            street: address.street,
            city: address.city,
            zip_code: address.zip_code,
            country: address.country,
        }
    }
}

/// A missing pageable means the first page of the default size
pub fn page_request(pageable: Option<proto::Pageable>) -> Result<PageRequest, ValidationError> {
    let Some(pageable) = pageable else {
        return Ok(PageRequest::default());
    };
    let direction = match proto::Direction::try_from(pageable.direction) {
        Ok(proto::Direction::Desc) => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    PageRequest::from_wire(pageable.page, pageable.size, &pageable.order_by, direction)
}

fn page_totals<T>(page: &Page<T>) -> (i32, i64, i32) {
    (
        i32::try_from(page.total_pages()).unwrap_or(i32::MAX),
        i64::try_from(page.total_size).unwrap_or(i64::MAX),
        i32::try_from(page.number_of_elements()).unwrap_or(i32::MAX),
    )
}

// =============================================================================
// Exporter
// =============================================================================

impl From<proto::NewExporterRequest> for NewExporter {
    fn from(request: proto::NewExporterRequest) -> Self {
        Self {
            code: request.code,
            name: request.name,
            payment_terms: payment_terms(request.payment_terms),
            address: request.address.map(Address::from),
            incoterm: incoterm(request.incoterm),
            currency: currency(request.currency),
            availability_lt: request.availability_lt,
            departure_lt: request.departure_lt,
            arrival_lt: request.arrival_lt,
            total_lt: request.total_lt,
        }
    }
}

impl From<proto::UpdateExporterRequest> for UpdateExporter {
    fn from(request: proto::UpdateExporterRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            payment_terms: payment_terms(request.payment_terms),
            address: request.address.map(Address::from),
            incoterm: incoterm(request.incoterm),
            currency: currency(request.currency),
            availability_lt: request.availability_lt,
            departure_lt: request.departure_lt,
            arrival_lt: request.arrival_lt,
            total_lt: request.total_lt,
        }
    }
}

impl From<Exporter> for proto::ExporterResponse {
    fn from(exporter: Exporter) -> Self {
        Self {
            id: exporter.id.to_string(),
            code: exporter.code,
            name: exporter.name,
            payment_terms: proto::PaymentTerms::from(exporter.payment_terms) as i32,
            address: Some(exporter.address.into()),
            incoterm: proto::Incoterm::from(exporter.incoterm) as i32,
            currency: proto::Currency::from(exporter.currency) as i32,
            availability_lt: exporter.lead_times.availability,
            departure_lt: exporter.lead_times.departure,
            arrival_lt: exporter.lead_times.arrival,
            total_lt: exporter.lead_times.total,
        }
    }
}

// =============================================================================
// Importer
// =============================================================================

impl From<proto::NewImporterRequest> for NewImporter {
    fn from(request: proto::NewImporterRequest) -> Self {
        Self {
            plant: request.plant,
            fiscal_name: request.fiscal_name,
            fiscal_number: request.fiscal_number,
            address: request.address.map(Address::from),
        }
    }
}

impl From<proto::UpdateImporterRequest> for UpdateImporter {
    fn from(request: proto::UpdateImporterRequest) -> Self {
        Self {
            id: request.id,
            address: request.address.map(Address::from),
        }
    }
}

impl From<Importer> for proto::ImporterResponse {
    fn from(importer: Importer) -> Self {
        Self {
            id: importer.id.to_string(),
            plant: importer.plant,
            fiscal_name: importer.fiscal_name,
            fiscal_number: importer.fiscal_number,
            address: Some(importer.address.into()),
        }
    }
}

// =============================================================================
// Material
// =============================================================================

pub fn new_material(request: proto::NewMaterialRequest) -> Result<NewMaterial, ValidationError> {
    let mut decoder = Decoder::default();
    let unit_price = decoder.decimal("unitPrice", &request.unit_price);
    decoder.finish(NewMaterial {
        code: request.code,
        description: request.description,
        ncm: request.ncm,
        unit_price,
        price_per_thousand: request.price_per_thousand,
        pre_shipment_license: request.pre_shipment_license,
        planning: request.planning,
    })
}

pub fn update_material(
    request: proto::UpdateMaterialRequest,
) -> Result<UpdateMaterial, ValidationError> {
    let mut decoder = Decoder::default();
    let unit_price = decoder.decimal("unitPrice", &request.unit_price);
    decoder.finish(UpdateMaterial {
        id: request.id,
        description: request.description,
        ncm: request.ncm,
        unit_price,
        price_per_thousand: request.price_per_thousand,
        pre_shipment_license: request.pre_shipment_license,
        planning: request.planning,
    })
}

pub fn material_search(search: Option<proto::read_material_request::SearchMaterial>) -> MaterialSearch {
    use proto::read_material_request::SearchMaterial;
    match search {
        Some(SearchMaterial::Code(code)) => MaterialSearch::Code(code),
        Some(SearchMaterial::Ncm(ncm)) => MaterialSearch::Ncm(ncm),
        Some(SearchMaterial::Description(text)) => MaterialSearch::Description(text),
        None => MaterialSearch::All,
    }
}

impl From<Material> for proto::MaterialResponse {
    fn from(material: Material) -> Self {
        Self {
            id: material.id.to_string(),
            code: material.code,
            description: material.description,
            ncm: material.ncm,
            unit_price: material.unit_price.to_string(),
            price_per_thousand: material.price_per_thousand,
            pre_shipment_license: material.pre_shipment_license,
            planning: material.planning,
            ncm_description: material.ncm_description.unwrap_or_default(),
        }
    }
}

impl From<Page<Material>> for proto::MaterialsResponse {
    fn from(page: Page<Material>) -> Self {
        let (total_pages, total_size, number_of_elements) = page_totals(&page);
        Self {
            materials: page.content.into_iter().map(Into::into).collect(),
            total_pages,
            total_size,
            number_of_elements,
        }
    }
}

// =============================================================================
// User, delivery place, operation
// =============================================================================

impl From<proto::NewUserRequest> for NewUser {
    fn from(request: proto::NewUserRequest) -> Self {
        Self {
            email: request.email,
            name: request.name,
        }
    }
}

impl From<proto::UpdateUserRequest> for UpdateUser {
    fn from(request: proto::UpdateUserRequest) -> Self {
        Self {
            id: request.id,
            email: request.email,
        }
    }
}

pub fn user_search(search: Option<proto::read_user_request::SearchUser>) -> UserSearch {
    use proto::read_user_request::SearchUser;
    match search {
        Some(SearchUser::Email(email)) => UserSearch::Email(email),
        Some(SearchUser::Name(name)) => UserSearch::Name(name),
        None => UserSearch::All,
    }
}

impl From<User> for proto::UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
        }
    }
}

impl From<DeliveryPlace> for proto::DeliveryPlaceResponse {
    fn from(place: DeliveryPlace) -> Self {
        Self {
            id: place.id.to_string(),
            name: place.name,
        }
    }
}

impl From<proto::NewOperationRequest> for NewOperation {
    fn from(request: proto::NewOperationRequest) -> Self {
        Self {
            country: request.country,
            operation_type: operation_type(request.operation_type),
        }
    }
}

impl From<Operation> for proto::OperationResponse {
    fn from(operation: Operation) -> Self {
        Self {
            id: operation.id.to_string(),
            country: operation.country,
            operation_type: proto::OperationType::from(operation.operation_type) as i32,
        }
    }
}

impl From<proto::NewProcessRequest> for NewProcess {
    fn from(request: proto::NewProcessRequest) -> Self {
        Self {
            responsible_id: request.responsible_id,
            name: request.name,
            operation_id: request.operation_id,
        }
    }
}

impl From<proto::UpdateProcessRequest> for UpdateProcess {
    fn from(request: proto::UpdateProcessRequest) -> Self {
        Self {
            id: request.id,
            responsible_id: request.responsible_id,
        }
    }
}

impl From<ProcessDetails> for proto::ProcessResponse {
    fn from(details: ProcessDetails) -> Self {
        Self {
            id: details.process.id.to_string(),
            name: details.process.name,
            responsible: details.responsible.name,
            country: details.operation.country,
            operation_type: proto::OperationType::from(details.operation.operation_type) as i32,
        }
    }
}

impl From<proto::NewPointRequest> for NewPoint {
    fn from(request: proto::NewPointRequest) -> Self {
        Self { name: request.name }
    }
}

impl From<Point> for proto::PointResponse {
    fn from(point: Point) -> Self {
        Self {
            id: point.id.to_string(),
            name: point.name,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

pub fn new_order(request: proto::NewOrderRequest) -> Result<NewOrder, ValidationError> {
    let mut decoder = Decoder::default();
    let items = request
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| NewOrderItem {
            quantity: decoder.decimal(&format!("items[{}].quantity", index), &item.quantity),
            material_id: item.material_id,
        })
        .collect();
    let date = decoder.date("date", &request.date);
    let necessity = decoder.date("necessity", &request.necessity);
    let deadline = decoder.date("deadline", &request.deadline);

    decoder.finish(NewOrder {
        origin: request.origin,
        destination: request.destination,
        exporter_id: request.exporter_id,
        items,
        number: request.number,
        importer_id: request.importer_id,
        date,
        responsible_id: request.responsible_id,
        modal: modal(request.modal),
        necessity,
        deadline,
        observation: request.observation,
        delivery_place_id: request.delivery_place_id,
        route: request.route,
    })
}

pub fn update_order(request: proto::UpdateOrderRequest) -> Result<UpdateOrder, ValidationError> {
    let mut decoder = Decoder::default();
    let necessity = decoder.date("necessity", &request.necessity);
    let deadline = decoder.date("deadline", &request.deadline);

    decoder.finish(UpdateOrder {
        id: request.id,
        delivery_place_id: request.delivery_place_id,
        modal: modal(request.modal),
        necessity,
        responsible_id: request.responsible_id,
        deadline,
        route: request.route,
    })
}

impl From<proto::UpdateObsOrderRequest> for UpdateObservation {
    fn from(request: proto::UpdateObsOrderRequest) -> Self {
        Self {
            id: request.id,
            observation: request.observation,
        }
    }
}

impl From<proto::UpdateRefOrderRequest> for UpdateReference {
    fn from(request: proto::UpdateRefOrderRequest) -> Self {
        Self {
            id: request.id,
            reference: request.reference,
        }
    }
}

pub fn order_search(search: Option<proto::read_order_request::SearchOrder>) -> OrderSearch {
    use proto::read_order_request::SearchOrder;
    match search {
        Some(SearchOrder::Destination(value)) => OrderSearch::Destination(value),
        Some(SearchOrder::Origin(value)) => OrderSearch::Origin(value),
        Some(SearchOrder::Number(value)) => OrderSearch::Number(value),
        Some(SearchOrder::ExporterId(value)) => OrderSearch::ExporterId(value),
        Some(SearchOrder::ImporterId(value)) => OrderSearch::ImporterId(value),
        None => OrderSearch::None,
    }
}

impl From<Item> for proto::ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.to_string(),
            code: item.material.code,
            description: item.material.description,
            quantity: item.quantity.to_string(),
        }
    }
}

impl From<Event> for proto::EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_string(),
            availability: date_text(event.availability),
            estimated_departure: date_text(event.estimated_departure),
            real_departure: date_text(event.real_departure),
            estimated_arrival: date_text(event.estimated_arrival),
            real_arrival: date_text(event.real_arrival),
            pre_alert: date_text(event.pre_alert),
            wrong_necessity_alert: date_text(event.wrong_necessity_alert),
        }
    }
}

impl From<Order> for proto::OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            origin: order.origin,
            destination: order.destination,
            exporter: order.exporter.name,
            items: order.items.into_iter().map(Into::into).collect(),
            number: order.number,
            importer: order.importer.plant,
            date: date_text(Some(order.date)),
            responsible: order.responsible.name,
            modal: proto::Modal::from(order.modal) as i32,
            necessity: date_text(Some(order.necessity)),
            deadline: date_text(Some(order.deadline)),
            observation: order.observation.unwrap_or_default(),
            delivery_place: order
                .delivery_place
                .map(|place| place.name)
                .unwrap_or_default(),
            broker_reference: order.broker_reference.unwrap_or_default(),
            status: proto::OrderStatus::from(order.status) as i32,
            route: order.route.unwrap_or_default(),
            events: Some(order.event.into()),
        }
    }
}

impl From<Page<Order>> for proto::OrdersResponse {
    fn from(page: Page<Order>) -> Self {
        let (total_pages, total_size, number_of_elements) = page_totals(&page);
        Self {
            orders: page.content.into_iter().map(Into::into).collect(),
            total_pages,
            total_size,
            number_of_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_and_unknown_enums_decode_to_none() {
        assert_eq!(modal(proto::Modal::Sea as i32), Some(Modal::Sea));
        assert_eq!(modal(proto::Modal::Unspecified as i32), None);
        assert_eq!(modal(99), None);
        assert_eq!(order_status(proto::OrderStatus::Concluded as i32), Some(OrderStatus::Concluded));
        assert_eq!(payment_terms(proto::PaymentTerms::E120 as i32), Some(PaymentTerms::E120));
    }

    #[test]
    fn test_enum_encoding_matches_names() {
        for status in OrderStatus::ALL {
            let wire = proto::OrderStatus::from(*status);
            assert_eq!(wire.as_str_name(), status.as_str());
        }
        for incoterm in Incoterm::ALL {
            assert_eq!(proto::Incoterm::from(*incoterm).as_str_name(), incoterm.as_str());
        }
    }

    #[test]
    fn test_new_order_collects_parse_failures() {
        let request = proto::NewOrderRequest {
            date: "2024/01/01".to_string(),
            necessity: "2024-01-10".to_string(),
            items: vec![proto::ItemRequest {
                material_id: String::new(),
                quantity: "a lot".to_string(),
            }],
            ..Default::default()
        };

        let violations = new_order(request).unwrap_err().violations();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "items[0].quantity"]);
    }

    #[test]
    fn test_new_order_decodes_dates_and_quantities() {
        let request = proto::NewOrderRequest {
            date: "2024-01-01".to_string(),
            modal: proto::Modal::Rail as i32,
            items: vec![proto::ItemRequest {
                material_id: "m".to_string(),
                quantity: "1000.5".to_string(),
            }],
            ..Default::default()
        };

        let order = new_order(request).unwrap();
        assert_eq!(order.date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(order.necessity, None);
        assert_eq!(order.modal, Some(Modal::Rail));
        assert_eq!(order.items[0].quantity, Decimal::from_str("1000.5").ok());
    }

    #[test]
    fn test_page_request_defaults_and_bounds() {
        assert_eq!(page_request(None).unwrap(), PageRequest::default());

        let page = page_request(Some(proto::Pageable {
            page: 2,
            size: 5,
            order_by: "number".to_string(),
            direction: proto::Direction::Desc as i32,
        }))
        .unwrap();
        assert_eq!(page.offset(), 10);
        assert_eq!(page.direction, SortDirection::Desc);

        let err = page_request(Some(proto::Pageable {
            page: -1,
            size: 0,
            ..Default::default()
        }))
        .unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_order_snapshot_uses_names_and_empty_strings() {
        let order = Order::new(crate::entities::order::fixtures::draft("4200212121", "Brazil"))
            .unwrap();
        let response = proto::OrderResponse::from(order);
        assert_eq!(response.exporter, "Acme Export");
        assert_eq!(response.importer, "BR01");
        assert_eq!(response.responsible, "Jane");
        assert_eq!(response.delivery_place, "");
        assert_eq!(response.broker_reference, "");
        assert_eq!(response.status, proto::OrderStatus::PendingApproval as i32);
        assert_eq!(response.items[0].code, "MAT-1");
        assert_eq!(response.events.unwrap().availability, "");
    }
}
