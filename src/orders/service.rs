//! Order create/update/delete and paged reads
//!
//! Every reference an order points at is resolved before anything is
//! written, and the aggregate (order, items, event) is stored in one call to
//! [`OrderStore::insert`]. The route service is told about the order only
//! after it is stored; a failed notification is logged and otherwise ignored.

use crate::clients::{RouteNotification, RouteNotifier};
use crate::core::error::{ComexError, ComexResult, StorageError};
use crate::core::query::{Page, PageRequest};
use crate::core::store::constraints;
use crate::core::validation::{parse_id, parse_optional_id, required, validate};
use crate::entities::order::validate_sort;
use crate::entities::{Order, OrderChanges, OrderDraft};
use crate::orders::filter::{self, OrderSearch};
use crate::orders::requests::{NewOrder, UpdateObservation, UpdateOrder, UpdateReference};
use crate::services::fetch;
use crate::storage::Repositories;
use std::sync::Arc;
use uuid::Uuid;

fn duplicate_number(number: &str) -> String {
    format!("Order with number {} already exists", number)
}

fn duplicate_reference(reference: &str) -> String {
    format!("Reference {} already exists", reference)
}

/// `None` for blank text
fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Clone)]
pub struct OrderService {
    repositories: Repositories,
    notifier: Arc<dyn RouteNotifier>,
}

impl OrderService {
    pub fn new(repositories: Repositories, notifier: Arc<dyn RouteNotifier>) -> Self {
        Self {
            repositories,
            notifier,
        }
    }

    pub async fn create(&self, request: NewOrder) -> ComexResult<Order> {
        validate(&request)?;

        let repos = &self.repositories;
        if repos.orders.exists_by_number(&request.number).await? {
            return Err(ComexError::already_exists(duplicate_number(&request.number)));
        }

        let exporter = fetch(
            repos.exporters.as_ref(),
            &parse_id("exporterId", &request.exporter_id)?,
        )
        .await?;
        let importer = fetch(
            repos.importers.as_ref(),
            &parse_id("importerId", &request.importer_id)?,
        )
        .await?;
        let responsible = fetch(
            repos.users.as_ref(),
            &parse_id("responsibleId", &request.responsible_id)?,
        )
        .await?;
        let delivery_place = match parse_optional_id("deliveryPlaceId", &request.delivery_place_id)? {
            Some(id) => Some(fetch(repos.delivery_places.as_ref(), &id).await?),
            None => None,
        };

        let mut items = Vec::with_capacity(request.items.len());
        for (index, item) in request.items.into_iter().enumerate() {
            let material_id = parse_id(&format!("items[{}].materialId", index), &item.material_id)?;
            let material = fetch(repos.materials.as_ref(), &material_id).await?;
            let quantity = required(&format!("items[{}].quantity", index), item.quantity)?;
            items.push((material, quantity));
        }

        let order = Order::new(OrderDraft {
            origin: request.origin,
            destination: request.destination,
            exporter,
            importer,
            number: request.number,
            date: required("date", request.date)?,
            responsible,
            modal: required("modal", request.modal)?,
            necessity: required("necessity", request.necessity)?,
            deadline: required("deadline", request.deadline)?,
            observation: non_blank(request.observation),
            delivery_place,
            route: non_blank(request.route),
            items,
        })?;

        repos.orders.insert(&order).await.map_err(|e| match e {
            StorageError::UniqueViolation { ref constraint }
                if constraint == constraints::ORDER_NUMBER =>
            {
                ComexError::already_exists(duplicate_number(&order.number))
            }
            other => other.into(),
        })?;
        tracing::info!(
            order_id = %order.id,
            number = %order.number,
            items = order.items.len(),
            "Order created"
        );

        self.notify_route(&order).await;
        Ok(order)
    }

    /// Change the delivery place, modal, dates, responsible and route of an order
    pub async fn update(&self, request: UpdateOrder) -> ComexResult<Order> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let repos = &self.repositories;
        let mut order = self.get(&id).await?;

        let delivery_place = match parse_optional_id("deliveryPlaceId", &request.delivery_place_id)? {
            Some(place_id) => Some(fetch(repos.delivery_places.as_ref(), &place_id).await?),
            None => None,
        };
        let responsible = fetch(
            repos.users.as_ref(),
            &parse_id("responsibleId", &request.responsible_id)?,
        )
        .await?;

        let route = non_blank(request.route);
        let notify = route.is_some();
        order.apply(OrderChanges {
            delivery_place,
            modal: required("modal", request.modal)?,
            necessity: required("necessity", request.necessity)?,
            responsible,
            deadline: required("deadline", request.deadline)?,
            route,
        });

        self.store_changes(&order).await?;
        tracing::info!(order_id = %order.id, "Order updated");

        if notify {
            self.notify_route(&order).await;
        }
        Ok(order)
    }

    /// Replace the observation; blank text clears it
    pub async fn update_observation(&self, request: UpdateObservation) -> ComexResult<Order> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let mut order = self.get(&id).await?;
        order.observation = non_blank(request.observation);
        self.store_changes(&order).await?;
        tracing::info!(order_id = %order.id, "Order observation updated");
        Ok(order)
    }

    /// Attach the broker reference; a reference belongs to at most one order
    pub async fn update_reference(&self, request: UpdateReference) -> ComexResult<Order> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;
        let reference = request.reference;

        let mut order = self.get(&id).await?;
        if order.broker_reference.as_deref() == Some(reference.as_str()) {
            return Ok(order);
        }

        let orders = &self.repositories.orders;
        if orders.exists_by_broker_reference(&reference).await? {
            return Err(ComexError::already_exists(duplicate_reference(&reference)));
        }

        order.broker_reference = Some(reference);
        self.store_changes(&order).await.map_err(|e| match e {
            ComexError::Storage(StorageError::UniqueViolation { ref constraint })
                if constraint == constraints::ORDER_BROKER_REFERENCE =>
            {
                ComexError::already_exists(duplicate_reference(
                    order.broker_reference.as_deref().unwrap_or_default(),
                ))
            }
            other => other,
        })?;
        tracing::info!(order_id = %order.id, "Order broker reference updated");
        Ok(order)
    }

    /// Write the mutable columns back; the order may have been deleted since
    /// it was read
    async fn store_changes(&self, order: &Order) -> ComexResult<()> {
        if self.repositories.orders.update(order).await? {
            Ok(())
        } else {
            Err(ComexError::not_found("Order", order.id))
        }
    }

    /// Delete an order with its items and event, returning what was removed
    pub async fn delete(&self, id: &str) -> ComexResult<Order> {
        let id = parse_id("id", id)?;
        let order = self.get(&id).await?;

        if !self.repositories.orders.delete(&id).await? {
            return Err(ComexError::not_found("Order", id));
        }
        tracing::info!(order_id = %id, number = %order.number, "Order deleted");
        Ok(order)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<Order> {
        self.repositories
            .orders
            .get(id)
            .await?
            .ok_or_else(|| ComexError::not_found("Order", id))
    }

    pub async fn read(&self, search: OrderSearch, page: &PageRequest) -> ComexResult<Page<Order>> {
        validate_sort(&page.sort)?;
        filter::search(self.repositories.orders.as_ref(), search, page).await
    }

    async fn notify_route(&self, order: &Order) {
        let Some(route) = order.route.as_deref() else {
            return;
        };

        let notification = RouteNotification::for_order(order, route);
        if let Err(e) = self.notifier.notify(&notification).await {
            tracing::warn!(
                order_id = %order.id,
                route = %route,
                error = %e,
                "Route notification failed"
            );
        }
    }
}
