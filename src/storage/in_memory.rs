//! In-memory storage backend for tests and development
//!
//! Reference entities are kept as JSON documents next to their unique keys,
//! orders as flat records pointing at entity ids. Everything sits behind one
//! `RwLock`, so every write (including the whole order aggregate) is atomic
//! and the unique and referential checks see a consistent state.

use crate::core::entity::{Entity, EntityRef, UniqueKey};
use crate::core::error::{StorageError, StorageResult};
use crate::core::query::{Page, PageRequest, SortDirection};
use crate::core::store::{EntityStore, FieldFilter, OrderStore, constraints};
use crate::entities::order::{Event, Item, Modal, Order, OrderSortKey, OrderStatus};
use crate::entities::{DeliveryPlace, Exporter, Importer, Material, User};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

struct StoredEntity {
    entity_type: &'static str,
    keys: Vec<UniqueKey>,
    references: Vec<EntityRef>,
    data: Value,
}

struct ItemRecord {
    id: Uuid,
    material_id: Uuid,
    quantity: Decimal,
}

struct OrderRecord {
    id: Uuid,
    origin: String,
    destination: String,
    exporter_id: Uuid,
    importer_id: Uuid,
    number: String,
    date: NaiveDate,
    responsible_id: Uuid,
    modal: Modal,
    necessity: NaiveDate,
    deadline: NaiveDate,
    observation: Option<String>,
    delivery_place_id: Option<Uuid>,
    broker_reference: Option<String>,
    route: Option<String>,
    status: OrderStatus,
    items: Vec<ItemRecord>,
    event: Event,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            origin: order.origin.clone(),
            destination: order.destination.clone(),
            exporter_id: order.exporter.id,
            importer_id: order.importer.id,
            number: order.number.clone(),
            date: order.date,
            responsible_id: order.responsible.id,
            modal: order.modal,
            necessity: order.necessity,
            deadline: order.deadline,
            observation: order.observation.clone(),
            delivery_place_id: order.delivery_place.as_ref().map(|p| p.id),
            broker_reference: order.broker_reference.clone(),
            route: order.route.clone(),
            status: order.status,
            items: order
                .items
                .iter()
                .map(|item| ItemRecord {
                    id: item.id,
                    material_id: item.material.id,
                    quantity: item.quantity,
                })
                .collect(),
            event: order.event.clone(),
        }
    }
}

impl OrderRecord {
    /// Ids of every entity this order points at, with the entity type expected
    fn references(&self) -> Vec<(Uuid, &'static str)> {
        let mut refs = vec![
            (self.exporter_id, Exporter::entity_type()),
            (self.importer_id, Importer::entity_type()),
            (self.responsible_id, User::entity_type()),
        ];
        if let Some(place) = self.delivery_place_id {
            refs.push((place, DeliveryPlace::entity_type()));
        }
        refs.extend(
            self.items
                .iter()
                .map(|item| (item.material_id, Material::entity_type())),
        );
        refs
    }
}

#[derive(Default)]
struct State {
    entities: HashMap<Uuid, StoredEntity>,
    orders: HashMap<Uuid, OrderRecord>,
}

impl State {
    fn decode<T: Entity>(&self, id: &Uuid) -> StorageResult<Option<T>> {
        match self.entities.get(id) {
            Some(stored) if stored.entity_type == T::entity_type() => {
                serde_json::from_value(stored.data.clone())
                    .map(Some)
                    .map_err(|e| StorageError::Corrupted {
                        entity_type: T::entity_type(),
                        message: e.to_string(),
                    })
            }
            _ => Ok(None),
        }
    }

    fn require<T: Entity>(&self, id: &Uuid) -> StorageResult<T> {
        self.decode(id)?.ok_or_else(|| StorageError::Corrupted {
            entity_type: T::entity_type(),
            message: format!("dangling reference {}", id),
        })
    }

    fn all<T: Entity>(&self) -> StorageResult<Vec<T>> {
        self.entities
            .iter()
            .filter(|(_, stored)| stored.entity_type == T::entity_type())
            .filter_map(|(id, _)| self.decode::<T>(id).transpose())
            .collect()
    }

    /// First unique key of `keys` already held by another entity of the same type
    fn conflicting_key(
        &self,
        entity_type: &str,
        own_id: &Uuid,
        keys: &[UniqueKey],
    ) -> Option<&'static str> {
        self.entities
            .iter()
            .filter(|(id, stored)| *id != own_id && stored.entity_type == entity_type)
            .flat_map(|(_, stored)| stored.keys.iter())
            .find(|existing| keys.contains(existing))
            .map(|existing| existing.constraint)
    }

    /// Constraint that keeps `id` alive, if any order or entity points at it
    fn referenced_by(&self, id: &Uuid, entity_type: &str) -> Option<String> {
        let by_order = self
            .orders
            .values()
            .any(|order| order.references().iter().any(|(ref_id, _)| ref_id == id));
        if by_order {
            return Some(format!("order_{}_fk", entity_type));
        }
        self.entities
            .values()
            .flat_map(|stored| stored.references.iter())
            .find(|reference| reference.id == *id)
            .map(|reference| reference.constraint.to_string())
    }

    fn check_entity_references(&self, references: &[EntityRef]) -> StorageResult<()> {
        for reference in references {
            let present = self
                .entities
                .get(&reference.id)
                .is_some_and(|stored| stored.entity_type == reference.entity_type);
            if !present {
                return Err(StorageError::ForeignKeyViolation {
                    constraint: reference.constraint.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_references(&self, record: &OrderRecord) -> StorageResult<()> {
        for (id, entity_type) in record.references() {
            let present = self
                .entities
                .get(&id)
                .is_some_and(|stored| stored.entity_type == entity_type);
            if !present {
                return Err(StorageError::ForeignKeyViolation {
                    constraint: format!("order_{}_fk", entity_type),
                });
            }
        }
        Ok(())
    }

    fn check_order_keys(&self, record: &OrderRecord) -> StorageResult<()> {
        for other in self.orders.values().filter(|o| o.id != record.id) {
            if other.number == record.number {
                return Err(StorageError::UniqueViolation {
                    constraint: constraints::ORDER_NUMBER.to_string(),
                });
            }
            if record.broker_reference.is_some() && other.broker_reference == record.broker_reference
            {
                return Err(StorageError::UniqueViolation {
                    constraint: constraints::ORDER_BROKER_REFERENCE.to_string(),
                });
            }
        }
        Ok(())
    }

    fn hydrate(&self, record: &OrderRecord) -> StorageResult<Order> {
        let items = record
            .items
            .iter()
            .map(|item| {
                Ok(Item {
                    id: item.id,
                    material: self.require::<Material>(&item.material_id)?,
                    quantity: item.quantity,
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let delivery_place = match &record.delivery_place_id {
            Some(id) => Some(self.require::<DeliveryPlace>(id)?),
            None => None,
        };

        Ok(Order {
            id: record.id,
            origin: record.origin.clone(),
            destination: record.destination.clone(),
            exporter: self.require(&record.exporter_id)?,
            importer: self.require(&record.importer_id)?,
            number: record.number.clone(),
            date: record.date,
            responsible: self.require(&record.responsible_id)?,
            modal: record.modal,
            necessity: record.necessity,
            deadline: record.deadline,
            observation: record.observation.clone(),
            delivery_place,
            broker_reference: record.broker_reference.clone(),
            route: record.route.clone(),
            status: record.status,
            items,
            event: record.event.clone(),
        })
    }

    fn order_page(
        &self,
        predicate: impl Fn(&OrderRecord) -> bool,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        let mut orders = self
            .orders
            .values()
            .filter(|record| predicate(record))
            .map(|record| self.hydrate(record))
            .collect::<StorageResult<Vec<_>>>()?;

        let key = OrderSortKey::parse(&page.sort).unwrap_or(OrderSortKey::Id);
        key.sort(&mut orders, page.direction);
        Ok(Page::slice(orders, page))
    }
}

/// In-memory store implementing every storage trait
///
/// Cloning is cheap and clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| StorageError::TransactionError {
                message: format!("Failed to acquire read lock: {}", e),
            })
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| StorageError::TransactionError {
                message: format!("Failed to acquire write lock: {}", e),
            })
    }
}

fn encode<T: Entity>(entity: &T) -> StorageResult<StoredEntity> {
    let data = serde_json::to_value(entity).map_err(|e| StorageError::Corrupted {
        entity_type: T::entity_type(),
        message: e.to_string(),
    })?;
    Ok(StoredEntity {
        entity_type: T::entity_type(),
        keys: entity.unique_keys(),
        references: entity.references(),
        data,
    })
}

fn sort_entities<T: Entity>(entities: &mut [T], field: &str, direction: SortDirection) {
    entities.sort_by(|a, b| {
        let ordering = a
            .field_value(field)
            .cmp(&b.field_value(field))
            .then_with(|| a.id().cmp(&b.id()));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl<T: Entity> EntityStore<T> for InMemoryStore {
    async fn insert(&self, entity: T) -> StorageResult<T> {
        let stored = encode(&entity)?;
        let mut state = self.write()?;

        if let Some(constraint) = state.conflicting_key(T::entity_type(), &entity.id(), &stored.keys)
        {
            return Err(StorageError::UniqueViolation {
                constraint: constraint.to_string(),
            });
        }
        state.check_entity_references(&stored.references)?;

        state.entities.insert(entity.id(), stored);
        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> StorageResult<Option<T>> {
        self.read()?.decode(id)
    }

    async fn list(&self) -> StorageResult<Vec<T>> {
        let mut all = self.read()?.all::<T>()?;
        sort_entities(&mut all, "id", SortDirection::Asc);
        Ok(all)
    }

    async fn update(&self, entity: T) -> StorageResult<Option<T>> {
        let stored = encode(&entity)?;
        let mut state = self.write()?;

        let exists = state
            .entities
            .get(&entity.id())
            .is_some_and(|current| current.entity_type == T::entity_type());
        if !exists {
            return Ok(None);
        }

        if let Some(constraint) = state.conflicting_key(T::entity_type(), &entity.id(), &stored.keys)
        {
            return Err(StorageError::UniqueViolation {
                constraint: constraint.to_string(),
            });
        }
        state.check_entity_references(&stored.references)?;

        state.entities.insert(entity.id(), stored);
        Ok(Some(entity))
    }

    async fn delete(&self, id: &Uuid) -> StorageResult<Option<T>> {
        let mut state = self.write()?;

        let Some(entity) = state.decode::<T>(id)? else {
            return Ok(None);
        };
        if let Some(constraint) = state.referenced_by(id, T::entity_type()) {
            return Err(StorageError::ForeignKeyViolation { constraint });
        }

        state.entities.remove(id);
        Ok(Some(entity))
    }

    async fn search(&self, filter: &FieldFilter) -> StorageResult<Vec<T>> {
        let mut found: Vec<T> = self
            .read()?
            .all::<T>()?
            .into_iter()
            .filter(|entity| filter.matches(entity.field_value(filter.field).as_deref()))
            .collect();
        sort_entities(&mut found, "id", SortDirection::Asc);
        Ok(found)
    }

    async fn search_page(
        &self,
        filter: Option<&FieldFilter>,
        sort_field: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<T>> {
        let mut found: Vec<T> = self
            .read()?
            .all::<T>()?
            .into_iter()
            .filter(|entity| {
                filter.is_none_or(|f| f.matches(entity.field_value(f.field).as_deref()))
            })
            .collect();
        sort_entities(&mut found, sort_field, page.direction);
        Ok(Page::slice(found, page))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn exists_by_number(&self, number: &str) -> StorageResult<bool> {
        Ok(self.read()?.orders.values().any(|o| o.number == number))
    }

    async fn exists_by_broker_reference(&self, reference: &str) -> StorageResult<bool> {
        Ok(self
            .read()?
            .orders
            .values()
            .any(|o| o.broker_reference.as_deref() == Some(reference)))
    }

    async fn insert(&self, order: &Order) -> StorageResult<()> {
        let record = OrderRecord::from(order);
        let mut state = self.write()?;

        if state.orders.contains_key(&record.id) {
            return Err(StorageError::UniqueViolation {
                constraint: "order_processes_pkey".to_string(),
            });
        }
        state.check_order_keys(&record)?;
        state.check_references(&record)?;

        state.orders.insert(record.id, record);
        Ok(())
    }

    async fn update(&self, order: &Order) -> StorageResult<bool> {
        let record = OrderRecord::from(order);
        let mut state = self.write()?;

        if !state.orders.contains_key(&record.id) {
            return Ok(false);
        }
        state.check_order_keys(&record)?;
        state.check_references(&record)?;

        state.orders.insert(record.id, record);
        Ok(true)
    }

    async fn get(&self, id: &Uuid) -> StorageResult<Option<Order>> {
        let state = self.read()?;
        state
            .orders
            .get(id)
            .map(|record| state.hydrate(record))
            .transpose()
    }

    async fn delete(&self, id: &Uuid) -> StorageResult<bool> {
        Ok(self.write()?.orders.remove(id).is_some())
    }

    async fn find_all(&self, page: &PageRequest) -> StorageResult<Page<Order>> {
        self.read()?.order_page(|_| true, page)
    }

    async fn find_by_destination(
        &self,
        destination: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.read()?
            .order_page(|o| o.destination == destination, page)
    }

    async fn find_by_origin(
        &self,
        origin: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.read()?.order_page(|o| o.origin == origin, page)
    }

    async fn find_by_number(
        &self,
        number: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.read()?.order_page(|o| o.number == number, page)
    }

    async fn find_by_exporter_id(
        &self,
        exporter_id: &Uuid,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.read()?
            .order_page(|o| &o.exporter_id == exporter_id, page)
    }

    async fn find_by_importer_id(
        &self,
        importer_id: &Uuid,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.read()?
            .order_page(|o| &o.importer_id == importer_id, page)
    }
}
