//! PostgreSQL storage backend using sqlx.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! comex-rs = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Reference entities share an `entities` table with a JSONB `data` column.
//! Their business keys are enforced by partial unique indexes named after
//! [`constraints`], so a violation reported by PostgreSQL maps straight back
//! to the rule that was broken. Orders live in relational tables
//! (`order_processes`, `order_items`, `order_events`) whose foreign keys point
//! at `entities`. References between entities (a process and its responsible
//! user, for instance) are rows of `entity_references`, so PostgreSQL refuses
//! to delete an entity something still points at.

use crate::core::entity::{Entity, EntityRef};
use crate::core::error::{StorageError, StorageResult};
use crate::core::query::{Page, PageRequest, SortDirection};
use crate::core::store::{EntityStore, FieldFilter, MatchMode, OrderStore, constraints};
use crate::entities::order::{Event, Item, Order, OrderSortKey};
use crate::entities::{DeliveryPlace, Exporter, Importer, Material, User};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const BACKEND: &str = "postgres";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Unique indexes over the JSON documents: (constraint, entity type, indexed expressions)
const ENTITY_UNIQUE_INDEXES: &[(&str, &str, &str)] = &[
    (constraints::EXPORTER_CODE, "exporter", "(data->>'code')"),
    (constraints::IMPORTER_PLANT, "importer", "(data->>'plant')"),
    (constraints::MATERIAL_CODE, "material", "(data->>'code')"),
    (constraints::USER_EMAIL, "user", "(data->>'email')"),
    (
        constraints::DELIVERY_PLACE_NAME,
        "delivery_place",
        "(data->>'name')",
    ),
    (
        constraints::OPERATION_COUNTRY_TYPE,
        "operation",
        "(data->>'country'), (data->>'operation_type')",
    ),
    (constraints::PROCESS_NAME, "process", "(data->>'name')"),
    (constraints::POINT_NAME, "point", "(data->>'name')"),
];

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS entities (
            id UUID PRIMARY KEY,
            entity_type VARCHAR(64) NOT NULL,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"
        .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_entities_type ON entities (entity_type)".to_string(),
        "CREATE TABLE IF NOT EXISTS entity_references (
            entity_id UUID NOT NULL REFERENCES entities (id) ON DELETE CASCADE,
            constraint_name VARCHAR(64) NOT NULL,
            target_id UUID NOT NULL,
            PRIMARY KEY (entity_id, constraint_name),
            CONSTRAINT entity_reference_target_fk FOREIGN KEY (target_id) REFERENCES entities (id)
        )"
        .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_entity_references_target ON entity_references (target_id)"
            .to_string(),
    ]
    .into_iter()
    .chain(
        ENTITY_UNIQUE_INDEXES
            .iter()
            .map(|(name, entity_type, expression)| {
                format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS {} ON entities ({}) WHERE entity_type = '{}'",
                    name, expression, entity_type
                )
            }),
    )
    .chain([
        format!(
            "CREATE TABLE IF NOT EXISTS order_processes (
                id UUID PRIMARY KEY,
                origin TEXT NOT NULL,
                destination TEXT NOT NULL,
                exporter_id UUID NOT NULL,
                importer_id UUID NOT NULL,
                number VARCHAR(10) NOT NULL,
                date DATE NOT NULL,
                responsible_id UUID NOT NULL,
                modal VARCHAR(16) NOT NULL,
                necessity DATE NOT NULL,
                deadline DATE NOT NULL,
                observation VARCHAR(1000),
                delivery_place_id UUID,
                broker_reference VARCHAR(20),
                route TEXT,
                status VARCHAR(40) NOT NULL,
                CONSTRAINT {} UNIQUE (number),
                CONSTRAINT {} UNIQUE (broker_reference),
                CONSTRAINT order_exporter_fk FOREIGN KEY (exporter_id) REFERENCES entities (id),
                CONSTRAINT order_importer_fk FOREIGN KEY (importer_id) REFERENCES entities (id),
                CONSTRAINT order_user_fk FOREIGN KEY (responsible_id) REFERENCES entities (id),
                CONSTRAINT order_delivery_place_fk FOREIGN KEY (delivery_place_id) REFERENCES entities (id)
            )",
            constraints::ORDER_NUMBER,
            constraints::ORDER_BROKER_REFERENCE
        ),
        "CREATE INDEX IF NOT EXISTS idx_orders_destination ON order_processes (destination)"
            .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_orders_origin ON order_processes (origin)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_orders_exporter ON order_processes (exporter_id)"
            .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_orders_importer ON order_processes (importer_id)"
            .to_string(),
        "CREATE TABLE IF NOT EXISTS order_items (
            id UUID PRIMARY KEY,
            order_id UUID NOT NULL REFERENCES order_processes (id) ON DELETE CASCADE,
            material_id UUID NOT NULL,
            quantity NUMERIC NOT NULL,
            position INTEGER NOT NULL,
            CONSTRAINT order_material_fk FOREIGN KEY (material_id) REFERENCES entities (id)
        )"
        .to_string(),
        "CREATE TABLE IF NOT EXISTS order_events (
            id UUID PRIMARY KEY,
            order_id UUID NOT NULL UNIQUE REFERENCES order_processes (id) ON DELETE CASCADE,
            availability DATE,
            estimated_departure DATE,
            real_departure DATE,
            estimated_arrival DATE,
            real_arrival DATE,
            pre_alert DATE,
            wrong_necessity_alert DATE
        )"
        .to_string(),
    ]);

    for statement in statements {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(map_sqlx_error)?;
    }

    Ok(())
}

/// Translate a sqlx error, keeping the constraint name of integrity violations
pub fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) => {
            let constraint = db.constraint().unwrap_or_default().to_string();
            match db.code().as_deref() {
                Some("23505") => StorageError::UniqueViolation { constraint },
                Some("23503") => StorageError::ForeignKeyViolation { constraint },
                _ => StorageError::QueryError {
                    backend: BACKEND,
                    message: err.to_string(),
                },
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StorageError::Unavailable { backend: BACKEND }
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StorageError::ConnectionError {
            backend: BACKEND,
            message: err.to_string(),
        },
        _ => StorageError::QueryError {
            backend: BACKEND,
            message: err.to_string(),
        },
    }
}

fn corrupted(entity_type: &'static str, message: impl ToString) -> StorageError {
    StorageError::Corrupted {
        entity_type,
        message: message.to_string(),
    }
}

fn decode<T: Entity>(data: Value) -> StorageResult<T> {
    serde_json::from_value(data).map_err(|e| corrupted(T::entity_type(), e))
}

fn encode<T: Entity>(entity: &T) -> StorageResult<Value> {
    serde_json::to_value(entity).map_err(|e| corrupted(T::entity_type(), e))
}

/// Only plain snake_case keys may be spliced into ORDER BY
fn safe_sort_field(field: &str) -> &str {
    if !field.is_empty() && field.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
        field
    } else {
        "id"
    }
}

/// Absent values sort before present ones, as `Option` orders in memory
fn nulls_placement(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "NULLS FIRST",
        SortDirection::Desc => "NULLS LAST",
    }
}

// ---------------------------------------------------------------------------
// PostgresStore
// ---------------------------------------------------------------------------

/// Storage backed by PostgreSQL, implementing every storage trait
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new `PostgresStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then make sure the schema exists
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: BACKEND,
                message: e.to_string(),
            })?;
        ensure_schema(&pool).await?;
        tracing::info!("Connected to PostgreSQL, schema ready");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Record the references of `entity_id`; each target must exist with the expected type
async fn insert_references(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entity_id: Uuid,
    references: &[EntityRef],
) -> StorageResult<()> {
    for reference in references {
        let result = sqlx::query(
            "INSERT INTO entity_references (entity_id, constraint_name, target_id) \
             SELECT $1, $2, $3 WHERE EXISTS \
             (SELECT 1 FROM entities WHERE id = $3 AND entity_type = $4)",
        )
        .bind(entity_id)
        .bind(reference.constraint)
        .bind(reference.id)
        .bind(reference.entity_type)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ForeignKeyViolation {
                constraint: reference.constraint.to_string(),
            });
        }
    }
    Ok(())
}

fn commit_error(err: sqlx::Error) -> StorageError {
    StorageError::TransactionError {
        message: err.to_string(),
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for PostgresStore {
    async fn insert(&self, entity: T) -> StorageResult<T> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        sqlx::query("INSERT INTO entities (id, entity_type, data) VALUES ($1, $2, $3)")
            .bind(entity.id())
            .bind(T::entity_type())
            .bind(encode(&entity)?)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        insert_references(&mut tx, entity.id(), &entity.references()).await?;
        tx.commit().await.map_err(commit_error)?;
        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> StorageResult<Option<T>> {
        let data: Option<Value> =
            sqlx::query_scalar("SELECT data FROM entities WHERE id = $1 AND entity_type = $2")
                .bind(id)
                .bind(T::entity_type())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        data.map(decode).transpose()
    }

    async fn list(&self) -> StorageResult<Vec<T>> {
        let rows: Vec<Value> =
            sqlx::query_scalar("SELECT data FROM entities WHERE entity_type = $1 ORDER BY id")
                .bind(T::entity_type())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn update(&self, entity: T) -> StorageResult<Option<T>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let result = sqlx::query(
            "UPDATE entities SET data = $3, updated_at = now() WHERE id = $1 AND entity_type = $2",
        )
        .bind(entity.id())
        .bind(T::entity_type())
        .bind(encode(&entity)?)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let references = entity.references();
        if !references.is_empty() {
            sqlx::query("DELETE FROM entity_references WHERE entity_id = $1")
                .bind(entity.id())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            insert_references(&mut tx, entity.id(), &references).await?;
        }
        tx.commit().await.map_err(commit_error)?;
        Ok(Some(entity))
    }

    async fn delete(&self, id: &Uuid) -> StorageResult<Option<T>> {
        let data: Option<Value> = sqlx::query_scalar(
            "DELETE FROM entities WHERE id = $1 AND entity_type = $2 RETURNING data",
        )
        .bind(id)
        .bind(T::entity_type())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        data.map(decode).transpose()
    }

    async fn search(&self, filter: &FieldFilter) -> StorageResult<Vec<T>> {
        let predicate = match filter.mode {
            MatchMode::Exact => "data->>$2 = $3",
            MatchMode::Contains => "strpos(data->>$2, $3) > 0",
        };
        let sql = format!(
            "SELECT data FROM entities WHERE entity_type = $1 AND {} ORDER BY id",
            predicate
        );
        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .bind(T::entity_type())
            .bind(filter.field)
            .bind(&filter.value)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn search_page(
        &self,
        filter: Option<&FieldFilter>,
        sort_field: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<T>> {
        let predicate = match filter.map(|f| f.mode) {
            None => "TRUE",
            Some(MatchMode::Exact) => "data->>$2 = $3",
            Some(MatchMode::Contains) => "strpos(data->>$2, $3) > 0",
        };
        let next = if filter.is_some() { 4 } else { 2 };

        let count_sql = format!(
            "SELECT COUNT(*) FROM entities WHERE entity_type = $1 AND {}",
            predicate
        );
        let select_sql = format!(
            "SELECT data FROM entities WHERE entity_type = $1 AND {} \
             ORDER BY data->>'{}' {}, id LIMIT ${} OFFSET ${}",
            predicate,
            safe_sort_field(sort_field),
            page.direction.as_sql(),
            next,
            next + 1
        );

        let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(T::entity_type());
        let mut select = sqlx::query_scalar::<_, Value>(&select_sql).bind(T::entity_type());
        if let Some(f) = filter {
            count = count.bind(f.field).bind(f.value.clone());
            select = select.bind(f.field).bind(f.value.clone());
        }

        let total = count
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let rows = select
            .bind(i64::from(page.size))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let content = rows.into_iter().map(decode).collect::<StorageResult<_>>()?;
        Ok(Page::new(content, page, total.max(0) as u64))
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    origin: String,
    destination: String,
    exporter_id: Uuid,
    importer_id: Uuid,
    number: String,
    date: NaiveDate,
    responsible_id: Uuid,
    modal: String,
    necessity: NaiveDate,
    deadline: NaiveDate,
    observation: Option<String>,
    delivery_place_id: Option<Uuid>,
    broker_reference: Option<String>,
    route: Option<String>,
    status: String,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    material_id: Uuid,
    quantity: Decimal,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    availability: Option<NaiveDate>,
    estimated_departure: Option<NaiveDate>,
    real_departure: Option<NaiveDate>,
    estimated_arrival: Option<NaiveDate>,
    real_arrival: Option<NaiveDate>,
    pre_alert: Option<NaiveDate>,
    wrong_necessity_alert: Option<NaiveDate>,
}

/// Which rows an order page is drawn from
enum Criterion<'a> {
    All,
    Text(&'static str, &'a str),
    Id(&'static str, &'a Uuid),
}

const ORDER_COLUMNS: &str = "id, origin, destination, exporter_id, importer_id, number, date, \
     responsible_id, modal, necessity, deadline, observation, delivery_place_id, \
     broker_reference, route, status";

impl PostgresStore {
    async fn require<T: Entity>(&self, id: &Uuid) -> StorageResult<T> {
        EntityStore::<T>::get(self, id)
            .await?
            .ok_or_else(|| corrupted(T::entity_type(), format!("dangling reference {}", id)))
    }

    async fn hydrate(&self, row: OrderRow) -> StorageResult<Order> {
        let item_rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, material_id, quantity FROM order_items WHERE order_id = $1 ORDER BY position",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut items = Vec::with_capacity(item_rows.len());
        for item in item_rows {
            items.push(Item {
                id: item.id,
                material: self.require::<Material>(&item.material_id).await?,
                quantity: item.quantity,
            });
        }

        let event: EventRow = sqlx::query_as(
            "SELECT id, availability, estimated_departure, real_departure, estimated_arrival, \
             real_arrival, pre_alert, wrong_necessity_alert FROM order_events WHERE order_id = $1",
        )
        .bind(row.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| corrupted("order", format!("order {} has no event", row.id)))?;

        let delivery_place = match &row.delivery_place_id {
            Some(id) => Some(self.require::<DeliveryPlace>(id).await?),
            None => None,
        };

        Ok(Order {
            id: row.id,
            origin: row.origin,
            destination: row.destination,
            exporter: self.require::<Exporter>(&row.exporter_id).await?,
            importer: self.require::<Importer>(&row.importer_id).await?,
            number: row.number,
            date: row.date,
            responsible: self.require::<User>(&row.responsible_id).await?,
            modal: row.modal.parse().map_err(|e| corrupted("order", e))?,
            necessity: row.necessity,
            deadline: row.deadline,
            observation: row.observation,
            delivery_place,
            broker_reference: row.broker_reference,
            route: row.route,
            status: row.status.parse().map_err(|e| corrupted("order", e))?,
            items,
            event: Event {
                id: event.id,
                availability: event.availability,
                estimated_departure: event.estimated_departure,
                real_departure: event.real_departure,
                estimated_arrival: event.estimated_arrival,
                real_arrival: event.real_arrival,
                pre_alert: event.pre_alert,
                wrong_necessity_alert: event.wrong_necessity_alert,
            },
        })
    }

    async fn order_page(
        &self,
        criterion: Criterion<'_>,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        let clause = match &criterion {
            Criterion::All => String::new(),
            Criterion::Text(column, _) | Criterion::Id(column, _) => {
                format!("WHERE {} = $1", column)
            }
        };
        let next = if matches!(criterion, Criterion::All) { 1 } else { 2 };
        let sort = OrderSortKey::parse(&page.sort).unwrap_or(OrderSortKey::Id);

        let count_sql = format!("SELECT COUNT(*) FROM order_processes {}", clause);
        let select_sql = format!(
            "SELECT {} FROM order_processes {} ORDER BY {} {} {}, id LIMIT ${} OFFSET ${}",
            ORDER_COLUMNS,
            clause,
            sort.column(),
            page.direction.as_sql(),
            nulls_placement(page.direction),
            next,
            next + 1
        );

        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select = sqlx::query_as::<_, OrderRow>(&select_sql);
        match criterion {
            Criterion::All => {}
            Criterion::Text(_, value) => {
                count = count.bind(value.to_string());
                select = select.bind(value.to_string());
            }
            Criterion::Id(_, id) => {
                count = count.bind(*id);
                select = select.bind(*id);
            }
        }

        let total = count
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let rows = select
            .bind(i64::from(page.size))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(Page::new(orders, page, total.max(0) as u64))
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn exists_by_number(&self, number: &str) -> StorageResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM order_processes WHERE number = $1)")
            .bind(number)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn exists_by_broker_reference(&self, reference: &str) -> StorageResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM order_processes WHERE broker_reference = $1)",
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert(&self, order: &Order) -> StorageResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO order_processes (id, origin, destination, exporter_id, importer_id, \
             number, date, responsible_id, modal, necessity, deadline, observation, \
             delivery_place_id, broker_reference, route, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(order.id)
        .bind(&order.origin)
        .bind(&order.destination)
        .bind(order.exporter.id)
        .bind(order.importer.id)
        .bind(&order.number)
        .bind(order.date)
        .bind(order.responsible.id)
        .bind(order.modal.as_str())
        .bind(order.necessity)
        .bind(order.deadline)
        .bind(&order.observation)
        .bind(order.delivery_place.as_ref().map(|p| p.id))
        .bind(&order.broker_reference)
        .bind(&order.route)
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, material_id, quantity, position) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.material.id)
            .bind(item.quantity)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        let event = &order.event;
        sqlx::query(
            "INSERT INTO order_events (id, order_id, availability, estimated_departure, \
             real_departure, estimated_arrival, real_arrival, pre_alert, wrong_necessity_alert) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(event.id)
        .bind(order.id)
        .bind(event.availability)
        .bind(event.estimated_departure)
        .bind(event.real_departure)
        .bind(event.estimated_arrival)
        .bind(event.real_arrival)
        .bind(event.pre_alert)
        .bind(event.wrong_necessity_alert)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(commit_error)
    }

    async fn update(&self, order: &Order) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE order_processes SET delivery_place_id = $2, modal = $3, necessity = $4, \
             responsible_id = $5, deadline = $6, observation = $7, broker_reference = $8, \
             route = $9 WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.delivery_place.as_ref().map(|p| p.id))
        .bind(order.modal.as_str())
        .bind(order.necessity)
        .bind(order.responsible.id)
        .bind(order.deadline)
        .bind(&order.observation)
        .bind(&order.broker_reference)
        .bind(&order.route)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: &Uuid) -> StorageResult<Option<Order>> {
        let sql = format!("SELECT {} FROM order_processes WHERE id = $1", ORDER_COLUMNS);
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM order_processes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_all(&self, page: &PageRequest) -> StorageResult<Page<Order>> {
        self.order_page(Criterion::All, page).await
    }

    async fn find_by_destination(
        &self,
        destination: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.order_page(Criterion::Text("destination", destination), page)
            .await
    }

    async fn find_by_origin(
        &self,
        origin: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.order_page(Criterion::Text("origin", origin), page).await
    }

    async fn find_by_number(
        &self,
        number: &str,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.order_page(Criterion::Text("number", number), page).await
    }

    async fn find_by_exporter_id(
        &self,
        exporter_id: &Uuid,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.order_page(Criterion::Id("exporter_id", exporter_id), page)
            .await
    }

    async fn find_by_importer_id(
        &self,
        importer_id: &Uuid,
        page: &PageRequest,
    ) -> StorageResult<Page<Order>> {
        self.order_page(Criterion::Id("importer_id", importer_id), page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_sort_field() {
        assert_eq!(safe_sort_field("code"), "code");
        assert_eq!(safe_sort_field("unit_price"), "unit_price");
        assert_eq!(safe_sort_field("code; DROP TABLE entities"), "id");
        assert_eq!(safe_sort_field(""), "id");
    }

    #[test]
    fn test_nulls_sort_first_ascending() {
        assert_eq!(nulls_placement(SortDirection::Asc), "NULLS FIRST");
        assert_eq!(nulls_placement(SortDirection::Desc), "NULLS LAST");
    }

    #[test]
    fn test_unique_indexes_cover_every_entity_constraint() {
        let names: Vec<&str> = ENTITY_UNIQUE_INDEXES.iter().map(|(n, _, _)| *n).collect();
        assert!(names.contains(&constraints::EXPORTER_CODE));
        assert!(names.contains(&constraints::OPERATION_COUNTRY_TYPE));
        assert!(names.contains(&constraints::PROCESS_NAME));
        assert!(names.contains(&constraints::POINT_NAME));
        assert_eq!(names.len(), 8);
    }
}
