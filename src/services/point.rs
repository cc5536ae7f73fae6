//! Route points: the named stops shipping routes are built from

use super::conflict;
use crate::core::error::{ComexError, ComexResult};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{validate, validators};
use crate::entities::Point;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewPoint {
    #[validate(custom(function = "validators::not_blank"))]
    pub name: String,
}

fn duplicate_name(name: &str) -> String {
    format!("Point already exists with name {}", name)
}

#[derive(Clone)]
pub struct PointService {
    store: Arc<dyn EntityStore<Point>>,
}

impl PointService {
    pub fn new(store: Arc<dyn EntityStore<Point>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewPoint) -> ComexResult<Point> {
        validate(&request)?;

        let name = request.name;
        if self.store.exists(&FieldFilter::exact("name", name.as_str())).await? {
            return Err(ComexError::already_exists(duplicate_name(&name)));
        }

        let point = self
            .store
            .insert(Point {
                id: Uuid::new_v4(),
                name: name.clone(),
            })
            .await
            .map_err(|e| conflict(e, constraints::POINT_NAME, || duplicate_name(&name)))?;
        tracing::info!(point_id = %point.id, name = %point.name, "Point created");
        Ok(point)
    }

    pub async fn read(&self) -> ComexResult<Vec<Point>> {
        Ok(self.store.list().await?)
    }
}
