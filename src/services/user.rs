//! Users responsible for orders

use super::{conflict, fetch, remove, replace};
use crate::core::error::{ComexError, ComexResult};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{parse_id, validate, validators};
use crate::entities::User;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewUser {
    #[validate(
        custom(function = "validators::not_blank"),
        email(message = "must be a well-formed email address")
    )]
    pub email: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateUser {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(
        custom(function = "validators::not_blank"),
        email(message = "must be a well-formed email address")
    )]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSearch {
    Email(String),
    Name(String),
    All,
}

fn duplicate_email(email: &str) -> String {
    format!("User already exists with email {}", email)
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore<User>>,
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore<User>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: NewUser) -> ComexResult<User> {
        validate(&request)?;

        let email = request.email.clone();
        if self.store.exists(&FieldFilter::exact("email", email.as_str())).await? {
            return Err(ComexError::already_exists(duplicate_email(&email)));
        }

        let user = self
            .store
            .insert(User {
                id: Uuid::new_v4(),
                email: request.email,
                name: request.name,
            })
            .await
            .map_err(|e| conflict(e, constraints::USER_EMAIL, || duplicate_email(&email)))?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn read(&self, search: UserSearch) -> ComexResult<Vec<User>> {
        tracing::debug!(?search, "Reading users");
        let users = match search {
            UserSearch::Email(email) if !email.trim().is_empty() => {
                self.store.search(&FieldFilter::exact("email", email)).await?
            }
            UserSearch::Name(name) if !name.trim().is_empty() => {
                self.store.search(&FieldFilter::exact("name", name)).await?
            }
            _ => self.store.list().await?,
        };
        Ok(users)
    }

    pub async fn get(&self, id: &Uuid) -> ComexResult<User> {
        fetch(self.store.as_ref(), id).await
    }

    /// Change the e-mail of a user; it must stay unique among the other users
    pub async fn update(&self, request: UpdateUser) -> ComexResult<User> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let mut user = fetch(self.store.as_ref(), &id).await?;
        let taken = self
            .store
            .search(&FieldFilter::exact("email", request.email.as_str()))
            .await?
            .iter()
            .any(|other| other.id != id);
        if taken {
            return Err(ComexError::already_exists(duplicate_email(&request.email)));
        }

        let email = request.email.clone();
        user.email = request.email;
        let user = replace(self.store.as_ref(), user)
            .await
            .map_err(|e| e.into_error(constraints::USER_EMAIL, || duplicate_email(&email)))?;
        tracing::info!(user_id = %user.id, "User e-mail updated");
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> ComexResult<User> {
        let id = parse_id("id", id)?;
        remove(self.store.as_ref(), &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_by_email_and_name() {
        let service = UserService::new(Arc::new(InMemoryStore::new()));
        let ana = service.create(new_user("ana@comex.com", "Ana")).await.unwrap();
        service.create(new_user("bruno@comex.com", "Bruno")).await.unwrap();

        let by_email = service.read(UserSearch::Email("ana@comex.com".to_string())).await.unwrap();
        assert_eq!(by_email, vec![ana.clone()]);
        let by_name = service.read(UserSearch::Name("Ana".to_string())).await.unwrap();
        assert_eq!(by_name, vec![ana]);
        assert_eq!(service.read(UserSearch::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let service = UserService::new(Arc::new(InMemoryStore::new()));
        let err = service.create(new_user("not-an-email", "Ana")).await.unwrap_err();
        let ComexError::Validation(validation) = err else {
            panic!("expected validation error, got {:?}", err);
        };
        assert_eq!(validation.violations()[0].field, "email");
    }

    #[tokio::test]
    async fn test_update_email_uniqueness() {
        let service = UserService::new(Arc::new(InMemoryStore::new()));
        let ana = service.create(new_user("ana@comex.com", "Ana")).await.unwrap();
        service.create(new_user("bruno@comex.com", "Bruno")).await.unwrap();

        let err = service
            .update(UpdateUser {
                id: ana.id.to_string(),
                email: "bruno@comex.com".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User already exists with email bruno@comex.com");

        // Re-submitting the current address is not a conflict
        let same = service
            .update(UpdateUser {
                id: ana.id.to_string(),
                email: "ana@comex.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(same.email, "ana@comex.com");

        let changed = service
            .update(UpdateUser {
                id: ana.id.to_string(),
                email: "ana.silva@comex.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(changed.name, "Ana");
        assert_eq!(changed.email, "ana.silva@comex.com");
    }
}
