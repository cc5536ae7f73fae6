//! Internal processes, each owned by a responsible user and run for one operation

use super::{StorageOrMissing, conflict, fetch, remove, replace};
use crate::core::entity::Entity;
use crate::core::error::{ComexError, ComexResult, StorageError};
use crate::core::store::{EntityStore, FieldFilter, constraints};
use crate::core::validation::{parse_id, validate, validators};
use crate::entities::{Operation, Process, User};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Validate)]
pub struct NewProcess {
    #[validate(custom(function = "validators::uuid"))]
    pub responsible_id: String,
    #[validate(custom(function = "validators::not_blank"))]
    pub name: String,
    #[validate(custom(function = "validators::uuid"))]
    pub operation_id: String,
}

/// Hand a process over to another responsible user
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateProcess {
    #[validate(custom(function = "validators::uuid"))]
    pub id: String,
    #[validate(custom(function = "validators::uuid"))]
    pub responsible_id: String,
}

/// A process with its references resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDetails {
    pub process: Process,
    pub responsible: User,
    pub operation: Operation,
}

fn duplicate_name(name: &str) -> String {
    format!("Process already exists with name {}", name)
}

/// Store errors of a process write; a reference deleted meanwhile is reported as missing
fn write_error(err: StorageError, process: &Process) -> ComexError {
    match err {
        StorageError::ForeignKeyViolation { ref constraint }
            if constraint == constraints::PROCESS_RESPONSIBLE =>
        {
            ComexError::not_found("Responsible", process.responsible_id)
        }
        StorageError::ForeignKeyViolation { ref constraint }
            if constraint == constraints::PROCESS_OPERATION =>
        {
            ComexError::not_found(Operation::display_name(), process.operation_id)
        }
        other => conflict(other, constraints::PROCESS_NAME, || {
            duplicate_name(&process.name)
        }),
    }
}

#[derive(Clone)]
pub struct ProcessService {
    processes: Arc<dyn EntityStore<Process>>,
    users: Arc<dyn EntityStore<User>>,
    operations: Arc<dyn EntityStore<Operation>>,
}

impl ProcessService {
    pub fn new(
        processes: Arc<dyn EntityStore<Process>>,
        users: Arc<dyn EntityStore<User>>,
        operations: Arc<dyn EntityStore<Operation>>,
    ) -> Self {
        Self {
            processes,
            users,
            operations,
        }
    }

    pub async fn create(&self, request: NewProcess) -> ComexResult<ProcessDetails> {
        validate(&request)?;

        if self
            .processes
            .exists(&FieldFilter::exact("name", request.name.as_str()))
            .await?
        {
            return Err(ComexError::already_exists(duplicate_name(&request.name)));
        }

        let responsible = self
            .responsible(&parse_id("responsibleId", &request.responsible_id)?)
            .await?;
        let operation = fetch(
            self.operations.as_ref(),
            &parse_id("operationId", &request.operation_id)?,
        )
        .await?;

        let process = Process {
            id: Uuid::new_v4(),
            name: request.name,
            responsible_id: responsible.id,
            operation_id: operation.id,
        };
        let process = self
            .processes
            .insert(process.clone())
            .await
            .map_err(|e| write_error(e, &process))?;
        tracing::info!(process_id = %process.id, name = %process.name, "Process created");

        Ok(ProcessDetails {
            process,
            responsible,
            operation,
        })
    }

    /// Processes named exactly `name`; every process when `name` is blank
    pub async fn read(&self, name: &str) -> ComexResult<Vec<ProcessDetails>> {
        let processes = if name.trim().is_empty() {
            self.processes.list().await?
        } else {
            self.processes.search(&FieldFilter::exact("name", name)).await?
        };

        let mut details = Vec::with_capacity(processes.len());
        for process in processes {
            details.push(self.details(process).await?);
        }
        Ok(details)
    }

    pub async fn update(&self, request: UpdateProcess) -> ComexResult<ProcessDetails> {
        validate(&request)?;
        let id = parse_id("id", &request.id)?;

        let mut process = fetch(self.processes.as_ref(), &id).await?;
        let responsible = self
            .responsible(&parse_id("responsibleId", &request.responsible_id)?)
            .await?;

        process.responsible_id = responsible.id;
        let snapshot = process.clone();
        let process = replace(self.processes.as_ref(), process)
            .await
            .map_err(|e| match e {
                StorageOrMissing::Storage(err) => write_error(err, &snapshot),
                StorageOrMissing::Missing(err) => err,
            })?;
        tracing::info!(
            process_id = %process.id,
            responsible_id = %responsible.id,
            "Process responsible updated"
        );

        let operation = fetch(self.operations.as_ref(), &process.operation_id).await?;
        Ok(ProcessDetails {
            process,
            responsible,
            operation,
        })
    }

    /// Delete a process, returning it as it was
    pub async fn delete(&self, id: &str) -> ComexResult<ProcessDetails> {
        let id = parse_id("id", id)?;
        let process = fetch(self.processes.as_ref(), &id).await?;
        let details = self.details(process).await?;
        remove(self.processes.as_ref(), &id).await?;
        Ok(details)
    }

    /// The user owning a process is reported as its "Responsible"
    async fn responsible(&self, id: &Uuid) -> ComexResult<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| ComexError::not_found("Responsible", id))
    }

    async fn details(&self, process: Process) -> ComexResult<ProcessDetails> {
        let responsible = fetch(self.users.as_ref(), &process.responsible_id).await?;
        let operation = fetch(self.operations.as_ref(), &process.operation_id).await?;
        Ok(ProcessDetails {
            process,
            responsible,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EntityError;
    use crate::entities::OperationType;
    use crate::storage::Repositories;
    use tonic::Code;

    struct Fixture {
        service: ProcessService,
        repos: Repositories,
        user: User,
        operation: Operation,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let user = repos
            .users
            .insert(User {
                id: Uuid::new_v4(),
                email: "email@comex.com".to_string(),
                name: "Tester".to_string(),
            })
            .await
            .unwrap();
        let operation = repos
            .operations
            .insert(Operation {
                id: Uuid::new_v4(),
                country: "Brazil".to_string(),
                operation_type: OperationType::Import,
            })
            .await
            .unwrap();
        let service = ProcessService::new(
            repos.processes.clone(),
            repos.users.clone(),
            repos.operations.clone(),
        );
        Fixture {
            service,
            repos,
            user,
            operation,
        }
    }

    fn new_process(fx: &Fixture, name: &str) -> NewProcess {
        NewProcess {
            responsible_id: fx.user.id.to_string(),
            name: name.to_string(),
            operation_id: fx.operation.id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_resolves_references() {
        let fx = fixture().await;
        let created = fx.service.create(new_process(&fx, "SAMPLE")).await.unwrap();
        assert_eq!(created.process.name, "SAMPLE");
        assert_eq!(created.responsible, fx.user);
        assert_eq!(created.operation, fx.operation);

        let err = fx.service.create(new_process(&fx, "SAMPLE")).await.unwrap_err();
        assert_eq!(err.grpc_code(), Code::AlreadyExists);
        assert_eq!(err.to_string(), "Process already exists with name SAMPLE");
    }

    #[tokio::test]
    async fn test_create_names_the_missing_reference() {
        let fx = fixture().await;
        let ghost = Uuid::new_v4();

        let mut request = new_process(&fx, "SAMPLE");
        request.operation_id = ghost.to_string();
        let err = fx.service.create(request).await.unwrap_err();
        assert_eq!(err.grpc_code(), Code::NotFound);
        assert_eq!(err.to_string(), format!("Operation not found with id {}", ghost));

        let mut request = new_process(&fx, "SAMPLE");
        request.responsible_id = ghost.to_string();
        let err = fx.service.create(request).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Responsible not found with id {}", ghost));

        assert!(fx.service.read("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_every_field() {
        let fx = fixture().await;
        let err = fx.service.create(NewProcess::default()).await.unwrap_err();
        let ComexError::Validation(validation) = err else {
            panic!("expected validation error, got {:?}", err);
        };
        let fields: Vec<_> = validation
            .violations()
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["name", "operationId", "responsibleId"]);
    }

    #[tokio::test]
    async fn test_read_all_or_by_name() {
        let fx = fixture().await;
        for name in ["SAMPLE", "REGULAR", "PROJECT"] {
            fx.service.create(new_process(&fx, name)).await.unwrap();
        }

        assert_eq!(fx.service.read("").await.unwrap().len(), 3);
        let sample = fx.service.read("SAMPLE").await.unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].process.name, "SAMPLE");
        assert!(fx.service.read("SAMP").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_the_responsible() {
        let fx = fixture().await;
        let created = fx.service.create(new_process(&fx, "SAMPLE")).await.unwrap();
        let other = fx
            .repos
            .users
            .insert(User {
                id: Uuid::new_v4(),
                email: "other@comex.com".to_string(),
                name: "Update test".to_string(),
            })
            .await
            .unwrap();

        let updated = fx
            .service
            .update(UpdateProcess {
                id: created.process.id.to_string(),
                responsible_id: other.id.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(updated.responsible.name, "Update test");
        assert_eq!(updated.process.name, "SAMPLE");

        // the previous responsible is free again
        assert!(fx.repos.users.delete(&fx.user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_process_or_responsible() {
        let fx = fixture().await;
        let created = fx.service.create(new_process(&fx, "SAMPLE")).await.unwrap();
        let ghost = Uuid::new_v4();

        let err = fx
            .service
            .update(UpdateProcess {
                id: ghost.to_string(),
                responsible_id: fx.user.id.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Process not found with id {}", ghost));

        let err = fx
            .service
            .update(UpdateProcess {
                id: created.process.id.to_string(),
                responsible_id: ghost.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Responsible not found with id {}", ghost));

        let err = fx.service.update(UpdateProcess::default()).await.unwrap_err();
        let ComexError::Validation(validation) = err else {
            panic!("expected validation error, got {:?}", err);
        };
        let fields: Vec<_> = validation
            .violations()
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["id", "responsibleId"]);
    }

    #[tokio::test]
    async fn test_delete_and_referenced_data() {
        let fx = fixture().await;
        let created = fx.service.create(new_process(&fx, "SAMPLE")).await.unwrap();

        let err = fx.repos.operations.delete(&fx.operation.id).await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));
        let users = crate::services::UserService::new(fx.repos.users.clone());
        let err = users.delete(&fx.user.id.to_string()).await.unwrap_err();
        assert!(matches!(err, ComexError::Entity(EntityError::StillReferenced { .. })));

        let deleted = fx
            .service
            .delete(&created.process.id.to_string())
            .await
            .unwrap();
        assert_eq!(deleted, created);

        let err = fx
            .service
            .delete(&created.process.id.to_string())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Process not found with id {}", created.process.id)
        );
        assert!(fx.repos.operations.delete(&fx.operation.id).await.unwrap().is_some());
    }
}
