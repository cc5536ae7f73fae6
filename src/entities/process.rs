//! Internal processes (sample, regular, project...) run for an operation

use crate::core::entity::{Entity, EntityRef, UniqueKey};
use crate::core::store::constraints;
use crate::entities::{Operation, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named process, owned by a responsible user and tied to one operation
///
/// Stored by reference; [`crate::services::ProcessService`] resolves the
/// user and the operation when it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: Uuid,
    pub name: String,
    pub responsible_id: Uuid,
    pub operation_id: Uuid,
}

impl Entity for Process {
    fn entity_type() -> &'static str {
        "process"
    }

    fn display_name() -> &'static str {
        "Process"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(constraints::PROCESS_NAME, self.name.clone())]
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![
            EntityRef::new(
                constraints::PROCESS_RESPONSIBLE,
                User::entity_type(),
                self.responsible_id,
            ),
            EntityRef::new(
                constraints::PROCESS_OPERATION,
                Operation::entity_type(),
                self.operation_id,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_points_at_user_and_operation() {
        let process = Process {
            id: Uuid::new_v4(),
            name: "SAMPLE".to_string(),
            responsible_id: Uuid::new_v4(),
            operation_id: Uuid::new_v4(),
        };
        let references = process.references();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].entity_type, "user");
        assert_eq!(references[0].id, process.responsible_id);
        assert_eq!(references[1].constraint, constraints::PROCESS_OPERATION);
        assert_eq!(process.unique_keys()[0].value, "SAMPLE");
    }
}
