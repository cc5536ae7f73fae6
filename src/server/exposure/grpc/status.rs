//! Mapping of crate errors onto gRPC statuses
//!
//! Validation failures become `INVALID_ARGUMENT` with the message
//! "Arguments validation error" and a prost-encoded [`proto::FieldViolations`]
//! in the status details. Every other error keeps its own message.

use super::proto;
use crate::core::error::ComexError;
use prost::Message;
use tonic::{Code, Status};

pub const VALIDATION_MESSAGE: &str = "Arguments validation error";

impl From<ComexError> for Status {
    fn from(err: ComexError) -> Self {
        if let ComexError::Validation(validation) = &err {
            let details = proto::FieldViolations {
                violations: validation
                    .violations()
                    .into_iter()
                    .map(|v| proto::FieldViolation {
                        field: v.field,
                        description: v.message,
                    })
                    .collect(),
            };
            tracing::debug!(error = %validation, "Rejected invalid request");
            return Status::with_details(
                Code::InvalidArgument,
                VALIDATION_MESSAGE,
                details.encode_to_vec().into(),
            );
        }

        let code = err.grpc_code();
        match code {
            Code::Internal | Code::Unavailable => {
                tracing::error!(error = %err, code = err.error_code(), "Request failed")
            }
            _ => tracing::debug!(error = %err, code = err.error_code(), "Request refused"),
        }
        Status::new(code, err.to_string())
    }
}

/// Field violations carried by an `INVALID_ARGUMENT` status
pub fn field_violations(status: &Status) -> Vec<proto::FieldViolation> {
    proto::FieldViolations::decode(status.details())
        .map(|details| details.violations)
        .unwrap_or_default()
}
