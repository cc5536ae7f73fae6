//! Typed error handling for the comex backend
//!
//! Every service returns [`ComexResult`]. The transport layer turns a
//! [`ComexError`] into a gRPC status using [`ComexError::grpc_code`], so the
//! kind of an error decides what the caller sees.
//!
//! # Error Categories
//!
//! - [`EntityError`]: missing references, uniqueness conflicts, entities still in use
//! - [`ValidationError`]: malformed or missing input, reported field by field
//! - [`StorageError`]: failures raised by a storage backend
//! - [`NotificationError`]: failures talking to the route service
//! - [`ConfigError`]: configuration loading problems
//!
//! # Example
//!
//! ```rust,ignore
//! match service.create(request).await {
//!     Ok(order) => println!("created {}", order.id),
//!     Err(ComexError::Entity(EntityError::NotFound { entity_type, id })) => {
//!         println!("{} {} is missing", entity_type, id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tonic::Code;
use uuid::Uuid;

/// The main error type of the crate
#[derive(Debug)]
pub enum ComexError {
    /// Entity-level business rule violations
    Entity(EntityError),

    /// Input validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Route service errors
    Notification(NotificationError),

    /// Configuration errors
    Config(ConfigError),

    /// Unexpected internal failures
    Internal(String),
}

impl fmt::Display for ComexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComexError::Entity(e) => write!(f, "{}", e),
            ComexError::Validation(e) => write!(f, "{}", e),
            ComexError::Storage(e) => write!(f, "{}", e),
            ComexError::Notification(e) => write!(f, "{}", e),
            ComexError::Config(e) => write!(f, "{}", e),
            ComexError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ComexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComexError::Entity(e) => Some(e),
            ComexError::Validation(e) => Some(e),
            ComexError::Storage(e) => Some(e),
            ComexError::Notification(e) => Some(e),
            ComexError::Config(e) => Some(e),
            ComexError::Internal(_) => None,
        }
    }
}

impl ComexError {
    /// gRPC status code reported to callers for this error
    pub fn grpc_code(&self) -> Code {
        match self {
            ComexError::Entity(e) => e.grpc_code(),
            ComexError::Validation(_) => Code::InvalidArgument,
            ComexError::Storage(e) => e.grpc_code(),
            ComexError::Notification(_) => Code::Unavailable,
            ComexError::Config(_) => Code::Internal,
            ComexError::Internal(_) => Code::Internal,
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            ComexError::Entity(e) => e.error_code(),
            ComexError::Validation(_) => "VALIDATION_ERROR",
            ComexError::Storage(_) => "STORAGE_ERROR",
            ComexError::Notification(_) => "NOTIFICATION_ERROR",
            ComexError::Config(_) => "CONFIG_ERROR",
            ComexError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Shorthand for a `NotFound` entity error
    pub fn not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        ComexError::Entity(EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        })
    }

    /// Shorthand for an `AlreadyExists` entity error carrying the caller-facing message
    pub fn already_exists(message: impl Into<String>) -> Self {
        ComexError::Entity(EntityError::AlreadyExists {
            message: message.into(),
        })
    }

    /// Shorthand for a single-field validation error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ComexError::Validation(ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        })
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors raised by business rules on entities
#[derive(Debug)]
pub enum EntityError {
    /// A referenced entity does not exist
    NotFound { entity_type: String, id: String },

    /// A uniqueness invariant would be broken
    AlreadyExists { message: String },

    /// The entity cannot be removed while orders point at it
    StillReferenced { entity_type: String, id: Uuid },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} not found with id {}", entity_type, id)
            }
            EntityError::AlreadyExists { message } => write!(f, "{}", message),
            EntityError::StillReferenced { entity_type, id } => {
                write!(
                    f,
                    "{} with id {} is referenced by existing orders",
                    entity_type, id
                )
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn grpc_code(&self) -> Code {
        match self {
            EntityError::NotFound { .. } => Code::NotFound,
            EntityError::AlreadyExists { .. } => Code::AlreadyExists,
            EntityError::StillReferenced { .. } => Code::FailedPrecondition,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
            EntityError::StillReferenced { .. } => "ENTITY_STILL_REFERENCED",
        }
    }
}

impl From<EntityError> for ComexError {
    fn from(err: EntityError) -> Self {
        ComexError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// A single invalid field
    FieldError { field: String, message: String },

    /// Several invalid fields, reported together
    FieldErrors(Vec<FieldValidationError>),
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ValidationError {
    /// Flatten into a list of (field, message) pairs
    pub fn violations(&self) -> Vec<FieldValidationError> {
        match self {
            ValidationError::FieldError { field, message } => {
                vec![FieldValidationError::new(field.clone(), message.clone())]
            }
            ValidationError::FieldErrors(errors) => errors.clone(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ComexError {
    fn from(err: ValidationError) -> Self {
        ComexError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A unique constraint rejected the write
    #[error("unique constraint '{constraint}' violated")]
    UniqueViolation { constraint: String },

    /// A referential constraint rejected the write or delete
    #[error("foreign key constraint '{constraint}' violated")]
    ForeignKeyViolation { constraint: String },

    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} query error: {message}")]
    QueryError {
        backend: &'static str,
        message: String,
    },

    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// Stored data could not be decoded back into a domain value
    #[error("Corrupted {entity_type} record: {message}")]
    Corrupted {
        entity_type: &'static str,
        message: String,
    },

    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: &'static str },
}

impl StorageError {
    pub fn grpc_code(&self) -> Code {
        match self {
            StorageError::UniqueViolation { .. } => Code::AlreadyExists,
            StorageError::ForeignKeyViolation { .. } => Code::FailedPrecondition,
            StorageError::ConnectionError { .. } | StorageError::Unavailable { .. } => {
                Code::Unavailable
            }
            StorageError::QueryError { .. }
            | StorageError::TransactionError { .. }
            | StorageError::Corrupted { .. } => Code::Internal,
        }
    }
}

impl From<StorageError> for ComexError {
    fn from(err: StorageError) -> Self {
        ComexError::Storage(err)
    }
}

/// Result type returned by storage backends
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Notification Errors
// =============================================================================

/// Errors raised while notifying the route service
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid route service endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("route service rejected the notification ({code:?}): {message}")]
    Rejected { code: Code, message: String },

    #[error("route service did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<NotificationError> for ComexError {
    fn from(err: NotificationError) -> Self {
        ComexError::Notification(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    IoError { path: String, message: String },

    /// The configuration could not be parsed
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// A value is present but unusable
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError { path, message } => {
                write!(f, "Failed to read config file '{}': {}", path, message)
            }
            ConfigError::ParseError { file, message } => match file {
                Some(file) => write!(f, "Failed to parse config file '{}': {}", file, message),
                None => write!(f, "Failed to parse config: {}", message),
            },
            ConfigError::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "Invalid value '{}' for '{}': {}", value, key, message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ComexError {
    fn from(err: ConfigError) -> Self {
        ComexError::Config(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for service operations
pub type ComexResult<T> = Result<T, ComexError>;

// =============================================================================
// Tests
// =============================================================================
