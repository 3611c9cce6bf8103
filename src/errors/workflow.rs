use thiserror::Error;

use super::InternalError;
use crate::types::internal::access::DenyReason;

/// Error surface of the lending workflows
///
/// `Denied` and `Conflict` carry a stable reason code for the caller to render.
/// `Storage` displays a generic message; the underlying
/// `InternalError` stays reachable through `source()` for logging.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    Denied(DenyReason),

    #[error("Conflict: {0}")]
    Conflict(DenyReason),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("Internal storage failure")]
    Storage(#[from] InternalError),
}

impl WorkflowError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Denied(reason) | Self::Conflict(reason) => reason.code(),
            Self::NotFound { .. } => "not_found",
            Self::Invalid { .. } => "invalid_input",
            Self::Storage(_) => "storage_failure",
        }
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Self::Denied(reason) | Self::Conflict(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<DenyReason> for WorkflowError {
    fn from(reason: DenyReason) -> Self {
        if reason.is_state_conflict() {
            Self::Conflict(reason)
        } else {
            Self::Denied(reason)
        }
    }
}
