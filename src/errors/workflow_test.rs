#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::errors::{InternalError, WorkflowError};
    use crate::types::internal::access::DenyReason;
    use sea_orm::DbErr;

    #[test]
    fn test_state_reasons_become_conflicts() {
        let error: WorkflowError = DenyReason::AlreadyProcessed.into();
        assert!(matches!(error, WorkflowError::Conflict(DenyReason::AlreadyProcessed)));
        assert_eq!(error.code(), "already_processed");
    }

    #[test]
    fn test_policy_reasons_become_denials() {
        let error: WorkflowError = DenyReason::InsufficientClearance.into();
        assert!(matches!(error, WorkflowError::Denied(DenyReason::InsufficientClearance)));
        assert_eq!(error.to_string(), "Access denied: insufficient_clearance");
    }

    #[test]
    fn test_storage_failure_does_not_leak_internals() {
        let inner = InternalError::database("secret_table_scan", DbErr::Custom("sqlite path".to_string()));
        let error: WorkflowError = inner.into();

        assert_eq!(error.to_string(), "Internal storage failure");
        assert_eq!(error.code(), "storage_failure");
        let source = error.source().expect("storage errors keep their source");
        assert!(source.to_string().contains("secret_table_scan"));
    }

    #[test]
    fn test_not_found_code() {
        let error = WorkflowError::not_found("Equipment", "eq-1");
        assert_eq!(error.code(), "not_found");
        assert_eq!(error.to_string(), "Equipment not found: eq-1");
    }
}
