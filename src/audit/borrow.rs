use super::AuditLogger;
use crate::errors::InternalError;
use crate::types::internal::access::Grant;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;

impl AuditLogger {
    pub async fn log_borrow_requested(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        equipment_name: &str,
        grant: Grant,
    ) -> Result<(), InternalError> {
        self.builder(EventType::BorrowRequested)
            .with_context(ctx)
            .user_id(user_id)
            .action(format!("Requested equipment {} as {}", equipment_name, grant))
            .write()
            .await
    }

    /// MAC denial on a borrow attempt
    pub async fn log_borrow_denied(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        equipment_name: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::BorrowDenied)
            .with_context(ctx)
            .user_id(user_id)
            .action(format!(
                "Unauthorized access attempt on {} (Clearance mismatch)",
                equipment_name
            ))
            .write()
            .await
    }

    pub async fn log_borrow_approved(
        &self,
        ctx: &RequestContext,
        approver_id: &str,
        request_id: &str,
        grant: Grant,
    ) -> Result<(), InternalError> {
        self.builder(EventType::BorrowApproved)
            .with_context(ctx)
            .user_id(approver_id)
            .action(format!("Approved request {} as {}", request_id, grant))
            .write()
            .await
    }

    /// Approval attempted outside the configured window
    pub async fn log_approval_blocked(
        &self,
        ctx: &RequestContext,
        approver_id: &str,
        request_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::ApprovalBlocked)
            .with_context(ctx)
            .user_id(approver_id)
            .action(format!(
                "Approval blocked (RuBAC time restriction) for request {}",
                request_id
            ))
            .write()
            .await
    }

    pub async fn log_borrow_returned(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        request_id: &str,
        grant: Grant,
    ) -> Result<(), InternalError> {
        self.builder(EventType::BorrowReturned)
            .with_context(ctx)
            .user_id(user_id)
            .action(format!("Returned request {} as {}", request_id, grant))
            .write()
            .await
    }
}
