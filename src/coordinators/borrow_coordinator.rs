use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::audit::{AlertSink, AuditLogger, best_effort};
use crate::errors::WorkflowError;
use crate::providers::{AuthorizationProvider, Clock, Notifier};
use crate::stores::{BorrowStore, EquipmentStore, SystemConfigStore, UserStore};
use crate::types::internal::access::{Decision, DenyReason};
use crate::types::internal::alert::NewAlert;
use crate::types::internal::borrow::{BorrowRequest, BorrowStatus};
use crate::types::internal::context::RequestContext;
use crate::types::internal::equipment::Equipment;

/// Borrow request workflow: `Pending -> Approved -> Returned`
///
/// Each successful transition writes exactly one audit entry. A denied borrow
/// for lack of clearance additionally raises an UnauthorizedAccess alert.
pub struct BorrowCoordinator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    audit_logger: Arc<AuditLogger>,
    alert_sink: Arc<AlertSink>,
    user_store: Arc<UserStore>,
    equipment_store: Arc<EquipmentStore>,
    borrow_store: Arc<BorrowStore>,
    system_config_store: Arc<SystemConfigStore>,
    authorization: AuthorizationProvider,
}

impl BorrowCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.lending.clone(),
            clock: Arc::clone(&app_data.clock),
            notifier: Arc::clone(&app_data.notifier),
            audit_logger: Arc::clone(&app_data.audit_logger),
            alert_sink: Arc::clone(&app_data.alert_sink),
            user_store: Arc::clone(&app_data.user_store),
            equipment_store: Arc::clone(&app_data.equipment_store),
            borrow_store: Arc::clone(&app_data.borrow_store),
            system_config_store: Arc::clone(&app_data.system_config_store),
            authorization: app_data.authorization,
        }
    }

    async fn load_equipment(&self, equipment_id: &str) -> Result<Equipment, WorkflowError> {
        self.equipment_store
            .get_equipment(&self.db, equipment_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Equipment", equipment_id))
    }

    async fn load_request(&self, request_id: &str) -> Result<BorrowRequest, WorkflowError> {
        self.borrow_store
            .get_request(&self.db, request_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("BorrowRequest", request_id))
    }

    /// Create a pending borrow request (MAC gate)
    pub async fn request_borrow(
        &self,
        ctx: &RequestContext,
        equipment_id: &str,
    ) -> Result<BorrowRequest, WorkflowError> {
        let caller = ctx.caller()?;
        let equipment = self.load_equipment(equipment_id).await?;

        match self.authorization.can_borrow(caller, &equipment) {
            Decision::Allow(grant) => {
                let request = self
                    .borrow_store
                    .create_request(&self.db, &caller.id, &equipment.id, self.clock.timestamp())
                    .await?;

                tracing::info!(
                    request_id = %request.id,
                    user_id = %caller.id,
                    equipment_id = %equipment.id,
                    grant = %grant,
                    "Borrow request created"
                );
                best_effort(
                    self.audit_logger
                        .log_borrow_requested(ctx, &caller.id, &equipment.name, grant)
                        .await,
                    "borrow request audit entry",
                );
                Ok(request)
            }
            Decision::Deny(reason) => {
                tracing::warn!(
                    user_id = %caller.id,
                    equipment_id = %equipment.id,
                    reason = %reason,
                    "Borrow denied"
                );
                if reason == DenyReason::InsufficientClearance {
                    best_effort(
                        self.audit_logger
                            .log_borrow_denied(ctx, &caller.id, &equipment.name)
                            .await,
                        "borrow denial audit entry",
                    );
                    self.alert_sink
                        .raise(NewAlert::unauthorized_access(
                            &caller.id,
                            &equipment.name,
                            &ctx.ip_label(),
                        ))
                        .await;
                }
                Err(reason.into())
            }
        }
    }

    /// Approve a pending request
    ///
    /// The approval window is read from system config and the hour from the
    /// clock, both once, before the decision.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        request_id: &str,
    ) -> Result<BorrowRequest, WorkflowError> {
        let caller = ctx.caller()?;
        let request = self.load_request(request_id).await?;
        let equipment = self.load_equipment(&request.equipment_id).await?;
        let window = self.system_config_store.get_approval_window(&self.db).await?;
        let hour = self.clock.local_hour();

        let decision =
            self.authorization
                .can_approve_borrow(caller, &request, &equipment, &window, hour);
        let grant = match decision {
            Decision::Allow(grant) => grant,
            Decision::Deny(reason) => {
                tracing::warn!(
                    request_id = %request.id,
                    approver_id = %caller.id,
                    reason = %reason,
                    hour,
                    "Borrow approval denied"
                );
                if reason == DenyReason::OutsideApprovalWindow {
                    best_effort(
                        self.audit_logger
                            .log_approval_blocked(ctx, &caller.id, &request.id)
                            .await,
                        "approval blocked audit entry",
                    );
                }
                return Err(reason.into());
            }
        };

        let now = self.clock.timestamp();
        let applied = self
            .borrow_store
            .mark_approved(&self.db, &request.id, &caller.id, now)
            .await?;
        if !applied {
            // Lost a race with another approver
            return Err(DenyReason::AlreadyProcessed.into());
        }

        tracing::info!(
            request_id = %request.id,
            approver_id = %caller.id,
            grant = %grant,
            "Borrow request approved"
        );
        best_effort(
            self.audit_logger
                .log_borrow_approved(ctx, &caller.id, &request.id, grant)
                .await,
            "borrow approval audit entry",
        );
        self.notify_borrower(&request, &equipment).await;

        Ok(BorrowRequest {
            status: BorrowStatus::Approved,
            approved_by_id: Some(caller.id.clone()),
            approved_at: Some(now),
            ..request
        })
    }

    /// Return an approved request
    pub async fn return_item(
        &self,
        ctx: &RequestContext,
        request_id: &str,
    ) -> Result<BorrowRequest, WorkflowError> {
        let caller = ctx.caller()?;
        let request = self.load_request(request_id).await?;

        let grant = self
            .authorization
            .can_return_borrow(caller, &request)
            .into_result()
            .inspect_err(|reason| {
                tracing::warn!(
                    request_id = %request.id,
                    user_id = %caller.id,
                    reason = %reason,
                    "Borrow return denied"
                );
            })?;

        let now = self.clock.timestamp();
        if !self.borrow_store.mark_returned(&self.db, &request.id, now).await? {
            return Err(DenyReason::NotReturnable.into());
        }

        tracing::info!(request_id = %request.id, user_id = %caller.id, grant = %grant, "Borrow request returned");
        best_effort(
            self.audit_logger
                .log_borrow_returned(ctx, &caller.id, &request.id, grant)
                .await,
            "borrow return audit entry",
        );

        Ok(BorrowRequest {
            status: BorrowStatus::Returned,
            returned_at: Some(now),
            ..request
        })
    }

    /// Managers and admins see every request; others see their own
    pub async fn list_requests(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<BorrowRequest>, WorkflowError> {
        let caller = ctx.caller()?;
        let requests = if caller.role.is_privileged() {
            self.borrow_store.list_all(&self.db).await?
        } else {
            self.borrow_store.list_for_user(&self.db, &caller.id).await?
        };
        Ok(requests)
    }

    async fn notify_borrower(&self, request: &BorrowRequest, equipment: &Equipment) {
        let borrower = match self.user_store.get_user(&self.db, &request.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load borrower for notification");
                return;
            }
        };
        if let Err(e) = self.notifier.notify(
            &borrower.username,
            "Borrow request approved",
            &format!("Your request for {} has been approved.", equipment.name),
        ) {
            tracing::error!(error = %e, request_id = %request.id, "Failed to notify borrower");
        }
    }
}
