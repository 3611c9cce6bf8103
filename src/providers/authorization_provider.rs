use crate::types::internal::access::{Decision, DenyReason, Grant};
use crate::types::internal::approval_window::ApprovalWindow;
use crate::types::internal::borrow::{BorrowRequest, BorrowStatus};
use crate::types::internal::equipment::{Equipment, EquipmentPermission};
use crate::types::internal::identity::{Clearance, Identity, Role};

/// Authorization decision engine
///
/// Composes the four access models used by the lending workflows:
/// - RBAC: the caller's role
/// - DAC: equipment ownership and explicit per-equipment grants
/// - MAC: caller clearance against equipment sensitivity
/// - RuBAC: the time-of-day approval window
///
/// Every check is a pure function of its arguments. Entities, configuration
/// and the current hour are loaded by the coordinator and passed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthorizationProvider;

impl AuthorizationProvider {
    pub fn new() -> Self {
        Self
    }

    /// Admin-only actions (user administration, configuration, alert review)
    pub fn require_admin(&self, caller: &Identity) -> Decision {
        if caller.is_admin() {
            Decision::Allow(Grant::Role(Role::Admin))
        } else {
            Decision::Deny(DenyReason::AdminRequired)
        }
    }

    /// Only managers and admins may add equipment to the catalog
    pub fn can_register_equipment(&self, caller: &Identity) -> Decision {
        if caller.role.is_privileged() {
            Decision::Allow(Grant::Role(caller.role))
        } else {
            Decision::Deny(DenyReason::NotOwnerNorAdmin)
        }
    }

    pub fn can_edit_equipment(
        &self,
        caller: &Identity,
        equipment: &Equipment,
        permission: Option<&EquipmentPermission>,
    ) -> Decision {
        self.owner_admin_or_grant(caller, equipment, permission, |p| p.can_edit)
    }

    pub fn can_delete_equipment(
        &self,
        caller: &Identity,
        equipment: &Equipment,
        permission: Option<&EquipmentPermission>,
    ) -> Decision {
        self.owner_admin_or_grant(caller, equipment, permission, |p| p.can_delete)
    }

    fn owner_admin_or_grant(
        &self,
        caller: &Identity,
        equipment: &Equipment,
        permission: Option<&EquipmentPermission>,
        right: impl Fn(&EquipmentPermission) -> bool,
    ) -> Decision {
        if equipment.is_owned_by(&caller.id) {
            return Decision::Allow(Grant::Owner);
        }
        if caller.is_admin() {
            return Decision::Allow(Grant::Role(Role::Admin));
        }

        // A grant only counts for this caller on this equipment
        let permission = permission
            .filter(|p| p.user_id == caller.id && p.equipment_id == equipment.id);

        match permission {
            Some(p) if right(p) => Decision::Allow(Grant::ExplicitPermission),
            Some(_) => Decision::Deny(DenyReason::NoExplicitGrant),
            None => Decision::Deny(DenyReason::NotOwnerNorAdmin),
        }
    }

    /// Grant and revoke share one rule: owner or admin, never targeting oneself
    pub fn can_grant_or_revoke_permission(
        &self,
        caller: &Identity,
        equipment: &Equipment,
        target_user_id: &str,
    ) -> Decision {
        let grant = if equipment.is_owned_by(&caller.id) {
            Grant::Owner
        } else if caller.is_admin() {
            Grant::Role(Role::Admin)
        } else {
            return Decision::Deny(DenyReason::NotOwnerNorAdmin);
        };

        if target_user_id == caller.id {
            return Decision::Deny(DenyReason::SelfActionForbidden);
        }
        Decision::Allow(grant)
    }

    pub fn can_view_permissions(&self, caller: &Identity, equipment: &Equipment) -> Decision {
        if equipment.is_owned_by(&caller.id) {
            Decision::Allow(Grant::Owner)
        } else if caller.is_admin() {
            Decision::Allow(Grant::Role(Role::Admin))
        } else {
            Decision::Deny(DenyReason::NotOwnerNorAdmin)
        }
    }

    /// MAC gate for creating a borrow request
    pub fn can_borrow(&self, caller: &Identity, equipment: &Equipment) -> Decision {
        if equipment.sensitivity == Clearance::Public {
            Decision::Allow(Grant::PublicResource)
        } else if caller.clearance.at_least(equipment.sensitivity) {
            Decision::Allow(Grant::Clearance)
        } else if caller.is_admin() {
            Decision::Allow(Grant::Role(Role::Admin))
        } else {
            Decision::Deny(DenyReason::InsufficientClearance)
        }
    }

    /// Approval check, short-circuiting in this order:
    /// state, self-approval, ownership/role, then the approval window
    /// (admins bypass the window).
    pub fn can_approve_borrow(
        &self,
        caller: &Identity,
        request: &BorrowRequest,
        equipment: &Equipment,
        window: &ApprovalWindow,
        hour: u32,
    ) -> Decision {
        if request.status != BorrowStatus::Pending {
            return Decision::Deny(DenyReason::AlreadyProcessed);
        }
        if request.user_id == caller.id {
            return Decision::Deny(DenyReason::SelfActionForbidden);
        }

        let is_owner = equipment.is_owned_by(&caller.id);
        if !is_owner && !caller.role.is_privileged() {
            return Decision::Deny(DenyReason::NotOwnerNorAdmin);
        }

        if !caller.is_admin() && !window.contains(hour) {
            return Decision::Deny(DenyReason::OutsideApprovalWindow);
        }

        if is_owner {
            Decision::Allow(Grant::Owner)
        } else {
            Decision::Allow(Grant::Role(caller.role))
        }
    }

    pub fn can_return_borrow(&self, caller: &Identity, request: &BorrowRequest) -> Decision {
        let grant = if request.user_id == caller.id {
            Grant::Requester
        } else if caller.is_admin() {
            Grant::Role(Role::Admin)
        } else {
            return Decision::Deny(DenyReason::NotOwnerNorAdmin);
        };

        if request.status != BorrowStatus::Approved {
            return Decision::Deny(DenyReason::NotReturnable);
        }
        Decision::Allow(grant)
    }

    pub fn can_manage_role_request(&self, caller: &Identity) -> Decision {
        self.require_admin(caller)
    }

    /// Validates a role-change submission and returns the parsed target role
    ///
    /// The requested role is validated before the one-in-flight rule.
    pub fn can_submit_role_request(
        &self,
        requested_role: &str,
        has_pending_request: bool,
    ) -> Result<Role, DenyReason> {
        let role = requested_role
            .trim()
            .to_lowercase()
            .parse::<Role>()
            .map_err(|_| DenyReason::InvalidRole)?;
        if has_pending_request {
            return Err(DenyReason::PendingRequestExists);
        }
        Ok(role)
    }
}
