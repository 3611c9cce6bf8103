// Coordinators layer - Workflow orchestration
//
// Coordinators compose store and provider operations into the lending
// workflows. Decisions come from providers; coordinators sequence the
// reads, the decision, the mutation and its audit/alert side effects.

pub mod admin_coordinator;
pub mod borrow_coordinator;
pub mod equipment_coordinator;
pub mod login_coordinator;
pub mod role_change_coordinator;

pub use admin_coordinator::AdminCoordinator;
pub use borrow_coordinator::BorrowCoordinator;
pub use equipment_coordinator::EquipmentCoordinator;
pub use login_coordinator::LoginCoordinator;
pub use role_change_coordinator::RoleChangeCoordinator;
