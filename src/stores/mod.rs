// Stores layer - Data access and repository pattern
//
// Lending stores are stateless and take `conn: &impl ConnectionTrait`, so the
// same method runs on the pooled connection or inside a transaction.
pub mod alert_store;
pub mod audit_store;
pub mod borrow_store;
pub mod equipment_store;
pub mod role_request_store;
pub mod system_config_store;
pub mod user_store;

pub use alert_store::AlertStore;
pub use audit_store::AuditStore;
pub use borrow_store::BorrowStore;
pub use equipment_store::EquipmentStore;
pub use role_request_store::RoleRequestStore;
pub use system_config_store::SystemConfigStore;
pub use user_store::UserStore;
