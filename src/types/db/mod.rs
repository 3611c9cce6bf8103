// Database entities - SeaORM models
pub mod alert;
pub mod audit_event;
pub mod borrow_request;
pub mod equipment;
pub mod equipment_permission;
pub mod role_change_request;
pub mod system_config;
pub mod user;
