pub mod alert_sink;
pub mod audit_builder;
pub mod audit_logger;

mod admin;
mod borrow;
mod equipment;
mod login;
mod role_change;

pub use alert_sink::AlertSink;
pub use audit_builder::AuditBuilder;
pub use audit_logger::{AuditLogger, best_effort};
