pub mod access;
pub mod alert;
pub mod approval_window;
pub mod audit;
pub mod borrow;
pub mod context;
pub mod equipment;
pub mod identity;
pub mod login;
pub mod role_change;
pub mod user;
