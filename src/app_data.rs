use std::sync::Arc;

use crate::audit::{AlertSink, AuditLogger};
use crate::config::{ConfigError, DatabaseConnections, Settings};
use crate::providers::{
    AuthorizationProvider, Clock, CryptoProvider, LoginGuard, Notifier, PasswordPolicyProvider,
    SystemClock, TracingNotifier,
};
use crate::stores::{
    AlertStore, AuditStore, BorrowStore, EquipmentStore, RoleRequestStore, SystemConfigStore,
    UserStore,
};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init(connections, settings)
///   ↓ creates once
///   ├─ clock, notifier
///   ├─ audit_store (audit db) → audit_logger
///   ├─ alert_store → alert_sink (lending db)
///   ├─ user/equipment/borrow/role_request/system_config stores
///   └─ authorization, login_guard, crypto, password_policy providers
///   ↓ wrapped in Arc<AppData>
///   ↓ passed to coordinators
///   ├─ BorrowCoordinator::new(app_data)
///   ├─ RoleChangeCoordinator::new(app_data)
///   ├─ LoginCoordinator::new(app_data)
///   ├─ EquipmentCoordinator::new(app_data)
///   └─ AdminCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,

    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub alert_store: Arc<AlertStore>,
    pub alert_sink: Arc<AlertSink>,

    pub user_store: Arc<UserStore>,
    pub equipment_store: Arc<EquipmentStore>,
    pub borrow_store: Arc<BorrowStore>,
    pub role_request_store: Arc<RoleRequestStore>,
    pub system_config_store: Arc<SystemConfigStore>,

    pub authorization: AuthorizationProvider,
    pub login_guard: LoginGuard,
    pub crypto: Arc<CryptoProvider>,
    pub password_policy: PasswordPolicyProvider,
}

impl AppData {
    /// Initialize with the system clock and the tracing notifier
    ///
    /// Database connections should be initialized and migrated before calling this.
    pub fn init(connections: DatabaseConnections, settings: &Settings) -> Result<Self, ConfigError> {
        Self::with_collaborators(
            connections,
            settings,
            Arc::new(SystemClock),
            Arc::new(TracingNotifier),
        )
    }

    /// Initialize with explicit time and notification collaborators
    pub fn with_collaborators(
        connections: DatabaseConnections,
        settings: &Settings,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        tracing::info!("Initializing AppData...");

        let audit_store = Arc::new(AuditStore::new(
            connections.audit.clone(),
            settings.audit_codec()?,
        ));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone(), clock.clone()));

        let alert_store = Arc::new(AlertStore::new());
        let alert_sink = Arc::new(AlertSink::new(
            connections.lending.clone(),
            alert_store.clone(),
            clock.clone(),
        ));

        tracing::debug!("Creating stores...");
        let user_store = Arc::new(UserStore::new());
        let equipment_store = Arc::new(EquipmentStore::new());
        let borrow_store = Arc::new(BorrowStore::new());
        let role_request_store = Arc::new(RoleRequestStore::new());
        let system_config_store = Arc::new(SystemConfigStore::new());

        let login_guard = LoginGuard::new(settings.lock_threshold(), settings.lock_duration_secs());
        let crypto = Arc::new(CryptoProvider::new(settings.password_pepper()));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            connections,
            clock,
            notifier,
            audit_store,
            audit_logger,
            alert_store,
            alert_sink,
            user_store,
            equipment_store,
            borrow_store,
            role_request_store,
            system_config_store,
            authorization: AuthorizationProvider::new(),
            login_guard,
            crypto,
            password_policy: PasswordPolicyProvider::new(),
        })
    }
}
