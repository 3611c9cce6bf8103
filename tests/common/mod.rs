// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use equiplend_backend::AppData;
use equiplend_backend::config::{DatabaseConnections, MockEnvironment, Settings};
use equiplend_backend::providers::{FixedClock, Notifier, NotifyError};
use equiplend_backend::types::internal::context::RequestContext;
use equiplend_backend::types::internal::identity::{Clearance, Role};
use equiplend_backend::types::internal::user::User;
use migration::{AuditMigrator, LendingMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

pub const TEST_NOW: i64 = 1_700_000_000;

/// Creates a test lending database with migrations applied
pub async fn setup_test_lending_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    LendingMigrator::up(&db, None)
        .await
        .expect("Failed to run lending migrations");

    db
}

/// Creates a test audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");

    db
}

/// Notifier that records every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn addresses(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(a, _)| a.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, address: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), subject.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Fresh databases, clock at `TEST_NOW` with local hour 10
    pub async fn new() -> Self {
        Self::with_env(MockEnvironment::empty()).await
    }

    pub async fn with_env(env: MockEnvironment) -> Self {
        let connections = DatabaseConnections {
            lending: setup_test_lending_db().await,
            audit: setup_test_audit_db().await,
        };
        let settings = Settings::from_env_provider(Arc::new(
            env.with_var("PASSWORD_PEPPER", "integration-test-pepper"),
        ))
        .expect("Failed to load test settings");

        let clock = Arc::new(FixedClock::at_timestamp(TEST_NOW));
        clock.set_hour(10);
        let notifier = Arc::new(RecordingNotifier::default());
        let app_data = AppData::with_collaborators(
            connections,
            &settings,
            clock.clone(),
            notifier.clone(),
        )
        .expect("Failed to create AppData");

        Self {
            app_data: Arc::new(app_data),
            clock,
            notifier,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.app_data.connections.lending
    }

    /// Insert a user with a real password hash
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        clearance: Clearance,
    ) -> User {
        let hash = self
            .app_data
            .crypto
            .hash_password(password)
            .expect("Failed to hash password");
        self.app_data
            .user_store
            .create_user(self.db(), username, hash, role, clearance, TEST_NOW)
            .await
            .expect("Failed to create user")
    }
}

pub fn ctx_for(user: &User) -> RequestContext {
    RequestContext::new()
        .with_ip_address("203.0.113.7".parse().unwrap())
        .with_identity(user.identity())
}
