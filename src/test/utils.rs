// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::{Arc, Mutex};

use migration::{AuditMigrator, LendingMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::{DatabaseConnections, MockEnvironment, Settings};
use crate::providers::{FixedClock, Notifier, NotifyError};
use crate::stores::UserStore;
use crate::types::internal::identity::{Clearance, Role};
use crate::types::internal::user::User;

pub const TEST_NOW: i64 = 1_700_000_000;

/// In-memory lending database with migrations applied
pub async fn setup_test_lending_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    LendingMigrator::up(&db, None)
        .await
        .expect("Failed to run lending migrations");
    db
}

/// In-memory audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");
    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");
    db
}

/// Insert a user directly through the store
///
/// The stored hash is not a valid Argon2 hash; use the admin coordinator
/// when a test needs to log in.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
    clearance: Clearance,
) -> User {
    UserStore::new()
        .create_user(db, username, "not-a-hash".to_string(), role, clearance, TEST_NOW)
        .await
        .expect("Failed to create test user")
}

/// Notifier that keeps every message for assertions
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    pub fn addresses(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(address, _, _)| address.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, address: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Full AppData over in-memory databases, a fixed clock at `TEST_NOW`
/// (local hour 10) and a recording notifier
pub async fn setup_test_app_data() -> (Arc<AppData>, Arc<FixedClock>, Arc<RecordingNotifier>) {
    let connections = DatabaseConnections {
        lending: setup_test_lending_db().await,
        audit: setup_test_audit_db().await,
    };
    let settings = Settings::from_env_provider(Arc::new(
        MockEnvironment::empty().with_var("PASSWORD_PEPPER", "test-pepper-for-unit-tests"),
    ))
    .expect("Failed to load test settings");

    let clock = Arc::new(FixedClock::at_timestamp(TEST_NOW));
    clock.set_hour(10);
    let notifier = Arc::new(RecordingNotifier::default());

    let app_data = AppData::with_collaborators(connections, &settings, clock.clone(), notifier.clone())
        .expect("Failed to create test AppData");
    (Arc::new(app_data), clock, notifier)
}
