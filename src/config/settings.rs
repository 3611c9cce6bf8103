use std::fmt;
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::errors::ConfigError;
use crate::providers::{AesGcmCodec, AuditCodec, PlaintextCodec};

const DEFAULT_DATABASE_URL: &str = "sqlite://lending.db?mode=rwc";
const DEFAULT_AUDIT_DATABASE_URL: &str = "sqlite://audit.db?mode=rwc";
const DEFAULT_LOCK_THRESHOLD: u32 = 5;
const DEFAULT_LOCK_DURATION_SECS: i64 = 120;

/// Process settings read once at startup
pub struct Settings {
    database_url: String,
    audit_database_url: String,
    lock_threshold: u32,
    lock_duration_secs: i64,
    log_encryption_key: Option<String>,
    password_pepper: String,
    cli_admin_id: Option<String>,
}

impl Settings {
    /// Load settings through an environment provider
    ///
    /// Unset variables fall back to defaults; set but malformed values are errors.
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        let database_url = non_empty(&*env_provider, "DATABASE_URL", DEFAULT_DATABASE_URL)?;
        let audit_database_url =
            non_empty(&*env_provider, "AUDIT_DATABASE_URL", DEFAULT_AUDIT_DATABASE_URL)?;

        let lock_threshold = match env_provider.get_var("LOCK_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::parse("LOCK_THRESHOLD", e))?,
            None => DEFAULT_LOCK_THRESHOLD,
        };
        if lock_threshold < 1 {
            return Err(ConfigError::invalid("LOCK_THRESHOLD", "must be at least 1"));
        }

        let lock_duration_secs = match env_provider.get_var("LOCK_DURATION_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::parse("LOCK_DURATION_SECS", e))?,
            None => DEFAULT_LOCK_DURATION_SECS,
        };
        if lock_duration_secs < 1 {
            return Err(ConfigError::invalid("LOCK_DURATION_SECS", "must be at least 1"));
        }

        let log_encryption_key = env_provider
            .get_var("LOG_ENCRYPTION_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if let Some(key) = &log_encryption_key {
            AesGcmCodec::from_hex_key(key)
                .map_err(|e| ConfigError::invalid("LOG_ENCRYPTION_KEY", e.to_string()))?;
        }

        let password_pepper = env_provider.get_var("PASSWORD_PEPPER").unwrap_or_default();
        let cli_admin_id = env_provider
            .get_var("CLI_ADMIN_ID")
            .filter(|id| !id.trim().is_empty());

        Ok(Self {
            database_url,
            audit_database_url,
            lock_threshold,
            lock_duration_secs,
            log_encryption_key,
            password_pepper,
            cli_admin_id,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ConfigError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn audit_database_url(&self) -> &str {
        &self.audit_database_url
    }

    pub fn lock_threshold(&self) -> u32 {
        self.lock_threshold
    }

    pub fn lock_duration_secs(&self) -> i64 {
        self.lock_duration_secs
    }

    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    /// User id that CLI administrative commands act as
    pub fn cli_admin_id(&self) -> Option<&str> {
        self.cli_admin_id.as_deref()
    }

    /// Codec for audit payloads; plaintext when no key is configured
    pub fn audit_codec(&self) -> Result<Arc<dyn AuditCodec>, ConfigError> {
        match &self.log_encryption_key {
            Some(key) => {
                let codec = AesGcmCodec::from_hex_key(key)
                    .map_err(|e| ConfigError::invalid("LOG_ENCRYPTION_KEY", e.to_string()))?;
                Ok(Arc::new(codec))
            }
            None => {
                tracing::warn!("LOG_ENCRYPTION_KEY not set; audit payloads are stored in plaintext");
                Ok(Arc::new(PlaintextCodec))
            }
        }
    }
}

fn non_empty(
    env_provider: &(dyn EnvironmentProvider + Send + Sync),
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match env_provider.get_var(key) {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::invalid(key, "must not be empty"))
        }
        Some(value) => Ok(value),
        None => Ok(default.to_string()),
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("audit_database_url", &self.audit_database_url)
            .field("lock_threshold", &self.lock_threshold)
            .field("lock_duration_secs", &self.lock_duration_secs)
            .field("log_encryption_key", &self.log_encryption_key.as_ref().map(|_| "<redacted>"))
            .field("password_pepper", &"<redacted>")
            .field("cli_admin_id", &self.cli_admin_id)
            .finish()
    }
}
