// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate. Policy decisions here are pure functions of
// their inputs; time and configuration are passed in explicitly.

pub mod audit_codec;
pub mod authorization_provider;
pub mod clock;
pub mod crypto_provider;
pub mod login_guard;
pub mod notification_provider;
pub mod password_policy_provider;

// Re-export providers for clean imports
pub use audit_codec::{AesGcmCodec, AuditCodec, PlaintextCodec};
pub use authorization_provider::AuthorizationProvider;
pub use clock::{Clock, FixedClock, SystemClock};
pub use crypto_provider::CryptoProvider;
pub use login_guard::{FailureOutcome, LoginGuard};
pub use notification_provider::{Notifier, NotifyError, TracingNotifier};
pub use password_policy_provider::{PasswordPolicyError, PasswordPolicyProvider};
