use thiserror::Error;

#[derive(Error, Debug)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification channel
///
/// Delivery is fire-and-forget for callers: workflows log a failure and move on.
pub trait Notifier: Send + Sync {
    fn notify(&self, address: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that records messages in the application log instead of sending them
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, address: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to = %address, subject = %subject, body = %body, "Notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_notifier_never_fails() {
        assert!(TracingNotifier.notify("user-1", "Subject", "Body").is_ok());
    }
}
