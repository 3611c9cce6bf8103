use std::net::IpAddr;

use crate::errors::WorkflowError;
use crate::types::internal::identity::Identity;

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Carries the verified caller (if any) plus the metadata needed for auditing
/// and alerting. Identity verification happens before a context is built.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Verified caller, `None` for unauthenticated requests
    pub identity: Option<Identity>,

    /// Source of the request (API or CLI)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,
}

impl RequestContext {
    /// Unauthenticated API context
    pub fn new() -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            identity: None,
            source: RequestSource::API,
            actor_id: "unknown".to_owned(),
        }
    }

    /// Create a RequestContext for CLI operations
    ///
    /// # Arguments
    /// * `command_name` - Name of the CLI command being executed
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            identity: None,
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
        }
    }

    /// Set the ip_address
    pub fn with_ip_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    /// Attach the verified caller; the actor becomes the caller's user id
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.actor_id = identity.id.clone();
        self.identity = Some(identity);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The verified caller, or `Unauthenticated`
    pub fn caller(&self) -> Result<&Identity, WorkflowError> {
        self.identity.as_ref().ok_or(WorkflowError::Unauthenticated)
    }

    /// IP address as recorded in alerts and audit entries
    pub fn ip_label(&self) -> String {
        self.ip_address
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
