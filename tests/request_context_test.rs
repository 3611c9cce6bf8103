use equiplend_backend::errors::WorkflowError;
use equiplend_backend::types::internal::context::{RequestContext, RequestSource};
use equiplend_backend::types::internal::identity::{Clearance, Identity, Role};

#[test]
fn test_request_context_new_defaults_to_api_source() {
    let ctx = RequestContext::new();

    assert_eq!(ctx.source, RequestSource::API);
    assert_eq!(ctx.actor_id, "unknown");
    assert!(!ctx.is_authenticated());
    assert!(matches!(ctx.caller(), Err(WorkflowError::Unauthenticated)));
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("alerts");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.actor_id, "cli:alerts");
    assert!(ctx.ip_address.is_none());
    assert_eq!(ctx.ip_label(), "unknown");
    assert_eq!(ctx.source.to_string(), "cli");
}

#[test]
fn test_identity_becomes_actor() {
    let identity = Identity::new("user-42", Role::Manager, Clearance::Secret);
    let ctx = RequestContext::for_cli("approval_window")
        .with_ip_address("10.1.2.3".parse().unwrap())
        .with_identity(identity.clone());

    assert_eq!(ctx.actor_id, "user-42");
    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.caller().unwrap(), &identity);
    assert_eq!(ctx.ip_label(), "10.1.2.3");
}

#[test]
fn test_request_ids_are_unique() {
    assert_ne!(RequestContext::new().request_id, RequestContext::new().request_id);
}
