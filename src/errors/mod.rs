// Errors layer - Error type definitions
pub mod internal;
pub mod workflow;

// Re-exports for convenience
pub use internal::InternalError;
pub use workflow::WorkflowError;

#[cfg(test)]
mod internal_test;

#[cfg(test)]
mod workflow_test;
