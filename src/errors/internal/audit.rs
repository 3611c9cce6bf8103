use thiserror::Error;

use super::CodecError;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The audit codec rejected a field before it was stored
    #[error("Failed to encode audit {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: CodecError,
    },
}
