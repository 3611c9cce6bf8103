use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Encoding audit payload failed: {0}")]
    EncodeFailed(String),
}
