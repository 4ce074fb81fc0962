use thiserror::Error;

pub type Result<T, E = StoreError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read of {path} failed: {reason}")]
    ReadFailed { path: String, reason: String },
    #[error("write of {path} failed: {reason}")]
    WriteFailed { path: String, reason: String },
    #[error("{path} holds {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },
    #[error("I/O error: {0}")]
    Io(String),
}
