use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("camera not found: {0}")]
    DeviceNotFound(String),
    #[error("no frame from {camera} within {timeout_ms} ms")]
    AcquisitionTimeout { camera: String, timeout_ms: u64 },
    #[error("acquisition failed on {camera}: {reason}")]
    AcquisitionFailed { camera: String, reason: String },
    #[error("I/O error: {0}")]
    Io(String),
}
