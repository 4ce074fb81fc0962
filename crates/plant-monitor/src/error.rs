use thiserror::Error;

pub type Result<T, E = MonitorError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Fatal before the loop starts: bad configuration or no controller.
    #[error("startup failed: {0}")]
    StartupFailed(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Vision(#[from] plant_vision::Error),
    #[error(transparent)]
    Store(#[from] plc_link::StoreError),
    #[error("I/O error: {0}")]
    Io(String),
}
