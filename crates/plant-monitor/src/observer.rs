use crate::{CameraCapture, CameraConfig, Result};
use time::OffsetDateTime;

/// A finished cycle, handed to observers after the verdict is known.
pub struct CycleReport<'a> {
    pub session: i64,
    pub vertical: bool,
    pub cameras: &'a [CameraConfig],
    pub captures: &'a [CameraCapture],
    pub finished_at: OffsetDateTime,
}

/// Side effects that hang off a cycle (archival, display, ...).
///
/// Errors are logged by the loop and never change the verdict.
pub trait CycleObserver {
    fn name(&self) -> &str;

    fn on_cycle(&mut self, report: &CycleReport<'_>) -> Result<()>;
}
