//! plant-monitor: the session-gated verticality checker
//!
//! [`ControlLoop`] polls the controller through `plc-link`, and whenever a new
//! session starts while the run flag is up it grabs one frame per camera,
//! classifies each with `plant-vision`, ANDs the per-camera verdicts and
//! writes the result back. Camera and controller glitches degrade to safe
//! defaults; only a bad configuration or an unreachable controller at
//! startup is fatal.

mod error;
pub use error::{MonitorError, Result};

mod config;
pub use config::{ArchiveConfig, CameraConfig, MonitorConfig, SessionConfig};

mod session;
pub use session::SessionState;

mod consensus;
pub use consensus::{aggregate, CameraVerdict};

pub mod retry;
pub use retry::{Clock, RetryPolicy, SystemClock};

mod pipeline;
pub use pipeline::{capture_all, capture_camera, CameraCapture};

mod observer;
pub use observer::{CycleObserver, CycleReport};

mod archive;
pub use archive::{Archiver, RunCounter};

mod metrics;
pub use metrics::{LoopMetrics, MetricsHub};

mod probe;
pub use probe::{check_cameras, CameraCheck};

mod control;
pub use control::{ControlLoop, CycleSummary, LoopState, RunSummary, TickOutcome};
