use crate::{MonitorError, Result};
use anyhow::Context;
use plant_vision::{Rect, SilhouetteParams};
use plc_link::PlcLayout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One camera: its id, where to crop raw frames, and where an upright
/// object's centroid must fall inside the crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub id: String,
    pub crop: Rect,
    pub roi: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Highest session number before the controller wraps.
    pub max_session: i64,
    /// Retries after a failed session read.
    pub read_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_session: 5,
            read_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub enabled: bool,
    /// Cleared at the start of every archived cycle.
    pub local_dir: PathBuf,
    /// Removable drive; used only while it exists.
    pub mirror_dir: Option<PathBuf>,
    /// Run counter file name, kept in `mirror_dir`.
    pub counter_file: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            local_dir: PathBuf::from("camera_outputs"),
            mirror_dir: None,
            counter_file: "run_count.txt".to_string(),
        }
    }
}

/// Everything the checker needs, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Processed in this order every cycle.
    pub cameras: Vec<CameraConfig>,
    pub silhouette: SilhouetteParams,
    pub acquisition_timeout_ms: u64,
    pub session: SessionConfig,
    /// Pause between polling ticks.
    pub cycle_delay_ms: u64,
    pub plc: PlcLayout,
    pub archive: ArchiveConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            silhouette: SilhouetteParams::default(),
            acquisition_timeout_ms: 5000,
            session: SessionConfig::default(),
            cycle_delay_ms: 3000,
            plc: PlcLayout::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Two opposing cameras as deployed on the planting line.
    pub fn example() -> Self {
        let camera = |id: &str| CameraConfig {
            id: id.to_string(),
            crop: Rect::new(700, 500, 750, 1000),
            roi: Rect::new(200, 0, 100, 1000),
        };
        Self {
            cameras: vec![camera("169.254.207.1"), camera("169.254.207.2")],
            ..Self::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let config = Self::from_yaml_str(&raw)
            .with_context(|| format!("parsing yaml: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| MonitorError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| MonitorError::Config(e.to_string()))
    }

    /// Reject configurations the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cameras.is_empty() {
            return Err(MonitorError::StartupFailed(
                "no cameras configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for cam in &self.cameras {
            if cam.id.trim().is_empty() {
                return Err(MonitorError::StartupFailed(
                    "camera with empty id".to_string(),
                ));
            }
            if !seen.insert(cam.id.as_str()) {
                return Err(MonitorError::StartupFailed(format!(
                    "camera {} configured twice",
                    cam.id
                )));
            }
            if cam.crop.is_degenerate() || cam.roi.is_degenerate() {
                return Err(MonitorError::StartupFailed(format!(
                    "camera {} has a crop or ROI with zero width or height",
                    cam.id
                )));
            }
        }
        if self.silhouette.kernel_size == 0 {
            return Err(MonitorError::StartupFailed(
                "silhouette kernel_size must be at least 1".to_string(),
            ));
        }
        if self.session.max_session < 0 {
            return Err(MonitorError::StartupFailed(
                "session max_session must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_millis(self.acquisition_timeout_ms)
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }
}
