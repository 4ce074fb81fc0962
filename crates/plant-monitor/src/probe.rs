use crate::CameraConfig;
use plant_vision::FrameSource;
use std::time::Duration;

/// Outcome of grabbing one test frame from a camera.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraCheck {
    pub camera_id: String,
    /// `(width, height)` of the grabbed frame.
    pub resolution: Option<(u32, u32)>,
    pub error: Option<String>,
}

impl CameraCheck {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Grab one frame from every camera and report what happened.
pub fn check_cameras<F: FrameSource + ?Sized>(
    source: &mut F,
    cameras: &[CameraConfig],
    timeout: Duration,
) -> Vec<CameraCheck> {
    cameras
        .iter()
        .map(|cam| match source.acquire(&cam.id, timeout) {
            Ok(frame) => {
                tracing::info!(
                    "Camera {} ready ({}x{})",
                    cam.id,
                    frame.width,
                    frame.height
                );
                CameraCheck {
                    camera_id: cam.id.clone(),
                    resolution: Some((frame.width, frame.height)),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Camera {} not ready: {}", cam.id, e);
                CameraCheck {
                    camera_id: cam.id.clone(),
                    resolution: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_vision::{MockCamera, Rect, SyntheticScene};

    #[test]
    fn reports_each_camera() {
        let mut cams = MockCamera::new().with_scene("a", SyntheticScene::upright_post());
        let cfg = |id: &str| CameraConfig {
            id: id.into(),
            crop: Rect::new(0, 0, 10, 10),
            roi: Rect::new(0, 0, 10, 10),
        };
        let report = check_cameras(
            &mut cams,
            &[cfg("a"), cfg("b")],
            Duration::from_millis(10),
        );
        assert!(report[0].ok());
        assert_eq!(report[0].resolution, Some((320, 240)));
        assert!(!report[1].ok());
        assert_eq!(cams.open_handles(), 0);
    }
}
