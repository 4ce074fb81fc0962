use crate::{CameraConfig, CameraVerdict};
use plant_vision::{detect, Detection, Frame, FrameSource, SilhouetteParams};
use std::time::Duration;

/// What one camera produced in one cycle.
///
/// Frames live only as long as the cycle that captured them.
#[derive(Clone, Debug)]
pub struct CameraCapture {
    pub verdict: CameraVerdict,
    pub frame: Option<Frame>,
    pub detection: Option<Detection>,
}

/// Acquire and classify one camera; failures become a fail-closed verdict.
pub fn capture_camera<F: FrameSource + ?Sized>(
    source: &mut F,
    camera: &CameraConfig,
    params: &SilhouetteParams,
    timeout: Duration,
) -> CameraCapture {
    let frame = match source.acquire(&camera.id, timeout) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Camera {}: acquisition failed: {}", camera.id, e);
            return CameraCapture {
                verdict: CameraVerdict::failed(&camera.id, e.to_string()),
                frame: None,
                detection: None,
            };
        }
    };
    tracing::debug!(
        "Camera {}: frame {}x{}",
        camera.id,
        frame.width,
        frame.height
    );
    match detect(&frame, &camera.crop, &camera.roi, params) {
        Ok(detection) => {
            tracing::info!(
                "Camera {}: centroid {} -> {}",
                camera.id,
                detection.centroid,
                if detection.in_roi {
                    "vertical"
                } else {
                    "not vertical"
                }
            );
            CameraCapture {
                verdict: CameraVerdict::measured(&camera.id, detection.centroid, detection.in_roi),
                frame: Some(frame),
                detection: Some(detection),
            }
        }
        Err(e) => {
            tracing::warn!("Camera {}: processing failed: {}", camera.id, e);
            CameraCapture {
                verdict: CameraVerdict::failed(&camera.id, e.to_string()),
                frame: Some(frame),
                detection: None,
            }
        }
    }
}

/// Every camera, one at a time, in configured order.
pub fn capture_all<F: FrameSource + ?Sized>(
    source: &mut F,
    cameras: &[CameraConfig],
    params: &SilhouetteParams,
    timeout: Duration,
) -> Vec<CameraCapture> {
    cameras
        .iter()
        .map(|camera| capture_camera(source, camera, params, timeout))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_vision::{Centroid, Error, MockCamera, Point, Rect, SyntheticScene};

    fn camera(id: &str) -> CameraConfig {
        CameraConfig {
            id: id.to_string(),
            crop: Rect::new(100, 0, 120, 240),
            roi: Rect::new(50, 60, 20, 120),
        }
    }

    const T: Duration = Duration::from_millis(5000);

    #[test]
    fn upright_post_is_vertical() {
        let mut cams = MockCamera::new().with_scene("a", SyntheticScene::upright_post());
        let c = capture_camera(&mut cams, &camera("a"), &SilhouetteParams::default(), T);
        // post x 154..=165 -> 159.5 -> crop-local 60 ; y 20..=219 -> 119.5 -> 120
        assert_eq!(
            c.verdict.centroid,
            Some(Centroid::Measured(Point { x: 60, y: 120 }))
        );
        assert!(c.verdict.in_roi);
        assert!(c.frame.is_some() && c.detection.is_some());
    }

    #[test]
    fn acquisition_failure_is_fail_closed() {
        let mut cams = MockCamera::new().with_scene("a", SyntheticScene::upright_post());
        cams.push_error(
            "a",
            Error::AcquisitionTimeout {
                camera: "a".into(),
                timeout_ms: 5000,
            },
        );
        let c = capture_camera(&mut cams, &camera("a"), &SilhouetteParams::default(), T);
        assert!(!c.verdict.in_roi);
        assert!(c.verdict.is_failure());
        assert!(c.frame.is_none());
        assert_eq!(cams.open_handles(), 0);
    }

    #[test]
    fn processing_failure_keeps_frame_and_fails_closed() {
        let mut cams = MockCamera::new().with_scene("a", SyntheticScene::upright_post());
        let mut cfg = camera("a");
        cfg.crop = Rect::new(1000, 1000, 10, 10);
        let c = capture_camera(&mut cams, &cfg, &SilhouetteParams::default(), T);
        assert!(c.verdict.is_failure());
        assert!(c.frame.is_some());
        assert!(c.detection.is_none());
    }

    #[test]
    fn cameras_run_in_configured_order_and_one_failure_does_not_stop_others() {
        let mut cams = MockCamera::new()
            .with_scene("b", SyntheticScene::upright_post())
            .with_scene("c", SyntheticScene::upright_post());
        let cfgs = [camera("c"), camera("missing"), camera("b")];
        let caps = capture_all(&mut cams, &cfgs, &SilhouetteParams::default(), T);
        let ids: Vec<_> = caps.iter().map(|c| c.verdict.camera_id.as_str()).collect();
        assert_eq!(ids, ["c", "missing", "b"]);
        assert_eq!(cams.grabs(), &["c", "missing", "b"]);
        assert!(caps[0].verdict.in_roi);
        assert!(!caps[1].verdict.in_roi);
        assert!(caps[2].verdict.in_roi);
    }
}
