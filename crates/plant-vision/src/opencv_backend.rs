use crate::{Error, Frame, FrameSource, PixelFormat, Result};
use opencv::prelude::*;
use opencv::{core, imgproc, videoio};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

/// Cameras reachable through OpenCV `VideoCapture`, keyed by camera id.
///
/// Each id maps to a device index (`"0"`) or a path/URL. The capture is
/// opened per acquisition and released before `acquire` returns.
pub struct OpenCvSource {
    devices: HashMap<String, String>,
}

impl OpenCvSource {
    pub fn new(devices: HashMap<String, String>) -> Self {
        Self { devices }
    }
}

/// Releases the capture on every exit path.
struct Capture(videoio::VideoCapture);

impl Drop for Capture {
    fn drop(&mut self) {
        if let Err(e) = self.0.release() {
            tracing::warn!("VideoCapture release failed: {}", e);
        }
    }
}

fn backend(camera: &str, e: opencv::Error) -> Error {
    Error::AcquisitionFailed {
        camera: camera.to_string(),
        reason: e.to_string(),
    }
}

/// Whether the backend took the read timeout; logs when it did not.
fn read_timeout_applied(camera: &str, timeout_ms: u64, set: opencv::Result<bool>) -> bool {
    match set {
        Ok(true) => true,
        Ok(false) => {
            tracing::debug!(
                "Camera {}: backend ignored read timeout of {} ms",
                camera,
                timeout_ms
            );
            false
        }
        Err(e) => {
            tracing::debug!("Camera {}: could not set read timeout: {}", camera, e);
            false
        }
    }
}

impl FrameSource for OpenCvSource {
    fn acquire(&mut self, camera_id: &str, timeout: Duration) -> Result<Frame> {
        let spec = self
            .devices
            .get(camera_id)
            .ok_or_else(|| Error::DeviceNotFound(camera_id.to_string()))?;
        let started = Instant::now();
        // Parse spec as index if numeric, else try to open as path
        let cap = if let Ok(idx) = spec.parse::<i32>() {
            videoio::VideoCapture::new(idx, videoio::CAP_ANY).map_err(|e| backend(camera_id, e))?
        } else {
            videoio::VideoCapture::from_file(spec, videoio::CAP_ANY)
                .map_err(|e| backend(camera_id, e))?
        };
        let mut cap = Capture(cap);
        let opened = videoio::VideoCapture::is_opened(&cap.0).map_err(|e| backend(camera_id, e))?;
        if !opened {
            return Err(Error::DeviceNotFound(camera_id.to_string()));
        }
        let timeout_ms = timeout.as_millis() as u64;
        let set = cap
            .0
            .set(videoio::CAP_PROP_READ_TIMEOUT_MSEC, timeout_ms as f64);
        read_timeout_applied(camera_id, timeout_ms, set);

        let mut mat = core::Mat::default();
        let grabbed = cap.0.read(&mut mat).map_err(|e| backend(camera_id, e))?;
        if started.elapsed() > timeout || (!grabbed && mat.empty()) {
            return Err(Error::AcquisitionTimeout {
                camera: camera_id.to_string(),
                timeout_ms,
            });
        }

        let mut gray = core::Mat::default();
        if mat.channels() == 1 {
            gray = mat;
        } else {
            imgproc::cvt_color(&mat, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
                .map_err(|e| backend(camera_id, e))?;
        }
        let data = gray
            .data_bytes()
            .map_err(|e| backend(camera_id, e))?
            .to_vec();
        Ok(Frame {
            camera_id: camera_id.to_string(),
            width: gray.cols() as u32,
            height: gray.rows() as u32,
            pixel_format: PixelFormat::Gray8,
            data,
            ts: Some(OffsetDateTime::now_utc()),
        })
    }
}
