use crate::{Error, Frame, FrameSource, Rect, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Synthetic view: a light gray ramp with an optional dark post.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticScene {
    pub width: u32,
    pub height: u32,
    pub post: Option<Rect>,
}

impl SyntheticScene {
    /// A 320x240 scene with an upright post near the center.
    pub fn upright_post() -> Self {
        Self {
            width: 320,
            height: 240,
            post: Some(Rect::new(154, 20, 12, 200)),
        }
    }

    pub fn render(&self, camera_id: &str) -> Frame {
        let mut data = vec![0u8; (self.width * self.height) as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = (y * self.width + x) as usize;
                data[idx] = 180 + ((x + y) % 50) as u8;
            }
        }
        if let Some(post) = self.post {
            let x1 = post.x.saturating_add(post.width).min(self.width);
            let y1 = post.y.saturating_add(post.height).min(self.height);
            for y in post.y.min(self.height)..y1 {
                for x in post.x.min(self.width)..x1 {
                    data[(y * self.width + x) as usize] = 25;
                }
            }
        }
        Frame::gray(camera_id, self.width, self.height, data)
    }
}

/// An in-process camera rig keyed by camera id.
///
/// Scripted outcomes are served first, in order; after that a camera with a
/// scene renders it on every grab and an unknown camera reports
/// `DeviceNotFound`.
#[derive(Default)]
pub struct MockCamera {
    scenes: HashMap<String, SyntheticScene>,
    scripted: HashMap<String, VecDeque<Result<Frame>>>,
    open_handles: Arc<AtomicUsize>,
    grabs: Vec<String>,
}

/// Stands in for a device handle; counts itself while alive.
struct HandleGuard(Arc<AtomicUsize>);

impl HandleGuard {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(mut self, camera_id: &str, scene: SyntheticScene) -> Self {
        self.scenes.insert(camera_id.to_string(), scene);
        self
    }

    pub fn push_frame(&mut self, camera_id: &str, frame: Frame) {
        self.scripted
            .entry(camera_id.to_string())
            .or_default()
            .push_back(Ok(frame));
    }

    pub fn push_error(&mut self, camera_id: &str, err: Error) {
        self.scripted
            .entry(camera_id.to_string())
            .or_default()
            .push_back(Err(err));
    }

    /// Device handles currently held open.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Camera ids in the order they were grabbed from.
    pub fn grabs(&self) -> &[String] {
        &self.grabs
    }
}

impl FrameSource for MockCamera {
    fn acquire(&mut self, camera_id: &str, _timeout: Duration) -> Result<Frame> {
        self.grabs.push(camera_id.to_string());
        let known = self.scenes.contains_key(camera_id) || self.scripted.contains_key(camera_id);
        if !known {
            return Err(Error::DeviceNotFound(camera_id.to_string()));
        }
        let _handle = HandleGuard::open(&self.open_handles);
        if let Some(next) = self
            .scripted
            .get_mut(camera_id)
            .and_then(|queue| queue.pop_front())
        {
            return next;
        }
        match self.scenes.get(camera_id) {
            Some(scene) => Ok(scene.render(camera_id)),
            None => Err(Error::AcquisitionFailed {
                camera: camera_id.to_string(),
                reason: "script exhausted".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(5000);

    #[test]
    fn unknown_camera_is_not_found() {
        let mut cam = MockCamera::new();
        assert!(matches!(
            cam.acquire("10.0.0.9", T),
            Err(Error::DeviceNotFound(_))
        ));
    }

    #[test]
    fn script_runs_before_scene_and_handles_are_released() {
        let mut cam = MockCamera::new().with_scene("a", SyntheticScene::upright_post());
        cam.push_error(
            "a",
            Error::AcquisitionTimeout {
                camera: "a".into(),
                timeout_ms: 5000,
            },
        );
        assert!(matches!(
            cam.acquire("a", T),
            Err(Error::AcquisitionTimeout { .. })
        ));
        assert_eq!(cam.open_handles(), 0);

        let f = cam.acquire("a", T).unwrap();
        assert_eq!((f.width, f.height), (320, 240));
        assert_eq!(f.camera_id, "a");
        assert_eq!(cam.open_handles(), 0);
        assert_eq!(cam.grabs(), &["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn scene_draws_dark_post() {
        let f = SyntheticScene::upright_post().render("x");
        assert_eq!(f.data[(100 * 320 + 160) as usize], 25);
        assert!(f.data[(100 * 320 + 20) as usize] >= 180);
    }
}
