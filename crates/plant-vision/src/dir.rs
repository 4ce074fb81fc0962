use crate::{io, Error, Frame, FrameSource, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Serves `<root>/<camera_id>.png` as the camera's current frame.
///
/// Dots in the id become underscores, so `169.254.207.1` maps to
/// `169_254_207_1.png`.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, camera_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.png", camera_id.replace(['.', '/', '\\'], "_")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameSource for DirectorySource {
    fn acquire(&mut self, camera_id: &str, _timeout: Duration) -> Result<Frame> {
        let path = self.path_for(camera_id);
        if !path.is_file() {
            return Err(Error::DeviceNotFound(format!(
                "{camera_id} (no {})",
                path.display()
            )));
        }
        io::read_gray(&path, camera_id).map_err(|e| Error::AcquisitionFailed {
            camera: camera_id.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_png_by_camera_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = DirectorySource::new(dir.path());
        let frame = Frame::gray("169.254.207.1", 2, 2, vec![1, 2, 3, 4]);
        io::write_png(src.path_for("169.254.207.1"), &frame).unwrap();

        let got = src
            .acquire("169.254.207.1", Duration::from_millis(10))
            .unwrap();
        assert_eq!(got.data, vec![1, 2, 3, 4]);
        assert_eq!(got.camera_id, "169.254.207.1");
        assert!(matches!(
            src.acquire("169.254.207.2", Duration::from_millis(10)),
            Err(Error::DeviceNotFound(_))
        ));
    }

    #[test]
    fn corrupt_file_is_acquisition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = DirectorySource::new(dir.path());
        std::fs::write(src.path_for("cam"), b"not a png").unwrap();
        assert!(matches!(
            src.acquire("cam", Duration::from_millis(10)),
            Err(Error::AcquisitionFailed { .. })
        ));
    }
}
