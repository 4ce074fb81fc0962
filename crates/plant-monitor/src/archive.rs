use crate::{ArchiveConfig, CycleObserver, CycleReport, MonitorError, Result};
use plant_vision::io;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent cycle counter, kept on the mirror drive only.
#[derive(Clone, Debug)]
pub struct RunCounter {
    mirror_dir: Option<PathBuf>,
    file_name: String,
}

impl RunCounter {
    pub fn new(mirror_dir: Option<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            mirror_dir,
            file_name: file_name.into(),
        }
    }

    fn file(&self) -> Option<PathBuf> {
        self.mirror_dir
            .as_ref()
            .filter(|dir| dir.is_dir())
            .map(|dir| dir.join(&self.file_name))
    }

    /// Stored count, 0 when the mirror or file is missing or unreadable.
    pub fn current(&self) -> u64 {
        self.file()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Increment and persist when the mirror is present.
    pub fn next(&self) -> Result<u64> {
        let run = self.current() + 1;
        if let Some(path) = self.file() {
            fs::write(&path, run.to_string())
                .map_err(|e| MonitorError::Io(format!("{}: {e}", path.display())))?;
        }
        Ok(run)
    }
}

/// Saves every cycle's images to disk.
pub struct Archiver {
    config: ArchiveConfig,
    counter: RunCounter,
}

impl Archiver {
    pub fn new(config: ArchiveConfig) -> Self {
        let counter = RunCounter::new(config.mirror_dir.clone(), config.counter_file.clone());
        Self { config, counter }
    }

    pub fn counter(&self) -> &RunCounter {
        &self.counter
    }

    /// `original_frame_169_254_207_1_run3.png` and friends.
    pub fn file_name(kind: &str, camera_id: &str, run: u64) -> String {
        format!("{kind}_frame_{}_run{run}.png", camera_id.replace('.', "_"))
    }

    fn targets(&self) -> Vec<&Path> {
        let mut dirs = vec![self.config.local_dir.as_path()];
        if let Some(mirror) = self.config.mirror_dir.as_deref() {
            if mirror.is_dir() {
                dirs.push(mirror);
            } else {
                tracing::debug!("Mirror {} not present; archiving locally", mirror.display());
            }
        }
        dirs
    }

    fn clear_local(&self) -> Result<()> {
        let dir = &self.config.local_dir;
        let io_err = |e: std::io::Error| MonitorError::Io(format!("{}: {e}", dir.display()));
        fs::create_dir_all(dir).map_err(io_err)?;
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(io_err)?;
            }
        }
        Ok(())
    }
}

impl CycleObserver for Archiver {
    fn name(&self) -> &str {
        "archive"
    }

    fn on_cycle(&mut self, report: &CycleReport<'_>) -> Result<()> {
        self.clear_local()?;
        let run = self.counter.next()?;
        let targets = self.targets();
        let mut saved = 0usize;
        for capture in report.captures {
            let id = &capture.verdict.camera_id;
            let roi = report
                .cameras
                .iter()
                .find(|c| &c.id == id)
                .map(|c| c.roi);
            for dir in &targets {
                if let Some(frame) = &capture.frame {
                    io::write_png(dir.join(Self::file_name("original", id, run)), frame)?;
                    saved += 1;
                }
                if let (Some(det), Some(roi)) = (&capture.detection, roi) {
                    io::write_png(dir.join(Self::file_name("cropped", id, run)), &det.cropped)?;
                    io::write_annotated_png(
                        dir.join(Self::file_name("binary", id, run)),
                        &det.mask,
                        &det.centroid,
                        &roi,
                    )?;
                    saved += 2;
                }
            }
        }
        tracing::info!(
            "Archived session {} as run {} ({} images)",
            report.session,
            run,
            saved
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{capture_all, CameraConfig};
    use plant_vision::{MockCamera, Rect, SilhouetteParams, SyntheticScene};
    use std::time::Duration;
    use time::OffsetDateTime;

    fn cameras() -> Vec<CameraConfig> {
        vec![
            CameraConfig {
                id: "169.254.207.1".into(),
                crop: Rect::new(100, 0, 120, 240),
                roi: Rect::new(50, 60, 20, 120),
            },
            CameraConfig {
                id: "169.254.207.2".into(),
                crop: Rect::new(100, 0, 120, 240),
                roi: Rect::new(50, 60, 20, 120),
            },
        ]
    }

    fn archive_once(archiver: &mut Archiver, cams: &[CameraConfig]) {
        let mut source = MockCamera::new().with_scene("169.254.207.1", SyntheticScene::upright_post());
        let captures = capture_all(
            &mut source,
            cams,
            &SilhouetteParams::default(),
            Duration::from_millis(100),
        );
        let report = CycleReport {
            session: 1,
            vertical: false,
            cameras: cams,
            captures: &captures,
            finished_at: OffsetDateTime::now_utc(),
        };
        archiver.on_cycle(&report).unwrap();
    }

    #[test]
    fn counter_without_mirror_always_starts_at_one() {
        let counter = RunCounter::new(None, "run_count.txt");
        assert_eq!(counter.next().unwrap(), 1);
        assert_eq!(counter.next().unwrap(), 1);
    }

    #[test]
    fn counter_persists_on_mirror() {
        let usb = tempfile::tempdir().unwrap();
        let counter = RunCounter::new(Some(usb.path().to_path_buf()), "run_count.txt");
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.next().unwrap(), 1);
        assert_eq!(counter.next().unwrap(), 2);
        let raw = fs::read_to_string(usb.path().join("run_count.txt")).unwrap();
        assert_eq!(raw, "2");
    }

    #[test]
    fn garbage_counter_reads_as_zero() {
        let usb = tempfile::tempdir().unwrap();
        fs::write(usb.path().join("run_count.txt"), "abc").unwrap();
        let counter = RunCounter::new(Some(usb.path().to_path_buf()), "run_count.txt");
        assert_eq!(counter.next().unwrap(), 1);
    }

    #[test]
    fn file_names_replace_dots() {
        assert_eq!(
            Archiver::file_name("binary", "169.254.207.1", 7),
            "binary_frame_169_254_207_1_run7.png"
        );
    }

    #[test]
    fn archives_locally_and_clears_previous_cycle() {
        let root = tempfile::tempdir().unwrap();
        let local = root.path().join("camera_outputs");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join("stale.png"), b"old").unwrap();

        let mut archiver = Archiver::new(ArchiveConfig {
            enabled: true,
            local_dir: local.clone(),
            mirror_dir: Some(root.path().join("usb-not-plugged")),
            counter_file: "run_count.txt".into(),
        });
        archive_once(&mut archiver, &cameras());

        assert!(!local.join("stale.png").exists());
        assert!(local.join("original_frame_169_254_207_1_run1.png").exists());
        assert!(local.join("cropped_frame_169_254_207_1_run1.png").exists());
        assert!(local.join("binary_frame_169_254_207_1_run1.png").exists());
        // the second camera failed, so nothing was captured for it
        assert!(!local.join("original_frame_169_254_207_2_run1.png").exists());
    }

    #[test]
    fn mirror_receives_copies_and_counter() {
        let root = tempfile::tempdir().unwrap();
        let usb = root.path().join("usb");
        fs::create_dir_all(&usb).unwrap();
        let mut archiver = Archiver::new(ArchiveConfig {
            enabled: true,
            local_dir: root.path().join("local"),
            mirror_dir: Some(usb.clone()),
            counter_file: "run_count.txt".into(),
        });
        let cams = cameras();
        archive_once(&mut archiver, &cams);
        archive_once(&mut archiver, &cams);

        assert!(usb.join("binary_frame_169_254_207_1_run1.png").exists());
        assert!(usb.join("binary_frame_169_254_207_1_run2.png").exists());
        assert_eq!(archiver.counter().current(), 2);
        assert!(!root
            .path()
            .join("local")
            .join("binary_frame_169_254_207_1_run1.png")
            .exists());
    }
}
