use plant_vision::Centroid;

/// One camera's answer for one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraVerdict {
    pub camera_id: String,
    /// `None` when the frame could not be acquired or processed.
    pub centroid: Option<Centroid>,
    pub in_roi: bool,
    pub failure: Option<String>,
}

impl CameraVerdict {
    pub fn measured(camera_id: impl Into<String>, centroid: Centroid, in_roi: bool) -> Self {
        Self {
            camera_id: camera_id.into(),
            centroid: Some(centroid),
            in_roi,
            failure: None,
        }
    }

    /// Fail-closed verdict for a camera that produced nothing usable.
    pub fn failed(camera_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            camera_id: camera_id.into(),
            centroid: None,
            in_roi: false,
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Vertical only if every camera says so; no verdicts at all is "not vertical".
pub fn aggregate(verdicts: &[CameraVerdict]) -> bool {
    if verdicts.is_empty() {
        tracing::error!("No camera verdicts to aggregate; reporting not vertical");
        return false;
    }
    verdicts.iter().all(|v| v.in_roi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_vision::Point;

    fn v(id: &str, in_roi: bool) -> CameraVerdict {
        CameraVerdict::measured(id, Centroid::Measured(Point { x: 1, y: 1 }), in_roi)
    }

    #[test]
    fn one_false_forces_false() {
        assert!(!aggregate(&[v("a", true), v("b", false)]));
        assert!(!aggregate(&[v("a", false), v("b", true), v("c", true)]));
    }

    #[test]
    fn all_true_is_true() {
        assert!(aggregate(&[v("a", true)]));
        assert!(aggregate(&[v("a", true), v("b", true), v("c", true)]));
    }

    #[test]
    fn conjunction_over_every_combination() {
        for bits in 0u8..16 {
            let verdicts: Vec<_> = (0..4)
                .map(|i| v(&format!("c{i}"), bits & (1 << i) != 0))
                .collect();
            assert_eq!(aggregate(&verdicts), bits == 0b1111);
        }
    }

    #[test]
    fn empty_fails_closed() {
        assert!(!aggregate(&[]));
    }

    #[test]
    fn failed_camera_counts_as_false() {
        let failed = CameraVerdict::failed("b", "timeout");
        assert!(failed.is_failure());
        assert!(!aggregate(&[v("a", true), failed]));
    }
}
