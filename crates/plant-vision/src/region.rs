use crate::{Centroid, Rect};

/// Whether a centroid falls inside `roi`, edges included.
///
/// A mask without foreground never classifies as inside, whatever the ROI.
pub fn classify(centroid: &Centroid, roi: &Rect) -> bool {
    match centroid {
        Centroid::Measured(p) => roi.contains(*p),
        Centroid::NoForeground => false,
    }
}
