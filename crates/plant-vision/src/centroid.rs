use crate::{BinaryMask, Centroid, ImageOps, NativeOps, Point};

/// Below this zeroth moment the mask is treated as empty.
const M00_EPSILON: f64 = 1e-9;

/// Center of mass of the mask's foreground, rounded to the nearest pixel.
pub fn locate(mask: &BinaryMask) -> Centroid {
    locate_with(&NativeOps, mask)
}

pub fn locate_with(ops: &impl ImageOps, mask: &BinaryMask) -> Centroid {
    let m = ops.moments(mask);
    if m.m00.abs() <= M00_EPSILON {
        return Centroid::NoForeground;
    }
    let cx = (m.m10 / m.m00).round().max(0.0);
    let cy = (m.m01 / m.m00).round().max(0.0);
    Centroid::Measured(Point {
        x: cx as u32,
        y: cy as u32,
    })
}
