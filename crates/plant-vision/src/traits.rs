use crate::{BinaryMask, Frame, Result};
use std::time::Duration;

/// Anything that can hand out a single grayscale-or-color frame per camera.
pub trait FrameSource {
    /// Grab one frame from `camera_id`, waiting at most `timeout`.
    ///
    /// Implementations release every device-side resource they opened for
    /// this attempt before returning, whether it succeeded or not.
    fn acquire(&mut self, camera_id: &str, timeout: Duration) -> Result<Frame>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn acquire(&mut self, camera_id: &str, timeout: Duration) -> Result<Frame> {
        (**self).acquire(camera_id, timeout)
    }
}

/// Raw image moments of a binary mask (foreground weight 1).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

/// Low-level pixel operations the detection pipeline is built on.
pub trait ImageOps {
    /// Invert a Gray8 frame and keep pixels whose inverted value is at least
    /// `threshold` as foreground.
    fn threshold_inverted(&self, frame: &Frame, threshold: u8) -> Result<BinaryMask>;

    /// Morphological opening with a square kernel, `iterations` erosions
    /// followed by as many dilations.
    fn open(&self, mask: &BinaryMask, kernel_size: u32, iterations: u32) -> BinaryMask;

    fn moments(&self, mask: &BinaryMask) -> Moments;
}
