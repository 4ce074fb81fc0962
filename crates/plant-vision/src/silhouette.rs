use crate::{BinaryMask, Frame, ImageOps, NativeOps, Result};
use serde::{Deserialize, Serialize};

/// Tuning for silhouette extraction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilhouetteParams {
    /// Inverted-intensity cut; pixels at or above it are foreground.
    pub threshold: u8,
    /// Side of the square structuring element.
    pub kernel_size: u32,
    /// Opening repetitions; 0 disables the opening.
    pub iterations: u32,
}

impl Default for SilhouetteParams {
    fn default() -> Self {
        Self {
            threshold: 128,
            kernel_size: 3,
            iterations: 1,
        }
    }
}

/// Turn a grayscale frame into a foreground mask of its dark objects.
pub fn extract(frame: &Frame, params: &SilhouetteParams) -> Result<BinaryMask> {
    extract_with(&NativeOps, frame, params)
}

pub fn extract_with(
    ops: &impl ImageOps,
    frame: &Frame,
    params: &SilhouetteParams,
) -> Result<BinaryMask> {
    let mask = ops.threshold_inverted(frame, params.threshold)?;
    let opened = ops.open(&mask, params.kernel_size, params.iterations);
    tracing::trace!(
        "silhouette {}: {} -> {} foreground px",
        frame.camera_id,
        mask.foreground_count(),
        opened.foreground_count()
    );
    Ok(opened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, PixelFormat};

    fn scene(width: u32, height: u32, post: (u32, u32, u32, u32)) -> Frame {
        let (px, py, pw, ph) = post;
        let mut data = vec![220u8; (width * height) as usize];
        for y in py..py + ph {
            for x in px..px + pw {
                data[(y * width + x) as usize] = 20;
            }
        }
        Frame::gray("cam", width, height, data)
    }

    #[test]
    fn dark_post_becomes_foreground() {
        let f = scene(40, 40, (10, 5, 4, 30));
        let m = extract(&f, &SilhouetteParams::default()).unwrap();
        assert_eq!(m.width(), 40);
        assert_eq!(m.height(), 40);
        assert_eq!(m.foreground_count(), 4 * 30);
        assert!(m.get(11, 20));
        assert!(!m.get(20, 20));
    }

    #[test]
    fn thin_noise_is_opened_away() {
        let mut f = scene(40, 40, (10, 5, 4, 30));
        f.data[(35 * 40 + 35) as usize] = 0;
        let m = extract(&f, &SilhouetteParams::default()).unwrap();
        assert!(!m.get(35, 35));

        let raw = extract(
            &f,
            &SilhouetteParams {
                kernel_size: 1,
                iterations: 0,
                ..SilhouetteParams::default()
            },
        )
        .unwrap();
        assert!(raw.get(35, 35));
    }

    #[test]
    fn color_frame_is_invalid() {
        let mut f = scene(4, 4, (0, 0, 1, 1));
        f.pixel_format = PixelFormat::Bgr8;
        assert!(matches!(
            extract(&f, &SilhouetteParams::default()),
            Err(Error::InvalidFrame(_))
        ));
    }
}
