use crate::{centroid, crop, region, silhouette, BinaryMask, Centroid, Frame, Rect, Result};
use crate::{ImageOps, NativeOps, SilhouetteParams};

/// Everything the single-frame pipeline produced for one camera.
#[derive(Clone, Debug)]
pub struct Detection {
    pub cropped: Frame,
    pub mask: BinaryMask,
    pub centroid: Centroid,
    pub in_roi: bool,
}

/// Crop, extract, locate and classify one raw frame.
pub fn detect(
    frame: &Frame,
    crop_rect: &Rect,
    roi: &Rect,
    params: &SilhouetteParams,
) -> Result<Detection> {
    detect_with(&NativeOps, frame, crop_rect, roi, params)
}

pub fn detect_with(
    ops: &impl ImageOps,
    frame: &Frame,
    crop_rect: &Rect,
    roi: &Rect,
    params: &SilhouetteParams,
) -> Result<Detection> {
    let cropped = crop::crop(&frame.to_gray(), crop_rect);
    let mask = silhouette::extract_with(ops, &cropped, params)?;
    let centroid = centroid::locate_with(ops, &mask);
    let in_roi = region::classify(&centroid, roi);
    Ok(Detection {
        cropped,
        mask,
        centroid,
        in_roi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Point};

    fn post_frame() -> Frame {
        // 200x120 light frame with a dark 6px post at x=120..126, y=10..110
        let (w, h) = (200u32, 120u32);
        let mut data = vec![200u8; (w * h) as usize];
        for y in 10..110 {
            for x in 120..126 {
                data[(y * w + x) as usize] = 15;
            }
        }
        Frame::gray("169.254.207.1", w, h, data)
    }

    #[test]
    fn upright_post_lands_in_roi() {
        let d = detect(
            &post_frame(),
            &Rect::new(100, 0, 50, 120),
            &Rect::new(15, 40, 15, 40),
            &SilhouetteParams::default(),
        )
        .unwrap();
        assert_eq!((d.cropped.width, d.cropped.height), (50, 120));
        // x: 20..=25 -> 22.5 -> 23 ; y: 10..=109 -> 59.5 -> 60
        assert_eq!(d.centroid, Centroid::Measured(Point { x: 23, y: 60 }));
        assert!(d.in_roi);
    }

    #[test]
    fn crop_missing_the_frame_is_invalid() {
        let err = detect(
            &post_frame(),
            &Rect::new(700, 500, 750, 1000),
            &Rect::new(200, 0, 100, 1000),
            &SilhouetteParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFrame(_)));
    }
}
