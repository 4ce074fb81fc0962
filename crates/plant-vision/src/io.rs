use crate::{BinaryMask, Centroid, Error, Frame, PixelFormat, Rect, Result};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use std::path::Path;

const ROI_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTROID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CENTROID_RADIUS: i32 = 5;

/// Read an image from disk as a Gray8 frame tagged with `camera_id`.
pub fn read_gray(path: impl AsRef<Path>, camera_id: &str) -> Result<Frame> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?
        .to_luma8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidFrame(format!("{} is empty", path.display())));
    }
    Ok(Frame::gray(camera_id, width, height, img.into_raw()))
}

/// Write any frame as PNG.
pub fn write_png(path: impl AsRef<Path>, frame: &Frame) -> Result<()> {
    match frame.pixel_format {
        PixelFormat::Gray8 => write_gray8_png(path.as_ref(), frame),
        PixelFormat::Rgb8 => write_rgb8_png(path.as_ref(), frame, false),
        PixelFormat::Bgr8 => write_rgb8_png(path.as_ref(), frame, true),
    }
}

fn write_gray8_png(path: &Path, frame: &Frame) -> Result<()> {
    let img = GrayImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| Error::InvalidFrame("buffer does not match dimensions".into()))?;
    img.save(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))
}

fn write_rgb8_png(path: &Path, frame: &Frame, swap: bool) -> Result<()> {
    let mut data = frame.data.clone();
    if swap {
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
    }
    let img = RgbImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| Error::InvalidFrame("buffer does not match dimensions".into()))?;
    img.save(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))
}

/// Render a mask in color with the ROI outline and the centroid marked.
pub fn annotate(mask: &BinaryMask, centroid: &Centroid, roi: &Rect) -> RgbImage {
    let mut img = RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get(x, y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    draw_rect_outline(&mut img, roi, 2);
    if let Some(p) = centroid.point() {
        if let (Ok(x), Ok(y)) = (i32::try_from(p.x), i32::try_from(p.y)) {
            draw_filled_circle_mut(&mut img, (x, y), CENTROID_RADIUS, CENTROID_COLOR);
        }
    }
    img
}

pub fn write_annotated_png(
    path: impl AsRef<Path>,
    mask: &BinaryMask,
    centroid: &Centroid,
    roi: &Rect,
) -> Result<()> {
    let path = path.as_ref();
    annotate(mask, centroid, roi)
        .save(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))
}

fn draw_rect_outline(img: &mut RgbImage, roi: &Rect, thickness: u32) {
    if roi.x > img.width() || roi.y > img.height() {
        return;
    }
    // The ROI is closed on both edges, so the outline spans width + 1 pixels.
    // Sides past the image only need to end off-canvas.
    let w = roi.width.saturating_add(1).min(img.width() + 2);
    let h = roi.height.saturating_add(1).min(img.height() + 2);
    for t in 0..thickness {
        let (Ok(x), Ok(y)) = (i32::try_from(roi.x + t), i32::try_from(roi.y + t)) else {
            return;
        };
        let (w, h) = (w.saturating_sub(2 * t), h.saturating_sub(2 * t));
        if w == 0 || h == 0 {
            return;
        }
        draw_hollow_rect_mut(img, imageproc::rect::Rect::at(x, y).of_size(w, h), ROI_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn gray_png_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.png");
        let frame = Frame::gray("cam", 3, 2, vec![0, 50, 100, 150, 200, 250]);
        write_png(&path, &frame).unwrap();
        let back = read_gray(&path, "cam").unwrap();
        assert_eq!((back.width, back.height), (3, 2));
        assert_eq!(back.data, frame.data);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_gray(dir.path().join("nope.png"), "c"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn annotation_marks_roi_and_centroid() {
        let mask = BinaryMask::empty(40, 40);
        let c = Centroid::Measured(Point { x: 20, y: 20 });
        let img = annotate(&mask, &c, &Rect::new(5, 5, 10, 10));
        assert_eq!(*img.get_pixel(20, 20), CENTROID_COLOR);
        assert_eq!(*img.get_pixel(5, 9), ROI_COLOR);
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn annotation_tolerates_roi_past_the_mask() {
        let mask = BinaryMask::empty(10, 10);
        let img = annotate(&mask, &Centroid::NoForeground, &Rect::new(200, 0, 100, 1000));
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn outline_covers_closed_roi_edges() {
        let mask = BinaryMask::empty(30, 30);
        let img = annotate(&mask, &Centroid::NoForeground, &Rect::new(5, 5, 10, 10));
        // both far edges are part of the ROI, and the line is two pixels wide
        assert_eq!(*img.get_pixel(15, 10), ROI_COLOR);
        assert_eq!(*img.get_pixel(10, 15), ROI_COLOR);
        assert_eq!(*img.get_pixel(14, 10), ROI_COLOR);
        assert_eq!(*img.get_pixel(13, 10), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(16, 10), Rgb([0, 0, 0]));
    }

    #[test]
    fn centroid_dot_has_radius_five() {
        let mask = BinaryMask::empty(40, 40);
        let c = Centroid::Measured(Point { x: 20, y: 20 });
        let img = annotate(&mask, &c, &Rect::new(0, 0, 1, 1));
        assert_eq!(*img.get_pixel(25, 20), CENTROID_COLOR);
        assert_eq!(*img.get_pixel(20, 15), CENTROID_COLOR);
        assert_eq!(*img.get_pixel(27, 20), Rgb([0, 0, 0]));
    }
}
