//! Pure-Rust pixel operations behind [`ImageOps`].
//!
//! Erosion and dilation with a square kernel are separable, so each runs as a
//! row pass followed by a column pass over prefix counts. Pixels outside the
//! mask never take part in either operation.

use crate::{BinaryMask, Error, Frame, ImageOps, Moments, PixelFormat, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct NativeOps;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Op {
    Erode,
    Dilate,
}

impl ImageOps for NativeOps {
    fn threshold_inverted(&self, frame: &Frame, threshold: u8) -> Result<BinaryMask> {
        if frame.is_empty() {
            return Err(Error::InvalidFrame(format!(
                "empty frame from {} ({}x{})",
                frame.camera_id, frame.width, frame.height
            )));
        }
        if frame.pixel_format != PixelFormat::Gray8 {
            return Err(Error::InvalidFrame(format!(
                "expected single-channel frame, got {:?}",
                frame.pixel_format
            )));
        }
        let expected = frame.width as usize * frame.height as usize;
        if frame.data.len() != expected {
            return Err(Error::InvalidFrame(format!(
                "buffer holds {} bytes, expected {}",
                frame.data.len(),
                expected
            )));
        }
        let pixels = frame.data.iter().map(|p| 255 - *p >= threshold).collect();
        Ok(BinaryMask::from_pixels(frame.width, frame.height, pixels))
    }

    fn open(&self, mask: &BinaryMask, kernel_size: u32, iterations: u32) -> BinaryMask {
        if kernel_size <= 1 || iterations == 0 {
            return mask.clone();
        }
        let mut out = mask.clone();
        for _ in 0..iterations {
            out = erode(&out, kernel_size);
        }
        for _ in 0..iterations {
            out = dilate(&out, kernel_size);
        }
        out
    }

    fn moments(&self, mask: &BinaryMask) -> Moments {
        let width = mask.width() as usize;
        let mut m = Moments::default();
        if width == 0 {
            return m;
        }
        for (idx, fg) in mask.pixels().iter().enumerate() {
            if *fg {
                m.m00 += 1.0;
                m.m10 += (idx % width) as f64;
                m.m01 += (idx / width) as f64;
            }
        }
        m
    }
}

pub fn erode(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    apply(mask, kernel_size, Op::Erode)
}

pub fn dilate(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    apply(mask, kernel_size, Op::Dilate)
}

fn apply(mask: &BinaryMask, kernel_size: u32, op: Op) -> BinaryMask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    if kernel_size <= 1 || width == 0 || height == 0 {
        return mask.clone();
    }
    let k = kernel_size as usize;
    // Anchor at the kernel center, as OpenCV does for even sizes too.
    let before = k / 2;
    let after = k - 1 - before;

    let rows = pass(mask.pixels(), width, height, before, after, op, true);
    let cols = pass(&rows, width, height, before, after, op, false);
    BinaryMask::from_pixels(mask.width(), mask.height(), cols)
}

fn pass(
    src: &[bool],
    width: usize,
    height: usize,
    before: usize,
    after: usize,
    op: Op,
    horizontal: bool,
) -> Vec<bool> {
    let (lines, len) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let index = |line: usize, i: usize| {
        if horizontal {
            line * width + i
        } else {
            i * width + line
        }
    };
    let mut out = vec![false; src.len()];
    let mut prefix = vec![0usize; len + 1];
    for line in 0..lines {
        for i in 0..len {
            prefix[i + 1] = prefix[i] + usize::from(src[index(line, i)]);
        }
        for i in 0..len {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(len - 1);
            let count = prefix[hi + 1] - prefix[lo];
            out[index(line, i)] = match op {
                Op::Erode => count == hi + 1 - lo,
                Op::Dilate => count > 0,
            };
        }
    }
    out
}
