use core::fmt;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    Bgr8,
    Rgb8,
    Gray8,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
        }
    }
}

/// A raw frame as delivered by a [`crate::FrameSource`], row-major.
#[derive(Clone, Debug)]
pub struct Frame {
    pub camera_id: String,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub data: Vec<u8>,
    pub ts: Option<OffsetDateTime>,
}

impl Frame {
    /// Build a Gray8 frame; `data` must hold `width * height` bytes.
    pub fn gray(camera_id: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            camera_id: camera_id.into(),
            width,
            height,
            pixel_format: PixelFormat::Gray8,
            data,
            ts: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Convert to single-channel luma if the frame is color.
    pub fn to_gray(&self) -> Frame {
        if self.pixel_format == PixelFormat::Gray8 {
            return self.clone();
        }
        let (r_idx, b_idx) = match self.pixel_format {
            PixelFormat::Rgb8 => (0, 2),
            _ => (2, 0),
        };
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let r = px[r_idx] as u32;
                let g = px[1] as u32;
                let b = px[b_idx] as u32;
                // ITU-R BT.601 luma in fixed point
                ((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8
            })
            .collect();
        Frame {
            camera_id: self.camera_id.clone(),
            width: self.width,
            height: self.height,
            pixel_format: PixelFormat::Gray8,
            data,
            ts: self.ts,
        }
    }
}

/// Axis-aligned rectangle in pixel coordinates.
///
/// Used both as a crop window and as a region of interest. No bounds are
/// checked against any particular frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect with a zero side cannot be used as crop or ROI.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Closed-interval containment: both edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        let x_end = self.x as u64 + self.width as u64;
        let y_end = self.y as u64 + self.height as u64;
        (self.x as u64) <= p.x as u64
            && p.x as u64 <= x_end
            && (self.y as u64) <= p.y as u64
            && p.y as u64 <= y_end
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl core::str::FromStr for Rect {
    type Err = String;

    /// Parse `x,y,w,h`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected x,y,w,h but got '{s}'"));
        }
        let mut vals = [0u32; 4];
        for (slot, part) in vals.iter_mut().zip(parts.iter()) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid rect component '{part}'"))?;
        }
        let rect = Rect::new(vals[0], vals[1], vals[2], vals[3]);
        if rect.is_degenerate() {
            return Err(format!("rect '{s}' has zero width or height"));
        }
        Ok(rect)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Two-level image: `true` is foreground.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl BinaryMask {
    pub(crate) fn from_pixels(width: u32, height: u32, pixels: Vec<bool>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// All-background mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self::from_pixels(width, height, vec![false; width as usize * height as usize])
    }

    /// Mask with a filled rectangle of foreground, clipped to the mask.
    pub fn with_filled_rect(width: u32, height: u32, rect: Rect) -> Self {
        let mut pixels = vec![false; width as usize * height as usize];
        let x1 = rect.x.saturating_add(rect.width).min(width);
        let y1 = rect.y.saturating_add(rect.height).min(height);
        for y in rect.y.min(height)..y1 {
            for x in rect.x.min(width)..x1 {
                pixels[y as usize * width as usize + x as usize] = true;
            }
        }
        Self::from_pixels(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn foreground_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    pub(crate) fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Render as 0/255 bytes, row-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().map(|p| if *p { 255 } else { 0 }).collect()
    }
}

/// Center of mass of a mask's foreground.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Centroid {
    Measured(Point),
    /// The mask had no foreground pixels.
    NoForeground,
}

impl Centroid {
    pub fn point(&self) -> Option<Point> {
        match self {
            Centroid::Measured(p) => Some(*p),
            Centroid::NoForeground => None,
        }
    }

    /// Legacy view: an empty mask reports `(0, 0)`.
    pub fn point_or_origin(&self) -> Point {
        self.point().unwrap_or_default()
    }
}

impl fmt::Display for Centroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Centroid::Measured(p) => write!(f, "{p}"),
            Centroid::NoForeground => write!(f, "none"),
        }
    }
}
