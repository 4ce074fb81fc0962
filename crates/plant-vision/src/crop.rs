use crate::{Frame, Rect};

/// Cut `rect` out of `frame`.
///
/// The window is clipped to the frame the way array slicing clips, so a crop
/// lying past the frame edge produces an empty frame rather than an error.
pub fn crop(frame: &Frame, rect: &Rect) -> Frame {
    let channels = frame.pixel_format.channels();
    let x0 = rect.x.min(frame.width);
    let y0 = rect.y.min(frame.height);
    let x1 = rect.x.saturating_add(rect.width).min(frame.width);
    let y1 = rect.y.saturating_add(rect.height).min(frame.height);
    let width = x1 - x0;
    let height = y1 - y0;

    let stride = frame.width as usize * channels;
    let row_len = width as usize * channels;
    let mut data = Vec::with_capacity(row_len * height as usize);
    for y in y0..y1 {
        let start = y as usize * stride + x0 as usize * channels;
        match frame.data.get(start..start + row_len) {
            Some(row) => data.extend_from_slice(row),
            None => break,
        }
    }
    let height = if row_len == 0 {
        height
    } else {
        (data.len() / row_len) as u32
    };
    Frame {
        camera_id: frame.camera_id.clone(),
        width,
        height,
        pixel_format: frame.pixel_format,
        data,
        ts: frame.ts,
    }
}
