//! Conversions between a row-major mono8 raster and a single frame element stream.

use crate::video::{ControlBits, PixMono8, VideoElement};
use pxl_traits::PxResult;

/// Lays out `pixels` as one frame of `width` pixels per line.
/// First element gets START_OF_FRAME, each line starts with START_OF_LINE and ends with
/// END_OF_LINE, the very last element also carries END_OF_FRAME.
pub fn frame_to_elements(pixels: &[u8], width: usize) -> PxResult<Vec<VideoElement>> {
    if width == 0 {
        return Err("Frame width must be at least 1 pixel.".into());
    }
    if pixels.is_empty() {
        return Err("Empty frame.".into());
    }
    if pixels.len() % width != 0 {
        return Err(format!(
            "Frame of {} pixels is not a whole number of {} pixel lines.",
            pixels.len(),
            width
        )
        .into());
    }

    let last = pixels.len() - 1;
    let elements = pixels
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let x = i % width;
            let mut ctrl = ControlBits::NONE;
            if i == 0 {
                ctrl = ctrl | ControlBits::START_OF_FRAME;
            }
            if x == 0 {
                ctrl = ctrl | ControlBits::START_OF_LINE;
            }
            if x == width - 1 {
                ctrl = ctrl | ControlBits::END_OF_LINE;
            }
            if i == last {
                ctrl = ctrl | ControlBits::END_OF_FRAME;
            }
            VideoElement {
                pixel: PixMono8(p),
                ctrl,
            }
        })
        .collect();
    Ok(elements)
}

/// Pixel values of the elements, in order.
pub fn elements_to_pixels(elements: &[VideoElement]) -> Vec<u8> {
    elements.iter().map(|e| e.pixel.0).collect()
}
