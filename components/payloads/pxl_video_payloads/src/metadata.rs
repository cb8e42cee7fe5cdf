use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Frame level parameters travelling next to the pixel stream, one record per frame.
/// Stages pass it through, they don't interpret it.
#[derive(Default, Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub stream_id: u8,
    pub source_tag: u16,
    /// Width in pixels.
    pub x_size: u32,
    pub x_offset: u32,
    /// Height in lines.
    pub y_size: u32,
    pub y_offset: u32,
    /// Size of one line in bytes.
    pub line_size: u32,
    pub pixel_format: u16,
    pub tap_geometry: u16,
    pub flags: u32,
    pub timestamp: u32,
    pub processing_flags: u32,
    pub status: u32,
}

impl FrameMetadata {
    /// Record for a mono8 frame of the given size, everything else zeroed.
    pub fn mono8(width: u32, height: u32) -> Self {
        FrameMetadata {
            x_size: width,
            y_size: height,
            line_size: width,
            ..Default::default()
        }
    }
}
