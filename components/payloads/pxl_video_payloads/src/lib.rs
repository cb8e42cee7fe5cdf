mod metadata;
mod raster;
mod video;

pub use metadata::FrameMetadata;
pub use raster::{elements_to_pixels, frame_to_elements};
pub use video::{ControlBits, PixMono8, VideoElement};
