mod pxl_threshold_impl;

pub use pxl_threshold_impl::{forward_frame, pix_threshold, PixThreshold};
