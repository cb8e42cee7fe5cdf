use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::BitOr;

/// An 8 bit monochrome intensity.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct PixMono8(pub u8);

impl PixMono8 {
    /// Value of a pixel classified below the threshold.
    pub const LOW: PixMono8 = PixMono8(u8::MIN);
    /// Value of a pixel classified at or above the threshold.
    pub const HIGH: PixMono8 = PixMono8(u8::MAX);

    /// Binarize against `threshold`: HIGH when self >= threshold, LOW otherwise.
    /// A pixel exactly at the threshold is HIGH.
    #[inline]
    pub fn classify(self, threshold: PixMono8) -> PixMono8 {
        if self >= threshold {
            PixMono8::HIGH
        } else {
            PixMono8::LOW
        }
    }
}

impl From<u8> for PixMono8 {
    fn from(value: u8) -> Self {
        PixMono8(value)
    }
}

impl From<PixMono8> for u8 {
    fn from(value: PixMono8) -> Self {
        value.0
    }
}

impl Display for PixMono8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Framing bits carried along every pixel.
///
/// Bit 0 start of frame, bit 1 start of line, bit 2 end of line, bit 3 end of frame.
/// The upper bits are reserved and carried as is.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct ControlBits(pub u8);

impl ControlBits {
    pub const NONE: ControlBits = ControlBits(0);
    pub const START_OF_FRAME: ControlBits = ControlBits(1 << 0);
    pub const START_OF_LINE: ControlBits = ControlBits(1 << 1);
    pub const END_OF_LINE: ControlBits = ControlBits(1 << 2);
    pub const END_OF_FRAME: ControlBits = ControlBits(1 << 3);

    #[inline]
    pub fn contains(self, other: ControlBits) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_start_of_frame(self) -> bool {
        self.contains(ControlBits::START_OF_FRAME)
    }

    #[inline]
    pub fn is_end_of_line(self) -> bool {
        self.contains(ControlBits::END_OF_LINE)
    }

    /// The terminal marker of a frame.
    #[inline]
    pub fn is_end_of_frame(self) -> bool {
        self.contains(ControlBits::END_OF_FRAME)
    }
}

impl BitOr for ControlBits {
    type Output = ControlBits;

    fn bitor(self, rhs: ControlBits) -> ControlBits {
        ControlBits(self.0 | rhs.0)
    }
}

impl Display for ControlBits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = [
            (ControlBits::START_OF_FRAME, "SOF"),
            (ControlBits::START_OF_LINE, "SOL"),
            (ControlBits::END_OF_LINE, "EOL"),
            (ControlBits::END_OF_FRAME, "EOF"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", set.join("|"))
        }
    }
}

/// One element of a video stream: a pixel and its framing bits.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct VideoElement {
    pub pixel: PixMono8,
    pub ctrl: ControlBits,
}

impl VideoElement {
    pub fn new(pixel: u8, ctrl: ControlBits) -> Self {
        VideoElement {
            pixel: PixMono8(pixel),
            ctrl,
        }
    }

    /// Same element with its pixel binarized, the control bits are untouched.
    #[inline]
    pub fn thresholded(self, threshold: PixMono8) -> Self {
        VideoElement {
            pixel: self.pixel.classify(threshold),
            ctrl: self.ctrl,
        }
    }
}
