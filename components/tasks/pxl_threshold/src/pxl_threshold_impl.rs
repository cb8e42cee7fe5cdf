use log::debug;
use pxl::prelude::*;
use pxl_video_payloads::{FrameMetadata, PixMono8, VideoElement};

/// Moves one frame from `video_in` to `video_out`, element by element, through `map`.
/// Stops right after forwarding the element carrying END_OF_FRAME and returns the element count.
/// The framing bits that decide the end of the frame are the input ones.
pub fn forward_frame<I, O, F>(video_in: &mut I, video_out: &mut O, mut map: F) -> PxResult<usize>
where
    I: PixelSource<VideoElement> + ?Sized,
    O: PixelSink<VideoElement> + ?Sized,
    F: FnMut(VideoElement) -> VideoElement,
{
    let mut forwarded = 0;
    loop {
        let element = video_in.pull().map_err(|e| {
            e.add_cause(&format!(
                "input stream ended after {} elements without an end of frame",
                forwarded
            ))
        })?;
        let last = element.ctrl.is_end_of_frame();
        video_out.push(map(element))?;
        forwarded += 1;
        if last {
            return Ok(forwarded);
        }
    }
}

/// Thresholds one frame.
///
/// `meta_out` receives a copy of `meta_in`, once. Every element of the frame is forwarded in
/// order with its control bits untouched and its pixel replaced by `PixMono8::HIGH` when
/// `pixel >= threshold`, `PixMono8::LOW` otherwise.
/// Returns once the END_OF_FRAME element has been forwarded, with the number of elements.
///
/// A source that closes before the end of frame is an error, whatever was already forwarded stays
/// forwarded. A source that stays open without ever ending the frame blocks this call forever.
pub fn pix_threshold<I, O, M>(
    video_in: &mut I,
    video_out: &mut O,
    meta_in: &M,
    meta_out: &mut M,
    threshold: PixMono8,
) -> PxResult<usize>
where
    I: PixelSource<VideoElement> + ?Sized,
    O: PixelSink<VideoElement> + ?Sized,
    M: Clone,
{
    meta_out.clone_from(meta_in);
    forward_frame(video_in, video_out, |element| element.thresholded(threshold))
}

/// Stage wrapper around [`pix_threshold`].
///
/// Config keys:
/// - `threshold`: integer in 0..=255, required.
/// - `bypass`: bool, defaults to false. When set, pixels go through unchanged.
#[derive(Debug, Clone)]
pub struct PixThreshold {
    threshold: PixMono8,
    bypass: bool,
}

impl PixThreshold {
    pub fn with_threshold(threshold: PixMono8) -> Self {
        PixThreshold {
            threshold,
            bypass: false,
        }
    }

    pub fn threshold(&self) -> PixMono8 {
        self.threshold
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }
}

impl PxStageLifecycle for PixThreshold {
    fn new(config: Option<&ComponentConfig>) -> PxResult<Self>
    where
        Self: Sized,
    {
        let config = config.ok_or("No config provided for PixThreshold.")?;
        let threshold = config
            .get::<u8>("threshold")?
            .ok_or("Missing required 'threshold' config for PixThreshold.")?;
        let bypass = config.get::<bool>("bypass")?.unwrap_or(false);
        Ok(PixThreshold {
            threshold: PixMono8(threshold),
            bypass,
        })
    }

    fn start(&mut self) -> PxResult<()> {
        debug!("PixThreshold: threshold {}, bypass {}", self.threshold, self.bypass);
        Ok(())
    }
}

impl PxStage for PixThreshold {
    type Input = VideoElement;
    type Output = VideoElement;
    type Meta = FrameMetadata;

    fn process(
        &mut self,
        input: &mut dyn PixelSource<VideoElement>,
        output: &mut dyn PixelSink<VideoElement>,
        meta_in: &FrameMetadata,
        meta_out: &mut FrameMetadata,
    ) -> PxResult<usize> {
        if self.bypass {
            meta_out.clone_from(meta_in);
            return forward_frame(input, output, |element| element);
        }
        pix_threshold(input, output, meta_in, meta_out, self.threshold)
    }
}
