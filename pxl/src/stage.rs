//! This module contains the traits you need to implement or interact with to create a pxl stage.

use crate::config::ComponentConfig;
use pxl_traits::{PixelSink, PixelSource, PxResult};

/// The PxStageLifecycle trait is the base trait for all stages in pxl.
/// It provides a default empty implementation as the start and stop steps are optional.
pub trait PxStageLifecycle {
    fn new(config: Option<&ComponentConfig>) -> PxResult<Self>
    where
        Self: Sized;

    /// Start is called once before the first frame goes through the stage.
    fn start(&mut self) -> PxResult<()> {
        Ok(())
    }

    /// Called at the end of the lifecycle of the stage, after the last frame.
    fn stop(&mut self) -> PxResult<()> {
        Ok(())
    }
}

/// A streaming transform between two pixel streams, with a side channel record
/// copied from input to output once per invocation.
///
/// One call to `process` handles exactly one frame: it reads one `Meta` record, writes one,
/// and moves elements from `input` to `output` until the frame is complete.
/// The stage only ever sees the pull/push capabilities of the streams, never a concrete queue.
pub trait PxStage: PxStageLifecycle {
    type Input;
    type Output;
    type Meta: Clone;

    /// Returns the number of elements forwarded to `output`.
    fn process(
        &mut self,
        input: &mut dyn PixelSource<Self::Input>,
        output: &mut dyn PixelSink<Self::Output>,
        meta_in: &Self::Meta,
        meta_out: &mut Self::Meta,
    ) -> PxResult<usize>;
}
