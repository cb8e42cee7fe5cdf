pub mod config;
pub mod queue;
pub mod runner;
pub mod stage;

pub use pxl_traits::{PixelSink, PixelSource, PxError, PxResult};

pub mod prelude {
    pub use crate::config::{read_configuration, ComponentConfig, PxConfig, StageConfig, Value};
    pub use crate::queue::{px_queue, QueueReader, QueueWriter};
    pub use crate::runner::{spawn_stage, RunStats, StageHandle, StagePorts};
    pub use crate::stage::{PxStage, PxStageLifecycle};
    pub use pxl_traits::{PixelSink, PixelSource, PxError, PxResult};
}
