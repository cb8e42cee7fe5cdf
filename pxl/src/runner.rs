//! The runner is what drives a stage inside a running pipeline.
//! Each stage gets its own thread and talks to its neighbours only through bounded queues:
//! one queue for the elements, one queue for the once-per-frame metadata records.

use crate::queue::{QueueReader, QueueWriter};
use crate::stage::PxStage;
use log::{debug, error, info};
use pxl_traits::{PxError, PxResult};
use std::fmt::{Display, Formatter};
use std::thread::{self, JoinHandle};

/// The queue ends a stage reads from and writes to.
///
/// The output record of a frame is sent after its last element. A caller draining all of
/// `video_out` before reading `meta_out` must give `meta_out` room for every frame, or the
/// stage blocks on the record while the caller waits for the elements to close.
pub struct StagePorts<I, O, M> {
    pub video_in: QueueReader<I>,
    pub video_out: QueueWriter<O>,
    pub meta_in: QueueReader<M>,
    pub meta_out: QueueWriter<M>,
}

/// What a stage did during its run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Number of completed invocations, one per frame.
    pub frames: u64,
    /// Number of elements forwarded over all frames.
    pub elements: u64,
}

impl Display for RunStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "frames: {}, elements: {}", self.frames, self.elements)
    }
}

/// Handle on a stage running on its own thread.
pub struct StageHandle {
    name: String,
    join_handle: JoinHandle<PxResult<RunStats>>,
}

impl StageHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the stage to end.
    /// The stage ends cleanly when its metadata input closes between two frames.
    pub fn join(self) -> PxResult<RunStats> {
        self.join_handle
            .join()
            .map_err(|_| PxError::from(format!("Stage {} panicked.", self.name)))?
    }
}

/// Starts `stage` on a dedicated thread.
///
/// The stage is started, then for every metadata record received it runs one invocation
/// and sends out the resulting record. Once the metadata queue is closed and drained the
/// stage is stopped and the thread ends, which closes the output queues in turn.
/// The stage is stopped as well when an invocation fails, the first error is returned.
/// See [`StagePorts`] for the order the outputs have to be drained in.
pub fn spawn_stage<S>(
    name: &str,
    mut stage: S,
    ports: StagePorts<S::Input, S::Output, S::Meta>,
) -> PxResult<StageHandle>
where
    S: PxStage + Send + 'static,
    S::Input: Send + 'static,
    S::Output: Send + 'static,
    S::Meta: Default + Send + 'static,
{
    let thread_name = name.to_string();
    let join_handle = thread::Builder::new()
        .name(format!("pxl-{}", name))
        .spawn(move || {
            let result = run_stage(&thread_name, &mut stage, ports);
            if let Err(e) = &result {
                error!("Stage {} failed: {}", thread_name, e);
            }
            result
        })
        .map_err(|e| PxError::new_with_cause("Failed to spawn the stage thread", e))?;

    Ok(StageHandle {
        name: name.to_string(),
        join_handle,
    })
}

fn run_stage<S>(
    name: &str,
    stage: &mut S,
    ports: StagePorts<S::Input, S::Output, S::Meta>,
) -> PxResult<RunStats>
where
    S: PxStage,
    S::Meta: Default,
{
    info!("Starting stage {}", name);
    stage.start()?;

    let mut stats = RunStats::default();
    let result = run_frames(name, stage, ports, &mut stats);
    let stopped = stage.stop();
    result?;
    stopped?;
    info!("Stage {} done, {}", name, stats);
    Ok(stats)
}

fn run_frames<S>(
    name: &str,
    stage: &mut S,
    ports: StagePorts<S::Input, S::Output, S::Meta>,
    stats: &mut RunStats,
) -> PxResult<()>
where
    S: PxStage,
    S::Meta: Default,
{
    let StagePorts {
        mut video_in,
        mut video_out,
        meta_in,
        meta_out,
    } = ports;

    while let Some(meta) = meta_in.recv() {
        let mut out_meta = S::Meta::default();
        let forwarded = stage
            .process(&mut video_in, &mut video_out, &meta, &mut out_meta)
            .map_err(|e| e.add_cause(&format!("stage {} frame #{}", name, stats.frames)))?;
        meta_out.send(out_meta)?;
        debug!("Stage {} frame #{}: {} elements", name, stats.frames, forwarded);
        stats.frames += 1;
        stats.elements += forwarded as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentConfig;
    use crate::queue::px_queue;
    use crate::stage::PxStageLifecycle;
    use pxl_traits::{PixelSink, PixelSource};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Frames are runs of u32, a 0 ends the frame.
    struct Doubler;

    impl PxStageLifecycle for Doubler {
        fn new(_config: Option<&ComponentConfig>) -> PxResult<Self> {
            Ok(Doubler)
        }
    }

    impl PxStage for Doubler {
        type Input = u32;
        type Output = u32;
        type Meta = String;

        fn process(
            &mut self,
            input: &mut dyn PixelSource<u32>,
            output: &mut dyn PixelSink<u32>,
            meta_in: &String,
            meta_out: &mut String,
        ) -> PxResult<usize> {
            meta_out.clone_from(meta_in);
            let mut count = 0;
            loop {
                let v = input.pull()?;
                output.push(v * 2)?;
                count += 1;
                if v == 0 {
                    return Ok(count);
                }
            }
        }
    }

    /// Doubler that records its stop.
    struct Tracked {
        stopped: Arc<AtomicBool>,
    }

    impl PxStageLifecycle for Tracked {
        fn new(_config: Option<&ComponentConfig>) -> PxResult<Self> {
            Ok(Tracked {
                stopped: Arc::new(AtomicBool::new(false)),
            })
        }

        fn stop(&mut self) -> PxResult<()> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    impl PxStage for Tracked {
        type Input = u32;
        type Output = u32;
        type Meta = String;

        fn process(
            &mut self,
            input: &mut dyn PixelSource<u32>,
            output: &mut dyn PixelSink<u32>,
            meta_in: &String,
            meta_out: &mut String,
        ) -> PxResult<usize> {
            Doubler.process(input, output, meta_in, meta_out)
        }
    }

    #[test]
    fn test_run_two_frames() {
        let (video_tx, video_in) = px_queue(4);
        let (video_out, video_rx) = px_queue(4);
        let (meta_tx, meta_in) = px_queue(1);
        // metadata is only drained after the elements, leave it room
        let (meta_out, meta_rx) = px_queue(4);

        let handle = spawn_stage(
            "doubler",
            Doubler::new(None).unwrap(),
            StagePorts {
                video_in,
                video_out,
                meta_in,
                meta_out,
            },
        )
        .unwrap();
        assert_eq!(handle.name(), "doubler");

        let feeder = thread::spawn(move || {
            for (meta, frame) in [("a", vec![1, 2, 0]), ("b", vec![5, 0])] {
                meta_tx.send(meta.to_string()).unwrap();
                for v in frame {
                    video_tx.send(v).unwrap();
                }
            }
        });

        let elements: Vec<u32> = video_rx.collect();
        let metas: Vec<String> = meta_rx.collect();
        feeder.join().unwrap();

        assert_eq!(elements, vec![2, 4, 0, 10, 0]);
        assert_eq!(metas, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            handle.join().unwrap(),
            RunStats {
                frames: 2,
                elements: 5
            }
        );
    }

    #[test]
    fn test_truncated_frame_is_an_error() {
        let (video_tx, video_in) = px_queue(4);
        let (video_out, _video_rx) = px_queue(4);
        let (meta_tx, meta_in) = px_queue(1);
        let (meta_out, _meta_rx) = px_queue(1);

        let handle = spawn_stage(
            "doubler",
            Doubler,
            StagePorts {
                video_in,
                video_out,
                meta_in,
                meta_out,
            },
        )
        .unwrap();

        meta_tx.send("a".to_string()).unwrap();
        video_tx.send(3).unwrap();
        drop(video_tx);
        drop(meta_tx);

        let err = handle.join().unwrap_err();
        assert_eq!(err.message(), "Queue closed before the end of the frame.");
        assert_eq!(err.cause(), Some("stage doubler frame #0"));
    }

    #[test]
    fn test_stage_is_stopped_after_a_failed_frame() {
        let stage = Tracked::new(None).unwrap();
        let stopped = stage.stopped.clone();
        let (video_tx, video_in) = px_queue(4);
        let (video_out, _video_rx) = px_queue(4);
        let (meta_tx, meta_in) = px_queue(1);
        let (meta_out, _meta_rx) = px_queue(1);

        let handle = spawn_stage(
            "tracked",
            stage,
            StagePorts {
                video_in,
                video_out,
                meta_in,
                meta_out,
            },
        )
        .unwrap();

        meta_tx.send("a".to_string()).unwrap();
        video_tx.send(3).unwrap();
        drop(video_tx);
        drop(meta_tx);

        assert!(handle.join().is_err());
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_no_frames() {
        let (_video_tx, video_in) = px_queue::<u32>(4);
        let (video_out, _video_rx) = px_queue(4);
        let (meta_tx, meta_in) = px_queue::<String>(1);
        let (meta_out, _meta_rx) = px_queue(1);
        drop(meta_tx);

        let handle = spawn_stage(
            "idle",
            Doubler,
            StagePorts {
                video_in,
                video_out,
                meta_in,
                meta_out,
            },
        )
        .unwrap();
        assert_eq!(handle.join().unwrap(), RunStats::default());
    }
}
