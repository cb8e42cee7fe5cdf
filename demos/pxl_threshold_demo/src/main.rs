use clap::Parser;
use log::{error, info};
use pxl::prelude::*;
use pxl_helpers::basic_pxl_setup;
use pxl_threshold::PixThreshold;
use pxl_video_payloads::{elements_to_pixels, frame_to_elements, FrameMetadata, VideoElement};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

/// Thresholds raw mono8 frames (one byte per pixel, row-major, frames back to back).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct DemoCli {
    /// Pipeline configuration.
    #[arg(short, long, default_value = "pipeline.ron")]
    config: PathBuf,

    /// Id of the threshold stage in the configuration.
    #[arg(long, default_value = "threshold")]
    stage: String,

    /// Raw mono8 input.
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the thresholded raw mono8 output.
    #[arg(short, long)]
    output: PathBuf,

    /// Frame width in pixels.
    #[arg(short, long)]
    width: u32,

    /// Frame height in lines. Without it the whole input is a single frame.
    #[arg(long)]
    height: Option<u32>,

    /// Overrides the threshold of the configuration.
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Forward pixels unchanged.
    #[arg(long)]
    bypass: bool,

    /// Dump the output metadata records (bincode) to this file.
    #[arg(long)]
    metadata_out: Option<PathBuf>,

    /// Debug level logs.
    #[arg(short, long)]
    verbose: bool,
}

fn split_frames(
    raw: &[u8],
    width: u32,
    height: Option<u32>,
) -> PxResult<Vec<(FrameMetadata, &[u8])>> {
    if raw.is_empty() {
        return Err("Input is empty.".into());
    }
    let width = width as usize;
    let frame_size = match height {
        Some(h) => width * h as usize,
        None => raw.len(),
    };
    if frame_size == 0 || raw.len() % frame_size != 0 {
        return Err(format!(
            "Input of {} bytes is not a whole number of {} byte frames.",
            raw.len(),
            frame_size
        )
        .into());
    }
    Ok(raw
        .chunks(frame_size)
        .enumerate()
        .map(|(i, chunk)| {
            let lines = chunk.len() / width.max(1);
            let mut meta = FrameMetadata::mono8(width as u32, lines as u32);
            meta.timestamp = i as u32;
            (meta, chunk)
        })
        .collect())
}

fn build_stage(cli: &DemoCli, config: &PxConfig) -> PxResult<PixThreshold> {
    let stage = config.find_stage(&cli.stage).ok_or_else(|| {
        PxError::from(format!("No stage {:?} in {:?}", cli.stage, cli.config))
    })?;
    let mut stage_config = stage.get_instance_config().cloned().unwrap_or_default();
    if let Some(threshold) = cli.threshold {
        stage_config.set("threshold", threshold);
    }
    if cli.bypass {
        stage_config.set("bypass", true);
    }
    info!("Stage {} config: {}", cli.stage, stage_config);
    PixThreshold::new(Some(&stage_config))
}

fn run(cli: &DemoCli) -> PxResult<RunStats> {
    let config = read_configuration(&cli.config)?;
    let capacity = config.queue_capacity;
    let stage = build_stage(cli, &config)?;

    let raw = fs::read(&cli.input).map_err(|e| {
        PxError::from(format!("Failed to read input {:?}", cli.input)).add_cause(&e.to_string())
    })?;
    let frames = split_frames(&raw, cli.width, cli.height)?
        .into_iter()
        .map(|(meta, pixels)| {
            frame_to_elements(pixels, cli.width as usize).map(|elements| (meta, elements))
        })
        .collect::<PxResult<Vec<(FrameMetadata, Vec<VideoElement>)>>>()?;
    info!("{} frame(s) of {} pixels wide", frames.len(), cli.width);

    let (video_tx, video_in) = px_queue(capacity);
    let (video_out, video_rx) = px_queue(capacity);
    let (meta_tx, meta_in) = px_queue(1);
    let (meta_out, meta_rx) = px_queue(frames.len());

    let handle = spawn_stage(
        &cli.stage,
        stage,
        StagePorts {
            video_in,
            video_out,
            meta_in,
            meta_out,
        },
    )?;

    let feeder = thread::spawn(move || -> PxResult<()> {
        for (meta, elements) in frames {
            meta_tx.send(meta)?;
            for element in elements {
                video_tx.send(element)?;
            }
        }
        Ok(())
    });

    let elements: Vec<VideoElement> = video_rx.collect();
    let metas: Vec<FrameMetadata> = meta_rx.collect();
    let stats = handle.join()?;
    feeder
        .join()
        .map_err(|_| PxError::from("Feeder thread panicked."))??;

    fs::write(&cli.output, elements_to_pixels(&elements)).map_err(|e| {
        PxError::from(format!("Failed to write output {:?}", cli.output)).add_cause(&e.to_string())
    })?;

    if let Some(path) = &cli.metadata_out {
        let encoded = bincode::encode_to_vec(&metas, bincode::config::standard())
            .map_err(|e| PxError::new_with_cause("Failed to encode the metadata records", e))?;
        fs::write(path, encoded).map_err(|e| {
            PxError::from(format!("Failed to write metadata {:?}", path)).add_cause(&e.to_string())
        })?;
    }
    Ok(stats)
}

fn main() -> ExitCode {
    let cli = DemoCli::parse();
    if let Err(e) = basic_pxl_setup(cli.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(stats) => {
            info!("Done, {}", stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
