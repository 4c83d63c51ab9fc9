use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::Result;
use crate::filters::sharpen_coadd;
use crate::io::image_io::{save_bgr8, save_coadd_tiff};
use crate::io::source::FrameDecoder;
use crate::stack::coadd;
use crate::store::extract_frames;

use super::config::PipelineConfig;
use super::types::{PipelineOutput, PipelineStage, ProgressReporter, VideoReport, VideoResult};

/// Extract, coadd and sharpen one video.
///
/// A video without valid frames yields [`PipelineOutput::NoImage`].
pub fn process_video<D: FrameDecoder>(
    decoder: &D,
    path: &Path,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutput> {
    info!(path = %path.display(), superres = config.superres, "Processing video");

    let store = extract_frames(decoder, path, config.superres, reporter)?;
    let Some(coadded) = coadd(&store, config.coadd.mode, reporter) else {
        warn!(path = %path.display(), "No image produced");
        return Ok(PipelineOutput::NoImage);
    };
    drop(store);

    reporter.begin_stage(PipelineStage::Sharpening, None);
    let sharpened = sharpen_coadd(&coadded, &config.sharpen);
    reporter.finish_stage();
    info!(
        kernel = config.sharpen.kernel_size,
        sigma = config.sharpen.sigma,
        strength = config.sharpen.strength(),
        "Sharpening complete"
    );

    Ok(PipelineOutput::Image(VideoResult { coadded, sharpened }))
}

/// Process every configured video in order.
///
/// Configuration problems fail the whole run before any video is opened.
/// A failing video is recorded in its report and the run moves on.
pub fn run_pipeline<D: FrameDecoder>(
    decoder: &D,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<VideoReport>> {
    config.validate()?;
    if let Some(nframes) = config.nframes {
        warn!(nframes, "Frame count limit is accepted but not applied; all frames are coadded");
    }

    let mut reports = Vec::with_capacity(config.videos.len());
    for video in &config.videos {
        let (outcome, written) = match process_and_write(decoder, video, config, reporter) {
            Ok((output, written)) => (Ok(output), written),
            Err(e) => {
                error!(video = %video.display(), error = %e, "Video failed");
                (Err(e), Vec::new())
            }
        };
        reports.push(VideoReport {
            video: video.clone(),
            outcome,
            written,
        });
    }
    Ok(reports)
}

fn process_and_write<D: FrameDecoder>(
    decoder: &D,
    video: &Path,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<(PipelineOutput, Vec<PathBuf>)> {
    let output = process_video(decoder, video, config, reporter)?;
    let written = match (&config.output.dir, output.image()) {
        (Some(dir), Some(result)) => {
            write_outputs(video, dir, result, config.output.save_coadd, reporter)?
        }
        _ => Vec::new(),
    };
    Ok((output, written))
}

fn write_outputs(
    video: &Path,
    dir: &Path,
    result: &VideoResult,
    save_coadd: bool,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<PathBuf>> {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());

    reporter.begin_stage(PipelineStage::Writing, Some(if save_coadd { 2 } else { 1 }));
    std::fs::create_dir_all(dir)?;

    let sharpened_path = dir.join(format!("{stem}_lucky.png"));
    save_bgr8(&result.sharpened, &sharpened_path)?;
    reporter.advance(1);
    let mut written = vec![sharpened_path];

    if save_coadd {
        let coadd_path = dir.join(format!("{stem}_coadd.tiff"));
        save_coadd_tiff(&result.coadded, &coadd_path)?;
        reporter.advance(2);
        written.push(coadd_path);
    }
    reporter.finish_stage();

    for path in &written {
        info!(path = %path.display(), "Wrote output");
    }
    Ok(written)
}
