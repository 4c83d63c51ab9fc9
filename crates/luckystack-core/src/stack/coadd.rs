use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{CHANNEL_COUNT, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::{CoaddedImage, Frame};
use crate::pipeline::{PipelineStage, ProgressReporter};
use crate::store::FrameStore;

/// How frames are summed into the accumulator.
///
/// Both modes add frames in store order; `Parallel` splits each addition
/// across pixels, so results are identical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoaddMode {
    #[default]
    Sequential,
    Parallel,
}

impl std::fmt::Display for CoaddMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::Parallel => write!(f, "Parallel"),
        }
    }
}

/// Average every frame in the store.
///
/// Frames are widened to f64 before summing, so any number of 8-bit frames
/// accumulates without overflow. Returns `None` for an empty store. The
/// result stays in floating point; narrowing is left to the caller.
pub fn coadd(
    store: &FrameStore,
    mode: CoaddMode,
    reporter: &dyn ProgressReporter,
) -> Option<CoaddedImage> {
    let (h, w) = store.geometry()?;
    let n = store.len();

    info!(frames = n, width = w, height = h, %mode, "Coadding frames");
    reporter.begin_stage(PipelineStage::Coadding, Some(n));
    reporter.advance(0);

    let mut sum = Array3::<f64>::zeros((h, w, CHANNEL_COUNT));
    for (i, frame) in store.iter().enumerate() {
        accumulate(&mut sum, frame, mode);
        reporter.advance(i + 1);
    }

    debug!("Dividing accumulator by frame count");
    sum /= n as f64;
    reporter.finish_stage();

    Some(CoaddedImage {
        data: sum,
        frame_count: n,
    })
}

fn accumulate(sum: &mut Array3<f64>, frame: &Frame, mode: CoaddMode) {
    let (h, w) = frame.geometry();
    let zip = Zip::from(sum).and(&frame.data);
    if mode == CoaddMode::Parallel && h * w >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(|acc, &v| *acc += f64::from(v));
    } else {
        zip.for_each(|acc, &v| *acc += f64::from(v));
    }
}
