use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array3, ArrayViewMut3};
use tracing::{debug, info, warn};

use crate::consts::CHANNEL_COUNT;
use crate::error::{LuckyError, Result};
use crate::frame::{Frame, FrameMetadata};
use crate::io::source::{Decoded, FrameDecoder, FrameSource, FrameView};
use crate::pipeline::{PipelineStage, ProgressReporter};

/// Ordered, independently owned frames extracted from one video.
///
/// All frames share one geometry; [`FrameStore::push`] rejects anything else.
#[derive(Clone, Debug, Default)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append a frame, enforcing uniform geometry.
    pub fn push(&mut self, frame: Frame) -> Result<()> {
        if let Some(expected) = self.geometry() {
            if frame.geometry() != expected {
                return Err(LuckyError::GeometryMismatch {
                    expected,
                    found: frame.geometry(),
                });
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// (height, width) shared by every frame, `None` when empty.
    pub fn geometry(&self) -> Option<(usize, usize)> {
        self.frames.first().map(Frame::geometry)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Mutable pixels of one frame. The view cannot change the frame's shape.
    pub fn pixels_mut(&mut self, index: usize) -> Option<ArrayViewMut3<'_, u8>> {
        self.frames.get_mut(index).map(|f| f.data.view_mut())
    }
}

impl TryFrom<Vec<Frame>> for FrameStore {
    type Error = LuckyError;

    fn try_from(frames: Vec<Frame>) -> Result<Self> {
        let mut store = Self::with_capacity(frames.len());
        for frame in frames {
            store.push(frame)?;
        }
        Ok(store)
    }
}

/// Reject scale factors that would make resampling meaningless.
pub fn validate_superres(superres: f64) -> Result<()> {
    if superres.is_finite() && superres > 0.0 {
        Ok(())
    } else {
        Err(LuckyError::InvalidScale(superres))
    }
}

/// Open `path` and drain it into a frame store.
pub fn extract_frames<D: FrameDecoder>(
    decoder: &D,
    path: &Path,
    superres: f64,
    reporter: &dyn ProgressReporter,
) -> Result<FrameStore> {
    validate_superres(superres)?;
    let mut source = decoder.open(path)?;
    build_frame_store(&mut source, superres, reporter)
}

/// Drain every frame from `source`, resampling by `superres` when it is not 1.
///
/// Invalid decode attempts are skipped but still counted as progress. The
/// container's frame estimate only feeds the progress total; the store holds
/// exactly the valid frames seen.
pub fn build_frame_store<S: FrameSource + ?Sized>(
    source: &mut S,
    superres: f64,
    reporter: &dyn ProgressReporter,
) -> Result<FrameStore> {
    validate_superres(superres)?;
    if superres < 1.0 {
        warn!(superres, "Super-resolution factor below 1 downsamples frames");
    }

    let expected = source.info().expected_frames;
    reporter.begin_stage(PipelineStage::Extracting, expected.known());

    let mut store = FrameStore::with_capacity(expected.known().unwrap_or(0));
    let mut attempts = 0usize;
    let mut skipped = 0usize;

    while let Some(decoded) = source.next_frame() {
        let decode_index = attempts;
        attempts += 1;
        match decoded {
            Decoded::Frame(view) => {
                let frame = copy_frame(view, decode_index, superres)?;
                store.push(frame)?;
            }
            Decoded::Invalid => {
                skipped += 1;
                debug!(decode_index, "Skipping invalid frame");
            }
        }
        reporter.advance(attempts);
    }
    reporter.advance(attempts);
    reporter.finish_stage();

    info!(
        frames = store.len(),
        skipped,
        expected = %expected,
        "Extracted frames"
    );
    if store.is_empty() {
        warn!("No valid frames in stream");
    }
    Ok(store)
}

/// Copy a borrowed decode buffer into an owned frame, resampling if asked.
fn copy_frame(view: FrameView<'_>, decode_index: usize, superres: f64) -> Result<Frame> {
    let native_geometry = (view.height, view.width);

    let data = if superres == 1.0 {
        Array3::from_shape_vec(
            (view.height, view.width, CHANNEL_COUNT),
            view.pixels.to_vec(),
        )?
    } else {
        resample(view, superres)?
    };

    let mut frame = Frame::new(data);
    frame.metadata = FrameMetadata {
        decode_index,
        native_geometry,
    };
    Ok(frame)
}

/// Bicubic (Catmull-Rom) resize to `round(size * scale)`, at least one pixel.
fn resample(view: FrameView<'_>, scale: f64) -> Result<Array3<u8>> {
    let invalid = LuckyError::InvalidDimensions {
        width: view.width,
        height: view.height,
    };
    let img = RgbImage::from_raw(view.width as u32, view.height as u32, view.pixels.to_vec())
        .ok_or(invalid)?;

    let new_w = scaled_len(view.width, scale);
    let new_h = scaled_len(view.height, scale);
    let resized = imageops::resize(&img, new_w as u32, new_h as u32, FilterType::CatmullRom);

    Ok(Array3::from_shape_vec(
        (new_h, new_w, CHANNEL_COUNT),
        resized.into_raw(),
    )?)
}

pub fn scaled_len(len: usize, scale: f64) -> usize {
    ((len as f64 * scale).round() as usize).max(1)
}
