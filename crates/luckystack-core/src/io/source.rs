use std::path::Path;

use crate::error::Result;
use crate::frame::VideoInfo;

/// Borrowed view of one decoded BGR8 frame.
///
/// The slice points into the source's reused decode buffer and is only valid
/// until the next call to [`FrameSource::next_frame`]; callers that keep a
/// frame must copy it.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub width: usize,
    pub height: usize,
    /// Interleaved B, G, R, row-major, `width * height * 3` bytes.
    pub pixels: &'a [u8],
}

/// Outcome of one decode attempt.
#[derive(Debug)]
pub enum Decoded<'a> {
    Frame(FrameView<'a>),
    /// The attempt produced a partial or corrupt frame.
    Invalid,
}

/// An opened video yielding decoded frames in stream order.
///
/// Dropping the source closes it.
pub trait FrameSource {
    fn info(&self) -> &VideoInfo;

    /// Decode the next frame. `None` marks end of stream.
    fn next_frame(&mut self) -> Option<Decoded<'_>>;
}

/// Opens video files for decoding.
///
/// The pipeline only depends on this capability, so any container or codec
/// library can be plugged in behind it.
pub trait FrameDecoder {
    type Source: FrameSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;
}
