use ndarray::Array3;
use std::path::PathBuf;

use crate::consts::CHANNEL_COUNT;

/// A single 8-bit color frame.
/// Pixels are interleaved B, G, R; shape = (height, width, 3).
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major.
    pub data: Array3<u8>,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// A frame with every channel of every pixel set to `value`.
    pub fn filled(height: usize, width: usize, value: u8) -> Self {
        Self::new(Array3::from_elem((height, width, CHANNEL_COUNT), value))
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// (height, width)
    pub fn geometry(&self) -> (usize, usize) {
        (self.height(), self.width())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    /// Position of this frame among all decode attempts, including skipped ones.
    pub decode_index: usize,
    /// Native size before resampling as (height, width).
    pub native_geometry: (usize, usize),
}

/// Floating-point average of a frame store. Never narrowed by the stacker.
#[derive(Clone, Debug)]
pub struct CoaddedImage {
    /// Per-channel means, shape = (height, width, 3).
    pub data: Array3<f64>,
    /// Number of frames that went into the average.
    pub frame_count: usize,
}

impl CoaddedImage {
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }
}

/// Frame count advertised by the container. Advisory only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedFrames {
    Known(usize),
    Unknown,
}

impl ExpectedFrames {
    pub fn known(self) -> Option<usize> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ExpectedFrames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{n}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Color layout of the source container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    BayerRGGB,
    BayerGRBG,
    BayerGBRG,
    BayerBGGR,
    BayerCYYM,
    BayerYCMY,
    BayerYMCY,
    BayerMYYC,
    RGB,
    BGR,
}

/// Metadata about an opened video.
#[derive(Clone, Debug)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
    pub expected_frames: ExpectedFrames,
}
