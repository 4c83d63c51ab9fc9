use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use luckystack_core::frame::{ColorMode, ExpectedFrames, VideoInfo};
use luckystack_core::io::ser::SER_HEADER_SIZE;
use luckystack_core::io::{Decoded, FrameSource, FrameView};
use luckystack_core::pipeline::{PipelineStage, ProgressReporter};

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8=BAYER_RGGB, 9=BAYER_GRBG, 10=BAYER_GBRG, 11=BAYER_BGGR,
///             100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC (8 bytes each)
    buf.extend_from_slice(&[0u8; 16]);

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Build a complete 8-bit BGR SER file with the given interleaved frames.
pub fn build_bgr_ser(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header_full(width, height, 8, frames.len(), 101);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// One BGR8 frame with every channel of every pixel set to `value`.
pub fn uniform_bgr(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height * 3]
}

/// Write a SER buffer to a temporary file and return the temp file handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}

/// One scripted decode attempt.
#[derive(Clone, Debug)]
pub enum Step {
    Frame { width: usize, height: usize, value: u8 },
    Invalid,
}

/// In-memory frame source that decodes every frame into the same buffer.
pub struct ScriptedSource {
    info: VideoInfo,
    steps: VecDeque<Step>,
    buffer: Vec<u8>,
}

impl ScriptedSource {
    pub fn new(width: usize, height: usize, expected: ExpectedFrames, steps: Vec<Step>) -> Self {
        Self {
            info: VideoInfo {
                path: PathBuf::from("scripted.ser"),
                width,
                height,
                bit_depth: 8,
                color_mode: ColorMode::BGR,
                expected_frames: expected,
            },
            steps: steps.into(),
            buffer: Vec::new(),
        }
    }

    /// Uniform frames with the given values, container count matching.
    pub fn uniform(width: usize, height: usize, values: &[u8]) -> Self {
        let steps = values
            .iter()
            .map(|&value| Step::Frame { width, height, value })
            .collect();
        Self::new(width, height, ExpectedFrames::Known(values.len()), steps)
    }
}

impl FrameSource for ScriptedSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Option<Decoded<'_>> {
        match self.steps.pop_front()? {
            Step::Invalid => Some(Decoded::Invalid),
            Step::Frame { width, height, value } => {
                self.buffer.clear();
                self.buffer.resize(width * height * 3, value);
                Some(Decoded::Frame(FrameView {
                    width,
                    height,
                    pixels: &self.buffer,
                }))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Begin(PipelineStage, Option<usize>),
    Advance(usize),
    Finish,
}

/// Records every progress call for later inspection.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// `advance` values reported during `stage`.
    pub fn advances(&self, stage: PipelineStage) -> Vec<usize> {
        let mut current = None;
        let mut out = Vec::new();
        for event in self.events() {
            match event {
                Event::Begin(s, _) => current = Some(s),
                Event::Advance(n) if current == Some(stage) => out.push(n),
                Event::Finish => current = None,
                _ => {}
            }
        }
        out
    }

    pub fn total_for(&self, stage: PipelineStage) -> Option<Option<usize>> {
        self.events().into_iter().find_map(|e| match e {
            Event::Begin(s, total) if s == stage => Some(total),
            _ => None,
        })
    }
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.events.lock().unwrap().push(Event::Begin(stage, total_items));
    }

    fn advance(&self, items_done: usize) {
        self.events.lock().unwrap().push(Event::Advance(items_done));
    }

    fn finish_stage(&self) {
        self.events.lock().unwrap().push(Event::Finish);
    }
}
