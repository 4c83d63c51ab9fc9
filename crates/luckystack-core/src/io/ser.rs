use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use tracing::{debug, info};

use crate::consts::CHANNEL_COUNT;
use crate::error::{LuckyError, Result};
use crate::frame::{ColorMode, ExpectedFrames, VideoInfo};
use crate::io::source::{Decoded, FrameDecoder, FrameSource, FrameView};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";
/// Size of one entry in the optional per-frame timestamp trailer.
const SER_TIMESTAMP_SIZE: usize = 8;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    /// Zero when the recorder did not fill it in. Advisory only.
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Samples stored per pixel: 3 for RGB/BGR, otherwise 1.
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, `None` on overflow.
    pub fn frame_byte_size(&self) -> Option<usize> {
        let pixels = (self.width as usize).checked_mul(self.height as usize)?;
        pixels.checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel())
    }

    pub fn color_mode(&self) -> Option<ColorMode> {
        match self.color_id {
            0 => Some(ColorMode::Mono),
            8 => Some(ColorMode::BayerRGGB),
            9 => Some(ColorMode::BayerGRBG),
            10 => Some(ColorMode::BayerGBRG),
            11 => Some(ColorMode::BayerBGGR),
            16 => Some(ColorMode::BayerCYYM),
            17 => Some(ColorMode::BayerYCMY),
            18 => Some(ColorMode::BayerYMCY),
            19 => Some(ColorMode::BayerMYYC),
            100 => Some(ColorMode::RGB),
            101 => Some(ColorMode::BGR),
            _ => None,
        }
    }
}

/// Opens SER recordings.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerDecoder;

impl FrameDecoder for SerDecoder {
    type Source = SerSource;

    fn open(&self, path: &Path) -> Result<SerSource> {
        SerSource::open(path)
    }
}

/// Memory-mapped SER stream decoding into a reused BGR8 buffer.
#[derive(Debug)]
pub struct SerSource {
    mmap: Mmap,
    header: SerHeader,
    info: VideoInfo,
    frame_bytes: usize,
    /// Plane index feeding each of the B, G, R output channels.
    channel_planes: [usize; CHANNEL_COUNT],
    attempts: usize,
    next_index: usize,
    buffer: Vec<u8>,
}

impl SerSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| LuckyError::Unopenable {
            path: path.to_path_buf(),
            source,
        })?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| LuckyError::Unopenable {
            path: path.to_path_buf(),
            source,
        })?;

        if mmap.len() < SER_HEADER_SIZE {
            return Err(no_stream(path, "file too small for SER header"));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(no_stream(path, "missing LUCAM-RECORDER magic"));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let color_mode = header.color_mode().ok_or_else(|| LuckyError::UnsupportedCodec {
            path: path.to_path_buf(),
            codec: format!("SER color id {}", header.color_id),
        })?;
        let channel_planes = match color_mode {
            ColorMode::Mono => [0, 0, 0],
            ColorMode::BGR => [0, 1, 2],
            ColorMode::RGB => [2, 1, 0],
            bayer => {
                return Err(LuckyError::UnsupportedCodec {
                    path: path.to_path_buf(),
                    codec: format!("{bayer:?}"),
                })
            }
        };
        if header.pixel_depth == 0 || header.pixel_depth > 16 {
            return Err(LuckyError::UnsupportedCodec {
                path: path.to_path_buf(),
                codec: format!("{}-bit samples", header.pixel_depth),
            });
        }

        let width = header.width as usize;
        let height = header.height as usize;
        let invalid_dims = || LuckyError::InvalidDimensions { width, height };
        let frame_bytes = header.frame_byte_size().ok_or_else(invalid_dims)?;
        let buffer_len = width
            .checked_mul(height)
            .and_then(|p| p.checked_mul(CHANNEL_COUNT))
            .ok_or_else(invalid_dims)?;

        let expected_frames = match header.frame_count {
            0 => ExpectedFrames::Unknown,
            n => ExpectedFrames::Known(n as usize),
        };
        let data_len = mmap.len() - SER_HEADER_SIZE;
        let attempts = decode_attempts(data_len, frame_bytes, expected_frames);

        let info = VideoInfo {
            path: path.to_path_buf(),
            width,
            height,
            bit_depth: header.pixel_depth as u8,
            color_mode,
            expected_frames,
        };
        info!(
            path = %path.display(),
            width,
            height,
            bit_depth = header.pixel_depth,
            expected = %expected_frames,
            "Opened SER video"
        );

        Ok(Self {
            mmap,
            header,
            info,
            frame_bytes,
            channel_planes,
            attempts,
            next_index: 0,
            buffer: vec![0; buffer_len],
        })
    }

    pub fn header(&self) -> &SerHeader {
        &self.header
    }
}

impl FrameSource for SerSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Option<Decoded<'_>> {
        if self.next_index >= self.attempts {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;

        let range = index
            .checked_mul(self.frame_bytes)
            .and_then(|o| o.checked_add(SER_HEADER_SIZE))
            .and_then(|start| Some(start..start.checked_add(self.frame_bytes)?));
        let raw = match range {
            Some(r) if r.end <= self.mmap.len() => &self.mmap[r],
            _ => {
                debug!(index, "Frame data runs past end of file");
                return Some(Decoded::Invalid);
            }
        };

        decode_bgr8(raw, &self.header, self.channel_planes, &mut self.buffer);
        Some(Decoded::Frame(FrameView {
            width: self.info.width,
            height: self.info.height,
            pixels: &self.buffer,
        }))
    }
}

/// Number of frame slots in `data_len` bytes of frame data.
///
/// The header count never bounds the result. A partial slot at the end is
/// still attempted, unless the leftover bytes are exactly the 8-byte
/// per-frame timestamp trailer for the `n` frames the header declares.
fn decode_attempts(data_len: usize, frame_bytes: usize, expected: ExpectedFrames) -> usize {
    if let ExpectedFrames::Known(n) = expected {
        let frames_len = n.checked_mul(frame_bytes);
        let trailer_len = n.checked_mul(SER_TIMESTAMP_SIZE);
        if let (Some(frames_len), Some(trailer_len)) = (frames_len, trailer_len) {
            if frames_len.checked_add(trailer_len) == Some(data_len) {
                return n;
            }
        }
    }
    data_len.div_ceil(frame_bytes)
}

fn no_stream(path: &Path, reason: &str) -> LuckyError {
    LuckyError::NoVideoStream {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
    let height = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()?.max(0) as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(LuckyError::InvalidDimensions {
            width: width as usize,
            height: height as usize,
        });
    }

    // Most writers put 0 here for little-endian data even though the format
    // documents the opposite; only an explicit 1 means big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

/// Convert one raw SER frame into interleaved BGR8.
fn decode_bgr8(
    raw: &[u8],
    header: &SerHeader,
    channel_planes: [usize; CHANNEL_COUNT],
    out: &mut [u8],
) {
    let bps = header.bytes_per_pixel_plane();
    let stride = header.planes_per_pixel() * bps;
    let depth = header.pixel_depth;
    let scale = 255.0 / ((1u32 << depth) - 1) as f32;

    for (i, px) in out.chunks_exact_mut(CHANNEL_COUNT).enumerate() {
        let base = i * stride;
        for (dst, &plane) in px.iter_mut().zip(channel_planes.iter()) {
            let idx = base + plane * bps;
            let value = if bps == 1 {
                raw[idx] as u32
            } else {
                let pair = [raw[idx], raw[idx + 1]];
                if header.little_endian {
                    u16::from_le_bytes(pair) as u32
                } else {
                    u16::from_be_bytes(pair) as u32
                }
            };
            *dst = if depth == 8 {
                value as u8
            } else {
                (value as f32 * scale).round().min(255.0) as u8
            };
        }
    }
}
