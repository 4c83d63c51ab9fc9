/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of interleaved channels in a frame (B, G, R).
pub const CHANNEL_COUNT: usize = 3;

/// Default super-resolution factor applied during extraction.
pub const DEFAULT_SUPERRES: f64 = 2.3;

/// Default Gaussian kernel size for the unsharp mask.
pub const DEFAULT_KERNEL_SIZE: usize = 7;

/// Default Gaussian sigma for the unsharp mask. Also drives the default
/// sharpening strength (`2 * sigma / 100`).
pub const DEFAULT_SHARPEN_SIGMA: f64 = 25.0;

/// Smallest usable blur kernel; a 1-tap kernel is the identity.
pub const MIN_KERNEL_SIZE: usize = 3;

/// Maximum value of an 8-bit output channel.
pub const MAX_OUTPUT_VALUE: f64 = 255.0;

/// Scale from 8-bit to 16-bit range when writing the coadd as TIFF.
pub const U8_TO_U16_SCALE: f64 = 257.0;
