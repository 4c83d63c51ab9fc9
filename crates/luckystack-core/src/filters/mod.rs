pub mod gaussian_blur;
pub mod unsharp_mask;

pub use unsharp_mask::{sharpen_coadd, sharpen_frame, unsharp_mask, UnsharpParams};
