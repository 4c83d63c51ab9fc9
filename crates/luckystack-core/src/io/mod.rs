pub mod image_io;
pub mod ser;
pub mod source;

pub use ser::{SerDecoder, SerSource};
pub use source::{Decoded, FrameDecoder, FrameSource, FrameView};
