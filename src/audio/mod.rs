//! Audio buffering and capture seams.

mod buffer;
mod capture;

pub use buffer::ChunkBuffer;
pub use capture::{CaptureSource, WavFileSource};
