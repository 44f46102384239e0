//! Frame sinks: streaming encoded output to ffmpeg or capturing it in tests.

pub mod ffmpeg;
pub mod sink;

pub use ffmpeg::FfmpegSink;
pub use sink::{FrameSink, InMemorySink, SinkConfig};

/// Constant output frame rate.
pub const FPS: u32 = 24;
