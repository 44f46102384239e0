use std::path::PathBuf;

use crate::error::{SlidecastError, SlidecastResult};

#[derive(Clone, Debug)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl SinkConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> SlidecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlidecastError::encode("output width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(SlidecastError::encode("output fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // We target yuv420p output for maximum player compatibility.
            return Err(SlidecastError::encode(
                "output width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }

    pub fn frame_bytes(&self) -> usize {
        (self.width * self.height * 4) as usize
    }
}

/// Receives opaque RGBA frames in presentation order.
pub trait FrameSink {
    fn push_frame(&mut self, rgba: &[u8]) -> SlidecastResult<()>;
    fn finish(&mut self) -> SlidecastResult<()>;
}

/// Test sink that keeps every frame in memory.
pub struct InMemorySink {
    frame_bytes: usize,
    pub frames: Vec<Vec<u8>>,
    pub finished: bool,
}

impl InMemorySink {
    pub fn new(cfg: &SinkConfig) -> Self {
        Self {
            frame_bytes: cfg.frame_bytes(),
            frames: Vec::new(),
            finished: false,
        }
    }
}

impl FrameSink for InMemorySink {
    fn push_frame(&mut self, rgba: &[u8]) -> SlidecastResult<()> {
        if rgba.len() != self.frame_bytes {
            return Err(SlidecastError::encode(format!(
                "frame size mismatch: got {} bytes, expected {}",
                rgba.len(),
                self.frame_bytes
            )));
        }
        self.frames.push(rgba.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> SlidecastResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(SinkConfig::new("out.mp4", 0, 10, 24).validate().is_err());
        assert!(SinkConfig::new("out.mp4", 11, 10, 24).validate().is_err());
        assert!(SinkConfig::new("out.mp4", 10, 10, 0).validate().is_err());
        assert!(SinkConfig::new("out.mp4", 1920, 1080, 24).validate().is_ok());
    }

    #[test]
    fn in_memory_sink_rejects_short_frames() {
        let cfg = SinkConfig::new("out.mp4", 4, 4, 24);
        let mut sink = InMemorySink::new(&cfg);
        assert!(sink.push_frame(&[0u8; 3]).is_err());
        assert!(sink.push_frame(&[0u8; 64]).is_ok());
        sink.finish().unwrap();
        assert_eq!(sink.frames.len(), 1);
        assert!(sink.finished);
    }
}
