use std::path::PathBuf;

use crate::error::{SlidecastError, SlidecastResult};
use crate::render::SlideVisual;
use crate::script::SlideType;

/// A rendered slide bound to its narration: one still image shown for
/// exactly as long as the narration audio runs.
#[derive(Debug)]
pub struct TimedClip {
    pub slide_number: u32,
    pub slide_type: SlideType,
    pub visual: SlideVisual,
    pub audio_path: PathBuf,
    pub duration_secs: f64,
}

impl TimedClip {
    pub fn assemble(
        slide_number: u32,
        slide_type: SlideType,
        visual: SlideVisual,
        audio_path: PathBuf,
        duration_secs: f64,
    ) -> SlidecastResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(SlidecastError::synthesis(format!(
                "narration for slide {slide_number} has non-positive duration {duration_secs}"
            )));
        }
        Ok(Self {
            slide_number,
            slide_type,
            visual,
            audio_path,
            duration_secs,
        })
    }
}
