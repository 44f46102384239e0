use std::path::Path;

use crate::collab::process::run_template;
use crate::error::SlidecastResult;

/// Out-of-process illustrative image generation.
///
/// Idempotent by convention: callers skip the request when the target asset
/// already exists, so re-runs reuse cached generations.
pub trait IllustrationGenerator {
    fn generate(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        slide_number: u32,
        out_path: &Path,
    ) -> SlidecastResult<()>;
}

/// Illustration generator backed by an external command template with
/// `{prompt}`, `{ratio}`, `{slide}`, and `{out}` placeholders.
#[derive(Clone, Debug)]
pub struct CommandIllustrationGenerator {
    argv: Vec<String>,
}

impl CommandIllustrationGenerator {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl IllustrationGenerator for CommandIllustrationGenerator {
    fn generate(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        slide_number: u32,
        out_path: &Path,
    ) -> SlidecastResult<()> {
        let out = out_path.to_string_lossy().into_owned();
        let slide = slide_number.to_string();
        run_template(
            &self.argv,
            &[
                ("prompt", prompt),
                ("ratio", aspect_ratio),
                ("slide", &slide),
                ("out", &out),
            ],
        )
    }
}
