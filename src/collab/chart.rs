use std::path::Path;

use crate::collab::process::run_template;
use crate::error::{SlidecastError, SlidecastResult};
use crate::script::model::ChartSpec;
use crate::script::style::ChartStyle;

/// Rasterize a logical chart spec to a pixel image.
pub trait ChartRasterizer {
    fn rasterize(
        &self,
        spec: &ChartSpec,
        style: &ChartStyle,
        out_path: &Path,
    ) -> SlidecastResult<()>;
}

/// Chart rasterizer backed by an external command template.
///
/// The chart spec and style are serialized to JSON and substituted as
/// `{spec}` and `{style}`; `{out}` names the target image path.
#[derive(Clone, Debug)]
pub struct CommandChartRasterizer {
    argv: Vec<String>,
}

impl CommandChartRasterizer {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl ChartRasterizer for CommandChartRasterizer {
    fn rasterize(
        &self,
        spec: &ChartSpec,
        style: &ChartStyle,
        out_path: &Path,
    ) -> SlidecastResult<()> {
        let spec_json = serde_json::to_string(spec)
            .map_err(|e| SlidecastError::asset(format!("failed to serialize chart spec: {e}")))?;
        let style_json = serde_json::to_string(style)
            .map_err(|e| SlidecastError::asset(format!("failed to serialize chart style: {e}")))?;
        let out = out_path.to_string_lossy().into_owned();
        run_template(
            &self.argv,
            &[
                ("spec", &spec_json),
                ("style", &style_json),
                ("out", &out),
            ],
        )
    }
}
