use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{SlidecastError, SlidecastResult};
use crate::script::model::{ContentKey, SlideType};

/// Per-run style sheet: slide-type name -> [`StyleConfig`].
///
/// Loaded once and shared read-only by every slide render. The style sheet is
/// the authority on which content keys actually render: a key present in the
/// slide but absent here is skipped silently.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct StyleSheet(BTreeMap<String, StyleConfig>);

impl StyleSheet {
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::input(format!(
                "failed to read style sheet '{}': {e}",
                path.display()
            ))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            SlidecastError::input(format!(
                "failed to parse style sheet '{}': {e}",
                path.display()
            ))
        })
    }

    /// Config for a slide type, falling back to the content-slide config.
    pub fn config_for(&self, slide_type: SlideType) -> SlidecastResult<&StyleConfig> {
        self.0
            .get(slide_type.as_str())
            .or_else(|| self.0.get(SlideType::Content.as_str()))
            .ok_or_else(|| {
                SlidecastError::input(format!(
                    "style sheet has no entry for '{}' and no content_slide fallback",
                    slide_type.as_str()
                ))
            })
    }

    /// Insert or replace the config for one slide-type name.
    pub fn insert(&mut self, slide_type: &str, config: StyleConfig) {
        self.0.insert(slide_type.to_string(), config);
    }
}

/// Styling for all slides of one slide type.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub title: Option<TextStyle>,
    pub subtitle: Option<TextStyle>,
    pub content: Option<TextStyle>,
    pub question: Option<TextStyle>,
    pub options: Option<TextStyle>,
    pub points: Option<TextStyle>,
    pub explanation: Option<TextStyle>,

    pub formula: Option<SnippetStyle>,
    pub code: Option<SnippetStyle>,

    pub chart: Option<ChartAnchor>,
    pub chart_style: Option<ChartStyle>,
}

impl StyleConfig {
    pub fn text_style(&self, key: ContentKey) -> Option<&TextStyle> {
        match key {
            ContentKey::Title => self.title.as_ref(),
            ContentKey::Subtitle => self.subtitle.as_ref(),
            ContentKey::Content => self.content.as_ref(),
            ContentKey::Question => self.question.as_ref(),
            ContentKey::Options => self.options.as_ref(),
            ContentKey::Points => self.points.as_ref(),
            ContentKey::Explanation => self.explanation.as_ref(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Styling for one content key.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Explicit pixel size; when absent, `scale` x 30 is used.
    pub font_size: Option<f32>,
    pub scale: f32,
    pub color: String,
    /// Vertical advance per line; defaults to font size + 5.
    pub line_spacing: Option<f32>,
    pub alignment: TextAlign,
    /// Fixed anchor, honoured only for the first rendered element (title).
    pub position: Option<[f32; 2]>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: None,
            scale: 1.0,
            color: "#000000".to_string(),
            line_spacing: None,
            alignment: TextAlign::Left,
            position: None,
        }
    }
}

impl TextStyle {
    pub fn resolved_font_size(&self) -> f32 {
        self.font_size.unwrap_or(self.scale * 30.0)
    }

    pub fn resolved_line_spacing(&self) -> f32 {
        self.line_spacing
            .unwrap_or_else(|| self.resolved_font_size() + 5.0)
    }
}

/// Anchor for pre-rasterized code/formula snippets.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SnippetStyle {
    /// Highlighting style tag passed through to the rasterizer.
    pub style: Option<String>,
    pub position: Option<[f32; 2]>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChartAnchor {
    pub position: [f32; 2],
}

impl Default for ChartAnchor {
    fn default() -> Self {
        Self {
            position: [400.0, 200.0],
        }
    }
}

/// Chart styling, delivered verbatim to the chart rasterization collaborator.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub show_legend: bool,
    pub show_data_points: bool,
    pub figure_size: [f32; 2],
    pub bar_color: String,
    pub line_color: String,
    pub pie_colors: Vec<String>,
    pub background_color: Option<String>,
    pub tick_color: String,
    pub spine_color: String,
    pub title_color: String,
    pub title_size: f32,
    pub label_color: String,
    pub label_size: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_data_points: true,
            figure_size: [10.0, 6.0],
            bar_color: "blue".to_string(),
            line_color: "b".to_string(),
            pie_colors: vec![
                "#FF5733".to_string(),
                "#33FF57".to_string(),
                "#3357FF".to_string(),
            ],
            background_color: None,
            tick_color: "#000000".to_string(),
            spine_color: "#000000".to_string(),
            title_color: "#000000".to_string(),
            title_size: 16.0,
            label_color: "#000000".to_string(),
            label_size: 14.0,
        }
    }
}
