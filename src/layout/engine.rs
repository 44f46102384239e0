use std::path::{Path, PathBuf};

use crate::collab::chart::ChartRasterizer;
use crate::collab::snippet::{
    LexerTag, SnippetKind, SnippetRasterizer, SnippetRequest,
};
use crate::core::{Canvas, Rgba8, sanitize_text};
use crate::error::{SlidecastError, SlidecastResult};
use crate::script::model::{ContentKey, ContentValue, SlideContent, SlideType};
use crate::script::style::{StyleConfig, TextAlign};
use crate::text::flow::{TextMeasure, wrap_text};

/// Left edge for left-aligned text.
pub const TEXT_LEFT_X: f32 = 100.0;
/// Horizontal margin reserved on both sides of wrapped text.
pub const SIDE_MARGINS: f32 = 200.0;
/// Vertical gap inserted after each placed key.
pub const BLOCK_GAP: f32 = 20.0;
/// Extra margin placed under the title's fixed anchor.
pub const TITLE_MARGIN: f32 = 20.0;
/// Pixel box every chart raster is scaled to.
pub const CHART_TARGET: (u32, u32) = (1200, 800);

/// What a positioned block contains.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockBody {
    /// Resolved, wrapped text lines for one content key.
    Lines {
        key: ContentKey,
        lines: Vec<String>,
        font_size: f32,
        line_spacing: f32,
        color: Rgba8,
        align: TextAlign,
    },
    /// A pre-rasterized code/formula snippet, placed at its natural size.
    Snippet { path: PathBuf, width: u32, height: u32 },
    /// A chart raster, to be scaled into [`CHART_TARGET`] at its anchor.
    Chart { path: PathBuf, target: (u32, u32) },
}

/// One positioned content block plus the vertical cursor after placing it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutBlock {
    pub x: f32,
    pub y: f32,
    pub body: BlockBody,
    /// Running cursor value after this block was placed.
    pub cursor_after: f32,
}

/// Lay out one slide's content onto the canvas.
///
/// Keys are visited in fixed priority order (title, subtitle, content,
/// question, options, points, explanation), then formula/code, then chart.
/// The style config is the authority on which keys render: a key present in
/// the slide but missing from the config is skipped without error.
pub fn layout_slide(
    slide: &SlideContent,
    config: &StyleConfig,
    canvas: Canvas,
    measure: &mut impl TextMeasure,
    snippets: &dyn SnippetRasterizer,
    charts: &dyn ChartRasterizer,
    assets_dir: &Path,
) -> SlidecastResult<Vec<LayoutBlock>> {
    let max_width = canvas.width as f32 - SIDE_MARGINS;
    let mut blocks = Vec::new();
    let mut cursor = 0.0f32;

    for key in ContentKey::ALL {
        let Some(value) = slide.value(key) else {
            continue;
        };
        let Some(style) = config.text_style(key) else {
            continue;
        };

        let font_size = style.resolved_font_size();
        let line_spacing = style.resolved_line_spacing();
        let color = Rgba8::parse_hex(&style.color)?;

        // The title anchors near the top regardless of accumulated height;
        // its configured position overrides the running cursor.
        if key == ContentKey::Title {
            let anchor = style.position.unwrap_or([100.0, 100.0]);
            cursor = anchor[1] + TITLE_MARGIN;
        }

        let lines = shape_key(key, value, max_width, font_size, line_spacing, measure)?;
        let line_count = lines.len() as f32;
        let cursor_after = cursor + line_spacing * line_count + BLOCK_GAP;
        blocks.push(LayoutBlock {
            x: TEXT_LEFT_X,
            y: cursor,
            body: BlockBody::Lines {
                key,
                lines,
                font_size,
                line_spacing,
                color,
                align: style.alignment,
            },
            cursor_after,
        });
        cursor = cursor_after;
    }

    if let Some(block) = layout_snippet(slide, config, canvas, cursor, snippets, assets_dir)? {
        blocks.push(block);
    }

    if slide.slide_type == SlideType::Chart
        && let Some(spec) = slide.chart_spec()
    {
        let anchor = config.chart.clone().unwrap_or_default();
        let style = config.chart_style.clone().unwrap_or_default();
        let path = assets_dir.join(format!("chart_{}.png", slide.slide_number));
        charts.rasterize(&spec, &style, &path)?;
        blocks.push(LayoutBlock {
            x: anchor.position[0],
            y: anchor.position[1],
            body: BlockBody::Chart {
                path,
                target: CHART_TARGET,
            },
            // Charts are anchored independently of the text cursor.
            cursor_after: cursor,
        });
    }

    Ok(blocks)
}

/// Resolve a content key's value into display lines, wrapping as its shape
/// demands.
fn shape_key(
    key: ContentKey,
    value: &ContentValue,
    max_width: f32,
    font_size: f32,
    line_spacing: f32,
    measure: &mut impl TextMeasure,
) -> SlidecastResult<Vec<String>> {
    match key {
        ContentKey::Options | ContentKey::Points => {
            let mut lines = Vec::new();
            for item in prefixed_items(key, value)? {
                let wrapped = wrap_text(&item, max_width, font_size, line_spacing, measure)?;
                lines.extend(wrapped.lines);
            }
            Ok(lines)
        }
        ContentKey::Title | ContentKey::Subtitle | ContentKey::Content | ContentKey::Explanation => {
            let text = joined_text(key, value)?;
            Ok(wrap_text(&text, max_width, font_size, line_spacing, measure)?.lines)
        }
        // Remaining keys: sequences are joined with line breaks, then each
        // resulting line wraps independently.
        _ => {
            let text = joined_text(key, value)?;
            let mut lines = Vec::new();
            for part in text.split('\n') {
                let wrapped = wrap_text(part, max_width, font_size, line_spacing, measure)?;
                lines.extend(wrapped.lines);
            }
            Ok(lines)
        }
    }
}

/// List-shaped keys render one prefixed line-group per item: numbered
/// (or map-keyed) `"N: "` for options, `"- "` for points.
fn prefixed_items(key: ContentKey, value: &ContentValue) -> SlidecastResult<Vec<String>> {
    let prefix_for = |n: &str| -> String {
        match key {
            ContentKey::Options => format!("{n}: "),
            _ => "- ".to_string(),
        }
    };

    match value {
        ContentValue::Text(s) => Ok(vec![format!(
            "{}{}",
            prefix_for("1"),
            sanitize_text(s)
        )]),
        ContentValue::List(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}{}", prefix_for(&(i + 1).to_string()), sanitize_text(item)))
            .collect()),
        ContentValue::Map(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (k, v) in map {
                let text = v.as_str().ok_or_else(|| {
                    SlidecastError::layout(format!(
                        "{} item '{k}' must be a string",
                        key.as_str()
                    ))
                })?;
                out.push(format!("{}{}", prefix_for(k), sanitize_text(text)));
            }
            Ok(out)
        }
    }
}

/// Scalar values pass through; sequences join with line breaks.
fn joined_text(key: ContentKey, value: &ContentValue) -> SlidecastResult<String> {
    match value {
        ContentValue::Text(s) => Ok(sanitize_text(s)),
        ContentValue::List(items) => Ok(items
            .iter()
            .map(|s| sanitize_text(s))
            .collect::<Vec<_>>()
            .join("\n")),
        ContentValue::Map(map) => {
            let mut parts = Vec::with_capacity(map.len());
            for (k, v) in map {
                let text = v.as_str().ok_or_else(|| {
                    SlidecastError::layout(format!(
                        "{} item '{k}' must be a string",
                        key.as_str()
                    ))
                })?;
                parts.push(sanitize_text(text));
            }
            Ok(parts.join("\n"))
        }
    }
}

/// Rasterize and center the slide's formula or code snippet, if any.
///
/// The snippet sits at the cursor height reached by the text flow but does
/// not advance it; its horizontal position is derived from the canvas width.
fn layout_snippet(
    slide: &SlideContent,
    config: &StyleConfig,
    canvas: Canvas,
    cursor: f32,
    snippets: &dyn SnippetRasterizer,
    assets_dir: &Path,
) -> SlidecastResult<Option<LayoutBlock>> {
    let (kind, text, style) = if let (Some(formula), Some(style)) =
        (slide.formula.as_deref(), config.formula.as_ref())
    {
        (SnippetKind::Formula, formula, style)
    } else if let (Some(code), Some(style)) = (slide.code.as_deref(), config.code.as_ref()) {
        (SnippetKind::Code, code, style)
    } else {
        return Ok(None);
    };

    let lexer = match kind {
        SnippetKind::Formula => LexerTag::Mathematica,
        SnippetKind::Code => LexerTag::from_tag(slide.lexer.as_deref().unwrap_or("bash")),
    };
    let request = SnippetRequest {
        kind,
        text: text.to_string(),
        lexer,
        style: style.style.clone().unwrap_or_else(|| "monokai".to_string()),
        font_size: SnippetRequest::tiered_font_size(kind, text),
    };

    let path = assets_dir.join(format!("snippet_{}.png", slide.slide_number));
    snippets.rasterize(&request, &path)?;

    let (width, height) = image::image_dimensions(&path).map_err(|e| {
        SlidecastError::asset(format!(
            "failed to open snippet raster '{}': {e}",
            path.display()
        ))
    })?;

    let x = (canvas.width as f32 - width as f32) / 2.0;
    Ok(Some(LayoutBlock {
        x,
        y: cursor,
        body: BlockBody::Snippet {
            path,
            width,
            height,
        },
        cursor_after: cursor,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::style::TextStyle;

    /// Fixed-advance measure for deterministic wrapping in tests.
    struct WideCells;

    impl TextMeasure for WideCells {
        fn text_width(&mut self, text: &str, _font_size: f32) -> SlidecastResult<f32> {
            Ok(text.chars().count() as f32 * 10.0)
        }
    }

    struct NoSnippets;

    impl SnippetRasterizer for NoSnippets {
        fn rasterize(&self, _request: &SnippetRequest, _out: &Path) -> SlidecastResult<()> {
            panic!("unexpected snippet rasterization");
        }
    }

    struct NoCharts;

    impl ChartRasterizer for NoCharts {
        fn rasterize(
            &self,
            _spec: &crate::script::model::ChartSpec,
            _style: &crate::script::style::ChartStyle,
            _out: &Path,
        ) -> SlidecastResult<()> {
            panic!("unexpected chart rasterization");
        }
    }

    fn config_with(keys: &[(&str, TextStyle)]) -> StyleConfig {
        let mut cfg = StyleConfig::default();
        for (key, style) in keys {
            match *key {
                "title" => cfg.title = Some(style.clone()),
                "content" => cfg.content = Some(style.clone()),
                "options" => cfg.options = Some(style.clone()),
                "points" => cfg.points = Some(style.clone()),
                other => panic!("unknown key {other}"),
            }
        }
        cfg
    }

    fn lines_of(block: &LayoutBlock) -> &[String] {
        match &block.body {
            BlockBody::Lines { lines, .. } => lines,
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn options_get_numbered_prefixes() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "options": ["A", "B"]
        }))
        .unwrap();
        let cfg = config_with(&[("options", TextStyle::default())]);
        let blocks = layout_slide(
            &slide,
            &cfg,
            Canvas::default(),
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(lines_of(&blocks[0]), &["1: A".to_string(), "2: B".to_string()]);
    }

    #[test]
    fn options_map_uses_supplied_keys() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "options": {"a": "First", "b": "Second"}
        }))
        .unwrap();
        let cfg = config_with(&[("options", TextStyle::default())]);
        let blocks = layout_slide(
            &slide,
            &cfg,
            Canvas::default(),
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap();
        assert_eq!(
            lines_of(&blocks[0]),
            &["a: First".to_string(), "b: Second".to_string()]
        );
    }

    #[test]
    fn points_get_dash_prefixes_and_wrap_per_item() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "points": ["short", "a very long point that needs wrapping to fit"]
        }))
        .unwrap();
        let cfg = config_with(&[("points", TextStyle::default())]);
        let blocks = layout_slide(
            &slide,
            &cfg,
            Canvas {
                width: 400,
                height: 1080,
            },
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap();
        let lines = lines_of(&blocks[0]);
        assert_eq!(lines[0], "- short");
        assert!(lines.len() > 2);
        assert!(lines[1].starts_with("- a very long"));
    }

    #[test]
    fn key_without_style_entry_is_silently_skipped() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "title": "Heading",
            "content": "Body text"
        }))
        .unwrap();
        let cfg = config_with(&[("title", TextStyle::default())]);
        let blocks = layout_slide(
            &slide,
            &cfg,
            Canvas::default(),
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap();
        assert_eq!(blocks.len(), 1);
        let BlockBody::Lines { key, .. } = &blocks[0].body else {
            panic!("expected lines");
        };
        assert_eq!(*key, ContentKey::Title);
    }

    #[test]
    fn title_anchor_overrides_running_cursor() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "title": "Heading",
            "content": "Body"
        }))
        .unwrap();
        let cfg = config_with(&[
            (
                "title",
                TextStyle {
                    position: Some([100.0, 300.0]),
                    ..TextStyle::default()
                },
            ),
            ("content", TextStyle::default()),
        ]);
        let blocks = layout_slide(
            &slide,
            &cfg,
            Canvas::default(),
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap();
        assert_eq!(blocks[0].y, 320.0);
        // Content flows below the title with the inter-block gap applied.
        let title_style = TextStyle::default();
        let expected = 320.0 + title_style.resolved_line_spacing() + BLOCK_GAP;
        assert_eq!(blocks[1].y, expected);
    }

    #[test]
    fn cursor_advances_by_line_count_and_gap() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "content": "one two three four five six seven eight nine ten"
        }))
        .unwrap();
        let cfg = config_with(&[("content", TextStyle::default())]);
        let blocks = layout_slide(
            &slide,
            &cfg,
            Canvas {
                width: 400,
                height: 1080,
            },
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap();
        let lines = lines_of(&blocks[0]).len() as f32;
        let spacing = TextStyle::default().resolved_line_spacing();
        assert_eq!(blocks[0].cursor_after, blocks[0].y + spacing * lines + BLOCK_GAP);
    }

    #[test]
    fn non_string_map_values_are_a_layout_error() {
        let slide: SlideContent = serde_json::from_value(serde_json::json!({
            "slideNumber": 1,
            "options": {"a": 3}
        }))
        .unwrap();
        let cfg = config_with(&[("options", TextStyle::default())]);
        let err = layout_slide(
            &slide,
            &cfg,
            Canvas::default(),
            &mut WideCells,
            &NoSnippets,
            &NoCharts,
            Path::new("/tmp"),
        )
        .unwrap_err();
        assert!(matches!(err, SlidecastError::Layout(_)));
    }
}
