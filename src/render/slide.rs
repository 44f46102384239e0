use std::path::Path;

use crate::core::{Canvas, Rgba8};
use crate::error::{SlidecastError, SlidecastResult};
use crate::layout::engine::{BLOCK_GAP, BlockBody, LayoutBlock};
use crate::render::surface::Surface;
use crate::script::model::{ContentKey, ContentValue, SlideContent, SlideType};
use crate::script::style::{StyleConfig, TextAlign};
use crate::text::font::GlyphRaster;

/// Opacity of the text layer when it sits on top of a title illustration.
const TITLE_TEXT_OPACITY: f32 = 0.9;
/// Illustration width as a fraction of the slide width.
const ILLUSTRATION_WIDTH_FRAC: f64 = 0.6;
/// Shrink factor applied when the illustration would overflow the space
/// remaining below the text.
const ILLUSTRATION_FIT_FRAC: f64 = 0.7;
/// Gap between the estimated text bottom and the illustration.
const ILLUSTRATION_GAP: f32 = 60.0;
/// Base value of the approximate text-height estimate.
const HEIGHT_ESTIMATE_BASE: f32 = 100.0;

/// One flattened slide raster.
#[derive(Clone, Debug)]
pub struct RenderedSlide {
    pub surface: Surface,
}

/// A second image layer composited at render time rather than baked into the
/// slide raster.
#[derive(Clone, Debug)]
pub struct OverlayLayer {
    pub surface: Surface,
    pub x: i32,
    pub y: i32,
    pub opacity: f32,
}

/// A slide's visual: base raster plus an optional overlay layer.
#[derive(Clone, Debug)]
pub struct SlideVisual {
    pub base: Surface,
    pub overlay: Option<OverlayLayer>,
}

impl SlideVisual {
    /// Composite base and overlay into one frame-sized surface.
    pub fn composited(&self) -> Surface {
        let mut out = self.base.clone();
        if let Some(layer) = &self.overlay {
            out.blit_over(&layer.surface, layer.x, layer.y, layer.opacity);
        }
        out
    }
}

/// Composite one slide: background, then text blocks, then snippet raster,
/// then chart raster.
pub fn render_slide(
    blocks: &[LayoutBlock],
    canvas: Canvas,
    background: Option<&Surface>,
    font: &mut dyn GlyphRaster,
) -> SlidecastResult<RenderedSlide> {
    let mut surface = match background {
        Some(bg) if bg.width == canvas.width && bg.height == canvas.height => bg.clone(),
        Some(bg) => bg.scaled_to(canvas.width, canvas.height)?,
        None => Surface::filled(canvas.width, canvas.height, Rgba8::WHITE),
    };

    for block in blocks {
        match &block.body {
            BlockBody::Lines {
                lines,
                font_size,
                line_spacing,
                color,
                align,
                ..
            } => {
                let mut y = block.y;
                for line in lines {
                    if !line.is_empty() {
                        let patch = font.raster_line(line, *font_size, *color)?;
                        let x = match align {
                            TextAlign::Center => {
                                (canvas.width as f32 - patch.width as f32) / 2.0
                            }
                            TextAlign::Left => block.x,
                        };
                        let patch_surface = Surface::from_premul_parts(
                            patch.width,
                            patch.height,
                            patch.rgba8_premul,
                        )?;
                        surface.blit_over(&patch_surface, x as i32, y as i32, 1.0);
                    }
                    y += line_spacing;
                }
            }
            BlockBody::Snippet { path, .. } => {
                let snippet = Surface::decode_path(path)?;
                surface.blit_over(&snippet, block.x as i32, block.y as i32, 1.0);
            }
            BlockBody::Chart { path, target } => {
                let chart = Surface::decode_path(path)?.scaled_to(target.0, target.1)?;
                surface.blit_over(&chart, block.x as i32, block.y as i32, 1.0);
            }
        }
    }

    Ok(RenderedSlide { surface })
}

/// Attach an illustrative image to a rendered slide.
///
/// Title slides swap z-order: the illustration becomes a full-canvas base and
/// the text layer is composited on top at reduced opacity. Other slides place
/// the illustration below the text content, scaled to 60% of the slide width
/// and shrunk further if it would overflow the remaining vertical space.
pub fn place_illustration(
    slide: &SlideContent,
    config: &StyleConfig,
    rendered: RenderedSlide,
    illustration_path: &Path,
    canvas: Canvas,
) -> SlidecastResult<SlideVisual> {
    let illustration = Surface::decode_path(illustration_path)?;

    if slide.slide_type == SlideType::Title {
        let base = illustration.scaled_to(canvas.width, canvas.height)?;
        return Ok(SlideVisual {
            base,
            overlay: Some(OverlayLayer {
                surface: rendered.surface,
                x: 0,
                y: 0,
                opacity: TITLE_TEXT_OPACITY,
            }),
        });
    }

    let text_bottom = estimate_text_height(slide, config)?;
    let image_y = text_bottom + ILLUSTRATION_GAP;

    let mut scaled = illustration
        .scaled_to_width(((canvas.width as f64) * ILLUSTRATION_WIDTH_FRAC).round() as u32)?;
    let available = canvas.height as f32 - image_y;
    if (scaled.height as f32) > available && available > 0.0 {
        let fit_height = ((available as f64) * ILLUSTRATION_FIT_FRAC).round().max(1.0) as u32;
        scaled = illustration.scaled_to_height(fit_height)?;
    }

    let x = (canvas.width as i32 - scaled.width as i32) / 2;
    Ok(SlideVisual {
        base: rendered.surface,
        overlay: Some(OverlayLayer {
            surface: scaled,
            x,
            y: image_y as i32,
            opacity: 1.0,
        }),
    })
}

/// Approximate accumulated text height for illustration placement.
///
/// Deliberately a line-spacing-based estimate over the raw content rather
/// than the exact layout cursor; embedded `.png` references contribute their
/// actual pixel heights. Best-effort placement, not pixel-exact.
fn estimate_text_height(slide: &SlideContent, config: &StyleConfig) -> SlidecastResult<f32> {
    let mut approx = HEIGHT_ESTIMATE_BASE;

    for key in ContentKey::ALL {
        let Some(value) = slide.value(key) else {
            continue;
        };
        let Some(style) = config.text_style(key) else {
            continue;
        };
        let line_spacing = style.resolved_line_spacing();

        let text = match value {
            ContentValue::Text(s) => s.clone(),
            ContentValue::List(items) => items.join("\n"),
            ContentValue::Map(map) => map
                .values()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        };

        for line in text.split('\n') {
            if line.ends_with(".png") {
                let (_, h) = image::image_dimensions(line).map_err(|e| {
                    SlidecastError::asset(format!(
                        "failed to open referenced image '{line}': {e}"
                    ))
                })?;
                approx += h as f32;
            } else {
                approx += line_spacing + BLOCK_GAP;
            }
        }
    }

    Ok(approx)
}
