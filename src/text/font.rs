use std::path::Path;

use crate::core::Rgba8;
use crate::error::{SlidecastError, SlidecastResult};
use crate::text::flow::TextMeasure;

/// RGBA8 brush color carried through Parley layout styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// One rasterized line of text: premultiplied RGBA8, tightly packed.
#[derive(Clone, Debug)]
pub struct TextPatch {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Rasterization of one line of text to pixels. Split out as a trait so the
/// slide renderer can be exercised without real fonts.
pub trait GlyphRaster: TextMeasure {
    fn raster_line(&mut self, text: &str, size_px: f32, color: Rgba8)
    -> SlidecastResult<TextPatch>;
}

/// Font loading, shaping, measurement, and glyph rasterization.
///
/// Holds one registered font (raw bytes supplied by the caller) plus reusable
/// Parley contexts and a `vello_cpu` render context. All slide text goes
/// through this engine, which keeps layout deterministic for a given font.
pub struct FontEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    ctx: Option<vello_cpu::RenderContext>,
}

impl FontEngine {
    /// Register a font from a file on disk.
    pub fn from_font_path(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::input(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_font_bytes(bytes)
    }

    /// Register a font from raw bytes.
    pub fn from_font_bytes(bytes: Vec<u8>) -> SlidecastResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SlidecastError::input("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SlidecastError::input("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            ctx: None,
        })
    }

    fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SlidecastResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SlidecastError::layout("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

}

impl GlyphRaster for FontEngine {
    /// Rasterize one line of text to a premultiplied RGBA patch.
    fn raster_line(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> SlidecastResult<TextPatch> {
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = self.layout_line(text, size_px, brush)?;

        let width = layout.width().ceil().max(1.0) as u32;
        let height = layout.height().ceil().max(1.0) as u32;
        let w: u16 = width
            .try_into()
            .map_err(|_| SlidecastError::layout("text patch width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| SlidecastError::layout("text patch height exceeds u16"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let rgba8_premul = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);

        Ok(TextPatch {
            width,
            height,
            rgba8_premul,
        })
    }
}

impl TextMeasure for FontEngine {
    fn text_width(&mut self, text: &str, font_size: f32) -> SlidecastResult<f32> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let layout = self.layout_line(text, font_size, TextBrushRgba8::default())?;
        Ok(layout.width())
    }
}
