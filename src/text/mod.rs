//! Text measurement, greedy line wrapping, and glyph rasterization.

pub mod flow;
pub mod font;

pub use flow::{TextMeasure, WrappedText, wrap_text};
pub use font::{FontEngine, GlyphRaster, TextPatch};
