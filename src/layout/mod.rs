//! Vertical-flow slide layout on a fixed canvas.

pub mod engine;

pub use engine::{BlockBody, LayoutBlock, layout_slide};
