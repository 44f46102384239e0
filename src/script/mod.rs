//! Course script and style-sheet documents.

pub mod model;
pub mod style;

pub use model::{
    ChartSpec, ChartType, ContentKey, ContentValue, CourseScript, DataPoint, SlideContent,
    SlideType,
};
pub use style::{ChartAnchor, ChartStyle, SnippetStyle, StyleConfig, StyleSheet, TextAlign, TextStyle};
