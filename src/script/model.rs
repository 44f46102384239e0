use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{SlidecastError, SlidecastResult};

/// One course script: an ordered sequence of slides.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CourseScript {
    pub slides: Vec<SlideContent>,
}

impl CourseScript {
    /// Load and validate a script document from a JSON file.
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::input(format!("failed to read script '{}': {e}", path.display()))
        })?;
        let script: Self = serde_json::from_slice(&bytes).map_err(|e| {
            SlidecastError::input(format!("failed to parse script '{}': {e}", path.display()))
        })?;
        script.validate()?;
        Ok(script)
    }

    /// Slide numbers drive asset file naming and must not collide.
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.slides.is_empty() {
            return Err(SlidecastError::input("script contains no slides"));
        }
        let mut seen = BTreeSet::new();
        for slide in &self.slides {
            if slide.slide_number == 0 {
                return Err(SlidecastError::input("slideNumber must be >= 1"));
            }
            if !seen.insert(slide.slide_number) {
                return Err(SlidecastError::input(format!(
                    "duplicate slideNumber {}",
                    slide.slide_number
                )));
            }
            slide.validate()?;
        }
        Ok(())
    }
}

/// The slide taxonomy understood by the layout and timeline stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SlideType {
    #[serde(rename = "title_slide")]
    Title,
    #[default]
    #[serde(rename = "content_slide")]
    Content,
    #[serde(rename = "question_slide")]
    Question,
    #[serde(rename = "unordered_list_slide")]
    UnorderedList,
    #[serde(rename = "chart_slide")]
    Chart,
}

impl SlideType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title_slide",
            Self::Content => "content_slide",
            Self::Question => "question_slide",
            Self::UnorderedList => "unordered_list_slide",
            Self::Chart => "chart_slide",
        }
    }
}

///// A content key's value: a scalar, a sequence, or an ordered mapping.
///
/// Mapping order is preserved (`serde_json` with `preserve_order`), matching
/// the script author's intent for keyed option lists.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    Text(String),
    List(Vec<String>),
    Map(serde_json::Map<String, serde_json::Value>),
}

impl ContentValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The content keys a slide may carry, in fixed layout priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKey {
    Title,
    Subtitle,
    Content,
    Question,
    Options,
    Points,
    Explanation,
}

impl ContentKey {
    /// Layout priority order: title first, explanation last.
    pub const ALL: [ContentKey; 7] = [
        ContentKey::Title,
        ContentKey::Subtitle,
        ContentKey::Content,
        ContentKey::Question,
        ContentKey::Options,
        ContentKey::Points,
        ContentKey::Explanation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Content => "content",
            Self::Question => "question",
            Self::Options => "options",
            Self::Points => "points",
            Self::Explanation => "explanation",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

/// The logical chart a chart slide asks the rasterization collaborator for.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub data: Vec<DataPoint>,
}

/// One slide's semantic payload as authored in the script document.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlideContent {
    #[serde(rename = "slideNumber")]
    pub slide_number: u32,
    #[serde(rename = "type")]
    pub slide_type: SlideType,

    pub title: Option<ContentValue>,
    pub subtitle: Option<ContentValue>,
    pub content: Option<ContentValue>,
    pub question: Option<ContentValue>,
    pub options: Option<ContentValue>,
    pub points: Option<ContentValue>,
    pub explanation: Option<ContentValue>,

    pub formula: Option<String>,
    pub code: Option<String>,
    pub lexer: Option<String>,

    #[serde(rename = "chartType")]
    pub chart_type: Option<ChartType>,
    pub data: Option<Vec<DataPoint>>,

    #[serde(rename = "imagePrompt")]
    pub image_prompt: Option<String>,
    #[serde(rename = "imageRatio")]
    pub image_ratio: Option<String>,

    pub voiceover: Option<String>,
    pub transition: Option<String>,
}

impl SlideContent {
    pub fn value(&self, key: ContentKey) -> Option<&ContentValue> {
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

    /// Narration text: explicit voiceover, else the body text. List and
    /// mapping bodies are spoken item by item.
    pub fn narration_text(&self) -> String {
        if let Some(v) = &self.voiceover {
            return v.clone();
        }
        match &self.content {
            Some(ContentValue::Text(s)) => s.clone(),
            Some(ContentValue::List(items)) => items.join(" "),
            Some(ContentValue::Map(map)) => map
                .values()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            None => String::new(),
        }
    }

    /// Chart payload for chart-bearing slides.
    pub fn chart_spec(&self) -> Option<ChartSpec> {
        if self.slide_type != SlideType::Chart {
            return None;
        }
        Some(ChartSpec {
            chart_type: self.chart_type.unwrap_or_default(),
            title: self
                .title
                .as_ref()
                .and_then(|v| v.as_text())
                .unwrap_or("Chart")
                .to_string(),
            data: self.data.clone().unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> SlidecastResult<()> {
        if self.formula.is_some() && self.code.is_some() {
            return Err(SlidecastError::input(format!(
                "slide {}: formula and code are mutually exclusive",
                self.slide_number
            )));
        }
        if self.slide_type == SlideType::Chart
            && self.data.as_ref().is_none_or(|d| d.is_empty())
        {
            return Err(SlidecastError::input(format!(
                "slide {}: chart slide has no data",
                self.slide_number
            )));
        }
        Ok(())
    }
}
