pub type SlidecastResult<T> = Result<T, SlidecastError>;

#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// Malformed or missing script/style document. Fatal before any slide work.
    #[error("input error: {0}")]
    Input(String),

    /// The speech-synthesis collaborator reported failure.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// A referenced image/snippet asset could not be opened or rasterized.
    #[error("asset error: {0}")]
    Asset(String),

    /// An unexpected content value shape for a recognized key.
    #[error("layout error: {0}")]
    Layout(String),

    /// Frame encoding or muxing failure.
    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Wrap an error with the failing slide number and pipeline stage.
    pub fn at_slide(self, slide_number: u32, stage: &str) -> Self {
        match self {
            Self::Input(m) => Self::Input(format!("slide {slide_number} ({stage}): {m}")),
            Self::Synthesis(m) => Self::Synthesis(format!("slide {slide_number} ({stage}): {m}")),
            Self::Asset(m) => Self::Asset(format!("slide {slide_number} ({stage}): {m}")),
            Self::Layout(m) => Self::Layout(format!("slide {slide_number} ({stage}): {m}")),
            Self::Encode(m) => Self::Encode(format!("slide {slide_number} ({stage}): {m}")),
            Self::Other(e) => Self::Other(e.context(format!("slide {slide_number} ({stage})"))),
        }
    }
}
