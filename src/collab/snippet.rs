use std::path::Path;

use crate::collab::process::run_template;
use crate::error::SlidecastResult;

/// Syntax-highlighting lexer registry.
///
/// Unknown tags fall back to `Bash`, mirroring the script format's default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LexerTag {
    Python,
    Java,
    Mathematica,
    Cpp,
    CSharp,
    Html,
    Css,
    Javascript,
    Json,
    Yaml,
    #[default]
    Bash,
    Perl,
    Php,
    Ruby,
    Sql,
    Swift,
    ObjectiveC,
    Matlab,
}

impl LexerTag {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" => Self::Python,
            "java" => Self::Java,
            "mathematics" | "mathematica" => Self::Mathematica,
            "cpp" => Self::Cpp,
            "c" | "csharp" => Self::CSharp,
            "html" => Self::Html,
            "css" => Self::Css,
            "javascript" => Self::Javascript,
            "json" => Self::Json,
            "yaml" => Self::Yaml,
            "perl" => Self::Perl,
            "php" => Self::Php,
            "ruby" => Self::Ruby,
            "sql" => Self::Sql,
            "swift" => Self::Swift,
            "objc" | "objective-c" => Self::ObjectiveC,
            "matlab" => Self::Matlab,
            _ => Self::Bash,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::Mathematica => "mathematica",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Html => "html",
            Self::Css => "css",
            Self::Javascript => "javascript",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Bash => "bash",
            Self::Perl => "perl",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Sql => "sql",
            Self::Swift => "swift",
            Self::ObjectiveC => "objc",
            Self::Matlab => "matlab",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnippetKind {
    Formula,
    Code,
}

/// One highlighted-snippet rasterization request.
#[derive(Clone, Debug)]
pub struct SnippetRequest {
    pub kind: SnippetKind,
    pub text: String,
    pub lexer: LexerTag,
    /// Highlighting style tag (e.g. "monokai").
    pub style: String,
    /// Font size chosen by the three-tier length rule.
    pub font_size: u32,
}

impl SnippetRequest {
    /// Font tier by text length: short texts get a large font, long texts a
    /// small one.
    pub fn tiered_font_size(kind: SnippetKind, text: &str) -> u32 {
        let (large, medium, small) = match kind {
            SnippetKind::Formula => (37, 34, 27),
            SnippetKind::Code => (32, 26, 22),
        };
        if text.len() < 100 {
            large
        } else if text.len() > 200 {
            small
        } else {
            medium
        }
    }
}

/// Rasterize highlighted code or formula text to a pixel image.
pub trait SnippetRasterizer {
    fn rasterize(&self, request: &SnippetRequest, out_path: &Path) -> SlidecastResult<()>;
}

/// Snippet rasterizer backed by an external command template with `{text}`,
/// `{lexer}`, `{style}`, `{font_size}`, and `{out}` placeholders.
#[derive(Clone, Debug)]
pub struct CommandSnippetRasterizer {
    argv: Vec<String>,
}

impl CommandSnippetRasterizer {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl SnippetRasterizer for CommandSnippetRasterizer {
    fn rasterize(&self, request: &SnippetRequest, out_path: &Path) -> SlidecastResult<()> {
        let out = out_path.to_string_lossy().into_owned();
        let font_size = request.font_size.to_string();
        run_template(
            &self.argv,
            &[
                ("text", &request.text),
                ("lexer", request.lexer.as_str()),
                ("style", &request.style),
                ("font_size", &font_size),
                ("out", &out),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexer_registry_maps_known_tags() {
        assert_eq!(LexerTag::from_tag("python"), LexerTag::Python);
        assert_eq!(LexerTag::from_tag(" SQL "), LexerTag::Sql);
        assert_eq!(LexerTag::from_tag("mathematics"), LexerTag::Mathematica);
        assert_eq!(LexerTag::from_tag("c"), LexerTag::CSharp);
    }

    #[test]
    fn unknown_lexer_falls_back_to_bash() {
        assert_eq!(LexerTag::from_tag("brainfuck"), LexerTag::Bash);
        assert_eq!(LexerTag::from_tag(""), LexerTag::Bash);
    }

    #[test]
    fn font_tiers_follow_text_length() {
        let short = "x".repeat(50);
        let medium = "x".repeat(150);
        let long = "x".repeat(250);
        assert_eq!(
            SnippetRequest::tiered_font_size(SnippetKind::Formula, &short),
            37
        );
        assert_eq!(
            SnippetRequest::tiered_font_size(SnippetKind::Formula, &medium),
            34
        );
        assert_eq!(
            SnippetRequest::tiered_font_size(SnippetKind::Formula, &long),
            27
        );
        assert_eq!(
            SnippetRequest::tiered_font_size(SnippetKind::Code, &short),
            32
        );
        assert_eq!(SnippetRequest::tiered_font_size(SnippetKind::Code, &long), 22);
    }
}
