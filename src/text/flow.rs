use crate::error::SlidecastResult;

/// Pixel-width measurement for a run of text at a given font size.
///
/// Measurement is always delegated here; the wrapper never assumes a
/// fixed-width font. Implementations may cache shaping state, hence `&mut`.
pub trait TextMeasure {
    fn text_width(&mut self, text: &str, font_size: f32) -> SlidecastResult<f32>;
}

/// Wrapped lines plus the total vertical height they consume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub height: f32,
}

impl WrappedText {
    /// Restartable iteration over the committed lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// Greedy word wrap against `max_width`.
///
/// Words accumulate into a candidate line; when appending the next word would
/// exceed `max_width`, the current line is committed and the word starts a new
/// one. The final partial line is committed unconditionally. A single word
/// wider than `max_width` occupies its own line; there is no mid-word
/// breaking. Empty input yields no lines and zero height.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_size: f32,
    line_height: f32,
    measure: &mut impl TextMeasure,
) -> SlidecastResult<WrappedText> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.text_width(&candidate, font_size)? <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let height = lines.len() as f32 * line_height;
    Ok(WrappedText { lines, height })
}
