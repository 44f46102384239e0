/// Direction a slide transition moves the outgoing clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideDir {
    Left,
    Right,
    Up,
    Down,
}

/// Visual effect bridging two adjacent clips.
///
/// `Cut` is both the explicit "no effect" spelling and the fallback for any
/// unrecognized transition name: scripts keep playing rather than failing on
/// a typo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transition {
    Slide(SlideDir),
    Dissolve,
    FadeIn,
    FadeOut,
    #[default]
    Cut,
}

impl Transition {
    /// Overlap duration used for every transition, in seconds.
    pub const DEFAULT_SECS: f64 = 1.7;

    /// The transition a slide gets when the script names none.
    pub const REQUESTED_DEFAULT: Transition = Transition::Slide(SlideDir::Left);

    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "slide_left" => Self::Slide(SlideDir::Left),
            "slide_right" => Self::Slide(SlideDir::Right),
            "slide_up" => Self::Slide(SlideDir::Up),
            "slide_down" => Self::Slide(SlideDir::Down),
            "dissolve" => Self::Dissolve,
            "fade_in" => Self::FadeIn,
            "fade_out" => Self::FadeOut,
            _ => Self::Cut,
        }
    }

    /// Resolve a script-level optional transition name.
    pub fn from_request(name: Option<&str>) -> Self {
        match name {
            Some(name) => Self::parse(name),
            None => Self::REQUESTED_DEFAULT,
        }
    }
}
