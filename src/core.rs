use crate::error::{SlidecastError, SlidecastResult};

/// Fixed output canvas in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> SlidecastResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidecastError::input("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa` hex notation.
    pub fn parse_hex(s: &str) -> SlidecastResult<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        let nibble = |c: u8| -> SlidecastResult<u8> {
            match c {
                b'0'..=b'9' => Ok(c - b'0'),
                b'a'..=b'f' => Ok(c - b'a' + 10),
                b'A'..=b'F' => Ok(c - b'A' + 10),
                _ => Err(SlidecastError::input(format!("invalid hex color '{s}'"))),
            }
        };
        let b = hex.as_bytes();
        match b.len() {
            3 => {
                let r = nibble(b[0])?;
                let g = nibble(b[1])?;
                let bl = nibble(b[2])?;
                Ok(Self {
                    r: r << 4 | r,
                    g: g << 4 | g,
                    b: bl << 4 | bl,
                    a: 255,
                })
            }
            6 | 8 => {
                let byte = |i: usize| -> SlidecastResult<u8> {
                    Ok(nibble(b[i])? << 4 | nibble(b[i + 1])?)
                };
                Ok(Self {
                    r: byte(0)?,
                    g: byte(2)?,
                    b: byte(4)?,
                    a: if b.len() == 8 { byte(6)? } else { 255 },
                })
            }
            _ => Err(SlidecastError::input(format!("invalid hex color '{s}'"))),
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Strip embedded markup tags and normalize punctuation-equivalent Unicode
/// characters (curly quotes, en/em dashes) to plain ASCII. Used both for
/// on-slide text and for narration handed to the synthesizer.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_zero_dims() {
        assert!(Canvas::new(0, 1080).is_err());
        assert!(Canvas::new(1920, 0).is_err());
        assert!(Canvas::new(1920, 1080).is_ok());
    }

    #[test]
    fn sanitize_replaces_curly_quotes_and_dashes() {
        assert_eq!(
            sanitize_text("\u{201C}it\u{2019}s\u{201D} fine \u{2014} ok"),
            "\"it's\" fine - ok"
        );
    }

    #[test]
    fn sanitize_strips_markup_tags() {
        assert_eq!(
            sanitize_text("Hello <break time=\"1s\"/> world"),
            "Hello  world"
        );
        assert_eq!(sanitize_text("<speak>plain</speak>"), "plain");
    }

    #[test]
    fn hex_color_forms_parse() {
        assert_eq!(
            Rgba8::parse_hex("#ffffff").unwrap(),
            Rgba8 {
                r: 255,
                g: 255,
                b: 255,
                a: 255
            }
        );
        assert_eq!(
            Rgba8::parse_hex("#f00").unwrap(),
            Rgba8 {
                r: 255,
                g: 0,
                b: 0,
                a: 255
            }
        );
        assert_eq!(Rgba8::parse_hex("11223344").unwrap().a, 0x44);
        assert!(Rgba8::parse_hex("#12345").is_err());
        assert!(Rgba8::parse_hex("zzzzzz").is_err());
    }
}
