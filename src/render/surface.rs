use std::path::Path;

use crate::core::Rgba8;
use crate::error::{SlidecastError, SlidecastResult};

/// A CPU compositing surface: premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Surface filled with one straight-alpha color.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        let px = premul_px(color.to_array());
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_premul_parts(width: u32, height: u32, data: Vec<u8>) -> SlidecastResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(SlidecastError::asset(
                "surface byte length mismatch with width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an image file into a premultiplied surface.
    pub fn decode_path(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::asset(format!("failed to read image '{}': {e}", path.display()))
        })?;
        let dyn_img = image::load_from_memory(&bytes).map_err(|e| {
            SlidecastError::asset(format!("failed to decode image '{}': {e}", path.display()))
        })?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_parts(width, height, data)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Composite `src` over `self` at `(x, y)` with a global opacity,
    /// clipping to the destination bounds.
    pub fn blit_over(&mut self, src: &Surface, x: i32, y: i32, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        for sy in 0..src.height as i32 {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width as i32 {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let si = ((sy as usize) * (src.width as usize) + sx as usize) * 4;
                let di = ((dy as usize) * (self.width as usize) + dx as usize) * 4;
                let s = [src.data[si], src.data[si + 1], src.data[si + 2], src.data[si + 3]];
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                let out = over(d, s, opacity);
                self.data[di..di + 4].copy_from_slice(&out);
            }
        }
    }

    /// Scale to an exact pixel box, preserving nothing about aspect ratio.
    pub fn scaled_to(&self, width: u32, height: u32) -> SlidecastResult<Surface> {
        if width == 0 || height == 0 {
            return Err(SlidecastError::asset("scale target must be non-zero"));
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }

        // Resample in straight-alpha space; the image crate filters assume it.
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| SlidecastError::asset("surface buffer has invalid dimensions"))?;
        let resized =
            image::imageops::resize(&img, width, height, image::imageops::FilterType::CatmullRom);
        let mut data = resized.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Surface::from_premul_parts(width, height, data)
    }

    /// Scale so the result has the given width, preserving aspect ratio.
    pub fn scaled_to_width(&self, width: u32) -> SlidecastResult<Surface> {
        let height =
            ((self.height as f64) * (width as f64) / (self.width as f64)).round().max(1.0) as u32;
        self.scaled_to(width, height)
    }

    /// Scale so the result has the given height, preserving aspect ratio.
    pub fn scaled_to_height(&self, height: u32) -> SlidecastResult<Surface> {
        let width =
            ((self.width as f64) * (height as f64) / (self.height as f64)).round().max(1.0) as u32;
        self.scaled_to(width, height)
    }

    /// Flatten to opaque RGBA8 over a background color, applying a whole-frame
    /// opacity envelope (fades dim toward the background).
    pub fn flatten_onto(&self, bg: Rgba8, envelope: f32) -> Vec<u8> {
        let envelope = envelope.clamp(0.0, 1.0);
        let bg_r = u16::from(bg.r);
        let bg_g = u16::from(bg.g);
        let bg_b = u16::from(bg.b);
        let env = ((envelope * 255.0).round() as u32).clamp(0, 255) as u16;

        let mut out = vec![0u8; self.data.len()];
        for (d, s) in out.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            let a = mul_div255_16(u16::from(s[3]), env);
            let inv = 255u16 - a;
            let r = mul_div255_16(u16::from(s[0]), env) + mul_div255_16(bg_r, inv);
            let g = mul_div255_16(u16::from(s[1]), env) + mul_div255_16(bg_g, inv);
            let b = mul_div255_16(u16::from(s[2]), env) + mul_div255_16(bg_b, inv);
            d[0] = r.min(255) as u8;
            d[1] = g.min(255) as u8;
            d[2] = b.min(255) as u8;
            d[3] = 255;
        }
        out
    }
}

/// Premultiplied source-over for one pixel with a global opacity.
pub fn over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn premul_px(rgba: [u8; 4]) -> [u8; 4] {
    let a = u16::from(rgba[3]);
    let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
    [premul(rgba[0]), premul(rgba[1]), premul(rgba[2]), rgba[3]]
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn mul_div255_16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_returns_scaled_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn blit_clips_outside_destination() {
        let mut dst = Surface::new(4, 4);
        let src = Surface::filled(4, 4, Rgba8::WHITE);
        dst.blit_over(&src, -2, -2, 1.0);
        // Top-left quadrant covered, bottom-right untouched.
        assert_eq!(&dst.data()[0..4], &[255, 255, 255, 255]);
        let last = dst.data().len() - 4;
        assert_eq!(&dst.data()[last..], &[0, 0, 0, 0]);
    }

    #[test]
    fn flatten_full_envelope_over_black_keeps_opaque_pixels() {
        let s = Surface::filled(1, 1, Rgba8 {
            r: 128,
            g: 0,
            b: 0,
            a: 255,
        });
        assert_eq!(s.flatten_onto(Rgba8::BLACK, 1.0), vec![128, 0, 0, 255]);
    }

    #[test]
    fn flatten_zero_envelope_is_background() {
        let s = Surface::filled(1, 1, Rgba8::WHITE);
        assert_eq!(
            s.flatten_onto(Rgba8 {
                r: 10,
                g: 20,
                b: 30,
                a: 255
            }, 0.0),
            vec![10, 20, 30, 255]
        );
    }

    #[test]
    fn scaled_to_width_preserves_aspect() {
        let s = Surface::filled(100, 50, Rgba8::WHITE);
        let scaled = s.scaled_to_width(60).unwrap();
        assert_eq!(scaled.width, 60);
        assert_eq!(scaled.height, 30);
    }
}
