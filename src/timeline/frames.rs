//! Samples the timeline into video frames.

use crate::core::{Canvas, Rgba8};
use crate::render::Surface;
use crate::timeline::reduce::{Segment, Timeline};
use crate::timeline::transition::SlideDir;

/// Serves fully flattened RGBA frames for any point on a timeline.
///
/// Each clip's visual is composited once up front; sampling a frame is then a
/// lookup plus at most two blits. When a backdrop image is configured it sits
/// behind every transition window and fade; otherwise the solid background
/// color does.
pub struct FrameServer {
    timeline: Timeline,
    canvas: Canvas,
    background: Rgba8,
    backdrop: Option<Surface>,
    stills: Vec<Surface>,
}

impl FrameServer {
    pub fn new(
        timeline: Timeline,
        canvas: Canvas,
        background: Rgba8,
        backdrop: Option<Surface>,
    ) -> Self {
        let stills = timeline
            .clips
            .iter()
            .map(|clip| clip.visual.composited())
            .collect();
        Self {
            timeline,
            canvas,
            background,
            backdrop,
            stills,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn total_secs(&self) -> f64 {
        self.timeline.total_secs
    }

    /// Number of frames a constant-rate encode of this timeline needs.
    pub fn total_frames(&self, fps: u32) -> u64 {
        (self.timeline.total_secs * f64::from(fps)).round() as u64
    }

    /// Flattened opaque RGBA frame at time `t` seconds.
    pub fn frame_at(&self, t: f64) -> Vec<u8> {
        if let Some(win) = self.timeline.window_at(t) {
            let p = ((t - win.start) / win.duration).clamp(0.0, 1.0);
            let w = f64::from(self.canvas.width);
            let h = f64::from(self.canvas.height);
            let ((ax, ay), (bx, by)) = match win.dir {
                SlideDir::Left => (((-w * p), 0.0), ((w * (1.0 - p)), 0.0)),
                SlideDir::Right => (((w * p), 0.0), ((-w * (1.0 - p)), 0.0)),
                SlideDir::Up => ((0.0, -h * p), (0.0, h * (1.0 - p))),
                SlideDir::Down => ((0.0, h * p), (0.0, -h * (1.0 - p))),
            };
            let mut frame = self.empty_frame();
            frame.blit_over(&self.stills[win.out_clip], ax as i32, ay as i32, 1.0);
            frame.blit_over(&self.stills[win.in_clip], bx as i32, by as i32, 1.0);
            return frame.flatten_onto(self.background, 1.0);
        }

        match self.timeline.segment_at(t) {
            Some(seg) => {
                let envelope = fade_envelope(seg, t);
                match &self.backdrop {
                    // Fades dim toward the backdrop image, not through it.
                    Some(_) => {
                        let mut frame = self.empty_frame();
                        frame.blit_over(&self.stills[seg.clip], 0, 0, envelope);
                        frame.flatten_onto(self.background, 1.0)
                    }
                    None => self.stills[seg.clip].flatten_onto(self.background, envelope),
                }
            }
            None => self.empty_frame().flatten_onto(self.background, 1.0),
        }
    }

    /// A clip-less frame: the backdrop image when configured, else a solid
    /// background-colored canvas.
    fn empty_frame(&self) -> Surface {
        match &self.backdrop {
            Some(b) => b.clone(),
            None => Surface::filled(self.canvas.width, self.canvas.height, self.background),
        }
    }
}

/// Opacity of a segment at time `t`, honoring its fade-in and fade-out tails.
fn fade_envelope(seg: &Segment, t: f64) -> f32 {
    let mut envelope: f64 = 1.0;
    if seg.fade_in > 0.0 {
        let elapsed = t - seg.start;
        if elapsed < seg.fade_in {
            envelope = envelope.min(elapsed / seg.fade_in);
        }
    }
    if seg.fade_out > 0.0 {
        let remaining = seg.start + seg.duration - t;
        if remaining < seg.fade_out {
            envelope = envelope.min(remaining / seg.fade_out);
        }
    }
    envelope.clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SlideVisual;
    use crate::script::SlideType;
    use crate::timeline::clip::TimedClip;
    use crate::timeline::reduce::reduce;
    use crate::timeline::transition::Transition;

    fn clip(n: u32, secs: f64, color: Rgba8) -> TimedClip {
        TimedClip {
            slide_number: n,
            slide_type: SlideType::Content,
            visual: SlideVisual {
                base: Surface::filled(4, 4, color),
                overlay: None,
            },
            audio_path: format!("audio_{n}.mp3").into(),
            duration_secs: secs,
        }
    }

    fn server(transition: Transition, secs: f64) -> FrameServer {
        let timeline = reduce(
            vec![
                clip(1, 3.0, Rgba8 { r: 255, g: 0, b: 0, a: 255 }),
                clip(2, 3.0, Rgba8 { r: 0, g: 0, b: 255, a: 255 }),
            ],
            &[transition],
            secs,
        );
        FrameServer::new(timeline, Canvas { width: 4, height: 4 }, Rgba8::BLACK, None)
    }

    #[test]
    fn frame_count_matches_runtime() {
        let server = server(Transition::Cut, 1.0);
        assert_eq!(server.total_frames(24), 144);
    }

    #[test]
    fn cut_switches_exactly_at_boundary() {
        let server = server(Transition::Cut, 1.0);
        let before = server.frame_at(2.99);
        let after = server.frame_at(3.0);
        assert_eq!(&before[..4], &[255, 0, 0, 255]);
        assert_eq!(&after[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn dissolve_darkens_toward_background_at_boundary() {
        let server = server(Transition::Dissolve, 2.0);
        // At the exact boundary the incoming clip's fade-in starts at zero.
        let frame = server.frame_at(3.0);
        assert_eq!(&frame[..4], &[0, 0, 0, 255]);
        // Mid fade-in the blue clip is partially visible over black.
        let frame = server.frame_at(4.0);
        assert_eq!(frame[2], 128);
        assert_eq!(frame[0], 0);
    }

    #[test]
    fn slide_window_shows_both_clips() {
        let server = server(Transition::Slide(SlideDir::Left), 2.0);
        // Midpoint of the window: red occupies the left half, blue the right.
        let frame = server.frame_at(3.0);
        let row = &frame[..16];
        assert_eq!(&row[0..4], &[255, 0, 0, 255]);
        assert_eq!(&row[12..16], &[0, 0, 255, 255]);
    }

    #[test]
    fn fades_settle_on_the_backdrop_image() {
        let green = Rgba8 { r: 0, g: 255, b: 0, a: 255 };
        let timeline = reduce(
            vec![
                clip(1, 3.0, Rgba8 { r: 255, g: 0, b: 0, a: 255 }),
                clip(2, 3.0, Rgba8 { r: 0, g: 0, b: 255, a: 255 }),
            ],
            &[Transition::Dissolve],
            2.0,
        );
        let server = FrameServer::new(
            timeline,
            Canvas { width: 4, height: 4 },
            Rgba8::BLACK,
            Some(Surface::filled(4, 4, green)),
        );
        // At the boundary both clips are fully faded; the backdrop shows.
        let frame = server.frame_at(3.0);
        assert_eq!(&frame[..4], &[0, 255, 0, 255]);
        // Past the end of the timeline the backdrop shows as well.
        let frame = server.frame_at(100.0);
        assert_eq!(&frame[..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn out_of_range_time_yields_background() {
        let server = server(Transition::Cut, 1.0);
        let frame = server.frame_at(100.0);
        assert_eq!(&frame[..4], &[0, 0, 0, 255]);
    }
}
