//! Folds timed clips and their requested transitions into one timeline.
//!
//! The fold runs right to left: the final clip anchors the tail of the
//! timeline and each earlier clip is prepended, shifting everything after it.
//! Narration audio is never overlapped, so total runtime is exactly the sum
//! of clip durations; slide transitions carve their overlap window out of the
//! visual time on either side of a boundary instead of extending it.

use crate::script::SlideType;
use crate::timeline::clip::TimedClip;
use crate::timeline::transition::{SlideDir, Transition};

/// One clip's span on the timeline, with optional fade envelopes at its ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub clip: usize,
    pub start: f64,
    pub duration: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

/// A directional wipe between two adjacent clips. During the window the
/// outgoing clip slides off-canvas while the incoming one slides on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideWindow {
    pub start: f64,
    pub duration: f64,
    pub dir: SlideDir,
    pub out_clip: usize,
    pub in_clip: usize,
}

pub struct Timeline {
    pub clips: Vec<TimedClip>,
    pub segments: Vec<Segment>,
    pub windows: Vec<SlideWindow>,
    pub total_secs: f64,
}

/// Reduce clips into a timeline, resolving one requested transition per
/// boundary. `requested` holds the transition between clip `i` and `i + 1`;
/// when two adjacent clips are both unordered lists the request is overridden
/// with a hard cut so a multi-slide list reads as one continuous build.
pub fn reduce(
    clips: Vec<TimedClip>,
    requested: &[Transition],
    transition_secs: f64,
) -> Timeline {
    let n = clips.len();
    if n == 0 {
        return Timeline {
            clips,
            segments: Vec::new(),
            windows: Vec::new(),
            total_secs: 0.0,
        };
    }

    let last = n - 1;
    let mut segments = vec![Segment {
        clip: last,
        start: 0.0,
        duration: clips[last].duration_secs,
        fade_in: 0.0,
        fade_out: 0.0,
    }];
    let mut windows: Vec<SlideWindow> = Vec::new();
    let mut total = clips[last].duration_secs;

    for i in (0..last).rev() {
        let d_left = clips[i].duration_secs;

        // Everything already placed moves right to make room.
        for seg in &mut segments {
            seg.start += d_left;
        }
        for win in &mut windows {
            win.start += d_left;
        }

        let both_lists = clips[i].slide_type == SlideType::UnorderedList
            && clips[i + 1].slide_type == SlideType::UnorderedList;
        let transition = if both_lists {
            Transition::Cut
        } else {
            requested.get(i).copied().unwrap_or_default()
        };

        let mut seg = Segment {
            clip: i,
            start: 0.0,
            duration: d_left,
            fade_in: 0.0,
            fade_out: 0.0,
        };

        match transition {
            Transition::Cut => {}
            Transition::FadeOut => {
                seg.fade_out = transition_secs.min(d_left);
            }
            Transition::FadeIn => {
                segments[0].fade_in = transition_secs.min(segments[0].duration);
            }
            Transition::Dissolve => {
                seg.fade_out = transition_secs.min(d_left);
                segments[0].fade_in = transition_secs.min(segments[0].duration);
            }
            Transition::Slide(dir) => {
                let half = (transition_secs / 2.0)
                    .min(d_left)
                    .min(clips[i + 1].duration_secs);
                if half > 0.0 {
                    windows.insert(
                        0,
                        SlideWindow {
                            start: d_left - half,
                            duration: 2.0 * half,
                            dir,
                            out_clip: i,
                            in_clip: i + 1,
                        },
                    );
                }
            }
        }

        segments.insert(0, seg);
        total += d_left;
    }

    Timeline {
        clips,
        segments,
        windows,
        total_secs: total,
    }
}

impl Timeline {
    /// Segment covering time `t`, if any. Boundaries belong to the later
    /// segment.
    pub fn segment_at(&self, t: f64) -> Option<&Segment> {
        let mut hit = None;
        for seg in &self.segments {
            if t >= seg.start && t < seg.start + seg.duration {
                hit = Some(seg);
            }
        }
        hit.or_else(|| {
            self.segments
                .last()
                .filter(|seg| t >= seg.start && t <= seg.start + seg.duration)
        })
    }

    /// Slide window covering time `t`, if any. Windows take priority over
    /// plain segments when a frame is sampled.
    pub fn window_at(&self, t: f64) -> Option<&SlideWindow> {
        self.windows
            .iter()
            .find(|win| t >= win.start && t < win.start + win.duration)
    }
}
