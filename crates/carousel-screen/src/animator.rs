// ABOUTME: Time-driven animation scheduler for view frames and scroll offsets.
// ABOUTME: Model values change immediately; the animator supplies in-between presentation values.

use std::time::{Duration, Instant};

use carousel_core::{Easing, Point, Rect};
use carousel_layout::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Track {
    Frame { view: ViewId, from: Rect, to: Rect },
    ContentOffset { view: ViewId, from: Point, to: Point },
}

#[derive(Debug)]
struct Animation {
    id: AnimationId,
    started: Instant,
    duration: Duration,
    easing: Easing,
    tracks: Vec<Track>,
    /// Eased progress as of the last tick
    progress: f64,
}

impl Animation {
    fn linear_progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

#[derive(Debug, Default)]
pub struct Animator {
    next_id: u64,
    active: Vec<Animation>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `tracks` from `now`. An animation with no tracks still
    /// runs for `duration` and completes normally.
    pub fn animate(
        &mut self,
        now: Instant,
        duration: Duration,
        easing: Easing,
        tracks: Vec<Track>,
    ) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            "Animation {:?} started: {} tracks over {:?}",
            id,
            tracks.len(),
            duration
        );
        self.active.push(Animation {
            id,
            started: now,
            duration,
            easing,
            tracks,
            progress: 0.0,
        });
        id
    }

    /// Advance every animation to `now`. Returns the animations that finished,
    /// in the order they were started.
    pub fn tick(&mut self, now: Instant) -> Vec<AnimationId> {
        let mut finished = Vec::new();
        self.active.retain_mut(|animation| {
            let linear = animation.linear_progress(now);
            animation.progress = animation.easing.apply(linear);
            if linear >= 1.0 {
                finished.push(animation.id);
                false
            } else {
                true
            }
        });
        finished
    }

    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    /// In-flight frame of `view`, if an animation is moving it
    pub fn presentation_frame(&self, view: ViewId) -> Option<Rect> {
        self.active.iter().rev().find_map(|animation| {
            animation.tracks.iter().find_map(|track| match track {
                Track::Frame { view: v, from, to } if *v == view => {
                    Some(from.lerp(to, animation.progress))
                }
                _ => None,
            })
        })
    }

    /// In-flight scroll offset of `view`, if an animation is scrolling it
    pub fn presentation_offset(&self, view: ViewId) -> Option<Point> {
        self.active.iter().rev().find_map(|animation| {
            animation.tracks.iter().find_map(|track| match track {
                Track::ContentOffset { view: v, from, to } if *v == view => {
                    Some(from.lerp(*to, animation.progress))
                }
                _ => None,
            })
        })
    }

    /// Point in-flight animations at new end values, e.g. after the root resized
    pub fn retarget(
        &mut self,
        mut frame: impl FnMut(ViewId) -> Option<Rect>,
        mut offset: impl FnMut(ViewId) -> Option<Point>,
    ) {
        for track in self.active.iter_mut().flat_map(|a| a.tracks.iter_mut()) {
            match track {
                Track::Frame { view, to, .. } => {
                    if let Some(target) = frame(*view) {
                        *to = target;
                    }
                }
                Track::ContentOffset { view, to, .. } => {
                    if let Some(target) = offset(*view) {
                        *to = target;
                    }
                }
            }
        }
    }
}
