//! Tooltip
//! Overlay state: content, page position and an opacity that fades out.

use crate::charts::zoom::ease_cubic;
use crate::data::DataPoint;
use crate::scene::Point;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    Hidden,
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f64,
    elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    phase: TooltipPhase,
    lines: Vec<String>,
    position: Point,
    opacity: f64,
    fade: Option<Fade>,
    fade_duration: Duration,
    offset: (f64, f64),
    shows: usize,
    hides: usize,
}

impl Tooltip {
    pub fn new(offset: (f64, f64), fade_duration: Duration) -> Self {
        Self {
            phase: TooltipPhase::Hidden,
            lines: Vec::new(),
            position: Point::default(),
            opacity: 0.0,
            fade: None,
            fade_duration,
            offset,
            shows: 0,
            hides: 0,
        }
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase != TooltipPhase::Hidden
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Top-left corner in page coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Number of `show` calls so far.
    pub fn show_count(&self) -> usize {
        self.shows
    }

    /// Number of fades actually started by `hide`.
    pub fn hide_count(&self) -> usize {
        self.hides
    }

    /// Show immediately at full opacity, cancelling any fade.
    pub fn show(&mut self, point: &DataPoint, page: Point) {
        self.shows += 1;
        self.lines = content_for(point);
        self.phase = TooltipPhase::Visible;
        self.opacity = 1.0;
        self.fade = None;
        self.move_to(page);
    }

    pub fn move_to(&mut self, page: Point) {
        self.position = Point::new(page.x + self.offset.0, page.y + self.offset.1);
    }

    /// Start fading out; a no-op if already fading or hidden.
    pub fn hide(&mut self) {
        if self.phase != TooltipPhase::Visible {
            return;
        }
        self.hides += 1;
        self.phase = TooltipPhase::FadingOut;
        self.fade = Some(Fade {
            from: self.opacity,
            elapsed: Duration::ZERO,
        });
    }

    /// Advance the fade. Returns true while still animating.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(fade) = self.fade.as_mut() else {
            return false;
        };
        fade.elapsed = (fade.elapsed + dt).min(self.fade_duration);
        let done = fade.elapsed >= self.fade_duration;
        if done {
            self.fade = None;
            self.opacity = 0.0;
            self.phase = TooltipPhase::Hidden;
            return false;
        }
        let t = ease_cubic(fade.elapsed.as_secs_f64() / self.fade_duration.as_secs_f64());
        self.opacity = fade.from * (1.0 - t);
        true
    }
}

fn content_for(point: &DataPoint) -> Vec<String> {
    vec![point.datetime.clone(), format!("value[%] {}", point.value)]
}
