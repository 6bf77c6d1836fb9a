//! Zoom & Pan
//! Zoom transform, the constrained zoom behaviour of the detail view, and the
//! short animated re-anchor transition.

use egui::emath::easing;
use std::time::Duration;

/// Scale factor `k` plus translation, applied as `p * k + t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.k + self.x
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.y) / self.k
    }

    pub fn invert(&self, p: (f64, f64)) -> (f64, f64) {
        (self.invert_x(p.0), self.invert_y(p.1))
    }

    /// Translate in pre-scale units.
    pub fn translate(&self, x: f64, y: f64) -> Self {
        Self::new(self.k, self.x + self.k * x, self.y + self.k * y)
    }

    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.k * k, self.x, self.y)
    }

    /// Apply the transform to both ends of a pixel range.
    pub fn rescale_range(&self, range: (f64, f64)) -> (f64, f64) {
        (self.apply_x(range.0), self.apply_x(range.1))
    }
}

/// `[[x0, y0], [x1, y1]]` rectangle in chart pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Extent {
    pub fn new(corners: [(f64, f64); 2]) -> Self {
        Self {
            x0: corners[0].0,
            y0: corners[0].1,
            x1: corners[1].0,
            y1: corners[1].1,
        }
    }

    pub fn centroid(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

/// Zoom rules of the detail viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomBehavior {
    scale_extent: (f64, f64),
    extent: Extent,
    translate_extent: Extent,
}

impl ZoomBehavior {
    pub fn new(scale_extent: (f64, f64), extent: Extent, translate_extent: Extent) -> Self {
        Self {
            scale_extent,
            extent,
            translate_extent,
        }
    }

    /// Fixed zoom level over a single extent, which also bounds panning.
    pub fn fixed(k: f64, extent: Extent) -> Self {
        Self::new((k, k), extent, extent)
    }

    /// Shift `t` so the viewport never leaves the translate extent.
    pub fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let e = &self.extent;
        let te = &self.translate_extent;
        let dx0 = t.invert_x(e.x0) - te.x0;
        let dx1 = t.invert_x(e.x1) - te.x1;
        let dy0 = t.invert_y(e.y0) - te.y0;
        let dy1 = t.invert_y(e.y1) - te.y1;
        t.translate(settle(dx0, dx1), settle(dy0, dy1))
    }

    fn clamp_scale(&self, t: ZoomTransform, k: f64) -> ZoomTransform {
        let k = k.clamp(self.scale_extent.0, self.scale_extent.1);
        if k == t.k {
            t
        } else {
            ZoomTransform::new(k, t.x, t.y)
        }
    }

    /// Move `t` so that `p1` (pre-transform) lands on `p0` (screen).
    fn anchor(t: ZoomTransform, p0: (f64, f64), p1: (f64, f64)) -> ZoomTransform {
        ZoomTransform::new(t.k, p0.0 - p1.0 * t.k, p0.1 - p1.1 * t.k)
    }

    pub fn scale_to(&self, t0: ZoomTransform, k: f64, anchor: Option<(f64, f64)>) -> ZoomTransform {
        let p0 = anchor.unwrap_or_else(|| self.extent.centroid());
        let p1 = t0.invert(p0);
        self.constrain(Self::anchor(self.clamp_scale(t0, k), p0, p1))
    }

    pub fn scale_by(&self, t0: ZoomTransform, k: f64, anchor: Option<(f64, f64)>) -> ZoomTransform {
        self.scale_to(t0, t0.k * k, anchor)
    }

    /// Put chart point `(x, y)` at `anchor` (defaults to the extent centre).
    pub fn translate_to(
        &self,
        t0: ZoomTransform,
        x: f64,
        y: f64,
        anchor: Option<(f64, f64)>,
    ) -> ZoomTransform {
        let p0 = anchor.unwrap_or_else(|| self.extent.centroid());
        let t = ZoomTransform::IDENTITY
            .translate(p0.0, p0.1)
            .scale(t0.k)
            .translate(-x, -y);
        self.constrain(t)
    }

    /// Pan by a pixel delta, as a drag gesture does.
    pub fn pan_by(&self, t0: ZoomTransform, dx: f64, dy: f64) -> ZoomTransform {
        self.constrain(ZoomTransform::new(t0.k, t0.x + dx, t0.y + dy))
    }
}

fn settle(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else {
        let low = d0.min(0.0);
        if low != 0.0 {
            low
        } else {
            d1.max(0.0)
        }
    }
}

/// Cubic in-out easing over `[0, 1]`.
pub fn ease_cubic(t: f64) -> f64 {
    easing::cubic_in_out(t.clamp(0.0, 1.0) as f32) as f64
}

/// Animated move between two transforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransition {
    from: ZoomTransform,
    to: ZoomTransform,
    duration: Duration,
    elapsed: Duration,
}

impl ZoomTransition {
    pub fn new(from: ZoomTransform, to: ZoomTransform, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance and return the transform for this frame.
    pub fn step(&mut self, dt: Duration) -> ZoomTransform {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.is_finished() {
            return self.to;
        }
        let t = ease_cubic(self.elapsed.as_secs_f64() / self.duration.as_secs_f64());
        ZoomTransform::new(
            lerp(self.from.k, self.to.k, t),
            lerp(self.from.x, self.to.x, t),
            lerp(self.from.y, self.to.y, t),
        )
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
