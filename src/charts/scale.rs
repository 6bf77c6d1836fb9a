//! Scales
//! Band scale for keyed bars and linear scale for values and the overview.

use std::collections::HashMap;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Maps categorical keys to contiguous, padded pixel bands.
#[derive(Clone, Debug)]
pub struct BandScale {
    keys: Vec<String>,
    index: HashMap<String, usize>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    start: f64,
    step: f64,
    band_width: f64,
}

impl BandScale {
    pub fn new(keys: Vec<String>, range: (f64, f64)) -> Self {
        let index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        let mut scale = Self {
            keys,
            index,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            start: range.0,
            step: 0.0,
            band_width: 0.0,
        };
        scale.rescale();
        scale
    }

    /// Sets inner and outer padding together.
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.padding_outer = padding.max(0.0);
        self.rescale();
        self
    }

    pub fn padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.rescale();
        self
    }

    pub fn padding_outer(mut self, padding: f64) -> Self {
        self.padding_outer = padding.max(0.0);
        self.rescale();
        self
    }

    pub fn align(mut self, align: f64) -> Self {
        self.align = align.clamp(0.0, 1.0);
        self.rescale();
        self
    }

    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
        self.rescale();
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn band_width(&self) -> f64 {
        self.band_width
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn rescale(&mut self) {
        let (r0, r1) = self.range;
        if self.keys.is_empty() {
            self.start = r0;
            self.step = 0.0;
            self.band_width = 0.0;
            return;
        }
        let n = self.keys.len() as f64;
        let reverse = r1 < r0;
        let (mut start, stop) = if reverse { (r1, r0) } else { (r0, r1) };
        let step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        start += (stop - start - step * (n - self.padding_inner)) * self.align;
        self.band_width = step * (1.0 - self.padding_inner);
        if reverse {
            // Walk backwards from the far end so index 0 sits at r0
            self.start = start + step * (n - 1.0);
            self.step = -step;
        } else {
            self.start = start;
            self.step = step;
        }
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Band start for a key; `None` for keys outside the domain.
    pub fn map(&self, key: &str) -> Option<f64> {
        self.index_of(key).and_then(|i| self.position(i))
    }

    pub fn position(&self, idx: usize) -> Option<f64> {
        if idx >= self.keys.len() {
            return None;
        }
        Some(self.start + self.step * idx as f64)
    }

    pub fn center(&self, idx: usize) -> Option<f64> {
        self.position(idx).map(|x| x + self.band_width * 0.5)
    }

    /// Index of the band slot containing `px`, clamped to the domain.
    pub fn index_at(&self, px: f64) -> Option<usize> {
        if self.keys.is_empty() || self.step == 0.0 {
            return None;
        }
        let raw = ((px - self.start) / self.step).floor();
        Some(raw.clamp(0.0, (self.keys.len() - 1) as f64) as usize)
    }

    /// Indices whose bands intersect `[lo, hi]`.
    pub fn indices_within(&self, lo: f64, hi: f64) -> std::ops::Range<usize> {
        let n = self.keys.len();
        if n == 0 || self.step == 0.0 {
            return 0..0;
        }
        let (a, b) = if self.step > 0.0 {
            ((lo - self.band_width - self.start) / self.step, (hi - self.start) / self.step)
        } else {
            ((hi - self.start) / self.step, (lo - self.band_width - self.start) / self.step)
        };
        let first = a.ceil().max(0.0);
        let last = b.floor().min((n - 1) as f64);
        if last < first {
            return 0..0;
        }
        first as usize..last as usize + 1
    }
}

/// Continuous proportional mapping from a numeric domain to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let d = d1 - d0;
        if d.abs() < 1e-12 {
            return r0;
        }
        r0 + (value - d0) / d * (r1 - r0)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let r = r1 - r0;
        if r.abs() < 1e-12 {
            return d0;
        }
        d0 + (px - r0) / r * (d1 - d0)
    }

    /// Extend the domain to round bounds.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut d0, mut d1) = self.domain;
        let reversed = d1 < d0;
        if reversed {
            std::mem::swap(&mut d0, &mut d1);
        }
        let mut start = d0;
        let mut stop = d1;
        let mut prestep = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if prestep == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = Some(step);
        }
        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    /// Roughly `count` round values spanning the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d1 < d0 { (d1, d0) } else { (d0, d1) };
        if count == 0 || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }

        let step = (hi - lo) / count as f64;
        let power = step.log10().floor();
        let error = step / 10f64.powf(power);
        let factor = tick_factor(error);

        let mut ticks = Vec::new();
        if power < 0.0 {
            let inc = 10f64.powf(-power) / factor;
            let mut i1 = (lo * inc).round();
            let mut i2 = (hi * inc).round();
            if i1 / inc < lo {
                i1 += 1.0;
            }
            if i2 / inc > hi {
                i2 -= 1.0;
            }
            let mut i = i1;
            while i <= i2 {
                ticks.push(i / inc);
                i += 1.0;
            }
        } else {
            let inc = 10f64.powf(power) * factor;
            let mut i1 = (lo / inc).round();
            let mut i2 = (hi / inc).round();
            if i1 * inc < lo {
                i1 += 1.0;
            }
            if i2 * inc > hi {
                i2 -= 1.0;
            }
            let mut i = i1;
            while i <= i2 {
                ticks.push(i * inc);
                i += 1.0;
            }
        }

        if d1 < d0 {
            ticks.reverse();
        }
        ticks
    }
}

fn tick_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

/// Positive for steps >= 1, negative reciprocal for fractional steps.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = tick_factor(error);
    if power < 0.0 {
        -10f64.powf(-power) / factor
    } else {
        factor * 10f64.powf(power)
    }
}
