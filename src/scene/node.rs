//! Scene nodes: shapes, paint and clipping.

/// Opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ClipRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    pub fn intersects(&self, other: &ClipRect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    pub fn intersection(&self, other: &ClipRect) -> Option<ClipRect> {
        if !self.intersects(other) {
            return None;
        }
        Some(ClipRect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    Top,
    #[default]
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Line {
        from: Point,
        to: Point,
    },
    Polyline(Vec<Point>),
    Text {
        at: Point,
        content: String,
        size: f64,
        anchor: TextAnchor,
        baseline: Baseline,
    },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl Shape {
    pub fn bounds(&self) -> Option<ClipRect> {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => Some(ClipRect::new(*x, *y, x + width, y + height)),
            Shape::Line { from, to } => Some(ClipRect::new(from.x, from.y, to.x, to.y)),
            Shape::Polyline(points) => {
                let first = points.first()?;
                Some(points.iter().fold(
                    ClipRect::new(first.x, first.y, first.x, first.y),
                    |acc, p| {
                        ClipRect::new(acc.x0.min(p.x), acc.y0.min(p.y), acc.x1.max(p.x), acc.y1.max(p.y))
                    },
                ))
            }
            Shape::Text { at, .. } => Some(ClipRect::new(at.x, at.y, at.x, at.y)),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        match self {
            Shape::Rect { .. } => self.bounds().is_some_and(|b| b.contains(p)),
            _ => false,
        }
    }

    /// Shape cut to `clip`, or `None` when nothing of it is visible.
    pub fn clipped(&self, clip: &ClipRect) -> Option<Shape> {
        let bounds = self.bounds()?;
        if !bounds.intersects(clip) {
            return None;
        }
        match self {
            Shape::Rect { .. } => {
                let r = bounds.intersection(clip)?;
                Some(Shape::Rect {
                    x: r.x0,
                    y: r.y0,
                    width: r.x1 - r.x0,
                    height: r.y1 - r.y0,
                })
            }
            Shape::Line { from, to } if from.y == to.y => Some(Shape::Line {
                from: Point::new(from.x.clamp(clip.x0, clip.x1), from.y),
                to: Point::new(to.x.clamp(clip.x0, clip.x1), to.y),
            }),
            Shape::Line { from, to } if from.x == to.x => Some(Shape::Line {
                from: Point::new(from.x, from.y.clamp(clip.y0, clip.y1)),
                to: Point::new(to.x, to.y.clamp(clip.y0, clip.y1)),
            }),
            Shape::Text { at, .. } if !clip.contains(*at) => None,
            _ => Some(self.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Dash and gap lengths.
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(mut self, dash: f64, gap: f64) -> Self {
        self.dash = Some((dash, gap));
        self
    }
}

/// Split a segment into its visible dashes.
pub fn dash_segments(from: Point, to: Point, dash: f64, gap: f64) -> Vec<(Point, Point)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 || dash <= 0.0 {
        return vec![(from, to)];
    }
    let (ux, uy) = (dx / length, dy / length);
    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let end = (offset + dash).min(length);
        segments.push((
            Point::new(from.x + ux * offset, from.y + uy * offset),
            Point::new(from.x + ux * end, from.y + uy * end),
        ));
        offset = end + gap.max(0.0);
    }
    segments
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
    pub opacity: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            opacity: 1.0,
        }
    }
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Default::default()
        }
    }

    pub fn stroke(stroke: Stroke) -> Self {
        Self {
            stroke: Some(stroke),
            ..Default::default()
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity <= 0.0 || (self.fill.is_none() && self.stroke.is_none())
    }
}

/// A keyed element of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: String,
    pub shape: Shape,
    pub paint: Paint,
    /// Receives pointer events, even when transparent.
    pub interactive: bool,
}

impl Node {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shape: Shape::default(),
            paint: Paint::default(),
            interactive: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        assert_eq!(Color::from_hex("#95CAFE"), Some(Color::rgb(0x95, 0xCA, 0xFE)));
        assert_eq!(Color::from_hex("95CAFE"), None);
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn rect_clipped_to_viewport() {
        let clip = ClipRect::new(40.0, 0.0, 800.0, 500.0);
        let bar = Shape::Rect {
            x: 780.0,
            y: 100.0,
            width: 40.0,
            height: 50.0,
        };
        assert_eq!(
            bar.clipped(&clip),
            Some(Shape::Rect {
                x: 780.0,
                y: 100.0,
                width: 20.0,
                height: 50.0
            })
        );
        let hidden = Shape::Rect {
            x: -500.0,
            y: 100.0,
            width: 40.0,
            height: 50.0,
        };
        assert_eq!(hidden.clipped(&clip), None);
    }

    #[test]
    fn horizontal_line_is_trimmed() {
        let clip = ClipRect::new(40.0, 0.0, 800.0, 500.0);
        let line = Shape::Line {
            from: Point::new(-1000.0, 470.0),
            to: Point::new(900.0, 470.0),
        };
        let Some(Shape::Line { from, to }) = line.clipped(&clip) else {
            panic!("line should stay visible");
        };
        assert_eq!(from.x, 40.0);
        assert_eq!(to.x, 800.0);
    }

    #[test]
    fn dashes_cover_segment() {
        let segs = dash_segments(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 2.0, 2.0);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].0.x, 4.0);
        assert_eq!(segs[2].1.x, 10.0);
    }
}
