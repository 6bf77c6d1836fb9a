//! Chart Canvas Widget
//! Paints a mounted chart scene with the egui painter, keeps its aspect ratio,
//! and translates pointer input into chart coordinates.

use crate::charts::ChartView;
use crate::scene::{self, dash_segments, Baseline, Paint, TextAnchor};
use egui::{Align, Align2, Color32, FontId, Pos2, Rect, Sense};
use std::time::Duration;

const TOOLTIP_FONT: f32 = 12.0;
const TOOLTIP_PADDING: f32 = 6.0;
/// Longest frame step fed to animations.
const MAX_FRAME_STEP: f32 = 0.1;

/// Maps between chart pixels and screen points for one frame.
#[derive(Clone, Copy)]
struct Viewport {
    origin: Pos2,
    scale: f32,
}

impl Viewport {
    fn to_chart(self, p: Pos2) -> scene::Point {
        scene::Point::new(
            ((p.x - self.origin.x) / self.scale) as f64,
            ((p.y - self.origin.y) / self.scale) as f64,
        )
    }

    fn to_screen(self, p: scene::Point) -> Pos2 {
        Pos2::new(
            self.origin.x + p.x as f32 * self.scale,
            self.origin.y + p.y as f32 * self.scale,
        )
    }
}

#[derive(Default)]
pub struct ChartCanvas {
    last_pointer: Option<Pos2>,
}

impl ChartCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget pointer state, e.g. after the chart was remounted.
    pub fn reset(&mut self) {
        self.last_pointer = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui, view: &mut ChartView) {
        let (width, height) = (view.config().width as f32, view.config().height as f32);
        let avail = ui.available_size();
        let scale = (avail.x / width).min(avail.y / height).max(0.1);
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width * scale, height * scale), Sense::click_and_drag());
        let viewport = Viewport {
            origin: response.rect.min,
            scale,
        };

        self.route_input(&response, view, viewport);

        let dt = ui.input(|i| i.stable_dt).min(MAX_FRAME_STEP);
        if view.tick(Duration::from_secs_f32(dt)) {
            ui.ctx().request_repaint();
        }

        let background = view.config().color(&view.config().palette.background);
        painter.rect_filled(response.rect, 0.0, to_color32(background, 1.0));
        for item in view.scene().render_list() {
            paint_item(&painter, viewport, &item.shape, &item.paint);
        }

        paint_tooltip(ui.ctx(), view);
    }

    fn route_input(&mut self, response: &egui::Response, view: &mut ChartView, viewport: Viewport) {
        if response.dragged() {
            let delta = response.drag_delta() / viewport.scale;
            if delta != egui::Vec2::ZERO {
                view.drag(delta.x as f64, delta.y as f64);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                view.click(viewport.to_chart(pos));
            }
        }

        match response.hover_pos() {
            Some(pos) if self.last_pointer != Some(pos) => {
                self.last_pointer = Some(pos);
                view.pointer_move(viewport.to_chart(pos), scene::Point::new(pos.x as f64, pos.y as f64));
            }
            Some(_) => {}
            None => {
                if self.last_pointer.take().is_some() {
                    view.pointer_leave();
                }
            }
        }
    }
}

fn to_color32(color: scene::Color, opacity: f64) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

fn paint_item(painter: &egui::Painter, viewport: Viewport, shape: &scene::Shape, paint: &Paint) {
    let stroke = paint.stroke.map(|s| {
        (
            egui::Stroke::new(s.width as f32 * viewport.scale, to_color32(s.color, paint.opacity)),
            s.dash,
        )
    });

    match shape {
        scene::Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let rect = Rect::from_min_max(
                viewport.to_screen(scene::Point::new(*x, *y)),
                viewport.to_screen(scene::Point::new(x + width, y + height)),
            );
            if let Some(fill) = paint.fill {
                painter.rect_filled(rect, 0.0, to_color32(fill, paint.opacity));
            }
            if let Some((stroke, _)) = stroke {
                painter.rect_stroke(rect, 0.0, stroke);
            }
        }
        scene::Shape::Line { from, to } => {
            let Some((stroke, dash)) = stroke else {
                return;
            };
            let segments = match dash {
                Some((dash, gap)) => dash_segments(*from, *to, dash, gap),
                None => vec![(*from, *to)],
            };
            for (a, b) in segments {
                painter.line_segment([viewport.to_screen(a), viewport.to_screen(b)], stroke);
            }
        }
        scene::Shape::Polyline(points) => {
            let Some((stroke, _)) = stroke else {
                return;
            };
            let points = points.iter().map(|&p| viewport.to_screen(p)).collect();
            painter.add(egui::Shape::line(points, stroke));
        }
        scene::Shape::Text {
            at,
            content,
            size,
            anchor,
            baseline,
        } => {
            let color = paint.fill.unwrap_or(scene::Color::BLACK);
            let h = match anchor {
                TextAnchor::Start => Align::Min,
                TextAnchor::Middle => Align::Center,
                TextAnchor::End => Align::Max,
            };
            let v = match baseline {
                Baseline::Top => Align::Min,
                Baseline::Middle => Align::Center,
            };
            painter.text(
                viewport.to_screen(*at),
                Align2([h, v]),
                content,
                FontId::proportional(*size as f32 * viewport.scale),
                to_color32(color, paint.opacity),
            );
        }
    }
}

/// Tooltip box on the foreground layer, in screen points.
fn paint_tooltip(ctx: &egui::Context, view: &ChartView) {
    let tooltip = view.tooltip();
    if !tooltip.is_visible() || tooltip.opacity() <= 0.0 {
        return;
    }
    let opacity = tooltip.opacity();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Tooltip,
        egui::Id::new("chart_tooltip"),
    ));

    let text_color = to_color32(scene::Color::BLACK, opacity);
    let galley = painter.layout_no_wrap(
        tooltip.lines().join("\n"),
        FontId::proportional(TOOLTIP_FONT),
        text_color,
    );
    let at = tooltip.position();
    let min = Pos2::new(at.x as f32, at.y as f32);
    let rect = Rect::from_min_size(min, galley.size() + egui::vec2(2.0, 2.0) * TOOLTIP_PADDING);

    painter.rect_filled(rect, 3.0, to_color32(scene::Color::WHITE, opacity));
    painter.rect_stroke(rect, 3.0, egui::Stroke::new(1.0, text_color));
    painter.galley(
        min + egui::vec2(TOOLTIP_PADDING, TOOLTIP_PADDING),
        galley,
        text_color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_round_trips() {
        let viewport = Viewport {
            origin: Pos2::new(100.0, 50.0),
            scale: 0.5,
        };
        let chart = scene::Point::new(400.0, 300.0);
        let screen = viewport.to_screen(chart);
        assert_eq!(screen, Pos2::new(300.0, 200.0));
        assert_eq!(viewport.to_chart(screen), chart);
    }

    #[test]
    fn opacity_maps_to_alpha() {
        let c = to_color32(scene::Color::rgb(10, 20, 30), 0.0);
        assert_eq!(c.a(), 0);
        let c = to_color32(scene::Color::rgb(10, 20, 30), 1.0);
        assert_eq!(c, Color32::from_rgb(10, 20, 30));
    }
}
