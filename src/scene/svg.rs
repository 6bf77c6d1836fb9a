//! SVG Export
//! Renders a scene to an SVG document through plotters' SVG backend.

use super::graph::{RenderItem, Scene};
use super::node::{dash_segments, Baseline, Color, Paint, Point, Shape, TextAnchor};
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write SVG: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to draw SVG: {0}")]
    Draw(String),
}

type Area<'a> = DrawingArea<SVGBackend<'a>, plotters::coord::Shift>;

fn draw_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Draw(e.to_string())
}

fn rgba(color: Color, opacity: f64) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, opacity)
}

fn coord(p: Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Render the scene's visible shapes to an SVG string.
pub fn render_svg(scene: &Scene, background: Color) -> Result<String, ExportError> {
    let mut buf = String::new();
    {
        let size = (scene.width().ceil() as u32, scene.height().ceil() as u32);
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        root.fill(&rgba(background, 1.0)).map_err(draw_err)?;

        for item in scene.render_list() {
            draw_item(&root, &item)?;
        }
        root.present().map_err(draw_err)?;
    }
    Ok(buf)
}

/// Render and write to `path`.
pub fn export_svg(scene: &Scene, background: Color, path: &Path) -> Result<(), ExportError> {
    let svg = render_svg(scene, background)?;
    std::fs::write(path, svg)?;
    info!(path = %path.display(), "exported chart as SVG");
    Ok(())
}

fn draw_item(root: &Area<'_>, item: &RenderItem) -> Result<(), ExportError> {
    let Paint {
        fill,
        stroke,
        opacity,
    } = item.paint;

    match &item.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let corners = [
                coord(Point::new(*x, *y)),
                coord(Point::new(x + width, y + height)),
            ];
            if let Some(fill) = fill {
                root.draw(&Rectangle::new(corners, rgba(fill, opacity).filled()))
                    .map_err(draw_err)?;
            }
            if let Some(stroke) = stroke {
                let style = rgba(stroke.color, opacity).stroke_width(stroke_px(stroke.width));
                root.draw(&Rectangle::new(corners, style)).map_err(draw_err)?;
            }
        }
        Shape::Line { from, to } => {
            let Some(stroke) = stroke else {
                return Ok(());
            };
            let style = rgba(stroke.color, opacity).stroke_width(stroke_px(stroke.width));
            let segments = match stroke.dash {
                Some((dash, gap)) => dash_segments(*from, *to, dash, gap),
                None => vec![(*from, *to)],
            };
            for (a, b) in segments {
                root.draw(&PathElement::new(vec![coord(a), coord(b)], style))
                    .map_err(draw_err)?;
            }
        }
        Shape::Polyline(points) => {
            let Some(stroke) = stroke else {
                return Ok(());
            };
            let style = rgba(stroke.color, opacity).stroke_width(stroke_px(stroke.width));
            let path: Vec<(i32, i32)> = points.iter().copied().map(coord).collect();
            root.draw(&PathElement::new(path, style)).map_err(draw_err)?;
        }
        Shape::Text {
            at,
            content,
            size,
            anchor,
            baseline,
        } => {
            let color = rgba(fill.unwrap_or(Color::BLACK), opacity);
            let h = match anchor {
                TextAnchor::Start => HPos::Left,
                TextAnchor::Middle => HPos::Center,
                TextAnchor::End => HPos::Right,
            };
            let v = match baseline {
                Baseline::Top => VPos::Top,
                Baseline::Middle => VPos::Center,
            };
            let style = ("sans-serif", *size)
                .into_font()
                .color(&color)
                .pos(Pos::new(h, v));
            root.draw(&Text::new(content.clone(), coord(*at), style))
                .map_err(draw_err)?;
        }
    }
    Ok(())
}

fn stroke_px(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LayerId, Stroke};

    #[test]
    fn writes_visible_shapes() {
        let mut scene = Scene::new(200.0, 100.0);
        scene.layer_mut(LayerId::Bars).join(&[10.0, 500.0], |x| x.to_string(), |x, n| {
            n.shape = Shape::Rect {
                x: *x,
                y: 10.0,
                width: 20.0,
                height: 30.0,
            };
            n.paint = Paint::fill(Color::rgb(0x95, 0xCA, 0xFE));
        });
        scene.layer_mut(LayerId::Grid).join(&[50.0], |y| y.to_string(), |y, n| {
            n.shape = Shape::Line {
                from: Point::new(0.0, *y),
                to: Point::new(200.0, *y),
            };
            n.paint = Paint::stroke(Stroke::solid(Color::BLACK, 1.0).dashed(2.0, 2.0));
        });

        let svg = render_svg(&scene, Color::WHITE).unwrap();
        assert!(svg.contains("<svg"));
        // Off-screen bar is culled, only the on-screen one is drawn
        assert_eq!(svg.to_uppercase().matches("#95CAFE").count(), 1);
    }

    #[test]
    fn writes_outlines_paths_and_text() {
        let mut scene = Scene::new(200.0, 100.0);
        let shapes = vec![
            (
                Shape::Rect {
                    x: 5.0,
                    y: 5.0,
                    width: 50.0,
                    height: 20.0,
                },
                Paint::stroke(Stroke::solid(Color::rgb(0x12, 0x34, 0x56), 2.0)),
            ),
            (
                Shape::Polyline(vec![Point::new(0.0, 90.0), Point::new(100.0, 60.0)]),
                Paint::stroke(Stroke::solid(Color::rgb(0x3A, 0x7B, 0xC8), 1.5)),
            ),
            (
                Shape::Text {
                    at: Point::new(100.0, 50.0),
                    content: "12:30".to_string(),
                    size: 10.0,
                    anchor: TextAnchor::Middle,
                    baseline: Baseline::Top,
                },
                Paint::fill(Color::BLACK),
            ),
        ];
        scene.layer_mut(LayerId::Overview).join(
            &shapes,
            |(shape, _)| format!("{shape:?}"),
            |(shape, paint), n| {
                n.shape = shape.clone();
                n.paint = *paint;
            },
        );

        let svg = render_svg(&scene, Color::WHITE).unwrap().to_uppercase();
        assert!(svg.contains("#123456"));
        assert!(svg.contains("#3A7BC8"));
        assert!(svg.contains("12:30"));
    }
}
