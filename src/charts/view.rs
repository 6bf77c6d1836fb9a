//! Chart View
//! Owns the dataset, scales, zoom state and scene of one mounted chart.
//!
//! Layout:
//! 1. Detail region: value gridlines, bars, time axis, value axis
//! 2. Overview strip: bracket, trend line, hover indicator, invisible overlay
//!
//! The host mounts the view once, forwards pointer events and frame ticks, and
//! unmounts it by value so nothing can reach it afterwards.

use crate::charts::axis::{bottom_ticks, left_ticks};
use crate::charts::interaction::{self, HandlerContext, HoverTarget, ViewState};
use crate::charts::scale::{BandScale, LinearScale};
use crate::charts::tooltip::Tooltip;
use crate::charts::zoom::{Extent, ZoomBehavior, ZoomTransform};
use crate::config::{ChartConfig, ConfigError};
use crate::data::{DataPoint, Dataset, GenerateError};
use crate::scene::{
    Baseline, ClipRect, ExportError, JoinStats, Layer, LayerId, Paint, Point, Scene, Shape,
    Stroke, TextAnchor,
};
use chrono::NaiveDateTime;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const LABEL_SIZE: f64 = 10.0;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Cannot mount a chart without data")]
    EmptyDataset,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] GenerateError),
}

pub struct ChartView {
    config: ChartConfig,
    data: Dataset,
    zoom: ZoomBehavior,
    initial: ZoomTransform,
    mini_x: LinearScale,
    mini_y: LinearScale,
    state: ViewState,
    scene: Scene,
}

impl ChartView {
    /// Generate a dataset ending at `now` and build the chart around it.
    pub fn mount<R: Rng + ?Sized>(
        config: ChartConfig,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Result<Self, ChartError> {
        if config.point_count == 0 {
            return Err(ChartError::EmptyDataset);
        }
        config.validate()?;
        let data = Dataset::generate(now, config.point_count, config.spacing_minutes, rng)?;
        Self::with_dataset(config, data)
    }

    pub fn with_dataset(config: ChartConfig, data: Dataset) -> Result<Self, ChartError> {
        if data.is_empty() {
            return Err(ChartError::EmptyDataset);
        }

        let detail = config.detail_x_range();
        let x = BandScale::new(data.labels(), detail)
            .padding_inner(config.band.inner)
            .padding_outer(config.band.outer)
            .align(config.band.align);
        let y = LinearScale::new((0.0, 100.0), config.detail_y_range()).nice(config.y_ticks);

        let extent = config.zoom_extent();
        let zoom = ZoomBehavior::fixed(config.scale_factor, Extent::new(extent));
        // Most recent point pinned to the right edge
        let initial = zoom.scale_by(ZoomTransform::IDENTITY, config.scale_factor, Some(extent[1]));

        let mini_x = LinearScale::new((0.0, data.len() as f64), detail);
        let mini_y = LinearScale::new(
            (0.0, 100.0),
            (config.overview_bottom(), config.overview_top()),
        );

        let state = ViewState {
            transform: ZoomTransform::IDENTITY,
            x,
            y,
            hovered: None,
            pointer: None,
            indicator_x: None,
            tooltip: Tooltip::new(config.tooltip_offset, config.fade_out()),
            transition: None,
        };

        let mut view = Self {
            scene: Scene::new(config.width, config.height),
            config,
            data,
            zoom,
            initial,
            mini_x,
            mini_y,
            state,
        };
        view.layout_value_axis();
        view.layout_overview();
        view.layout_indicator();
        view.apply_transform(initial);

        info!(
            points = view.data.len(),
            nodes = view.scene.node_count(),
            "chart mounted"
        );
        Ok(view)
    }

    /// Tear down; the scene and dataset are released with `self`.
    pub fn unmount(self) {
        info!(points = self.data.len(), "chart unmounted");
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.state.tooltip
    }

    pub fn transform(&self) -> ZoomTransform {
        self.state.transform
    }

    /// Oldest and newest points currently inside the detail viewport.
    pub fn visible_window(&self) -> Option<(&DataPoint, &DataPoint)> {
        let (lo, hi) = self.config.detail_x_range();
        let range = self.state.x.indices_within(lo, hi);
        if range.is_empty() {
            return None;
        }
        Some((self.data.get(range.start)?, self.data.get(range.end - 1)?))
    }

    pub fn render_svg(&self) -> Result<String, ExportError> {
        crate::scene::render_svg(&self.scene, self.config.color(&self.config.palette.background))
    }

    // ---- events ----

    fn target_at(&self, pos: Point) -> Option<HoverTarget> {
        let (layer, node) = self.scene.hit_test(pos)?;
        match layer {
            LayerId::Bars => self.state.x.index_of(&node.key).map(HoverTarget::Bar),
            LayerId::OverviewOverlay => Some(HoverTarget::Overview),
            _ => None,
        }
    }

    /// Pointer moved to `pos` (chart pixels); `page` is where the tooltip anchors.
    pub fn pointer_move(&mut self, pos: Point, page: Point) {
        self.state.pointer = Some((pos, page));
        let target = self.target_at(pos);
        let ctx = HandlerContext {
            config: &self.config,
            data: &self.data,
            mini_x: &self.mini_x,
            zoom: &self.zoom,
        };
        let state = &mut self.state;

        if target != state.hovered {
            match state.hovered.take() {
                Some(HoverTarget::Bar(_)) => interaction::bar_leave(state),
                Some(HoverTarget::Overview) => interaction::overview_leave(state),
                None => {}
            }
            match target {
                Some(HoverTarget::Bar(i)) => interaction::bar_enter(state, &ctx, i, page),
                Some(HoverTarget::Overview) => {
                    interaction::overview_move(state, &ctx, pos, page);
                }
                None => {}
            }
            state.hovered = target;
        } else {
            match target {
                Some(HoverTarget::Bar(_)) => interaction::bar_move(state, page),
                Some(HoverTarget::Overview) => {
                    interaction::overview_move(state, &ctx, pos, page);
                }
                None => {}
            }
        }
        self.layout_indicator();
    }

    /// Pointer left the chart surface.
    pub fn pointer_leave(&mut self) {
        self.state.pointer = None;
        match self.state.hovered.take() {
            Some(HoverTarget::Bar(_)) => interaction::bar_leave(&mut self.state),
            Some(HoverTarget::Overview) => interaction::overview_leave(&mut self.state),
            None => return,
        }
        self.layout_indicator();
    }

    pub fn click(&mut self, pos: Point) {
        if self.target_at(pos) != Some(HoverTarget::Overview) {
            return;
        }
        let ctx = HandlerContext {
            config: &self.config,
            data: &self.data,
            mini_x: &self.mini_x,
            zoom: &self.zoom,
        };
        interaction::overview_click(&mut self.state, &ctx, pos);
    }

    /// Pan by a pixel delta.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        let ctx = HandlerContext {
            config: &self.config,
            data: &self.data,
            mini_x: &self.mini_x,
            zoom: &self.zoom,
        };
        interaction::drag(&mut self.state, &ctx, dx, dy);
        self.layout_detail();
        self.rehover();
    }

    pub fn reset_view(&mut self) {
        self.state.transition = None;
        self.apply_transform(self.initial);
        self.rehover();
    }

    /// Advance animations. Returns true while something is still moving.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut animating = self.state.tooltip.tick(dt);
        if let Some(mut transition) = self.state.transition.take() {
            let t = transition.step(dt);
            if !transition.is_finished() {
                self.state.transition = Some(transition);
                animating = true;
            }
            self.apply_transform(t);
            self.rehover();
        }
        animating
    }

    // ---- layout ----

    fn apply_transform(&mut self, t: ZoomTransform) {
        self.state.transform = t;
        self.layout_detail();
    }

    /// Bars may have moved under a still pointer; re-resolve what it is over.
    fn rehover(&mut self) {
        let Some((pos, page)) = self.state.pointer else {
            return;
        };
        if self.target_at(pos) != self.state.hovered {
            self.pointer_move(pos, page);
        }
    }

    /// Re-derive the band range from the transform and re-lay bars and time axis.
    fn layout_detail(&mut self) {
        let range = self
            .state
            .transform
            .rescale_range(self.config.detail_x_range());
        self.state.x.set_range(range);
        let bars = self.layout_bars();
        self.layout_time_axis();
        debug!(
            range_start = range.0,
            range_end = range.1,
            entered = bars.entered,
            "detail re-laid out"
        );
    }

    fn detail_clip(&self) -> ClipRect {
        let (x0, x1) = self.config.detail_x_range();
        ClipRect::new(x0, 0.0, x1, self.config.main_height)
    }

    fn layout_bars(&mut self) -> JoinStats {
        let clip = self.detail_clip();
        let fill = Paint::fill(self.config.color(&self.config.palette.bar));
        let x = &self.state.x;
        let y = &self.state.y;
        let base = y.map(0.0);
        let width = x.band_width();

        let layer = self.scene.layer_mut(LayerId::Bars);
        layer.set_clip(Some(clip));
        layer.join(
            self.data.points(),
            |p| p.datetime.clone(),
            |p, node| {
                let Some(left) = x.map(&p.datetime) else {
                    return;
                };
                let top = y.map(p.value as f64);
                node.shape = Shape::Rect {
                    x: left,
                    y: top,
                    width,
                    height: base - top,
                };
                node.paint = fill;
                node.interactive = true;
            },
        )
    }

    fn layout_time_axis(&mut self) {
        let color = self.config.color(&self.config.palette.axis);
        let stroke = Paint::stroke(Stroke::solid(color, 1.0));
        let axis_y = self.config.main_height - self.config.margin.bottom;
        let (r0, r1) = self.state.x.range();

        let mut items = vec![(
            "domain".to_string(),
            Shape::Line {
                from: Point::new(r0, axis_y),
                to: Point::new(r1, axis_y),
            },
            stroke,
        )];
        for tick in bottom_ticks(&self.state.x, &self.data, self.config.detail_x_range()) {
            items.push((
                format!("tick:{}", tick.key),
                Shape::Line {
                    from: Point::new(tick.px, axis_y),
                    to: Point::new(tick.px, axis_y + TICK_SIZE),
                },
                stroke,
            ));
            if let Some(label) = tick.label {
                items.push((
                    format!("label:{}", tick.key),
                    Shape::Text {
                        at: Point::new(tick.px, axis_y + TICK_SIZE + TICK_PADDING),
                        content: label,
                        size: LABEL_SIZE,
                        anchor: TextAnchor::Middle,
                        baseline: Baseline::Top,
                    },
                    Paint::fill(color),
                ));
            }
        }

        let clip = ClipRect::new(
            self.config.margin.left,
            0.0,
            self.config.width - self.config.margin.right,
            self.config.height,
        );
        let layer = self.scene.layer_mut(LayerId::XAxis);
        layer.set_clip(Some(clip));
        join_shapes(layer, items);
    }

    fn layout_value_axis(&mut self) {
        let color = self.config.color(&self.config.palette.axis);
        let stroke = Stroke::solid(color, 1.0);
        let left = self.config.margin.left;
        let right = self.config.width - self.config.margin.right;
        let (bottom, top) = self.state.y.range();
        let ticks = left_ticks(&self.state.y, self.config.y_ticks);

        let grid: Vec<_> = ticks
            .iter()
            .enumerate()
            .map(|(i, tick)| {
                // Baseline stays solid, the rest are faint dashes
                let paint = if i == 0 {
                    Paint::stroke(stroke)
                } else {
                    Paint::stroke(stroke.dashed(2.0, 2.0)).with_opacity(0.2)
                };
                (
                    format!("grid:{}", tick.key),
                    Shape::Line {
                        from: Point::new(left, tick.px),
                        to: Point::new(right, tick.px),
                    },
                    paint,
                )
            })
            .collect();
        join_shapes(self.scene.layer_mut(LayerId::Grid), grid);

        let outer = self.config.margin.left;
        let mut axis = vec![
            (
                "domain".to_string(),
                Shape::Line {
                    from: Point::new(left, bottom),
                    to: Point::new(left, top),
                },
                Paint::stroke(stroke),
            ),
            (
                "outer:bottom".to_string(),
                Shape::Line {
                    from: Point::new(left - outer, bottom),
                    to: Point::new(left, bottom),
                },
                Paint::stroke(stroke),
            ),
            (
                "outer:top".to_string(),
                Shape::Line {
                    from: Point::new(left - outer, top),
                    to: Point::new(left, top),
                },
                Paint::stroke(stroke),
            ),
        ];
        axis.extend(ticks.into_iter().filter_map(|tick| {
            let label = tick.label?;
            Some((
                format!("label:{}", tick.key),
                Shape::Text {
                    at: Point::new(left - TICK_PADDING, tick.px),
                    content: label,
                    size: LABEL_SIZE,
                    anchor: TextAnchor::End,
                    baseline: Baseline::Middle,
                },
                Paint::fill(color),
            ))
        }));
        join_shapes(self.scene.layer_mut(LayerId::YAxis), axis);
    }

    fn layout_overview(&mut self) {
        let (left, right) = self.config.detail_x_range();
        let top = self.config.overview_top();
        let bottom = self.config.overview_bottom();
        let bracket = Paint::stroke(Stroke::solid(
            self.config.color(&self.config.palette.bracket),
            self.config.bracket_width,
        ));
        let line = |from: (f64, f64), to: (f64, f64)| Shape::Line {
            from: Point::new(from.0, from.1),
            to: Point::new(to.0, to.1),
        };

        let trend: Vec<Point> = self
            .data
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| Point::new(self.mini_x.map(i as f64), self.mini_y.map(p.value as f64)))
            .collect();

        let items = vec![
            ("bracket:left".to_string(), line((left, top), (left, bottom)), bracket),
            ("bracket:right".to_string(), line((right, top), (right, bottom)), bracket),
            ("bracket:top".to_string(), line((left, top), (right, top)), bracket),
            ("bracket:bottom".to_string(), line((left, bottom), (right, bottom)), bracket),
            (
                "trend".to_string(),
                Shape::Polyline(trend),
                Paint::stroke(Stroke::solid(
                    self.config.color(&self.config.palette.overview_line),
                    self.config.overview_stroke_width,
                )),
            ),
        ];
        join_shapes(self.scene.layer_mut(LayerId::Overview), items);

        let strip_top = self.config.main_height;
        let overlay = self.scene.layer_mut(LayerId::OverviewOverlay);
        overlay.join(
            &[(strip_top, bottom - strip_top)],
            |_| "overlay".to_string(),
            |&(y, height), node| {
                node.shape = Shape::Rect {
                    x: left,
                    y,
                    width: right - left,
                    height,
                };
                node.paint = Paint::default().with_opacity(0.0);
                node.interactive = true;
            },
        );
    }

    fn layout_indicator(&mut self) {
        let top = self.config.overview_top();
        let bottom = self.config.overview_bottom();
        let x = self.state.indicator_x.unwrap_or(self.config.margin.left);
        let opacity = if self.state.indicator_x.is_some() { 1.0 } else { 0.0 };
        let paint = Paint::stroke(Stroke::solid(
            self.config.color(&self.config.palette.indicator),
            1.0,
        ))
        .with_opacity(opacity);

        join_shapes(
            self.scene.layer_mut(LayerId::Indicator),
            vec![(
                "indicator".to_string(),
                Shape::Line {
                    from: Point::new(x, top),
                    to: Point::new(x, bottom),
                },
                paint,
            )],
        );
    }
}

fn join_shapes(layer: &mut Layer, items: Vec<(String, Shape, Paint)>) -> JoinStats {
    layer.join(
        &items,
        |(key, _, _)| key.clone(),
        |(_, shape, paint), node| {
            node.shape = shape.clone();
            node.paint = *paint;
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tooltip::TooltipPhase;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn mounted() -> ChartView {
        ChartView::mount(ChartConfig::default(), now(), &mut StdRng::seed_from_u64(11)).unwrap()
    }

    fn bar_rect(view: &ChartView, position: usize) -> (f64, f64, f64, f64) {
        let key = &view.data().get(position).unwrap().datetime;
        match view.scene().layer(LayerId::Bars).find(key).unwrap().shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => (x, y, width, height),
            _ => panic!("bar is not a rect"),
        }
    }

    #[test]
    fn mount_builds_one_bar_per_point() {
        let view = mounted();
        assert_eq!(view.scene().layer(LayerId::Bars).len(), 1500);
        assert_eq!(view.transform().k, 100.0);
        assert_eq!(view.state().x.range(), (-75_200.0, 800.0));
    }

    #[test]
    fn bars_follow_value_scale() {
        let view = mounted();
        let last = view.data().len() - 1;
        let value = view.data().get(last).unwrap().value as f64;
        let (x, y, width, height) = bar_rect(&view, last);
        assert!((x + width - 800.0).abs() < 1e-6);
        assert!((y + height - 470.0).abs() < 1e-6);
        assert!((height - value * 4.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_empty_dataset() {
        let err = ChartView::with_dataset(ChartConfig::default(), Dataset::default());
        assert!(matches!(err, Err(ChartError::EmptyDataset)));
    }

    #[test]
    fn value_axis_hides_bound_labels() {
        let view = mounted();
        let labels: Vec<_> = view
            .scene()
            .layer(LayerId::YAxis)
            .nodes()
            .iter()
            .filter_map(|n| match &n.shape {
                Shape::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 9);
        assert!(!labels.contains(&"0".to_string()));
        assert!(!labels.contains(&"100".to_string()));
        assert_eq!(view.scene().layer(LayerId::Grid).len(), 11);
    }

    #[test]
    fn time_axis_only_labels_visible_bands() {
        let view = mounted();
        let labels = view
            .scene()
            .layer(LayerId::XAxis)
            .nodes()
            .iter()
            .filter(|n| matches!(n.shape, Shape::Text { .. }))
            .count();
        // ~50px bands across a 760px viewport
        assert!((14..=16).contains(&labels), "got {labels} labels");
        let newest = view.data().most_recent().unwrap();
        assert!(view
            .scene()
            .layer(LayerId::XAxis)
            .find(&format!("label:{}", newest.datetime))
            .is_some());
    }

    #[test]
    fn hover_bar_shows_and_leave_fades() {
        let mut view = mounted();
        let last = (0..view.data().len())
            .rev()
            .find(|&i| view.data().get(i).unwrap().value > 2)
            .unwrap();
        let (x, _, width, _) = bar_rect(&view, last);
        let inside = Point::new(x + width / 2.0, 467.0);

        view.pointer_move(inside, Point::new(500.0, 300.0));
        assert_eq!(view.state().hovered, Some(HoverTarget::Bar(last)));
        assert_eq!(view.tooltip().phase(), TooltipPhase::Visible);
        assert_eq!(view.tooltip().position(), Point::new(530.0, 220.0));

        view.pointer_move(Point::new(inside.x, inside.y - 1.0), Point::new(501.0, 301.0));
        assert_eq!(view.tooltip().position(), Point::new(531.0, 221.0));

        view.pointer_leave();
        assert_eq!(view.tooltip().phase(), TooltipPhase::FadingOut);
        view.tick(Duration::from_millis(500));
        assert_eq!(view.tooltip().phase(), TooltipPhase::Hidden);
        assert_eq!(view.tooltip().opacity(), 0.0);
    }

    #[test]
    fn overview_hover_moves_indicator() {
        let mut view = mounted();
        view.pointer_move(Point::new(420.0, 530.0), Point::new(0.0, 0.0));
        assert_eq!(view.state().hovered, Some(HoverTarget::Overview));
        assert_eq!(view.state().indicator_x, Some(420.0));
        let indicator = view.scene().layer(LayerId::Indicator).find("indicator").unwrap();
        assert_eq!(indicator.paint.opacity, 1.0);

        view.pointer_move(Point::new(300.0, 100.0), Point::new(0.0, 0.0));
        assert_eq!(view.state().indicator_x, None);
        let indicator = view.scene().layer(LayerId::Indicator).find("indicator").unwrap();
        assert_eq!(indicator.paint.opacity, 0.0);
    }

    #[test]
    fn moving_bars_update_hover_under_still_pointer() {
        let mut view = mounted();
        let last = (0..view.data().len())
            .rev()
            .find(|&i| view.data().get(i).unwrap().value > 2)
            .unwrap();
        let (x, _, width, _) = bar_rect(&view, last);
        let still = Point::new(x + width / 2.0, 468.0);
        view.pointer_move(still, Point::new(100.0, 100.0));
        assert_eq!(view.state().hovered, Some(HoverTarget::Bar(last)));

        // Shift everything one band to the right
        let step = view.state().x.step();
        view.drag(step, 0.0);
        assert_ne!(view.state().hovered, Some(HoverTarget::Bar(last)));
        assert_eq!(view.tooltip().hide_count(), 1);

        view.reset_view();
        assert_eq!(view.state().hovered, Some(HoverTarget::Bar(last)));
        assert_eq!(view.tooltip().phase(), TooltipPhase::Visible);
    }

    #[test]
    fn click_outside_overview_does_nothing() {
        let mut view = mounted();
        view.click(Point::new(400.0, 200.0));
        assert!(view.state().transition.is_none());
    }

    #[test]
    fn drag_pans_and_reset_restores() {
        let mut view = mounted();
        let before = view.transform();
        view.drag(500.0, 0.0);
        assert_eq!(view.transform().x, before.x + 500.0);
        assert_eq!(view.state().x.range().1, 1300.0);
        view.reset_view();
        assert_eq!(view.transform(), before);
    }

    #[test]
    fn visible_window_ends_with_newest() {
        let view = mounted();
        let (first, last) = view.visible_window().unwrap();
        assert_eq!(last.sequence_index, 0);
        assert!(first.sequence_index > 10);
    }

    #[test]
    fn svg_export_contains_bars() {
        let view = mounted();
        let svg = view.render_svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.to_uppercase().contains("#95CAFE"));
    }
}
