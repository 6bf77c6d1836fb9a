//! Pointer Handlers
//! Every handler gets the view state by `&mut` and only touches what it owns;
//! the caller decides what to re-layout afterwards.

use crate::charts::scale::{BandScale, LinearScale};
use crate::charts::tooltip::Tooltip;
use crate::charts::zoom::{ZoomBehavior, ZoomTransform, ZoomTransition};
use crate::config::ChartConfig;
use crate::data::Dataset;
use crate::scene::Point;
use tracing::debug;

/// What the pointer is currently over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// Bar at a dataset position.
    Bar(usize),
    Overview,
}

/// Ephemeral interaction state of a mounted chart.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub transform: ZoomTransform,
    /// Detail scale; its range follows the transform.
    pub x: BandScale,
    pub y: LinearScale,
    pub hovered: Option<HoverTarget>,
    /// Last pointer position over the chart, in chart and page coordinates.
    pub pointer: Option<(Point, Point)>,
    /// Overview indicator line position.
    pub indicator_x: Option<f64>,
    pub tooltip: Tooltip,
    pub transition: Option<ZoomTransition>,
}

/// Read-only pieces the handlers need.
pub struct HandlerContext<'a> {
    pub config: &'a ChartConfig,
    pub data: &'a Dataset,
    pub mini_x: &'a LinearScale,
    pub zoom: &'a ZoomBehavior,
}

impl HandlerContext<'_> {
    /// Dataset position under an overview x coordinate, clamped to the data.
    pub fn overview_index(&self, x: f64) -> usize {
        overview_index(self.mini_x, self.data.len(), x)
    }
}

pub fn overview_index(mini_x: &LinearScale, len: usize, x: f64) -> usize {
    if len == 0 {
        return 0;
    }
    let raw = mini_x.invert(x).floor();
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, (len - 1) as f64) as usize
}

pub fn bar_enter(state: &mut ViewState, ctx: &HandlerContext<'_>, position: usize, page: Point) {
    if let Some(point) = ctx.data.get(position) {
        state.tooltip.show(point, page);
    }
}

pub fn bar_move(state: &mut ViewState, page: Point) {
    state.tooltip.move_to(page);
}

pub fn bar_leave(state: &mut ViewState) {
    state.tooltip.hide();
}

/// Returns the dataset position the pointer resolves to.
pub fn overview_move(
    state: &mut ViewState,
    ctx: &HandlerContext<'_>,
    pos: Point,
    page: Point,
) -> usize {
    let i = ctx.overview_index(pos.x);
    state.indicator_x = Some(pos.x);
    if let Some(point) = ctx.data.get(i) {
        state.tooltip.show(point, page);
    }
    i
}

pub fn overview_leave(state: &mut ViewState) {
    state.indicator_x = None;
    state.tooltip.hide();
}

/// Start re-anchoring the detail view on the clicked overview position.
pub fn overview_click(state: &mut ViewState, ctx: &HandlerContext<'_>, pos: Point) {
    let target = ctx
        .zoom
        .translate_to(state.transform, pos.x, 0.0, Some((pos.x, 0.0)));
    debug!(x = pos.x, target_x = target.x, "re-anchoring detail view");
    state.transition = Some(ZoomTransition::new(
        state.transform,
        target,
        ctx.config.reanchor(),
    ));
}

/// Pan the detail view by a pixel delta; interrupts a running transition.
pub fn drag(state: &mut ViewState, ctx: &HandlerContext<'_>, dx: f64, dy: f64) {
    state.transition = None;
    state.transform = ctx.zoom.pan_by(state.transform, dx, dy);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_index_clamps() {
        let mini_x = LinearScale::new((0.0, 1500.0), (40.0, 800.0));
        assert_eq!(overview_index(&mini_x, 1500, 420.0), 750);
        assert_eq!(overview_index(&mini_x, 1500, 0.0), 0);
        assert_eq!(overview_index(&mini_x, 1500, 800.0), 1499);
        assert_eq!(overview_index(&mini_x, 1500, 5000.0), 1499);
        assert_eq!(overview_index(&mini_x, 0, 400.0), 0);
    }

    #[test]
    fn overview_index_round_trips_positions() {
        let mini_x = LinearScale::new((0.0, 1500.0), (40.0, 800.0));
        for i in 0..1500 {
            // Sample inside the slot so pixel quantization cannot push it back
            let px = mini_x.map(i as f64 + 0.5);
            assert_eq!(overview_index(&mini_x, 1500, px), i);
        }
    }
}
