//! Scene module - Retained drawing surface the chart binds its data to

mod graph;
mod node;
pub mod svg;

pub use graph::{JoinStats, Layer, LayerId, RenderItem, Scene};
pub use node::{
    dash_segments, Baseline, ClipRect, Color, Node, Paint, Point, Shape, Stroke, TextAnchor,
};
pub use svg::{export_svg, render_svg, ExportError};
