//! GUI module - User interface components

mod app;
mod chart_canvas;
mod control_panel;

pub use app::TimebarApp;
pub use chart_canvas::ChartCanvas;
pub use control_panel::{ControlPanel, ControlPanelAction};
