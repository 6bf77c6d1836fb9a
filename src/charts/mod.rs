//! Charts module - Scales, zoom, interaction and the mounted chart view

pub mod axis;
pub mod interaction;
pub mod scale;
pub mod tooltip;
mod view;
pub mod zoom;

pub use interaction::{HoverTarget, ViewState};
pub use scale::{BandScale, LinearScale};
pub use tooltip::{Tooltip, TooltipPhase};
pub use view::{ChartError, ChartView};
pub use zoom::{ZoomBehavior, ZoomTransform, ZoomTransition};
