//! Force-directed knowledge-graph viewer.
//!
//! [`graph`] holds the immutable snapshot types, [`source`] the suppliers of
//! snapshots, and [`app`] the layout engine, renderer, hit testing and the
//! eframe application that ties them together.

pub mod app;
pub mod graph;
pub mod source;
mod util;

pub use app::physics::{Layout, LayoutPass, SimulationConfig, Viewport, run_layout};
pub use app::render::{DrawStats, Surface, render};
pub use app::{
    Fetch, GraphLensApp, LoadRequest, Phase, RelatedPanel, RelatedRequest, ViewConfig, ViewModel,
    pick_node,
};
