//! UI modules for the overlay demo.
//!
//! The UI is split into distinct panels:
//! - Top bar: title, overlay toggle and availability status
//! - Left panel: date pickers and the compare toggle
//! - Central canvas: the host map the overlays are drawn on
//! - Alerts: modal or banner for unavailable imagery

mod alerts;
mod canvas;
mod colors;
mod left_panel;
mod top_bar;

pub use alerts::{render_alerts, AlertState};
pub use canvas::{render_canvas, CanvasHost};
pub use left_panel::{render_left_panel, DateMenu};
pub use top_bar::render_top_bar;
