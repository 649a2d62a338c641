//! Host map view interface.
//!
//! The engine never renders anything itself. It reads the view center and
//! readiness from the host, and writes the zoom constraint, overlay layers
//! and the swipe reveal control back to it.

#[cfg(test)]
pub(crate) mod testing;

use crate::geo::{TilingScheme, ZoomConstraint};
use crate::tiles::TileId;
use geo_types::Coord;

/// Current map center and zoom, owned by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// (longitude, latitude) in degrees.
    pub center: Coord<f64>,
    pub zoom: f64,
}

/// A raster overlay handed to the host for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub key: TileId,
    /// Host layer id, `key.to_layer_id()`.
    pub id: String,
    pub title: String,
    pub copyright: &'static str,
    /// Template with `{level}`, `{col}`, `{row}` placeholders.
    pub url_template: String,
    pub tiling: TilingScheme,
    pub opacity: f32,
    /// Overlays with a higher index draw above lower ones.
    pub z_index: usize,
    pub visible: bool,
}

/// Id given to the single swipe reveal control.
pub const REVEAL_CONTROL_ID: &str = "compare-swipe";

/// Split position of a fresh reveal control, percent from the leading edge.
pub const REVEAL_POSITION: f32 = 35.0;

/// Dual-layer swipe reveal control.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealControl {
    pub id: &'static str,
    /// Layer id shown on the leading side of the split.
    pub leading: String,
    /// Layer id shown on the trailing side of the split.
    pub trailing: String,
    pub position: f32,
}

/// Operations the engine needs from the host map view.
///
/// Implementations should treat unknown layer or control ids as no-ops.
pub trait HostMap {
    /// Current viewport, or `None` while the view is not ready.
    fn viewport(&self) -> Option<Viewport>;

    /// Installs the zoom constraint built from the overlay pyramid.
    fn set_zoom_constraint(&mut self, constraint: ZoomConstraint);

    /// Adds an overlay layer.
    fn add_layer(&mut self, layer: OverlayLayer);

    /// Removes the layers with the given ids. Returns how many were removed.
    fn remove_layers(&mut self, ids: &[String]) -> usize;

    /// Ids of every layer on the map, in draw order.
    fn layer_ids(&self) -> Vec<String>;

    /// Sets a layer's visibility. Returns false if no such layer exists.
    fn set_layer_visible(&mut self, id: &str, visible: bool) -> bool;

    /// Asks the host to re-request a layer's tiles.
    fn refresh_layer(&mut self, id: &str);

    fn add_control(&mut self, control: RevealControl);

    fn remove_control(&mut self, id: &str);

    /// Whether the container hosting the overlay controls is open.
    /// Hosts without a collapsible container are always open.
    fn is_container_open(&self) -> bool {
        true
    }
}
