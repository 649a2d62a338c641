//! Overlay toggle state.

/// User-facing switches for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayToggles {
    /// Show the imagery overlay.
    pub overlay_enabled: bool,

    /// Swipe-compare two capture dates.
    pub compare_enabled: bool,
}

impl OverlayToggles {
    pub fn new(overlay_enabled: bool) -> Self {
        Self {
            overlay_enabled,
            compare_enabled: false,
        }
    }

    /// Whether a layer of the given role should currently be drawn.
    pub fn role_visible(&self, is_compare: bool) -> bool {
        self.overlay_enabled && (!is_compare || self.compare_enabled)
    }
}
