//! Centralized color constants for the UI.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for labels.
    pub const LABEL: Color32 = Color32::from_rgb(120, 120, 130);
    /// Slightly brighter for values.
    pub const VALUE: Color32 = Color32::from_rgb(170, 170, 180);
    /// Emphasized color for active states.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
    /// Year headings in the date menu.
    pub const HEADING: Color32 = Color32::from_rgb(200, 200, 210);
}

/// Availability indicator colors.
pub mod status {
    use super::Color32;

    pub const READY: Color32 = Color32::from_rgb(100, 200, 100);
    pub const PENDING: Color32 = Color32::from_rgb(160, 160, 160);
    pub const WARNING: Color32 = Color32::from_rgb(255, 180, 50);
    pub const ERROR: Color32 = Color32::from_rgb(255, 80, 80);
    /// Banner background.
    pub const BANNER: Color32 = Color32::from_rgb(70, 45, 20);
}

/// Map canvas colors.
pub mod map {
    use super::Color32;

    pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
    pub const TILE_BORDER: Color32 = Color32::from_rgba_premultiplied(40, 40, 50, 120);
    pub const TILE_LABEL: Color32 = Color32::from_rgb(220, 220, 230);
    pub const CROSSHAIR: Color32 = Color32::from_rgb(255, 255, 255);
    pub const DIVIDER: Color32 = Color32::from_rgb(240, 240, 240);

    /// Tile fill for an overlay, scaled by its opacity.
    pub fn layer_fill(is_compare: bool, opacity: f32) -> Color32 {
        let (r, g, b) = if is_compare {
            (170, 120, 60)
        } else {
            (60, 110, 170)
        };
        Color32::from_rgba_unmultiplied(r, g, b, (opacity.clamp(0.0, 1.0) * 200.0) as u8)
    }
}
