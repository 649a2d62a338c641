//! Top bar UI: title, overlay toggle and availability status.

use super::canvas::CanvasHost;
use super::colors;
use eframe::egui::{self, Color32, RichText};
use nearmap_overlay::{AvailabilityState, OverlayEngine};

pub fn render_top_bar(
    ctx: &egui::Context,
    engine: &mut OverlayEngine<CanvasHost>,
    controls_open: &mut bool,
) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.toggle_value(controls_open, "\u{2630}")
                    .on_hover_text("Show or hide the overlay controls");

                ui.separator();

                ui.label(
                    RichText::new("Nearmap Overlay")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                let mut overlay = engine.toggles().overlay_enabled;
                let toggle = ui.add_enabled(
                    !engine.controls_disabled(),
                    egui::Checkbox::new(&mut overlay, "Imagery"),
                );
                if toggle.changed() {
                    engine.set_overlay_enabled(overlay);
                }

                ui.separator();

                let (text, color) = status_text(engine.availability());
                ui.label(RichText::new(text).size(13.0).color(color));
            });
        });
}

fn status_text(state: Option<AvailabilityState>) -> (&'static str, Color32) {
    match state {
        None => ("Checking coverage...", colors::status::PENDING),
        Some(AvailabilityState::Ready) => ("Imagery available", colors::status::READY),
        Some(AvailabilityState::RequestFailed) => {
            ("Coverage request failed", colors::status::WARNING)
        }
        Some(other) => (other.label(), colors::status::ERROR),
    }
}
