//! Availability alerts: a modal for a missing credential, a banner for
//! area errors. Request failures are only logged.

use super::canvas::CanvasHost;
use super::colors;
use eframe::egui::{self, RichText};
use nearmap_overlay::{AvailabilityState, OverlayEngine, Presentation};

/// Tracks whether the current alert was dismissed.
#[derive(Default)]
pub struct AlertState {
    seen: Option<AvailabilityState>,
    dismissed: bool,
}

pub fn render_alerts(
    ctx: &egui::Context,
    engine: &OverlayEngine<CanvasHost>,
    alerts: &mut AlertState,
) {
    let current = engine.availability();
    if current != alerts.seen {
        alerts.seen = current;
        alerts.dismissed = false;
    }

    let Some(state) = current else {
        return;
    };
    let Some(message) = state.message() else {
        return;
    };

    match state.presentation() {
        Presentation::Modal if !alerts.dismissed => {
            let modal = egui::Modal::new(egui::Id::new("availability_modal")).show(ctx, |ui| {
                ui.set_width(320.0);
                ui.heading(state.label());
                ui.add_space(6.0);
                ui.label(message);
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    alerts.dismissed = true;
                }
            });
            if modal.should_close() {
                alerts.dismissed = true;
            }
        }
        Presentation::Banner => {
            egui::TopBottomPanel::top("availability_banner")
                .frame(
                    egui::Frame::NONE
                        .fill(colors::status::BANNER)
                        .inner_margin(egui::Margin::symmetric(8, 4)),
                )
                .show(ctx, |ui| {
                    ui.label(RichText::new(message).color(colors::status::WARNING));
                });
        }
        _ => {}
    }
}
