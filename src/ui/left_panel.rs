//! Left panel UI: the overlay controls container.
//!
//! Holds the capture date picker, the compare toggle and, while comparing,
//! the compare date picker. Collapsing the panel closes the container.

use super::canvas::CanvasHost;
use super::colors;
use eframe::egui::{self, RichText};
use nearmap_overlay::compare::CompareMode;
use nearmap_overlay::{CaptureDate, MenuEntry, OverlayEngine, Role, Step};

/// Year-grouped menu entries, rebuilt only when the date list changes.
#[derive(Default)]
pub struct DateMenu {
    revision: Option<u64>,
    entries: Vec<MenuEntry>,
}

impl DateMenu {
    fn entries(&mut self, engine: &OverlayEngine<CanvasHost>) -> &[MenuEntry] {
        let revision = engine.date_list_revision();
        if self.revision != Some(revision) {
            self.entries = engine.menu_entries();
            self.revision = Some(revision);
        }
        &self.entries
    }
}

pub fn render_left_panel(
    ctx: &egui::Context,
    engine: &mut OverlayEngine<CanvasHost>,
    date_menu: &mut DateMenu,
) {
    egui::SidePanel::left("left_panel")
        .resizable(true)
        .default_width(260.0)
        .min_width(220.0)
        .max_width(400.0)
        .show(ctx, |ui| {
            ui.heading("Capture Date");
            ui.separator();

            let enabled = !engine.controls_disabled() && engine.toggles().overlay_enabled;
            let menu = date_menu.entries(engine);

            ui.add_enabled_ui(enabled, |ui| {
                render_date_picker(ui, engine, menu, Role::Primary);

                ui.add_space(10.0);

                let comparing = engine.compare_mode() == CompareMode::On;
                let label = RichText::new("Compare").color(if comparing {
                    colors::ui::ACTIVE
                } else {
                    colors::ui::VALUE
                });
                if ui.selectable_label(comparing, label).clicked() {
                    engine.set_compare_enabled(!comparing);
                }

                if engine.compare_mode() == CompareMode::On {
                    ui.add_space(6.0);
                    ui.label(RichText::new("Compare with").size(11.0).color(colors::ui::LABEL));
                    render_date_picker(ui, engine, menu, Role::Compare);
                }
            });

            ui.add_space(10.0);
            ui.separator();
            ui.label(
                RichText::new(format!("{} capture date(s)", engine.date_list().len()))
                    .size(11.0)
                    .color(colors::ui::LABEL),
            );
        });
}

/// Previous/next buttons around a year-grouped date menu.
fn render_date_picker(
    ui: &mut egui::Ui,
    engine: &mut OverlayEngine<CanvasHost>,
    menu: &[MenuEntry],
    role: Role,
) {
    let buttons = engine.nav_buttons(role);
    let selected = engine.selected(role).clone();
    let mut choice: Option<CaptureDate> = None;
    let mut step: Option<Step> = None;

    ui.horizontal(|ui| {
        if ui
            .add_enabled(buttons.previous_enabled, egui::Button::new("\u{25C0}"))
            .on_hover_text("Previous capture")
            .clicked()
        {
            step = Some(Step::Previous);
        }

        egui::ComboBox::from_id_salt(("date_picker", role.label()))
            .selected_text(selected.display_label())
            .width(150.0)
            .show_ui(ui, |ui| {
                for entry in menu {
                    match entry {
                        MenuEntry::Year(year) => {
                            ui.label(RichText::new(year).strong().color(colors::ui::HEADING));
                        }
                        MenuEntry::Date(date) => {
                            if ui
                                .selectable_label(*date == selected, date.menu_label())
                                .clicked()
                            {
                                choice = Some(date.clone());
                            }
                        }
                    }
                }
            });

        if ui
            .add_enabled(buttons.next_enabled, egui::Button::new("\u{25B6}"))
            .on_hover_text("Next capture")
            .clicked()
        {
            step = Some(Step::Next);
        }
    });

    if let Some(date) = choice {
        engine.select_date(role, date);
    }
    if let Some(step) = step {
        engine.step_date(role, step);
    }
}
