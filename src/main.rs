#![warn(clippy::all)]

//! Nearmap Overlay - interactive demo of the temporal imagery overlay.
//!
//! Hosts the overlay engine on a schematic slippy map. Coverage for the view
//! center is looked up whenever the map comes to rest, and the left panel
//! drives date selection and the swipe compare.

mod ui;

use eframe::egui;
use nearmap_overlay::{
    ConfigError, CoverageChannel, FetchTicket, HostMap, OverlayConfig, OverlayEngine,
};
use ui::{AlertState, CanvasHost, DateMenu};

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Nearmap Overlay",
        native_options,
        Box::new(|cc| Ok(Box::new(OverlayApp::new(cc)?))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            log::error!("No document to attach to");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("app_canvas")
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("app_canvas is missing or not a HtmlCanvasElement");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(OverlayApp::new(cc)?))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Demo application state.
pub struct OverlayApp {
    /// Overlay engine, owning the canvas host.
    engine: OverlayEngine<CanvasHost>,

    /// Channel for async coverage requests
    coverage: CoverageChannel,

    /// Whether the overlay controls container is expanded
    controls_open: bool,

    alerts: AlertState,

    date_menu: DateMenu,
}

impl OverlayApp {
    /// Creates the app and issues the first coverage request.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, ConfigError> {
        let config = OverlayConfig::load();
        let host = CanvasHost::new(config.origin(), f64::from(config.origin_zoom));

        let mut engine = OverlayEngine::new(config)?;
        engine.attach_host(host);

        let mut app = Self {
            engine,
            coverage: CoverageChannel::new(),
            controls_open: true,
            alerts: AlertState::default(),
            date_menu: DateMenu::default(),
        };

        let ticket = app.engine.begin_coverage_fetch();
        app.request_coverage(&cc.egui_ctx, ticket);
        Ok(app)
    }

    fn request_coverage(&self, ctx: &egui::Context, ticket: FetchTicket) {
        let ctx = ctx.clone();
        self.coverage.fetch(ticket, move || ctx.request_repaint());
    }

    /// Applies every finished coverage request.
    fn poll_coverage(&mut self) {
        while let Some(completion) = self.coverage.try_recv() {
            self.engine.on_coverage_complete(completion);
        }
    }

    /// Mirrors the controls panel state onto the host container.
    fn sync_container(&mut self) {
        let Some(host) = self.engine.host_mut() else {
            return;
        };
        if host.is_container_open() != self.controls_open {
            host.set_container_open(self.controls_open);
            log::debug!("Controls container open: {}", self.controls_open);
            self.engine.on_container_state_changed();
        }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_coverage();

        ui::render_top_bar(ctx, &mut self.engine, &mut self.controls_open);
        ui::render_alerts(ctx, &self.engine, &mut self.alerts);

        if self.controls_open {
            ui::render_left_panel(ctx, &mut self.engine, &mut self.date_menu);
        }
        self.sync_container();

        if ui::render_canvas(ctx, &mut self.engine) {
            if let Some(ticket) = self.engine.on_view_stationary() {
                self.request_coverage(ctx, ticket);
            }
        }
    }
}
