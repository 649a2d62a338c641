//! Central canvas UI: a schematic slippy map that hosts the overlays.
//!
//! Overlays are drawn as their tile grid at the level the layer's pyramid
//! picks for the current zoom. The reveal control splits the canvas between
//! its leading and trailing layers.

use super::colors;
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, RichText, Sense, Stroke, Vec2};
use geo_types::Coord;
use nearmap_overlay::geo::{lat_to_tile_y, lon_to_tile_x, tile_to_lon_lat, TileCoord, ZoomConstraint};
use nearmap_overlay::tiles::expand_tile_url;
use nearmap_overlay::{HostMap, OverlayEngine, OverlayLayer, RevealControl, Viewport};

/// Zoom range of the view before an overlay constraint is installed.
const NATIVE_ZOOM_RANGE: (f64, f64) = (0.0, 19.0);

/// Tiles drawn per layer are capped to keep extreme zooms cheap.
const MAX_TILES_PER_LAYER: i64 = 2048;

/// Host map state owned by the canvas.
pub struct CanvasHost {
    /// (longitude, latitude) in degrees.
    center: Coord<f64>,
    zoom: f64,
    zoom_range: (f64, f64),
    /// Overlays in draw order.
    layers: Vec<OverlayLayer>,
    control: Option<RevealControl>,
    container_open: bool,
    moving: bool,
    stationary: bool,
}

impl CanvasHost {
    pub fn new(center: Coord<f64>, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            zoom_range: NATIVE_ZOOM_RANGE,
            layers: Vec::new(),
            control: None,
            container_open: true,
            moving: false,
            stationary: false,
        }
    }

    pub fn set_container_open(&mut self, open: bool) {
        self.container_open = open;
    }

    /// Returns true once after the view stopped moving.
    pub fn take_stationary(&mut self) -> bool {
        std::mem::take(&mut self.stationary)
    }

    fn world_scale(&self) -> f64 {
        256.0 * 2f64.powf(self.zoom)
    }

    /// World pixel position of a lon/lat at the current zoom.
    fn to_world(&self, lon: f64, lat: f64) -> (f64, f64) {
        let scale = self.world_scale();
        (lon_to_tile_x(lon, 0) * scale, lat_to_tile_y(lat, 0) * scale)
    }

    fn pan(&mut self, delta: Vec2) {
        let (x, y) = self.to_world(self.center.x, self.center.y);
        let scale = self.world_scale();
        let x = x - f64::from(delta.x);
        let y = (y - f64::from(delta.y)).clamp(0.0, scale);
        let mut center = tile_to_lon_lat(x / scale, y / scale, 0);
        center.x = (center.x + 180.0).rem_euclid(360.0) - 180.0;
        self.center = center;
    }

    fn zoom_by(&mut self, delta: f64) {
        let (min, max) = self.zoom_range;
        self.zoom = (self.zoom + delta).clamp(min, max);
    }

    fn handle_interaction(&mut self, response: &egui::Response) {
        let mut moved = false;

        if response.dragged() {
            self.pan(response.drag_delta());
            moved = true;
        }

        if response.hovered() {
            let scroll = response.ctx.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.zoom_by(f64::from(scroll) * 0.002);
                moved = true;
            }
        }

        if response.double_clicked() {
            self.zoom_by(1.0);
            moved = true;
        }

        if self.moving && !moved {
            self.stationary = true;
        }
        self.moving = moved;
    }

    fn render(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, colors::map::BACKGROUND);

        let split = self.control.as_ref().map(|control| {
            rect.left() + rect.width() * control.position.clamp(0.0, 100.0) / 100.0
        });

        for layer in self.layers.iter().filter(|layer| layer.visible) {
            let clip = match (&self.control, split) {
                (Some(control), Some(x)) if control.leading == layer.id => {
                    Rect::from_min_max(rect.min, Pos2::new(x, rect.max.y))
                }
                (Some(control), Some(x)) if control.trailing == layer.id => {
                    Rect::from_min_max(Pos2::new(x, rect.min.y), rect.max)
                }
                _ => rect,
            };
            self.paint_layer(&painter.with_clip_rect(clip), rect, layer);
        }

        painter.circle_filled(rect.center(), 3.0, colors::map::CROSSHAIR);

        if let Some(x) = split {
            self.render_divider(ui, &painter, rect, x);
        }

        self.draw_view_info(ui, rect, response.hover_pos());
        self.handle_interaction(&response);
    }

    fn tile_level(&self, layer: &OverlayLayer) -> Option<u8> {
        layer.tiling.pyramid.clamp_level(self.zoom)
    }

    /// Screen-space placement of the tile grid at `level`: the fractional
    /// tile under the view center and the on-screen tile size.
    fn grid(&self, level: u8, tile_size: u32) -> (f64, f64, f32) {
        let cx = lon_to_tile_x(self.center.x, level);
        let cy = lat_to_tile_y(self.center.y, level);
        let size = f64::from(tile_size) * 2f64.powf(self.zoom - f64::from(level));
        (cx, cy, size as f32)
    }

    fn paint_layer(&self, painter: &Painter, rect: Rect, layer: &OverlayLayer) {
        let Some(level) = self.tile_level(layer) else {
            return;
        };
        let (cx, cy, size) = self.grid(level, layer.tiling.size[0]);
        if size < 1.0 {
            return;
        }

        let half_w = f64::from(rect.width() / 2.0 / size);
        let half_h = f64::from(rect.height() / 2.0 / size);
        let tiles = 1i64 << level;
        let cols = (cx - half_w).floor() as i64..=(cx + half_w).floor() as i64;
        let rows = ((cy - half_h).floor() as i64).max(0)..=((cy + half_h).floor() as i64).min(tiles - 1);

        let count = (cols.end() - cols.start() + 1) * (rows.end() - rows.start() + 1);
        if count > MAX_TILES_PER_LAYER {
            log::debug!("Skipping {}: {} tiles in view", layer.id, count);
            return;
        }

        let fill = colors::map::layer_fill(layer.key.role.is_compare(), layer.opacity);
        let stroke = Stroke::new(1.0, colors::map::TILE_BORDER);
        let label_tiles = size > 96.0;

        for row in rows {
            for col in cols.clone() {
                let min = rect.center()
                    + Vec2::new(
                        ((col as f64 - cx) * f64::from(size)) as f32,
                        ((row as f64 - cy) * f64::from(size)) as f32,
                    );
                let tile_rect = Rect::from_min_size(min, Vec2::splat(size));
                painter.rect_filled(tile_rect, 0.0, fill);
                painter.rect_stroke(tile_rect, 0.0, stroke, egui::StrokeKind::Inside);

                if label_tiles {
                    painter.text(
                        tile_rect.left_top() + Vec2::new(4.0, 4.0),
                        Align2::LEFT_TOP,
                        format!("{}/{}/{}", level, col.rem_euclid(tiles), row),
                        FontId::monospace(10.0),
                        colors::map::TILE_LABEL,
                    );
                }
            }
        }

        painter.text(
            painter.clip_rect().left_bottom() + Vec2::new(8.0, -8.0),
            Align2::LEFT_BOTTOM,
            &layer.title,
            FontId::proportional(12.0),
            colors::map::TILE_LABEL,
        );
    }

    fn render_divider(&mut self, ui: &mut egui::Ui, painter: &Painter, rect: Rect, x: f32) {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(2.0, colors::map::DIVIDER),
        );

        let handle = Rect::from_center_size(Pos2::new(x, rect.center().y), Vec2::new(14.0, 40.0));
        let response = ui.interact(handle, ui.id().with("reveal_handle"), Sense::drag());
        painter.rect_filled(handle, 4.0, colors::map::DIVIDER);

        if response.dragged() && rect.width() > 0.0 {
            if let Some(control) = self.control.as_mut() {
                let moved = control.position + response.drag_delta().x / rect.width() * 100.0;
                control.position = moved.clamp(0.0, 100.0);
            }
        }
    }

    fn draw_view_info(&self, ui: &mut egui::Ui, rect: Rect, hover: Option<Pos2>) {
        let info_rect = Rect::from_min_size(rect.left_top() + Vec2::new(10.0, 10.0), Vec2::new(520.0, 60.0));

        let hovered_url = hover.and_then(|pos| {
            let layer = self.layers.iter().rev().find(|layer| layer.visible)?;
            let level = self.tile_level(layer)?;
            let (cx, cy, size) = self.grid(level, layer.tiling.size[0]);
            let offset = pos - rect.center();
            let tile = TileCoord {
                zoom: level,
                col: (cx + f64::from(offset.x / size)).floor() as i64,
                row: (cy + f64::from(offset.y / size)).floor() as i64,
            };
            Some(expand_tile_url(&layer.url_template, tile))
        });

        ui.scope_builder(egui::UiBuilder::new().max_rect(info_rect), |ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(format!(
                        "Center: {:.5}, {:.5}  Zoom: {:.2}",
                        self.center.y, self.center.x, self.zoom
                    ))
                    .monospace()
                    .size(12.0)
                    .color(colors::ui::VALUE),
                );
                if let Some(url) = hovered_url {
                    ui.label(RichText::new(url).monospace().size(10.0).color(colors::ui::LABEL));
                }
            });
        });
    }
}

impl HostMap for CanvasHost {
    fn viewport(&self) -> Option<Viewport> {
        Some(Viewport {
            center: self.center,
            zoom: self.zoom,
        })
    }

    fn set_zoom_constraint(&mut self, constraint: ZoomConstraint) {
        let min = constraint
            .pyramid
            .min_level()
            .map_or(NATIVE_ZOOM_RANGE.0, f64::from);
        self.zoom_range = (min, f64::from(constraint.max_zoom));
        self.zoom = self.zoom.clamp(self.zoom_range.0, self.zoom_range.1);
        log::debug!("Zoom constraint installed: {:?}", self.zoom_range);
    }

    fn add_layer(&mut self, layer: OverlayLayer) {
        let at = self
            .layers
            .iter()
            .position(|existing| existing.z_index > layer.z_index)
            .unwrap_or(self.layers.len());
        self.layers.insert(at, layer);
    }

    fn remove_layers(&mut self, ids: &[String]) -> usize {
        let before = self.layers.len();
        self.layers.retain(|layer| !ids.contains(&layer.id));
        before - self.layers.len()
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    fn set_layer_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.layers.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    fn refresh_layer(&mut self, id: &str) {
        log::info!("Re-requesting tiles for {}", id);
    }

    fn add_control(&mut self, control: RevealControl) {
        if self.control.is_some() {
            log::warn!("Replacing existing reveal control");
        }
        self.control = Some(control);
    }

    fn remove_control(&mut self, id: &str) {
        if self.control.as_ref().is_some_and(|control| control.id == id) {
            self.control = None;
        }
    }

    fn is_container_open(&self) -> bool {
        self.container_open
    }
}

/// Renders the map. Returns true when the view just became stationary.
pub fn render_canvas(ctx: &egui::Context, engine: &mut OverlayEngine<CanvasHost>) -> bool {
    let mut stationary = false;

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let Some(host) = engine.host_mut() else {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("Map view not ready").color(Color32::GRAY));
                });
                return;
            };
            host.render(ui);
            stationary = host.take_stationary();
        });

    stationary
}
