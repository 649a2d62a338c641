//! Overlay layer lifecycle.
//!
//! Each role has one slot. Installing a date for a role first retires
//! whatever the role currently shows (and any stray copy of the new key), so
//! the host never holds two layers of the same role.

use crate::config::{Direction, OverlayConfig};
use crate::dates::CaptureDate;
use crate::geo::{TilePyramid, TilingScheme};
use crate::host::{HostMap, OverlayLayer};
use crate::state::OverlayToggles;
use crate::tiles::{build_tile_url, Role, TileId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

const COPYRIGHT: &str = "Nearmap";

/// Everything needed to build an overlay besides its key.
#[derive(Debug, Clone)]
pub struct LayerTemplate {
    pub tile_url: String,
    pub direction: Direction,
    pub api_key: String,
    pub opacity: f32,
    pub tiling: TilingScheme,
}

impl LayerTemplate {
    pub fn from_config(config: &OverlayConfig, pyramid: Rc<TilePyramid>) -> Self {
        Self {
            tile_url: config.tile_url.clone(),
            direction: config.direction,
            api_key: config.n_api_key.clone(),
            opacity: config.opacity,
            tiling: TilingScheme::new(pyramid),
        }
    }

    pub fn build(&self, key: TileId, visible: bool) -> OverlayLayer {
        let id = key.to_layer_id();
        OverlayLayer {
            title: format!("Nearmap for {}", id),
            copyright: COPYRIGHT,
            url_template: build_tile_url(&self.tile_url, self.direction, &key.date, &self.api_key),
            tiling: self.tiling.clone(),
            opacity: self.opacity,
            z_index: key.role.z_index(),
            visible,
            id,
            key,
        }
    }
}

/// Creates and destroys overlays on the host by identity.
pub struct LayerManager {
    template: LayerTemplate,
    installed: HashMap<Role, TileId>,
    /// Layers whose render errors trigger a refresh.
    refresh_on_error: HashSet<String>,
}

impl LayerManager {
    pub fn new(template: LayerTemplate) -> Self {
        Self {
            template,
            installed: HashMap::new(),
            refresh_on_error: HashSet::new(),
        }
    }

    /// Replaces the template used for layers created from now on.
    pub fn set_template(&mut self, template: LayerTemplate) {
        self.template = template;
    }

    pub fn template(&self) -> &LayerTemplate {
        &self.template
    }

    /// Key currently installed for a role.
    pub fn installed(&self, role: Role) -> Option<&TileId> {
        self.installed.get(&role)
    }

    /// Installs the overlay for `(role, date)` if availability allows.
    ///
    /// Returns true when a layer was added.
    pub fn ensure_layer<H: HostMap>(
        &mut self,
        host: &mut H,
        ready: bool,
        toggles: OverlayToggles,
        role: Role,
        date: &CaptureDate,
    ) -> bool {
        if !ready {
            log::debug!("Skipping {} layer for {}: imagery not ready", role.label(), date);
            return false;
        }

        let key = TileId::new(role, date.clone());
        let id = key.to_layer_id();

        let on_host = host.layer_ids().iter().filter(|l| **l == id).count();
        if self.installed.get(&role) == Some(&key) && on_host == 1 {
            return false;
        }

        self.retire_role(host, role);

        let layer = self
            .template
            .build(key.clone(), toggles.role_visible(role.is_compare()));
        log::debug!("Installing overlay {} (visible: {})", id, layer.visible);
        host.add_layer(layer);

        self.refresh_on_error.insert(id);
        self.installed.insert(role, key);
        true
    }

    /// Removes every host layer whose identity is `(role, date)`.
    /// Idempotent; returns how many layers were removed.
    pub fn retire_layer<H: HostMap>(&mut self, host: &mut H, role: Role, date: &CaptureDate) -> usize {
        let key = TileId::new(role, date.clone());
        let id = key.to_layer_id();

        if self.installed.get(&role) == Some(&key) {
            self.installed.remove(&role);
        }
        self.refresh_on_error.remove(&id);

        let matching: Vec<String> = host.layer_ids().into_iter().filter(|l| *l == id).collect();
        self.remove_from_host(host, matching)
    }

    /// Removes every host layer belonging to `role`, whatever its date.
    pub fn retire_role<H: HostMap>(&mut self, host: &mut H, role: Role) -> usize {
        let installed = self.installed.remove(&role).map(|key| key.to_layer_id());

        let matching: Vec<String> = host
            .layer_ids()
            .into_iter()
            .filter(|id| installed.as_ref() == Some(id) || TileId::layer_has_role(id, role))
            .collect();
        for id in &matching {
            self.refresh_on_error.remove(id);
        }
        self.remove_from_host(host, matching)
    }

    /// Removes all overlays of both roles.
    pub fn retire_all<H: HostMap>(&mut self, host: &mut H) -> usize {
        Role::ALL
            .iter()
            .map(|role| self.retire_role(host, *role))
            .sum()
    }

    fn remove_from_host<H: HostMap>(&self, host: &mut H, mut ids: Vec<String>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        ids.sort();
        ids.dedup();
        log::debug!("Retiring overlays {:?}", ids);
        host.remove_layers(&ids)
    }

    /// Shows or hides the installed layer of a role.
    pub fn set_role_visible<H: HostMap>(&self, host: &mut H, role: Role, visible: bool) -> bool {
        match self.installed.get(&role) {
            Some(key) => host.set_layer_visible(&key.to_layer_id(), visible),
            None => false,
        }
    }

    /// Reacts to a host tile-view creation error by refreshing the layer.
    /// Tile provisioning errors are expected to be transient.
    pub fn handle_render_error<H: HostMap>(&self, host: &mut H, layer_id: &str) -> bool {
        if !self.refresh_on_error.contains(layer_id) {
            log::debug!("Ignoring render error for unmanaged layer {}", layer_id);
            return false;
        }
        log::warn!("Layer view for {} failed to create; refreshing", layer_id);
        host.refresh_layer(layer_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;

    fn manager() -> LayerManager {
        let config = OverlayConfig {
            n_api_key: "KEY".to_string(),
            ..OverlayConfig::default()
        };
        let pyramid = Rc::new(TilePyramid::new(3, 24, config.pyramid_params()));
        LayerManager::new(LayerTemplate::from_config(&config, pyramid))
    }

    fn shown() -> OverlayToggles {
        OverlayToggles::new(true)
    }

    #[test]
    fn test_not_ready_is_noop() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        let date = CaptureDate::from("2020-03-01");

        assert!(!layers.ensure_layer(&mut host, false, shown(), Role::Primary, &date));
        assert!(host.layers.is_empty());
        assert!(layers.installed(Role::Primary).is_none());
    }

    #[test]
    fn test_retire_then_ensure_leaves_one() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        let date = CaptureDate::from("2020-03-01");

        for _ in 0..4 {
            layers.retire_layer(&mut host, Role::Primary, &date);
            layers.ensure_layer(&mut host, true, shown(), Role::Primary, &date);
            assert_eq!(host.count("base-2020-03-01"), 1);
        }
        assert_eq!(host.layers.len(), 1);

        // Repeated ensure without retire is also single-instance.
        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &date);
        assert_eq!(host.count("base-2020-03-01"), 1);
    }

    #[test]
    fn test_new_date_replaces_old() {
        let mut layers = manager();
        let mut host = RecordingHost::new();

        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &"2020-03-01".into());
        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &"2020-06-01".into());

        assert_eq!(host.layer_ids(), vec!["base-2020-06-01".to_string()]);
        assert_eq!(
            layers.installed(Role::Primary).map(|k| k.date.as_str()),
            Some("2020-06-01")
        );
    }

    #[test]
    fn test_stray_copies_are_cleared() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        let date = CaptureDate::from("2020-03-01");
        let stray = layers
            .template()
            .build(TileId::new(Role::Primary, date.clone()), true);
        host.add_layer(stray.clone());
        host.add_layer(stray);

        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &date);
        assert_eq!(host.count("base-2020-03-01"), 1);
    }

    #[test]
    fn test_retire_keeps_host_layers_with_role_prefix() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        let date = CaptureDate::from("2020-03-01");
        let mut streets = layers
            .template()
            .build(TileId::new(Role::Primary, date.clone()), true);
        streets.id = "base-streets".to_string();
        host.add_layer(streets);

        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &date);
        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &"2020-06-01".into());
        assert_eq!(
            host.layer_ids(),
            vec!["base-streets".to_string(), "base-2020-06-01".to_string()]
        );

        assert_eq!(layers.retire_all(&mut host), 1);
        assert_eq!(host.layer_ids(), vec!["base-streets".to_string()]);
    }

    #[test]
    fn test_initial_visibility() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        let date = CaptureDate::from("2020-03-01");

        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &date);
        layers.ensure_layer(&mut host, true, shown(), Role::Compare, &date);
        assert!(host.is_visible("base-2020-03-01"));
        assert!(!host.is_visible("compare-2020-03-01"));

        let hidden = OverlayToggles::new(false);
        layers.retire_all(&mut host);
        layers.ensure_layer(&mut host, true, hidden, Role::Primary, &date);
        assert!(!host.is_visible("base-2020-03-01"));

        let comparing = OverlayToggles {
            overlay_enabled: true,
            compare_enabled: true,
        };
        layers.ensure_layer(&mut host, true, comparing, Role::Compare, &date);
        assert!(host.is_visible("compare-2020-03-01"));
    }

    #[test]
    fn test_primary_draws_above_compare() {
        let mut layers = manager();
        let mut host = RecordingHost::new();

        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &"2020-03-01".into());
        layers.ensure_layer(&mut host, true, shown(), Role::Compare, &"2019-01-01".into());

        assert_eq!(
            host.layer_ids(),
            vec!["compare-2019-01-01".to_string(), "base-2020-03-01".to_string()]
        );
    }

    #[test]
    fn test_layer_attributes() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        layers.ensure_layer(&mut host, true, shown(), Role::Compare, &"2020-03-01".into());

        let layer = host.layer("compare-2020-03-01").unwrap();
        assert_eq!(layer.title, "Nearmap for compare-2020-03-01");
        assert_eq!(layer.copyright, "Nearmap");
        assert!(layer.url_template.ends_with("apikey=KEY&until=2020-03-01"));
        assert_eq!(layer.tiling.pyramid.max_level(), Some(24));
    }

    #[test]
    fn test_retire_is_idempotent() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        let date = CaptureDate::from("2020-03-01");

        assert_eq!(layers.retire_layer(&mut host, Role::Compare, &date), 0);
        layers.ensure_layer(&mut host, true, shown(), Role::Compare, &date);
        assert_eq!(layers.retire_layer(&mut host, Role::Compare, &date), 1);
        assert_eq!(layers.retire_layer(&mut host, Role::Compare, &date), 0);
        assert!(layers.installed(Role::Compare).is_none());
    }

    #[test]
    fn test_render_error_refreshes_managed_layer() {
        let mut layers = manager();
        let mut host = RecordingHost::new();
        layers.ensure_layer(&mut host, true, shown(), Role::Primary, &"2020-03-01".into());

        assert!(layers.handle_render_error(&mut host, "base-2020-03-01"));
        assert!(!layers.handle_render_error(&mut host, "basemap"));
        assert_eq!(host.refreshes("base-2020-03-01"), 1);

        layers.retire_all(&mut host);
        assert!(!layers.handle_render_error(&mut host, "base-2020-03-01"));
    }
}
