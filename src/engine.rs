//! The temporal tile overlay engine.
//!
//! `OverlayEngine` owns the observed inputs (availability, date list,
//! selected dates, the overlay and compare toggles, the host view slot) and
//! a fixed table of reactions. Every input change records a [`Signals`] bit;
//! `flush` then runs, in table order, each reaction that observes one of the
//! changed bits. Nothing is rebuilt for inputs a reaction does not observe.
//!
//! Reaction order matters: a stale reveal control is torn down before the
//! layers it references are retired, and rebuilt only after the new layers
//! are installed.

use crate::compare::{CompareController, CompareMode, CompareSession};
use crate::config::{ConfigError, OverlayConfig};
use crate::coverage::{
    classify_result, sync_dates, Classification, CoverageCompletion, DateSelection, FetchTicket,
    SequenceGuard,
};
use crate::dates::{CaptureDate, DateList, MenuEntry};
use crate::geo::{TileCoord, TilePyramid, ZoomConstraint};
use crate::host::HostMap;
use crate::layers::{LayerManager, LayerTemplate};
use crate::navigation::{DateNavigator, NavButtons, Step};
use crate::state::{AvailabilityMachine, AvailabilityState, OverlayToggles};
use crate::tiles::{build_coverage_url, Role, TileId};
use geo_types::Coord;
use std::rc::Rc;

bitflags::bitflags! {
    /// Observed inputs that changed since the last flush.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Signals: u8 {
        const AVAILABILITY = 1 << 0;
        const PRIMARY_DATE = 1 << 1;
        const COMPARE_DATE = 1 << 2;
        const COMPARE_FLAG = 1 << 3;
        const OVERLAY_FLAG = 1 << 4;
        const HOST_VIEW = 1 << 5;
        const CONFIG = 1 << 6;
    }
}

/// A registered reaction: the inputs it observes and what it runs.
struct Reaction<H: HostMap> {
    name: &'static str,
    observes: Signals,
    run: fn(&mut OverlayEngine<H>, &mut H),
}

/// Coordinates coverage, layers and compare against one host view.
pub struct OverlayEngine<H: HostMap> {
    config: OverlayConfig,
    pyramid: Rc<TilePyramid>,
    /// Host view slot; empty until the host attaches.
    host: Option<H>,
    availability: AvailabilityMachine,
    date_list: DateList,
    date_list_revision: u64,
    selection: DateSelection,
    toggles: OverlayToggles,
    layers: LayerManager,
    compare: CompareController,
    sequence: SequenceGuard,
    /// Center the latest coverage query was issued for.
    query_center: Coord<f64>,
    pending: Signals,
}

impl<H: HostMap> OverlayEngine<H> {
    pub fn new(config: OverlayConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let pyramid = Self::build_pyramid(&config);
        let today = CaptureDate::today();

        Ok(Self {
            layers: LayerManager::new(LayerTemplate::from_config(&config, pyramid.clone())),
            pyramid,
            host: None,
            availability: AvailabilityMachine::new(),
            date_list: DateList::single(today.clone()),
            date_list_revision: 0,
            selection: DateSelection::new(today),
            toggles: OverlayToggles::new(config.initial_nmap_active),
            compare: CompareController::new(),
            sequence: SequenceGuard::new(),
            query_center: config.origin(),
            pending: Signals::empty(),
            config,
        })
    }

    fn build_pyramid(config: &OverlayConfig) -> Rc<TilePyramid> {
        Rc::new(TilePyramid::new(
            config.nearmap_min_zoom,
            config.nearmap_max_zoom,
            config.pyramid_params(),
        ))
    }

    fn zoom_constraint(&self) -> ZoomConstraint {
        ZoomConstraint {
            pyramid: self.pyramid.clone(),
            max_zoom: self.config.nearmap_max_zoom,
        }
    }

    /// Registered reactions, in execution order.
    fn reactions() -> [Reaction<H>; 5] {
        let every_layer_input = Signals::AVAILABILITY | Signals::HOST_VIEW | Signals::CONFIG;
        [
            Reaction {
                name: "compare-teardown",
                observes: Signals::all(),
                run: Self::react_compare_teardown,
            },
            Reaction {
                name: "primary-layer",
                observes: every_layer_input | Signals::PRIMARY_DATE,
                run: Self::react_primary_layer,
            },
            Reaction {
                name: "compare-layer",
                observes: every_layer_input | Signals::COMPARE_DATE,
                run: Self::react_compare_layer,
            },
            Reaction {
                name: "compare-session",
                observes: Signals::all(),
                run: Self::react_compare_session,
            },
            Reaction {
                name: "visibility",
                observes: Signals::all(),
                run: Self::react_visibility,
            },
        ]
    }

    fn signal(&mut self, signals: Signals) {
        self.pending |= signals;
    }

    /// Runs every reaction observing a pending change.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let changed = std::mem::replace(&mut self.pending, Signals::empty());

        // Reacting before the host view is attached means "not ready yet";
        // attaching signals HOST_VIEW, which every layer reaction observes.
        let Some(mut host) = self.host.take() else {
            log::debug!("Host view not attached yet; deferring {:?}", changed);
            return;
        };

        for reaction in Self::reactions() {
            if reaction.observes.intersects(changed) {
                log::trace!("Reaction {} ({:?})", reaction.name, changed);
                (reaction.run)(self, &mut host);
            }
        }

        self.host = Some(host);
    }

    fn react_compare_teardown(&mut self, host: &mut H) {
        let keep = self.toggles.compare_enabled
            && self.toggles.overlay_enabled
            && self.availability.is_ready()
            && !self.compare.is_stale(&self.layers)
            && self.compare.session().is_some_and(|session| {
                session.leading.date == self.selection.primary
                    && session.trailing.date == self.selection.compare
            });
        if !keep {
            self.compare.exit(host);
        }
    }

    fn sync_role_layer(&mut self, host: &mut H, role: Role) {
        if self.availability.is_ready() {
            let date = self.selection.get(role).clone();
            self.layers.ensure_layer(host, true, self.toggles, role, &date);
        } else {
            self.layers.retire_role(host, role);
        }
    }

    fn react_primary_layer(&mut self, host: &mut H) {
        self.sync_role_layer(host, Role::Primary);
    }

    fn react_compare_layer(&mut self, host: &mut H) {
        self.sync_role_layer(host, Role::Compare);
    }

    fn react_compare_session(&mut self, host: &mut H) {
        if self.toggles.compare_enabled && self.compare.session().is_none() {
            self.compare.enter(host, self.availability.is_ready(), &self.layers);
        }
    }

    fn react_visibility(&mut self, host: &mut H) {
        let overlay = self.toggles.overlay_enabled;
        let comparing = self.compare.mode() == CompareMode::On;
        self.layers.set_role_visible(host, Role::Primary, overlay);
        self.layers.set_role_visible(host, Role::Compare, overlay && comparing);
    }

    fn set_overlay_flag(&mut self, enabled: bool) {
        if self.toggles.overlay_enabled != enabled {
            self.toggles.overlay_enabled = enabled;
            self.signal(Signals::OVERLAY_FLAG);
        }
        // Switching the overlay either way ends compare.
        self.set_compare_flag(false);
    }

    fn set_compare_flag(&mut self, enabled: bool) {
        if self.toggles.compare_enabled != enabled {
            self.toggles.compare_enabled = enabled;
            self.signal(Signals::COMPARE_FLAG);
        }
    }

    // ---- host view lifecycle -------------------------------------------

    /// Attaches the host view, installs the zoom constraint and builds the
    /// overlays for the current state.
    pub fn attach_host(&mut self, mut host: H) {
        if self.host.is_some() {
            log::warn!("Replacing an attached host view");
            self.detach_host();
        }

        host.set_zoom_constraint(self.zoom_constraint());
        let container_open = host.is_container_open();
        self.host = Some(host);
        log::info!("Host view attached");

        self.signal(Signals::HOST_VIEW);
        if !container_open {
            self.set_overlay_flag(false);
        }
        self.flush();
    }

    /// Tears down every overlay and the reveal control, and hands the host
    /// back.
    pub fn detach_host(&mut self) -> Option<H> {
        let mut host = self.host.take()?;
        self.compare.exit(&mut host);
        self.layers.retire_all(&mut host);
        log::info!("Host view detached");
        Some(host)
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    /// Applies new settings. All overlays are rebuilt, availability returns
    /// to pending and a fresh coverage request is issued.
    pub fn reconfigure(&mut self, config: OverlayConfig) -> Result<FetchTicket, ConfigError> {
        config.validate()?;

        if let Some(mut host) = self.host.take() {
            self.compare.exit(&mut host);
            self.layers.retire_all(&mut host);
            self.host = Some(host);
        }

        self.pyramid = Self::build_pyramid(&config);
        self.layers
            .set_template(LayerTemplate::from_config(&config, self.pyramid.clone()));
        self.config = config;

        let constraint = self.zoom_constraint();
        if let Some(host) = self.host.as_mut() {
            host.set_zoom_constraint(constraint);
        }

        // Responses to requests made with the old settings are discarded.
        self.sequence.invalidate();
        self.availability.reset();
        self.signal(Signals::CONFIG | Signals::AVAILABILITY);
        self.set_compare_flag(false);
        self.flush();

        Ok(self.begin_coverage_fetch())
    }

    // ---- coverage ------------------------------------------------------

    /// Issues a coverage request for the tile under the last known center.
    pub fn begin_coverage_fetch(&mut self) -> FetchTicket {
        let zoom = self.config.origin_zoom;
        let tile = TileCoord::from_lon_lat(self.query_center.x, self.query_center.y, zoom)
            .or_else(|| {
                log::warn!("Non-finite view center; querying the configured origin");
                let origin = self.config.origin();
                TileCoord::from_lon_lat(origin.x, origin.y, zoom)
            })
            .unwrap_or(TileCoord { zoom, col: 0, row: 0 });

        let seq = self.sequence.issue();
        let url = build_coverage_url(
            &self.config.coverage_url,
            tile,
            &self.config.n_api_key,
            self.config.coverage_limit,
        );
        log::debug!("Coverage request #{} for tile {}/{}/{}", seq, tile.zoom, tile.col, tile.row);
        FetchTicket { seq, url }
    }

    /// Handles the host's "view stationary" notification. Returns a new
    /// request when the center moved since the last query or the last
    /// request failed.
    pub fn on_view_stationary(&mut self) -> Option<FetchTicket> {
        let Some(viewport) = self.host.as_ref().and_then(|host| host.viewport()) else {
            log::debug!("View stationary before the host view is ready");
            return None;
        };

        // A failed request is retried on the next trigger even without a move.
        let retry = self.availability.state() == Some(AvailabilityState::RequestFailed);
        if viewport.center == self.query_center && self.sequence.latest() > 0 && !retry {
            return None;
        }
        self.query_center = viewport.center;
        Some(self.begin_coverage_fetch())
    }

    /// Applies a finished coverage request. Returns false when the
    /// completion was superseded by a newer one and discarded.
    pub fn on_coverage_complete(&mut self, completion: CoverageCompletion) -> bool {
        if !self.sequence.accept(completion.seq) {
            log::debug!("Discarding stale coverage response #{}", completion.seq);
            return false;
        }

        let classification = classify_result(&completion.result);
        self.apply_classification(classification);
        true
    }

    fn apply_classification(&mut self, classification: Classification) {
        if self.availability.apply(classification.state) {
            self.signal(Signals::AVAILABILITY);
        }

        match classification.dates {
            Some(candidate) => {
                let outcome = sync_dates(&mut self.date_list, &mut self.selection, candidate);
                if outcome.list_changed {
                    self.date_list_revision += 1;
                }
                if outcome.primary_changed {
                    self.signal(Signals::PRIMARY_DATE);
                }
                if outcome.compare_changed {
                    self.signal(Signals::COMPARE_DATE);
                }
            }
            None => {
                self.set_compare_flag(false);
                if classification.state.forces_overlay_off() {
                    self.set_overlay_flag(false);
                }
            }
        }

        self.flush();
    }

    // ---- user interaction ----------------------------------------------

    /// Switches the overlay on or off. Enabling is refused while the
    /// controls are disabled. Either way compare is turned off.
    pub fn set_overlay_enabled(&mut self, enabled: bool) -> bool {
        if enabled && self.controls_disabled() {
            log::debug!("Overlay toggle is disabled; ignoring");
            return false;
        }
        self.set_overlay_flag(enabled);
        self.flush();
        true
    }

    /// Switches compare on or off. Turning it on requires `Ready` and an
    /// enabled overlay.
    pub fn set_compare_enabled(&mut self, enabled: bool) -> bool {
        if enabled && (!self.availability.is_ready() || !self.toggles.overlay_enabled) {
            log::debug!("Compare unavailable; ignoring");
            return false;
        }
        self.set_compare_flag(enabled);
        self.flush();
        true
    }

    /// Selects a capture date for a role. Dates outside the list are
    /// refused.
    pub fn select_date(&mut self, role: Role, date: CaptureDate) -> bool {
        if !self.date_list.contains(&date) {
            log::warn!("{} is not an available capture date", date);
            return false;
        }
        if self.selection.set(role, date) {
            self.signal(match role {
                Role::Primary => Signals::PRIMARY_DATE,
                Role::Compare => Signals::COMPARE_DATE,
            });
            self.flush();
        }
        true
    }

    /// Moves a role's selection one date forward or back.
    pub fn step_date(&mut self, role: Role, step: Step) -> Option<CaptureDate> {
        let flat = self.date_list.flatten();
        let target = DateNavigator::new(&flat)
            .step(self.selection.get(role), step)?
            .clone();
        self.select_date(role, target.clone());
        Some(target)
    }

    pub fn nav_buttons(&self, role: Role) -> NavButtons {
        let flat = self.date_list.flatten();
        DateNavigator::new(&flat).buttons(self.selection.get(role))
    }

    /// Host report that a layer's tile view failed to create.
    pub fn on_layer_view_error(&mut self, layer_id: &str) -> bool {
        match self.host.as_mut() {
            Some(host) => self.layers.handle_render_error(host, layer_id),
            None => false,
        }
    }

    /// Host report that the hosting container opened or closed.
    pub fn on_container_state_changed(&mut self) {
        let open = self
            .host
            .as_ref()
            .map_or(true, |host| host.is_container_open());
        if !open {
            self.set_overlay_flag(false);
            self.flush();
        }
    }

    // ---- accessors -----------------------------------------------------

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn pyramid(&self) -> &Rc<TilePyramid> {
        &self.pyramid
    }

    /// `None` until the first coverage response is classified.
    pub fn availability(&self) -> Option<AvailabilityState> {
        self.availability.state()
    }

    /// True whenever availability is not `Ready`.
    pub fn controls_disabled(&self) -> bool {
        self.availability.controls_disabled()
    }

    pub fn date_list(&self) -> &DateList {
        &self.date_list
    }

    /// Incremented each time the stored date list is replaced.
    pub fn date_list_revision(&self) -> u64 {
        self.date_list_revision
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.date_list.menu_entries()
    }

    pub fn selection(&self) -> &DateSelection {
        &self.selection
    }

    pub fn selected(&self, role: Role) -> &CaptureDate {
        self.selection.get(role)
    }

    pub fn toggles(&self) -> OverlayToggles {
        self.toggles
    }

    pub fn compare_mode(&self) -> CompareMode {
        self.compare.mode()
    }

    pub fn compare_session(&self) -> Option<&CompareSession> {
        self.compare.session()
    }

    pub fn installed(&self, role: Role) -> Option<&TileId> {
        self.layers.installed(role)
    }
}

impl<H: HostMap> Drop for OverlayEngine<H> {
    fn drop(&mut self) {
        self.detach_host();
    }
}
