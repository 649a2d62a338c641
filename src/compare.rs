//! Swipe compare controller.
//!
//! While compare is on, exactly one reveal control exists on the host. It
//! references the installed primary layer (leading) and compare layer
//! (trailing). Leaving compare hides the trailing layer again and removes
//! the control.

use crate::host::{HostMap, RevealControl, REVEAL_CONTROL_ID, REVEAL_POSITION};
use crate::layers::LayerManager;
use crate::tiles::{Role, TileId};

/// Compare controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareMode {
    #[default]
    Off,
    On,
}

/// The live reveal control and the two layers it splits.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareSession {
    pub control_id: &'static str,
    pub leading: TileId,
    pub trailing: TileId,
}

/// Owns the single reveal control slot.
#[derive(Debug, Default)]
pub struct CompareController {
    session: Option<CompareSession>,
}

impl CompareController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CompareMode {
        if self.session.is_some() {
            CompareMode::On
        } else {
            CompareMode::Off
        }
    }

    pub fn session(&self) -> Option<&CompareSession> {
        self.session.as_ref()
    }

    /// Off → On. Requires `Ready` and both role layers installed.
    pub fn enter<H: HostMap>(&mut self, host: &mut H, ready: bool, layers: &LayerManager) -> bool {
        if !ready {
            log::debug!("Compare requested while imagery is unavailable; ignoring");
            return false;
        }

        let (Some(leading), Some(trailing)) =
            (layers.installed(Role::Primary), layers.installed(Role::Compare))
        else {
            log::debug!("Compare requested before both overlays are installed");
            return false;
        };
        let (leading, trailing) = (leading.clone(), trailing.clone());

        if self.session.is_some() {
            self.exit(host);
        }

        let trailing_id = trailing.to_layer_id();
        host.set_layer_visible(&trailing_id, true);
        host.add_control(RevealControl {
            id: REVEAL_CONTROL_ID,
            leading: leading.to_layer_id(),
            trailing: trailing_id,
            position: REVEAL_POSITION,
        });
        log::debug!("Reveal control created: {} | {}", leading, trailing);

        self.session = Some(CompareSession {
            control_id: REVEAL_CONTROL_ID,
            leading,
            trailing,
        });
        true
    }

    /// On → Off. Returns false when compare was already off.
    pub fn exit<H: HostMap>(&mut self, host: &mut H) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        host.set_layer_visible(&session.trailing.to_layer_id(), false);
        host.remove_control(session.control_id);
        log::debug!("Reveal control destroyed");
        true
    }

    /// True when the session no longer matches the installed layers.
    pub fn is_stale(&self, layers: &LayerManager) -> bool {
        match &self.session {
            Some(session) => {
                layers.installed(Role::Primary) != Some(&session.leading)
                    || layers.installed(Role::Compare) != Some(&session.trailing)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayConfig;
    use crate::dates::CaptureDate;
    use crate::geo::TilePyramid;
    use crate::host::testing::RecordingHost;
    use crate::layers::LayerTemplate;
    use crate::state::OverlayToggles;
    use std::rc::Rc;

    fn installed_pair(host: &mut RecordingHost) -> LayerManager {
        let config = OverlayConfig::default();
        let pyramid = Rc::new(TilePyramid::new(3, 24, config.pyramid_params()));
        let mut layers = LayerManager::new(LayerTemplate::from_config(&config, pyramid));
        let toggles = OverlayToggles::new(true);
        layers.ensure_layer(host, true, toggles, Role::Primary, &CaptureDate::from("2021-01-15"));
        layers.ensure_layer(host, true, toggles, Role::Compare, &CaptureDate::from("2020-03-01"));
        layers
    }

    #[test]
    fn test_enter_requires_ready() {
        let mut host = RecordingHost::new();
        let layers = installed_pair(&mut host);
        let mut compare = CompareController::new();

        assert!(!compare.enter(&mut host, false, &layers));
        assert!(host.controls.is_empty());
        assert_eq!(compare.mode(), CompareMode::Off);
    }

    #[test]
    fn test_enter_and_exit() {
        let mut host = RecordingHost::new();
        let layers = installed_pair(&mut host);
        let mut compare = CompareController::new();
        assert!(!host.is_visible("compare-2020-03-01"));

        assert!(compare.enter(&mut host, true, &layers));
        assert_eq!(compare.mode(), CompareMode::On);
        assert_eq!(host.controls.len(), 1);
        let control = &host.controls[0];
        assert_eq!(control.leading, "base-2021-01-15");
        assert_eq!(control.trailing, "compare-2020-03-01");
        assert!((control.position - 35.0).abs() < f32::EPSILON);
        assert!(host.is_visible("compare-2020-03-01"));

        assert!(compare.exit(&mut host));
        assert!(host.controls.is_empty());
        assert!(!host.is_visible("compare-2020-03-01"));
        assert!(!compare.exit(&mut host));
    }

    #[test]
    fn test_reenter_never_stacks_controls() {
        let mut host = RecordingHost::new();
        let layers = installed_pair(&mut host);
        let mut compare = CompareController::new();

        compare.enter(&mut host, true, &layers);
        compare.enter(&mut host, true, &layers);
        assert_eq!(host.controls.len(), 1);
    }

    #[test]
    fn test_missing_layer_blocks_enter() {
        let mut host = RecordingHost::new();
        let mut layers = installed_pair(&mut host);
        layers.retire_role(&mut host, Role::Compare);
        let mut compare = CompareController::new();

        assert!(!compare.enter(&mut host, true, &layers));
        assert!(host.controls.is_empty());
    }

    #[test]
    fn test_stale_after_layer_swap() {
        let mut host = RecordingHost::new();
        let mut layers = installed_pair(&mut host);
        let mut compare = CompareController::new();
        compare.enter(&mut host, true, &layers);
        assert!(!compare.is_stale(&layers));

        layers.ensure_layer(
            &mut host,
            true,
            OverlayToggles::new(true),
            Role::Compare,
            &CaptureDate::from("2019-07-07"),
        );
        assert!(compare.is_stale(&layers));
    }
}
