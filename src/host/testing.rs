//! In-memory host that records every call, for lifecycle tests.

use super::{HostMap, OverlayLayer, RevealControl, Viewport};
use crate::geo::ZoomConstraint;
use geo_types::Coord;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostCall {
    Constraint(u8),
    Add(String),
    Remove(String),
    Visible(String, bool),
    Refresh(String),
    AddControl(String, String),
    RemoveControl(String),
}

#[derive(Debug)]
pub(crate) struct RecordingHost {
    pub viewport: Option<Viewport>,
    pub layers: Vec<OverlayLayer>,
    pub controls: Vec<RevealControl>,
    pub constraint: Option<ZoomConstraint>,
    pub container_open: bool,
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            viewport: Some(Viewport {
                center: Coord {
                    x: -97.7431,
                    y: 30.2672,
                },
                zoom: 15.0,
            }),
            layers: Vec::new(),
            controls: Vec::new(),
            constraint: None,
            container_open: true,
            calls: Vec::new(),
        }
    }

    pub fn layer(&self, id: &str) -> Option<&OverlayLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn count(&self, id: &str) -> usize {
        self.layers.iter().filter(|layer| layer.id == id).count()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.layer(id).is_some_and(|layer| layer.visible)
    }

    /// Layer and control calls in order, e.g. "add base-2020-03-01".
    /// Visibility changes are left out.
    pub fn structural_calls(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Constraint(max_zoom) => Some(format!("constraint {}", max_zoom)),
                HostCall::Add(id) => Some(format!("add {}", id)),
                HostCall::Remove(id) => Some(format!("remove {}", id)),
                HostCall::AddControl(leading, trailing) => {
                    Some(format!("add control {} | {}", leading, trailing))
                }
                HostCall::RemoveControl(id) => Some(format!("remove control {}", id)),
                HostCall::Visible(..) | HostCall::Refresh(_) => None,
            })
            .collect()
    }

    /// Visibility changes recorded for one layer.
    pub fn visibility_changes(&self, id: &str) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Visible(layer, visible) if layer == id => Some(*visible),
                _ => None,
            })
            .collect()
    }

    pub fn refreshes(&self, id: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HostCall::Refresh(r) if r == id))
            .count()
    }
}

impl HostMap for RecordingHost {
    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn set_zoom_constraint(&mut self, constraint: ZoomConstraint) {
        self.calls.push(HostCall::Constraint(constraint.max_zoom));
        self.constraint = Some(constraint);
    }

    fn add_layer(&mut self, layer: OverlayLayer) {
        self.calls.push(HostCall::Add(layer.id.clone()));
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
        for id in ids {
            self.calls.push(HostCall::Remove(id.clone()));
        }
        before - self.layers.len()
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    fn set_layer_visible(&mut self, id: &str, visible: bool) -> bool {
        self.calls.push(HostCall::Visible(id.to_string(), visible));
        match self.layers.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    fn refresh_layer(&mut self, id: &str) {
        self.calls.push(HostCall::Refresh(id.to_string()));
    }

    fn add_control(&mut self, control: RevealControl) {
        self.calls.push(HostCall::AddControl(
            control.leading.clone(),
            control.trailing.clone(),
        ));
        self.controls.push(control);
    }

    fn remove_control(&mut self, id: &str) {
        self.calls.push(HostCall::RemoveControl(id.to_string()));
        self.controls.retain(|control| control.id != id);
    }

    fn is_container_open(&self) -> bool {
        self.container_open
    }
}
