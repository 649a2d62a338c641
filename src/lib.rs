//! Nearmap temporal imagery overlay.
//!
//! Puts dated aerial imagery tiles over a host map view. The engine looks up
//! which capture dates cover the current view, keeps one overlay per role
//! (primary and compare) on the host, and drives an optional swipe reveal
//! that compares two dates side by side.
//!
//! The host map is abstracted behind [`host::HostMap`]; the engine never
//! renders anything itself.

pub mod compare;
pub mod config;
pub mod coverage;
pub mod dates;
pub mod engine;
pub mod geo;
pub mod host;
pub mod layers;
pub mod navigation;
pub mod state;
pub mod tiles;

pub use config::{ConfigError, Direction, OverlayConfig};
pub use coverage::{CoverageChannel, CoverageCompletion, FetchError, FetchTicket};
pub use dates::{CaptureDate, DateList, MenuEntry};
pub use engine::OverlayEngine;
pub use host::{HostMap, OverlayLayer, RevealControl, Viewport};
pub use navigation::{NavButtons, Step};
pub use state::{AvailabilityState, Presentation};
pub use tiles::{Role, TileId};
