//! Overlay identity and provider URL templates.

mod identity;

pub use identity::{build_coverage_url, build_tile_url, expand_tile_url, generate_tile_id, Role, TileId};
