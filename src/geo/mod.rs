//! Slippy-tile math and the custom level-of-detail pyramid.
//!
//! The host map view stops at its native maximum zoom; the imagery provider
//! serves deeper levels. The pyramid built here extends both the view's zoom
//! constraint and every overlay's tiling scheme with the same levels.

mod projection;
mod pyramid;

pub use projection::{lat2tile, lat_to_tile_y, lon2tile, lon_to_tile_x, tile_to_lon_lat, TileCoord};
pub use pyramid::{
    build_pyramid, Lod, PyramidParams, TilePyramid, TilingScheme, ZoomConstraint,
    TILE_FORMAT, TILE_INFO_DPI, WEB_MERCATOR_ORIGIN,
};
