//! Web-Mercator slippy tile conversion.
//!
//! Converts between geographic coordinates (lon/lat) and tile column/row
//! using the OpenStreetMap tiling convention:
//! - column = floor((lon + 180) / 360 * 2^z)
//! - row = floor((1 - ln(tan(lat) + sec(lat)) / π) / 2 * 2^z)

use geo_types::Coord;
use std::f64::consts::PI;

fn tiles_at(zoom: u8) -> f64 {
    2f64.powi(i32::from(zoom))
}

/// Fractional tile column for a longitude.
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * tiles_at(zoom)
}

/// Fractional tile row for a latitude.
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * tiles_at(zoom)
}

/// Tile column containing `lon` at `zoom`.
pub fn lon2tile(lon: f64, zoom: u8) -> i64 {
    lon_to_tile_x(lon, zoom).floor() as i64
}

/// Tile row containing `lat` at `zoom`.
///
/// ±90° is accepted and yields an extreme row index rather than an error.
pub fn lat2tile(lat: f64, zoom: u8) -> i64 {
    lat_to_tile_y(lat, zoom).floor() as i64
}

/// North-west corner of a (possibly fractional) tile position.
pub fn tile_to_lon_lat(x: f64, y: f64, zoom: u8) -> Coord<f64> {
    let n = tiles_at(zoom);
    let lon = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    Coord { x: lon, y: lat }
}

/// Tile address used by the coverage query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub zoom: u8,
    pub col: i64,
    pub row: i64,
}

impl TileCoord {
    /// Tile containing a lon/lat position; `None` for non-finite input.
    pub fn from_lon_lat(lon: f64, lat: f64, zoom: u8) -> Option<Self> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        Some(Self {
            zoom,
            col: lon2tile(lon, zoom),
            row: lat2tile(lat, zoom),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon2tile() {
        assert_eq!(lon2tile(-180.0, 5), 0);
        assert_eq!(lon2tile(0.0, 1), 1);
        assert_eq!(lon2tile(179.9999, 3), 7);
        assert_eq!(lon2tile(-97.7431, 13), 1871);
    }

    #[test]
    fn test_lat2tile() {
        assert_eq!(lat2tile(0.0, 4), 8);
        assert_eq!(lat2tile(85.0, 1), 0);
        assert_eq!(lat2tile(-85.0, 1), 1);
    }

    #[test]
    fn test_polar_latitude_is_extreme_not_error() {
        assert!(lat2tile(90.0, 10) < 0);
        assert!(lat2tile(-89.9, 10) > 1 << 10);
    }

    #[test]
    fn test_tile_round_trip_corner() {
        let corner = tile_to_lon_lat(1871.0, 3372.0, 13);
        assert_eq!(lon2tile(corner.x + 1e-9, 13), 1871);
        assert_eq!(lat2tile(corner.y - 1e-9, 13), 3372);
    }

    #[test]
    fn test_tile_coord_rejects_non_finite() {
        assert!(TileCoord::from_lon_lat(f64::NAN, 0.0, 3).is_none());
        let coord = TileCoord::from_lon_lat(0.0, 0.0, 2).unwrap();
        assert_eq!((coord.col, coord.row), (2, 2));
    }
}
