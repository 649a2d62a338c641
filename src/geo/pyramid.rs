//! Level-of-detail pyramid for zoom levels beyond the host's native maximum.

use geo_types::Coord;
use std::rc::Rc;

/// Top-left corner of the Web-Mercator tile grid in metres.
pub const WEB_MERCATOR_ORIGIN: Coord<f64> = Coord {
    x: -20037508.342787,
    y: 20037508.342787,
};

/// DPI the host assumes when decoding overlay tiles.
pub const TILE_INFO_DPI: u32 = 72;

/// Image format served by the tile endpoint.
pub const TILE_FORMAT: &str = "jpg";

/// Web-Mercator spatial reference id.
pub const WEB_MERCATOR_WKID: u32 = 3857;

/// One level of detail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lod {
    pub level: u8,
    /// Ground metres per pixel.
    pub resolution: f64,
    /// Map scale denominator at the display DPI.
    pub scale: f64,
}

/// Constants the pyramid is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidParams {
    /// Reference circumference in metres.
    pub circumference: f64,
    /// Tile edge in pixels.
    pub tile_size: u32,
    /// Display DPI used for the scale denominator.
    pub dpi: f64,
    pub inches_per_meter: f64,
}

impl PyramidParams {
    /// Resolution at zoom 0.
    pub fn base_resolution(&self) -> f64 {
        self.circumference / f64::from(self.tile_size)
    }
}

/// Builds one LOD per zoom in `[min_zoom, max_zoom]`, ascending.
pub fn build_pyramid(min_zoom: u8, max_zoom: u8, params: &PyramidParams) -> Vec<Lod> {
    let base = params.base_resolution();
    (min_zoom..=max_zoom)
        .map(|level| {
            let resolution = base / 2f64.powi(i32::from(level));
            Lod {
                level,
                resolution,
                scale: resolution * params.dpi * params.inches_per_meter,
            }
        })
        .collect()
}

/// The LOD sequence shared by the view constraint and every overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePyramid {
    lods: Vec<Lod>,
    params: PyramidParams,
}

impl TilePyramid {
    pub fn new(min_zoom: u8, max_zoom: u8, params: PyramidParams) -> Self {
        Self {
            lods: build_pyramid(min_zoom, max_zoom, &params),
            params,
        }
    }

    pub fn lods(&self) -> &[Lod] {
        &self.lods
    }

    pub fn params(&self) -> &PyramidParams {
        &self.params
    }

    pub fn min_level(&self) -> Option<u8> {
        self.lods.first().map(|lod| lod.level)
    }

    pub fn max_level(&self) -> Option<u8> {
        self.lods.last().map(|lod| lod.level)
    }

    /// Clamps a fractional view zoom to the nearest level the pyramid has.
    pub fn clamp_level(&self, zoom: f64) -> Option<u8> {
        let min = self.min_level()?;
        let max = self.max_level()?;
        Some(zoom.round().clamp(f64::from(min), f64::from(max)) as u8)
    }
}

/// Tiling scheme attached to each overlay layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TilingScheme {
    pub pyramid: Rc<TilePyramid>,
    pub origin: Coord<f64>,
    pub size: [u32; 2],
    pub dpi: u32,
    pub format: &'static str,
    pub wkid: u32,
}

impl TilingScheme {
    pub fn new(pyramid: Rc<TilePyramid>) -> Self {
        let tile_size = pyramid.params().tile_size;
        Self {
            pyramid,
            origin: WEB_MERCATOR_ORIGIN,
            size: [tile_size, tile_size],
            dpi: TILE_INFO_DPI,
            format: TILE_FORMAT,
            wkid: WEB_MERCATOR_WKID,
        }
    }
}

/// Zoom constraint installed on the host view.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomConstraint {
    pub pyramid: Rc<TilePyramid>,
    pub max_zoom: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PyramidParams {
        PyramidParams {
            circumference: 40075016.685568,
            tile_size: 256,
            dpi: 96.0,
            inches_per_meter: 39.37,
        }
    }

    #[test]
    fn test_levels_ascending_with_decreasing_resolution() {
        let lods = build_pyramid(3, 24, &params());
        assert_eq!(lods.len(), 22);
        assert_eq!(lods.first().unwrap().level, 3);
        assert_eq!(lods.last().unwrap().level, 24);

        for pair in lods.windows(2) {
            assert_eq!(pair[1].level, pair[0].level + 1);
            assert!(pair[1].resolution < pair[0].resolution);
            assert!((pair[0].resolution / pair[1].resolution - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_zero_values() {
        let lods = build_pyramid(0, 0, &params());
        let lod = lods[0];
        assert!((lod.resolution - 156543.03392804097).abs() < 1e-6);
        assert!((lod.scale - lod.resolution * 96.0 * 39.37).abs() < 1e-6);
        assert!((lod.scale - 591657527.59).abs() < 1.0);
    }

    #[test]
    fn test_single_level_range() {
        let lods = build_pyramid(19, 19, &params());
        assert_eq!(lods.len(), 1);
        assert_eq!(lods[0].level, 19);
    }

    #[test]
    fn test_shared_instance() {
        let pyramid = Rc::new(TilePyramid::new(3, 24, params()));
        let tiling = TilingScheme::new(pyramid.clone());
        let constraint = ZoomConstraint {
            pyramid: pyramid.clone(),
            max_zoom: 24,
        };
        assert!(Rc::ptr_eq(&tiling.pyramid, &constraint.pyramid));
        assert_eq!(tiling.size, [256, 256]);
        assert_eq!(pyramid.clamp_level(30.4), Some(24));
        assert_eq!(pyramid.clamp_level(10.6), Some(11));
        assert_eq!(pyramid.clamp_level(0.0), Some(3));
    }
}
