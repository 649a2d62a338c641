//! Layer identity keys and URL builders.
//!
//! An overlay is identified by its role and capture date. The same key,
//! rendered as `"base-2020-03-01"` or `"compare-2020-03-01"`, is used as the
//! host map's layer id so layers can be found again by search.

use crate::config::Direction;
use crate::dates::CaptureDate;
use crate::geo::TileCoord;
use std::fmt;

/// Which selection an overlay renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The main overlay; leads the swipe reveal.
    Primary,
    /// The comparison overlay; trails the swipe reveal.
    Compare,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Primary, Role::Compare];

    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Primary => "base-",
            Role::Compare => "compare-",
        }
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, Role::Compare)
    }

    /// Stacking order among overlays; primary renders above compare.
    pub fn z_index(&self) -> usize {
        match self {
            Role::Primary => 1,
            Role::Compare => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Primary => "Primary",
            Role::Compare => "Compare",
        }
    }
}

/// Composite `(role, date)` overlay key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileId {
    pub role: Role,
    pub date: CaptureDate,
}

impl TileId {
    pub fn new(role: Role, date: CaptureDate) -> Self {
        Self { role, date }
    }

    /// Host layer id, e.g. "base-2020-03-01".
    pub fn to_layer_id(&self) -> String {
        format!("{}{}", self.role.prefix(), self.date)
    }

    /// Parses a host layer id back into a key. Ids whose suffix is not a
    /// capture date belong to the host, not to the overlay.
    pub fn from_layer_id(id: &str) -> Option<Self> {
        Role::ALL.iter().find_map(|role| {
            id.strip_prefix(role.prefix())
                .and_then(|date| CaptureDate::parse(date).ok())
                .map(|date| Self::new(*role, date))
        })
    }

    /// True when a host layer id is an overlay of `role`, whatever its date.
    pub fn layer_has_role(id: &str, role: Role) -> bool {
        Self::from_layer_id(id).is_some_and(|key| key.role == role)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.date)
    }
}

/// Layer id for a date and role.
pub fn generate_tile_id(date: &CaptureDate, is_compare: bool) -> String {
    let role = if is_compare {
        Role::Compare
    } else {
        Role::Primary
    };
    TileId::new(role, date.clone()).to_layer_id()
}

/// Tile URL template; `{level}`, `{col}` and `{row}` are substituted by the
/// host renderer, `until` caps imagery at the selected capture date.
pub fn build_tile_url(
    base_url: &str,
    direction: Direction,
    date: &CaptureDate,
    api_key: &str,
) -> String {
    format!(
        "{}/{}/{{level}}/{{col}}/{{row}}.img?apikey={}&until={}",
        base_url.trim_end_matches('/'),
        direction,
        api_key,
        date
    )
}

/// Fills a tile URL template for one tile.
pub fn expand_tile_url(template: &str, tile: TileCoord) -> String {
    template
        .replace("{level}", &tile.zoom.to_string())
        .replace("{col}", &tile.col.to_string())
        .replace("{row}", &tile.row.to_string())
}

/// Coverage query URL for the tile containing the view center.
pub fn build_coverage_url(base_url: &str, tile: TileCoord, api_key: &str, limit: u32) -> String {
    format!(
        "{}/{}/{}/{}?apikey={}&limit={}",
        base_url.trim_end_matches('/'),
        tile.zoom,
        tile.col,
        tile.row,
        api_key,
        limit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_id_format() {
        let date = CaptureDate::from("2020-03-01");
        assert_eq!(generate_tile_id(&date, false), "base-2020-03-01");
        assert_eq!(generate_tile_id(&date, true), "compare-2020-03-01");
        assert_eq!(generate_tile_id(&date, true), generate_tile_id(&date, true));
        assert_ne!(generate_tile_id(&date, true), generate_tile_id(&date, false));
    }

    #[test]
    fn test_tile_id_parse() {
        let key = TileId::from_layer_id("compare-2021-01-15").unwrap();
        assert_eq!(key.role, Role::Compare);
        assert_eq!(key.date.as_str(), "2021-01-15");
        assert_eq!(key.to_layer_id(), "compare-2021-01-15");

        assert!(TileId::from_layer_id("basemap-streets").is_none());
        assert!(TileId::from_layer_id("base-").is_none());
        assert!(TileId::from_layer_id("base-streets").is_none());
        assert!(TileId::layer_has_role("base-2020-01-01", Role::Primary));
        assert!(!TileId::layer_has_role("base-2020-01-01", Role::Compare));
        assert!(!TileId::layer_has_role("base-streets", Role::Primary));
        assert!(!TileId::layer_has_role("compare-2020", Role::Compare));
    }

    #[test]
    fn test_tile_url_template() {
        let url = build_tile_url(
            "https://api.nearmap.com/tiles/v3/",
            Direction::Vert,
            &CaptureDate::from("2020-03-01"),
            "KEY",
        );
        assert_eq!(
            url,
            "https://api.nearmap.com/tiles/v3/Vert/{level}/{col}/{row}.img?apikey=KEY&until=2020-03-01"
        );
    }

    #[test]
    fn test_expand_tile_url() {
        let template = build_tile_url(
            "https://api.nearmap.com/tiles/v3",
            Direction::North,
            &CaptureDate::from("2020-03-01"),
            "KEY",
        );
        let tile = TileCoord {
            zoom: 19,
            col: 119776,
            row: 215830,
        };
        assert_eq!(
            expand_tile_url(&template, tile),
            "https://api.nearmap.com/tiles/v3/North/19/119776/215830.img?apikey=KEY&until=2020-03-01"
        );
    }

    #[test]
    fn test_coverage_url() {
        let tile = TileCoord {
            zoom: 13,
            col: 1871,
            row: 3372,
        };
        assert_eq!(
            build_coverage_url("https://api.nearmap.com/coverage/v2/coord", tile, "KEY", 500),
            "https://api.nearmap.com/coverage/v2/coord/13/1871/3372?apikey=KEY&limit=500"
        );
    }
}
