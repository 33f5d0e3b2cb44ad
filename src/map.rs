//! Terrain grid.

use crate::location::MapLocation;

/// Terrain code of locations outside the grid.
pub const OFF_MAP_TERRAIN: &str = "_off^_usr";

/// A rectangular hex map of terrain codes, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMap {
    width: i32,
    height: i32,
    tiles: Vec<String>,
}

impl GameMap {
    /// A map filled with a single terrain.
    pub fn filled(width: i32, height: i32, terrain: &str) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![terrain.to_string(); (width * height) as usize],
        }
    }

    /// Build from rows of terrain codes. Short rows are padded with the last
    /// code of the row (or [`OFF_MAP_TERRAIN`] for an empty row).
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        let mut map = GameMap::filled(width, height, OFF_MAP_TERRAIN);
        for (y, row) in rows.iter().enumerate() {
            for x in 0..width as usize {
                let code = row
                    .get(x)
                    .or_else(|| row.last())
                    .copied()
                    .unwrap_or(OFF_MAP_TERRAIN);
                map.set_terrain(MapLocation::new(x as i32, y as i32), code);
            }
        }
        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn on_board(&self, loc: MapLocation) -> bool {
        loc.x >= 0 && loc.x < self.width && loc.y >= 0 && loc.y < self.height
    }

    fn index(&self, loc: MapLocation) -> Option<usize> {
        self.on_board(loc)
            .then(|| (loc.y * self.width + loc.x) as usize)
    }

    /// Terrain code at `loc`, or [`OFF_MAP_TERRAIN`] outside the grid.
    pub fn terrain(&self, loc: MapLocation) -> &str {
        self.index(loc)
            .map(|idx| self.tiles[idx].as_str())
            .unwrap_or(OFF_MAP_TERRAIN)
    }

    /// Returns false when `loc` is off the board.
    pub fn set_terrain(&mut self, loc: MapLocation, terrain: &str) -> bool {
        match self.index(loc) {
            Some(idx) => {
                self.tiles[idx] = terrain.to_string();
                true
            }
            None => false,
        }
    }

    /// Every on-board location, row by row.
    pub fn locations(&self) -> impl Iterator<Item = MapLocation> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| MapLocation::new(x, y)))
    }
}

/// Match a terrain code against a pattern where `*` matches any run of
/// characters, e.g. `G*` or `*^Fp`.
pub fn terrain_matches(pattern: &str, code: &str) -> bool {
    let pattern = pattern.trim();
    if !pattern.contains('*') {
        return pattern == code;
    }
    let pieces: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = pieces.split_first().map_or(("", &[][..]), |(f, r)| (*f, r));
    let Some(mut remaining) = code.strip_prefix(first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };
    for piece in middle {
        match remaining.find(piece) {
            Some(idx) => remaining = &remaining[idx + piece.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_patterns() {
        assert!(terrain_matches("Gg", "Gg"));
        assert!(!terrain_matches("Gg", "Gs"));
        assert!(terrain_matches("G*", "Gs^Fp"));
        assert!(terrain_matches("*^Fp", "Gs^Fp"));
        assert!(terrain_matches("*", "Ww"));
        assert!(terrain_matches("G*^F*", "Gg^Fds"));
        assert!(!terrain_matches("G*^F*", "Gg"));
        assert!(!terrain_matches("W*", "Gg"));
    }

    #[test]
    fn test_on_board_and_terrain() {
        let mut map = GameMap::filled(4, 3, "Gg");
        assert!(map.on_board(MapLocation::new(3, 2)));
        assert!(!map.on_board(MapLocation::new(4, 2)));
        assert!(!map.on_board(MapLocation::null_location()));
        assert!(map.set_terrain(MapLocation::new(1, 1), "Ww"));
        assert!(!map.set_terrain(MapLocation::new(9, 9), "Ww"));
        assert_eq!(map.terrain(MapLocation::new(1, 1)), "Ww");
        assert_eq!(map.terrain(MapLocation::new(0, 0)), "Gg");
        assert_eq!(map.terrain(MapLocation::new(-1, 0)), OFF_MAP_TERRAIN);
        assert_eq!(map.locations().count(), 12);
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let map = GameMap::from_rows(&[&["Gg", "Ff", "Hh"], &["Ww"]]);
        assert_eq!(map.width(), 3);
        assert_eq!(map.terrain(MapLocation::new(2, 0)), "Hh");
        assert_eq!(map.terrain(MapLocation::new(2, 1)), "Ww");
    }
}
