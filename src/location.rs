//! Hex map locations and compass directions.
//!
//! Locations are zero-based internally. Scenario text (`x=`, `y=` and range
//! expressions) is one-based, so `x=1` names column 0.

use std::fmt;

use crate::lazy_list::split_list;

/// One of the six hex directions, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Parse `n`, `ne`, `se`, `s`, `sw`, `nw`. A leading `-` yields the
    /// opposite direction.
    pub fn parse(token: &str) -> Option<Direction> {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix('-') {
            return Direction::parse(rest).map(Direction::opposite);
        }
        match token {
            "n" => Some(Direction::North),
            "ne" => Some(Direction::NorthEast),
            "se" => Some(Direction::SouthEast),
            "s" => Some(Direction::South),
            "sw" => Some(Direction::SouthWest),
            "nw" => Some(Direction::NorthWest),
            _ => None,
        }
    }

    /// Parse a comma-separated direction list, dropping unknown tokens.
    pub fn parse_list(text: &str) -> Vec<Direction> {
        split_list(text)
            .iter()
            .filter_map(|token| Direction::parse(token))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::NorthWest => "nw",
        }
    }
}

/// A hex coordinate. Odd columns are shifted half a hex down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct MapLocation {
    pub x: i32,
    pub y: i32,
}

impl MapLocation {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build from one-based scenario coordinates.
    pub const fn from_one_based(x: i32, y: i32) -> Self {
        Self { x: x - 1, y: y - 1 }
    }

    /// The location of units that are not on the map (recall list, reserves).
    pub const fn null_location() -> Self {
        Self { x: -1000, y: -1000 }
    }

    /// A location is valid when both coordinates are non-negative. Validity
    /// says nothing about whether the location is on a particular map.
    pub fn valid(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    pub fn neighbor(&self, dir: Direction) -> MapLocation {
        let odd = self.x & 1 == 1;
        let (x, y) = (self.x, self.y);
        match dir {
            Direction::North => MapLocation::new(x, y - 1),
            Direction::South => MapLocation::new(x, y + 1),
            Direction::NorthEast => MapLocation::new(x + 1, y - i32::from(!odd)),
            Direction::SouthEast => MapLocation::new(x + 1, y + i32::from(odd)),
            Direction::SouthWest => MapLocation::new(x - 1, y + i32::from(odd)),
            Direction::NorthWest => MapLocation::new(x - 1, y - i32::from(!odd)),
        }
    }

    /// The six neighbours in [`Direction::ALL`] order.
    pub fn adjacent(&self) -> [MapLocation; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Match against one-based coordinate range expressions.
    ///
    /// When either expression is a comma list, both are split and paired by
    /// index (the shorter is padded with empty entries) and any matching pair
    /// suffices. An empty entry accepts any coordinate.
    pub fn matches_range(&self, xloc: &str, yloc: &str) -> bool {
        if xloc.contains(',') || yloc.contains(',') {
            let mut xs = split_all(xloc);
            let mut ys = split_all(yloc);
            let size = xs.len().max(ys.len());
            xs.resize(size, "");
            ys.resize(size, "");
            return xs
                .iter()
                .zip(ys.iter())
                .any(|(x, y)| self.matches_range(x, y));
        }
        coordinate_in(self.x, xloc) && coordinate_in(self.y, yloc)
    }
}

/// Split on commas keeping empty pieces, so positions stay paired.
fn split_all(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).collect()
}

fn coordinate_in(value: i32, expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return true;
    }
    match expr.split_once('-') {
        Some((lo, hi)) => {
            let lo = lo.trim().parse::<i32>().unwrap_or(0) - 1;
            let hi = hi.trim().parse::<i32>().unwrap_or(0) - 1;
            lo <= value && value <= hi
        }
        None => expr.parse::<i32>().unwrap_or(0) - 1 == value,
    }
}

impl Default for MapLocation {
    fn default() -> Self {
        Self::null_location()
    }
}

impl fmt::Display for MapLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x + 1, self.y + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::parse("ne"), Some(Direction::NorthEast));
        assert_eq!(Direction::parse("-ne"), Some(Direction::SouthWest));
        assert_eq!(Direction::parse("up"), None);
        assert_eq!(
            Direction::parse_list("n, s,bogus,-n"),
            vec![Direction::North, Direction::South, Direction::South]
        );
    }

    #[test]
    fn test_neighbors_even_column() {
        let loc = MapLocation::new(2, 2);
        assert_eq!(loc.neighbor(Direction::North), MapLocation::new(2, 1));
        assert_eq!(loc.neighbor(Direction::NorthEast), MapLocation::new(3, 1));
        assert_eq!(loc.neighbor(Direction::SouthEast), MapLocation::new(3, 2));
        assert_eq!(loc.neighbor(Direction::South), MapLocation::new(2, 3));
        assert_eq!(loc.neighbor(Direction::SouthWest), MapLocation::new(1, 2));
        assert_eq!(loc.neighbor(Direction::NorthWest), MapLocation::new(1, 1));
    }

    #[test]
    fn test_neighbors_odd_column() {
        let loc = MapLocation::new(3, 2);
        assert_eq!(loc.neighbor(Direction::NorthEast), MapLocation::new(4, 2));
        assert_eq!(loc.neighbor(Direction::SouthEast), MapLocation::new(4, 3));
        assert_eq!(loc.neighbor(Direction::SouthWest), MapLocation::new(2, 3));
        assert_eq!(loc.neighbor(Direction::NorthWest), MapLocation::new(2, 2));
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        for x in 0..4 {
            for y in 1..4 {
                let loc = MapLocation::new(x, y);
                for dir in Direction::ALL {
                    assert_eq!(loc.neighbor(dir).neighbor(dir.opposite()), loc);
                }
            }
        }
    }

    #[test]
    fn test_matches_range() {
        let loc = MapLocation::from_one_based(3, 4);
        assert!(loc.matches_range("3", "4"));
        assert!(loc.matches_range("1-5", ""));
        assert!(!loc.matches_range("4-5", "4"));
        assert!(loc.matches_range("1,3", "1,4"));
        assert!(!loc.matches_range("1,3", "4,1"));
        assert!(loc.matches_range("1,3", "9"));
        assert!(!loc.matches_range("1,2", "4"));
    }

    #[test]
    fn test_null_location_is_invalid() {
        assert!(!MapLocation::null_location().valid());
        assert!(MapLocation::new(0, 0).valid());
        assert_eq!(MapLocation::new(0, 0).to_string(), "1,1");
    }
}
