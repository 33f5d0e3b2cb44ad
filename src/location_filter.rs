//! Location filters (`[filter_location]`).

use tracing::debug;

use crate::conditional::{Conditional, fold_children};
use crate::config::Config;
use crate::context::FilterContext;
use crate::error::FilterError;
use crate::lazy_list::LazyStringList;
use crate::location::MapLocation;
use crate::map::terrain_matches;
use crate::unit_filter::UnitFilter;

/// Alignment of a time of day, judged by the sign of its lawful bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Illumination {
    Lawful,
    Chaotic,
    Neutral,
}

impl Illumination {
    pub fn parse(token: &str) -> Option<Illumination> {
        match token.trim() {
            "lawful" => Some(Illumination::Lawful),
            "chaotic" => Some(Illumination::Chaotic),
            "neutral" => Some(Illumination::Neutral),
            _ => None,
        }
    }

    pub fn of_bonus(lawful_bonus: i32) -> Illumination {
        match lawful_bonus.signum() {
            1 => Illumination::Lawful,
            -1 => Illumination::Chaotic,
            _ => Illumination::Neutral,
        }
    }
}

/// A compiled location filter.
pub struct LocationFilter<'ctx> {
    ctx: &'ctx dyn FilterContext,
    /// Ignore local illumination when reading the time of day.
    flat_tod: bool,
    /// One-based coordinate range lists; empty means any.
    x: String,
    y: String,
    terrain: LazyStringList,
    /// Accepted alignments; empty accepts any.
    time_of_day: Vec<Illumination>,
    time_of_day_id: LazyStringList,
    /// `[filter]` child the unit on the hex must match.
    occupant: Option<UnitFilter<'ctx>>,
    cond_children: Vec<(Conditional, LocationFilter<'ctx>)>,
}

impl<'ctx> LocationFilter<'ctx> {
    pub fn new(
        cfg: &Config,
        ctx: &'ctx dyn FilterContext,
        flat_tod: bool,
    ) -> Result<Self, FilterError> {
        let time_of_day = cfg.get("time_of_day");
        let mut filter = Self {
            ctx,
            flat_tod,
            x: cfg.get("x").str(),
            y: cfg.get("y").str(),
            terrain: LazyStringList::new(cfg.get("terrain")),
            time_of_day: LazyStringList::new(time_of_day)
                .values()
                .iter()
                .filter_map(|token| {
                    let parsed = Illumination::parse(token);
                    if parsed.is_none() {
                        debug!(token = %token, "unknown time_of_day alignment");
                    }
                    parsed
                })
                .collect(),
            time_of_day_id: LazyStringList::new(cfg.get("time_of_day_id")),
            occupant: None,
            cond_children: Vec::new(),
        };

        for (tag, child) in cfg.all_children() {
            if let Some(cond) = Conditional::from_tag(tag) {
                filter
                    .cond_children
                    .push((cond, LocationFilter::new(child, ctx, flat_tod)?));
                continue;
            }
            match tag {
                "filter" => {
                    if filter.occupant.is_some() {
                        return Err(FilterError::DuplicateOccupantFilter);
                    }
                    filter.occupant = Some(UnitFilter::build(child, Some(ctx), flat_tod)?);
                }
                _ => debug!(tag, "ignoring unrecognised child of a location filter"),
            }
        }
        Ok(filter)
    }

    /// Whether `loc` passes the filter. Locations off the map never match.
    pub fn matches(&self, loc: MapLocation) -> bool {
        if !self.ctx.map().on_board(loc) {
            return false;
        }
        let base = self.internal_matches(loc);
        fold_children(base, &self.cond_children, |child| child.matches(loc))
    }

    fn internal_matches(&self, loc: MapLocation) -> bool {
        if !loc.matches_range(&self.x, &self.y) {
            return false;
        }

        if !self.terrain.is_empty() {
            let code = self.ctx.map().terrain(loc);
            if !self
                .terrain
                .values()
                .iter()
                .any(|pattern| terrain_matches(pattern, code))
            {
                return false;
            }
        }

        if !self.time_of_day.is_empty() || !self.time_of_day_id.is_empty() {
            let tod = self.ctx.time_of_day_at(loc, self.flat_tod);
            if !self.time_of_day.is_empty()
                && !self
                    .time_of_day
                    .contains(&Illumination::of_bonus(tod.lawful_bonus))
            {
                return false;
            }
            if !self.time_of_day_id.is_empty() && !self.time_of_day_id.contains(&tod.id) {
                return false;
            }
        }

        if let Some(occupant) = &self.occupant {
            match self.ctx.units().find(loc) {
                Some(unit) if occupant.matches(unit) => {}
                _ => return false,
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GameBoard;
    use crate::context::TimeOfDay;
    use crate::map::GameMap;
    use crate::unit::Unit;

    fn board() -> GameBoard {
        let map = GameMap::from_rows(&[&["Gg", "Gs^Fp", "Ww"], &["Hh", "Gg", "Ce"]]);
        GameBoard::new(map)
            .with_time_of_day(TimeOfDay::first_watch())
            .with_illumination(MapLocation::new(2, 1), 25)
            .with_unit(Unit::new("Delfador", "Elder Wizard").at(2, 2))
    }

    fn check(cfg: Config, board: &GameBoard, loc: MapLocation) -> bool {
        LocationFilter::new(&cfg, board, false)
            .expect("valid")
            .matches(loc)
    }

    #[test]
    fn test_off_map_never_matches() {
        let board = board();
        assert!(!check(Config::new(), &board, MapLocation::new(9, 9)));
        assert!(!check(Config::new(), &board, MapLocation::null_location()));
        assert!(check(Config::new(), &board, MapLocation::new(0, 0)));
    }

    #[test]
    fn test_coordinates_are_one_based() {
        let board = board();
        let cfg = Config::new().with("x", "2-3").with("y", 1);
        assert!(check(cfg.clone(), &board, MapLocation::new(1, 0)));
        assert!(!check(cfg, &board, MapLocation::new(0, 0)));
    }

    #[test]
    fn test_terrain_patterns() {
        let board = board();
        let forest = Config::new().with("terrain", "*^Fp, Hh");
        assert!(check(forest.clone(), &board, MapLocation::new(1, 0)));
        assert!(check(forest.clone(), &board, MapLocation::new(0, 1)));
        assert!(!check(forest, &board, MapLocation::new(0, 0)));
    }

    #[test]
    fn test_time_of_day_uses_illumination_unless_flat() {
        let board = board();
        let lit = MapLocation::new(2, 1);
        let neutral = Config::new().with("time_of_day", "neutral");
        assert!(check(neutral.clone(), &board, lit));
        assert!(!check(neutral.clone(), &board, MapLocation::new(0, 0)));
        let flat = LocationFilter::new(&neutral, &board, true).expect("valid");
        assert!(!flat.matches(lit));

        let chaotic_watch = Config::new()
            .with("time_of_day", "chaotic")
            .with("time_of_day_id", "first_watch");
        assert!(check(chaotic_watch, &board, MapLocation::new(0, 0)));
    }

    #[test]
    fn test_occupant_filter() {
        let board = board();
        let cfg = Config::new().with_child("filter", Config::new().with("type", "Elder Wizard"));
        assert!(check(cfg.clone(), &board, MapLocation::new(1, 1)));
        assert!(!check(cfg, &board, MapLocation::new(0, 0)));

        let duplicate = Config::new()
            .with_child("filter", Config::new())
            .with_child("filter", Config::new());
        assert!(matches!(
            LocationFilter::new(&duplicate, &board, false),
            Err(FilterError::DuplicateOccupantFilter)
        ));
    }

    #[test]
    fn test_conditionals() {
        let board = board();
        let cfg = Config::new()
            .with("terrain", "Gg")
            .with_child("not", Config::new().with("x", 2));
        assert!(check(cfg.clone(), &board, MapLocation::new(0, 0)));
        assert!(!check(cfg, &board, MapLocation::new(1, 1)));
    }
}
