//! Side filters (`[filter_side]`, `[filter_vision]` viewers).

use tracing::debug;

use crate::conditional::{Conditional, fold_children};
use crate::config::Config;
use crate::context::FilterContext;
use crate::error::FilterError;
use crate::lazy_list::LazyStringList;
use crate::range::RangeSet;
use crate::team::{Controller, Team, team_for_side};
use crate::unit_filter::UnitFilter;

/// A compiled side filter. An empty query matches every side.
pub struct SideFilter<'ctx> {
    ctx: &'ctx dyn FilterContext,
    side: Option<RangeSet>,
    team_name: LazyStringList,
    controller: Option<Controller>,
    enemy_of: Option<Box<SideFilter<'ctx>>>,
    allied_with: Option<Box<SideFilter<'ctx>>>,
    has_unit: Option<UnitFilter<'ctx>>,
    cond_children: Vec<(Conditional, SideFilter<'ctx>)>,
}

impl<'ctx> SideFilter<'ctx> {
    pub fn new(
        cfg: &Config,
        ctx: &'ctx dyn FilterContext,
        flat_tod: bool,
    ) -> Result<Self, FilterError> {
        let side = cfg.get("side");
        let controller = cfg.get("controller");
        let mut filter = Self {
            ctx,
            side: (!side.blank()).then(|| RangeSet::parse(&side.str())),
            team_name: LazyStringList::new(cfg.get("team_name")),
            controller: None,
            enemy_of: None,
            allied_with: None,
            has_unit: None,
            cond_children: Vec::new(),
        };
        if !controller.blank() {
            filter.controller = Controller::parse(&controller.str());
            if filter.controller.is_none() {
                debug!(controller = %controller, "unknown controller in side filter");
            }
        }

        for (tag, child) in cfg.all_children() {
            if let Some(cond) = Conditional::from_tag(tag) {
                filter
                    .cond_children
                    .push((cond, SideFilter::new(child, ctx, flat_tod)?));
                continue;
            }
            match tag {
                "enemy_of" => {
                    filter.enemy_of = Some(Box::new(SideFilter::new(child, ctx, flat_tod)?));
                }
                "allied_with" => {
                    filter.allied_with = Some(Box::new(SideFilter::new(child, ctx, flat_tod)?));
                }
                "has_unit" => {
                    filter.has_unit = Some(UnitFilter::build(child, Some(ctx), flat_tod)?);
                }
                _ => debug!(tag, "ignoring unrecognised child of a side filter"),
            }
        }
        Ok(filter)
    }

    /// Whether `side` passes the filter. Sides with no team never match.
    pub fn matches(&self, side: i32) -> bool {
        let Some(team) = team_for_side(self.ctx.teams(), side) else {
            return false;
        };
        let base = self.internal_matches(team);
        fold_children(base, &self.cond_children, |child| child.matches(side))
    }

    /// Every side of the context that passes, ascending.
    pub fn get_teams(&self) -> Vec<i32> {
        let mut sides: Vec<i32> = self
            .ctx
            .teams()
            .iter()
            .map(Team::side)
            .filter(|&side| self.matches(side))
            .collect();
        sides.sort_unstable();
        sides
    }

    fn internal_matches(&self, team: &Team) -> bool {
        if let Some(range) = &self.side
            && !range.contains(team.side())
        {
            return false;
        }

        if !self.team_name.is_empty()
            && !team
                .team_names()
                .iter()
                .any(|name| self.team_name.contains(name))
        {
            return false;
        }

        if let Some(controller) = self.controller
            && controller != team.controller()
        {
            return false;
        }

        // Enemy of, or allied with, every side the nested filter selects.
        if let Some(enemy_of) = &self.enemy_of {
            let others = enemy_of.get_teams();
            if others.is_empty() || !others.iter().all(|&other| team.is_enemy(other)) {
                return false;
            }
        }

        if let Some(allied_with) = &self.allied_with {
            let others = allied_with.get_teams();
            if others.is_empty() || others.iter().any(|&other| team.is_enemy(other)) {
                return false;
            }
        }

        if let Some(has_unit) = &self.has_unit
            && !self
                .ctx
                .units()
                .iter()
                .filter(|unit| unit.side == team.side())
                .any(|unit| has_unit.matches(unit))
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GameBoard;
    use crate::map::GameMap;
    use crate::unit::Unit;

    fn board() -> GameBoard {
        GameBoard::new(GameMap::filled(5, 5, "Gg"))
            .with_teams(vec![
                Team::new(1).with_team_name("good"),
                Team::new(2).with_team_name("good").with_controller(Controller::Ai),
                Team::new(3).with_team_name("evil").with_controller(Controller::Ai),
                Team::new(4).with_controller(Controller::Null),
            ])
            .with_unit(Unit::new("Konrad", "Commander").with_side(1).at(1, 1))
            .with_unit(Unit::new("Grunt", "Grunt").with_side(3).at(2, 2))
    }

    fn teams(cfg: Config, board: &GameBoard) -> Vec<i32> {
        SideFilter::new(&cfg, board, false).expect("valid").get_teams()
    }

    #[test]
    fn test_empty_filter_selects_every_side() {
        let board = board();
        assert_eq!(teams(Config::new(), &board), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_side_ranges_and_unknown_sides() {
        let board = board();
        assert_eq!(teams(Config::new().with("side", "2-3"), &board), vec![2, 3]);
        let filter = SideFilter::new(&Config::new(), &board, false).expect("valid");
        assert!(!filter.matches(9));
    }

    #[test]
    fn test_team_name_and_controller() {
        let board = board();
        assert_eq!(teams(Config::new().with("team_name", "good"), &board), vec![1, 2]);
        assert_eq!(
            teams(Config::new().with("team_name", "good").with("controller", "ai"), &board),
            vec![2]
        );
    }

    #[test]
    fn test_enemy_of_and_allied_with() {
        let board = board();
        let enemies = Config::new().with_child("enemy_of", Config::new().with("side", 1));
        assert_eq!(teams(enemies, &board), vec![3, 4]);
        let allies = Config::new().with_child("allied_with", Config::new().with("side", 1));
        assert_eq!(teams(allies, &board), vec![1, 2]);
        let nobody = Config::new().with_child("enemy_of", Config::new().with("side", 7));
        assert!(teams(nobody, &board).is_empty());
    }

    #[test]
    fn test_has_unit() {
        let board = board();
        let cfg = Config::new().with_child("has_unit", Config::new().with("type", "Grunt"));
        assert_eq!(teams(cfg, &board), vec![3]);
    }

    #[test]
    fn test_conditionals() {
        let board = board();
        let cfg = Config::new()
            .with("side", 1)
            .with_child("or", Config::new().with("side", 4));
        assert_eq!(teams(cfg, &board), vec![1, 4]);
        let cfg = Config::new()
            .with("team_name", "good")
            .with_child("not", Config::new().with("controller", "ai"));
        assert_eq!(teams(cfg, &board), vec![1]);
    }

    #[test]
    fn test_sides_need_not_start_at_one() {
        let board = GameBoard::new(GameMap::filled(3, 3, "Gg"))
            .with_teams(vec![Team::new(5).with_team_name("raiders"), Team::new(2)])
            .with_unit(Unit::new("Rider", "Wolf Rider").with_side(5).at(1, 1));
        assert_eq!(teams(Config::new(), &board), vec![2, 5]);
        assert_eq!(teams(Config::new().with("team_name", "raiders"), &board), vec![5]);
        let cfg = Config::new().with_child("has_unit", Config::new().with("type", "Wolf Rider"));
        assert_eq!(teams(cfg, &board), vec![5]);
        let filter = SideFilter::new(&Config::new(), &board, false).expect("valid");
        assert!(!filter.matches(1));
    }
}
