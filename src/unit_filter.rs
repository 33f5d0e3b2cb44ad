//! Unit filters.
//!
//! A [`UnitFilter`] is compiled once from a query [`Config`] and then asked
//! whether particular units match. Construction picks one of two
//! implementations:
//!
//! - an empty query builds a null filter that matches every unit;
//! - anything else builds a basic filter that parses every recognised
//!   attribute and child up front and evaluates them lazily per unit.
//!
//! Filters are evaluated against a borrowed [`FilterContext`], which must
//! outlive them.
//!
//! # Example
//!
//! ```ignore
//! let query = Config::new()
//!     .with("side", "2,3")
//!     .with("type", "Elvish Archer,Elvish Scout");
//! let filter = UnitFilter::new(&query, &board)?;
//! let archers = filter.all_matches_on_map();
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::conditional::{Conditional, fold_children};
use crate::config::{AttributeValue, Config};
use crate::context::{FilterContext, THIS_UNIT};
use crate::error::FilterError;
use crate::lazy_list::LazyStringList;
use crate::location::{Direction, MapLocation};
use crate::location_filter::LocationFilter;
use crate::range::RangeSet;
use crate::side_filter::SideFilter;
use crate::team::team_for_side;
use crate::unit::{Gender, Unit};

/// Stack headroom kept free before growing during recursive evaluation.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each additional stack segment.
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Adjacency count accepted when `count=` is absent.
const DEFAULT_ADJACENT_COUNT: &str = "1-6";

/// A compiled unit filter.
///
/// Cloning is cheap: clones share the compiled filter.
#[derive(Clone)]
pub struct UnitFilter<'ctx> {
    inner: Rc<FilterImpl<'ctx>>,
}

enum FilterImpl<'ctx> {
    Null(NullUnitFilter<'ctx>),
    Basic(Box<BasicUnitFilter<'ctx>>),
}

impl<'ctx> UnitFilter<'ctx> {
    /// Compile `cfg` against `ctx`.
    ///
    /// `flat_tod` makes location tests inside this filter ignore local
    /// illumination when judging time of day.
    pub fn build(
        cfg: &Config,
        ctx: Option<&'ctx dyn FilterContext>,
        flat_tod: bool,
    ) -> Result<Self, FilterError> {
        let ctx = ctx.ok_or(FilterError::MissingContext)?;
        let inner = if cfg.is_null() {
            FilterImpl::Null(NullUnitFilter { ctx })
        } else {
            let basic = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                BasicUnitFilter::new(cfg, ctx, flat_tod)
            })?;
            FilterImpl::Basic(Box::new(basic))
        };
        Ok(Self {
            inner: Rc::new(inner),
        })
    }

    /// Compile `cfg` against `ctx` with normal time-of-day handling.
    pub fn new(cfg: &Config, ctx: &'ctx dyn FilterContext) -> Result<Self, FilterError> {
        Self::build(cfg, Some(ctx), false)
    }

    /// True when this filter was built from an empty query.
    pub fn is_null(&self) -> bool {
        matches!(*self.inner, FilterImpl::Null(_))
    }

    /// Check `unit` at its current location.
    pub fn matches(&self, unit: &Unit) -> bool {
        self.matches_at(unit, unit.location)
    }

    /// Check `unit` as if it stood at `loc`.
    ///
    /// An invalid `loc` (recall list, reserves) is evaluated without binding
    /// the unit into the context's scope.
    pub fn matches_at(&self, unit: &Unit, loc: MapLocation) -> bool {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || match &*self.inner {
            FilterImpl::Null(_) => true,
            FilterImpl::Basic(filter) => filter.matches(unit, loc),
        })
    }

    fn ctx(&self) -> &'ctx dyn FilterContext {
        match &*self.inner {
            FilterImpl::Null(filter) => filter.ctx,
            FilterImpl::Basic(filter) => filter.ctx,
        }
    }

    /// Every unit on the map that matches, in the context's unit order.
    pub fn all_matches_on_map(&self) -> Vec<&'ctx Unit> {
        let units = self.ctx().units();
        match &*self.inner {
            FilterImpl::Null(_) => units.iter().map(Rc::as_ref).collect(),
            FilterImpl::Basic(filter) => units
                .iter()
                .map(Rc::as_ref)
                .filter(|unit| filter.matches(unit, unit.location))
                .collect(),
        }
    }

    /// The first unit on the map that matches.
    pub fn first_match_on_map(&self) -> Option<Rc<Unit>> {
        let units = self.ctx().units();
        match &*self.inner {
            FilterImpl::Null(_) => units.iter().next().cloned(),
            FilterImpl::Basic(filter) => units
                .iter()
                .find(|unit| filter.matches(unit, unit.location))
                .cloned(),
        }
    }
}

impl fmt::Debug for UnitFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.inner {
            FilterImpl::Null(_) => "null",
            FilterImpl::Basic(_) => "basic",
        };
        f.debug_struct("UnitFilter").field("kind", &kind).finish()
    }
}

/// Matches everything.
struct NullUnitFilter<'ctx> {
    ctx: &'ctx dyn FilterContext,
}

/// `x=`/`y=` handling, decided at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CoordinateTest {
    /// `x=recall,y=recall`: the unit must be off the board.
    Recall,
    /// Both present but empty: nothing matches.
    Never,
    Range { x: String, y: String },
}

impl CoordinateTest {
    fn parse(x: &AttributeValue, y: &AttributeValue) -> Option<CoordinateTest> {
        if x.blank() && y.blank() {
            None
        } else if x.is("recall") && y.is("recall") {
            Some(CoordinateTest::Recall)
        } else if x.empty() && y.empty() {
            Some(CoordinateTest::Never)
        } else {
            Some(CoordinateTest::Range {
                x: x.str(),
                y: y.str(),
            })
        }
    }
}

/// A `[filter_wml]` child.
enum WmlFilter {
    /// Only a `[variables]` child: matched against the unit's variables
    /// without serializing the whole unit.
    Variables(Config),
    Snapshot(Config),
}

impl WmlFilter {
    fn new(cfg: &Config) -> Self {
        match cfg.child("variables") {
            Some(vars) if cfg.attribute_count() == 0 && cfg.child_count() == 1 => {
                WmlFilter::Variables(vars.clone())
            }
            _ => WmlFilter::Snapshot(cfg.clone()),
        }
    }
}

/// A `[filter_vision]` child.
struct VisionFilter {
    viewers: BTreeSet<i32>,
    visible: bool,
}

/// A `[filter_adjacent]` child.
struct AdjacentFilter<'ctx> {
    filter: UnitFilter<'ctx>,
    directions: Vec<Direction>,
    is_enemy: Option<bool>,
    counts: RangeSet,
}

struct BasicUnitFilter<'ctx> {
    ctx: &'ctx dyn FilterContext,

    cond_children: Vec<(Conditional, UnitFilter<'ctx>)>,

    name: Option<String>,
    id: LazyStringList,
    /// Single-id alias used by dialogue events.
    speaker: Option<String>,
    filter_location: Option<LocationFilter<'ctx>>,
    filter_side: Option<SideFilter<'ctx>>,
    /// `x`/`y`, or the recall-list marker.
    coordinates: Option<CoordinateTest>,
    type_ids: LazyStringList,
    variation: LazyStringList,
    has_variation: LazyStringList,
    ability: LazyStringList,
    race: LazyStringList,
    gender: Option<Gender>,
    side: LazyStringList,
    /// `side` read as one integer, checked before splitting the list.
    side_number: i64,
    has_weapon: Option<String>,
    role: Option<String>,
    /// From `ai_special`; only `guardian` is recognised.
    guardian: Option<bool>,
    can_recruit: Option<bool>,
    recall_cost: Option<i64>,
    level: Option<i64>,
    defense: Option<i64>,
    movement_cost: Option<i64>,

    /// `[filter_wml]` patterns, checked against one snapshot per unit.
    wml_filters: Vec<WmlFilter>,
    vision_filters: Vec<VisionFilter>,
    adjacent_filters: Vec<AdjacentFilter<'ctx>>,

    /// Variable path whose containers list the matching unit ids.
    find_in: Option<String>,
    formula: Option<String>,
    lua_function: Option<String>,
}

fn scalar(value: &AttributeValue) -> Option<String> {
    (!value.blank()).then(|| value.str())
}

fn int_or_unset(value: &AttributeValue) -> Option<i64> {
    (!value.blank()).then(|| value.to_int(-1))
}

impl<'ctx> BasicUnitFilter<'ctx> {
    fn new(
        cfg: &Config,
        ctx: &'ctx dyn FilterContext,
        flat_tod: bool,
    ) -> Result<Self, FilterError> {
        let ai_special = cfg.get("ai_special");
        let canrecruit = cfg.get("canrecruit");
        let gender = cfg.get("gender");

        let mut filter = Self {
            ctx,
            cond_children: Vec::new(),
            name: scalar(cfg.get("name")),
            id: LazyStringList::new(cfg.get("id")),
            speaker: scalar(cfg.get("speaker")),
            filter_location: None,
            filter_side: None,
            coordinates: CoordinateTest::parse(cfg.get("x"), cfg.get("y")),
            type_ids: LazyStringList::new(cfg.get("type")),
            variation: LazyStringList::new(cfg.get("variation")),
            has_variation: LazyStringList::new(cfg.get("has_variation")),
            ability: LazyStringList::new(cfg.get("ability")),
            race: LazyStringList::new(cfg.get("race")),
            gender: (!gender.blank()).then(|| Gender::from_token(&gender.str())),
            side: LazyStringList::new(cfg.get("side")),
            side_number: cfg.get("side").to_int(-999),
            has_weapon: scalar(cfg.get("has_weapon")),
            role: scalar(cfg.get("role")),
            guardian: (!ai_special.blank()).then(|| ai_special.str() == "guardian"),
            can_recruit: (!canrecruit.blank()).then(|| canrecruit.to_bool(false)),
            recall_cost: int_or_unset(cfg.get("recall_cost")),
            level: int_or_unset(cfg.get("level")),
            defense: int_or_unset(cfg.get("defense")),
            movement_cost: int_or_unset(cfg.get("movement_cost")),
            wml_filters: Vec::new(),
            vision_filters: Vec::new(),
            adjacent_filters: Vec::new(),
            find_in: scalar(cfg.get("find_in")),
            formula: scalar(cfg.get("formula")),
            lua_function: scalar(cfg.get("lua_function")),
        };

        // Conditionals are folded in document order, interleaved with the
        // other children.
        for (tag, child) in cfg.all_children() {
            if let Some(cond) = Conditional::from_tag(tag) {
                let nested = UnitFilter::build(child, Some(ctx), flat_tod)?;
                filter.cond_children.push((cond, nested));
                continue;
            }
            match tag {
                "filter_vision" => {
                    let viewers = SideFilter::new(child, ctx, flat_tod)?.get_teams();
                    filter.vision_filters.push(VisionFilter {
                        viewers: viewers.into_iter().collect(),
                        visible: child.get("visible").to_bool(true),
                    });
                }
                "filter_adjacent" => {
                    let adjacent = child.get("adjacent");
                    let is_enemy = child.get("is_enemy");
                    let count = child.get("count");
                    filter.adjacent_filters.push(AdjacentFilter {
                        filter: UnitFilter::build(child, Some(ctx), flat_tod)?,
                        directions: if adjacent.blank() {
                            Direction::ALL.to_vec()
                        } else {
                            Direction::parse_list(&adjacent.str())
                        },
                        is_enemy: (!is_enemy.blank()).then(|| is_enemy.to_bool(false)),
                        counts: if count.blank() {
                            RangeSet::parse(DEFAULT_ADJACENT_COUNT)
                        } else {
                            RangeSet::parse(&count.str())
                        },
                    });
                }
                "filter_location" => {
                    if filter.filter_location.is_some() {
                        return Err(FilterError::DuplicateLocationFilter);
                    }
                    filter.filter_location = Some(LocationFilter::new(child, ctx, flat_tod)?);
                }
                "filter_side" => {
                    if filter.filter_side.is_some() {
                        return Err(FilterError::DuplicateSideFilter);
                    }
                    filter.filter_side = Some(SideFilter::new(child, ctx, flat_tod)?);
                }
                "filter_wml" => filter.wml_filters.push(WmlFilter::new(child)),
                _ => debug!(tag, "ignoring unrecognised child of a unit filter"),
            }
        }

        if let Some(function) = &filter.lua_function
            && ctx.script_hook().is_none()
        {
            warn!(
                function = %function,
                "no scripting hook available; lua_function will not be enforced"
            );
        }
        if let Some(formula) = &filter.formula
            && ctx.formula_evaluator().is_none()
        {
            warn!(formula = %formula, "no formula evaluator available; formula never matches");
        }

        Ok(filter)
    }

    fn matches(&self, u: &Unit, loc: MapLocation) -> bool {
        let matches = {
            // Off-map units are never bound into the scope.
            let _scoped = loc
                .valid()
                .then(|| self.ctx.unit_scope().bind(THIS_UNIT, u, loc));
            self.internal_matches(u, loc)
        };

        fold_children(matches, &self.cond_children, |child| {
            child.matches_at(u, loc)
        })
    }

    fn internal_matches(&self, u: &Unit, loc: MapLocation) -> bool {
        let ctx = self.ctx;

        if let Some(name) = &self.name
            && *name != u.name
        {
            return false;
        }

        if !self.id.is_empty() && !self.id.contains(&u.id) {
            return false;
        }

        // `speaker` is an alias for a single id.
        if let Some(speaker) = &self.speaker
            && *speaker != u.id
        {
            return false;
        }

        if let Some(location_filter) = &self.filter_location
            && !location_filter.matches(loc)
        {
            return false;
        }

        if let Some(side_filter) = &self.filter_side
            && !side_filter.matches(u.side)
        {
            return false;
        }

        match &self.coordinates {
            None => {}
            Some(CoordinateTest::Recall) => {
                if ctx.map().on_board(loc) {
                    return false;
                }
            }
            Some(CoordinateTest::Never) => return false,
            Some(CoordinateTest::Range { x, y }) => {
                if !loc.matches_range(x, y) {
                    return false;
                }
            }
        }

        if !self.type_ids.is_empty() && !self.type_ids.contains(&u.type_id) {
            return false;
        }

        if !self.variation.is_empty() && !self.variation.contains(&u.variation) {
            return false;
        }

        if !self.has_variation.is_empty() {
            let Some(host) = ctx.unit_types().variation_host(&u.type_id, &u.variation) else {
                return false;
            };
            if !self
                .has_variation
                .values()
                .iter()
                .any(|variation| host.has_variation(variation))
            {
                return false;
            }
        }

        if !self.ability.is_empty()
            && !self
                .ability
                .values()
                .iter()
                .any(|ability| u.has_ability_by_id(ability))
        {
            return false;
        }

        if !self.race.is_empty() && !self.race.contains(&u.race) {
            return false;
        }

        if let Some(gender) = self.gender
            && gender != u.gender
        {
            return false;
        }

        if !self.side.is_empty()
            && self.side_number != i64::from(u.side)
            && !self.side.contains(&u.side.to_string())
        {
            return false;
        }

        if let Some(weapon) = &self.has_weapon
            && !u.has_weapon(weapon)
        {
            return false;
        }

        if let Some(role) = &self.role
            && *role != u.role
        {
            return false;
        }

        if let Some(guardian) = self.guardian
            && guardian != u.guardian
        {
            return false;
        }

        if let Some(can_recruit) = self.can_recruit
            && can_recruit != u.can_recruit
        {
            return false;
        }

        if let Some(recall_cost) = self.recall_cost
            && recall_cost != u.recall_cost
        {
            return false;
        }

        if let Some(level) = self.level
            && level != u.level
        {
            return false;
        }

        if let Some(defense) = self.defense
            && defense != i64::from(u.defense_modifier(ctx.map().terrain(loc)))
        {
            return false;
        }

        if let Some(movement_cost) = self.movement_cost
            && movement_cost != i64::from(u.movement_cost(ctx.map().terrain(loc)))
        {
            return false;
        }

        if !self.wml_filters.is_empty() {
            let mut snapshot: Option<Config> = None;
            for wml in &self.wml_filters {
                let matched = match wml {
                    WmlFilter::Variables(pattern) => u.variables.matches(pattern),
                    WmlFilter::Snapshot(pattern) => {
                        snapshot.get_or_insert_with(|| u.write()).matches(pattern)
                    }
                };
                if !matched {
                    return false;
                }
            }
        }

        for vision in &self.vision_filters {
            let seen_as_expected = vision.viewers.iter().any(|&viewer| {
                team_for_side(ctx.teams(), viewer).is_some_and(|team| {
                    let hidden = team.fogged(loc) || u.invisible(loc, ctx.map());
                    vision.visible != hidden
                })
            });
            if !seen_as_expected {
                return false;
            }
        }

        if !self.adjacent_filters.is_empty() {
            let own_team = team_for_side(ctx.teams(), u.side);
            for adjacent in &self.adjacent_filters {
                let mut match_count = 0;
                for &dir in &adjacent.directions {
                    let Some(neighbor) = ctx.units().find(loc.neighbor(dir)) else {
                        continue;
                    };
                    if !adjacent.filter.matches(neighbor) {
                        continue;
                    }
                    let hostility_ok = adjacent.is_enemy.is_none_or(|want_enemy| {
                        own_team.is_some_and(|team| team.is_enemy(neighbor.side)) == want_enemy
                    });
                    if hostility_ok {
                        match_count += 1;
                    }
                }
                if !adjacent.counts.contains(match_count) {
                    return false;
                }
            }
        }

        if let Some(path) = &self.find_in
            && let Some(data) = ctx.game_data()
        {
            match data.get_variable_array(path) {
                Ok(items) => {
                    if !items.iter().any(|item| item.get("id").is(&u.id)) {
                        return false;
                    }
                }
                Err(err) => {
                    debug!(%err, "find_in lookup failed");
                    return false;
                }
            }
        }

        if let Some(formula) = &self.formula {
            match ctx.formula_evaluator() {
                Some(evaluator) => {
                    if !evaluator.matches_filter(formula, loc, u, ctx) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if let Some(function) = &self.lua_function
            && let Some(hook) = ctx.script_hook()
            && !hook.run_filter(function, u)
        {
            return false;
        }

        true
    }
}
