//! The collaborator interface filters are evaluated against.
//!
//! A [`FilterContext`] gives read access to the units on the map, the terrain,
//! the sides, the unit type registry and (optionally) the variable store, the
//! formula evaluator and the scripting hook. It also owns the [`UnitScope`],
//! the stack of "unit under inspection" bindings that formula and scripting
//! collaborators read while a filter runs.

use std::cell::RefCell;

use crate::location::MapLocation;
use crate::map::GameMap;
use crate::team::Team;
use crate::unit::Unit;
use crate::unit_map::UnitMap;
use crate::unit_types::UnitTypes;
use crate::variables::GameData;

/// Alias under which the unit being filtered is exposed.
pub const THIS_UNIT: &str = "this_unit";

/// A time of day and its effect on lawful units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOfDay {
    pub id: String,
    pub lawful_bonus: i32,
}

impl TimeOfDay {
    pub fn new(id: impl Into<String>, lawful_bonus: i32) -> Self {
        Self {
            id: id.into(),
            lawful_bonus,
        }
    }

    pub fn dawn() -> Self {
        Self::new("dawn", 0)
    }

    pub fn morning() -> Self {
        Self::new("morning", 25)
    }

    pub fn first_watch() -> Self {
        Self::new("first_watch", -25)
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self::dawn()
    }
}

/// Evaluates `formula=` expressions.
pub trait FormulaEvaluator {
    fn matches_filter(
        &self,
        formula: &str,
        loc: MapLocation,
        unit: &Unit,
        ctx: &dyn FilterContext,
    ) -> bool;
}

/// Runs named `lua_function=` filter hooks.
pub trait ScriptHook {
    fn run_filter(&self, function: &str, unit: &Unit) -> bool;
}

/// Read access to everything a filter may consult.
pub trait FilterContext {
    fn units(&self) -> &UnitMap;

    fn map(&self) -> &GameMap;

    /// Every side of the scenario. Look teams up with [`team_for_side`](crate::team::team_for_side).
    fn teams(&self) -> &[Team];

    fn unit_types(&self) -> &UnitTypes;

    /// Time of day at `loc`. When `flat` is set, local illumination is
    /// ignored.
    fn time_of_day_at(&self, loc: MapLocation, flat: bool) -> TimeOfDay;

    fn unit_scope(&self) -> &UnitScope;

    fn game_data(&self) -> Option<&GameData> {
        None
    }

    fn formula_evaluator(&self) -> Option<&dyn FormulaEvaluator> {
        None
    }

    fn script_hook(&self) -> Option<&dyn ScriptHook> {
        None
    }
}

/// One entry of the unit scope stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedBinding {
    pub alias: String,
    pub unit_id: String,
    pub location: MapLocation,
}

/// Stack of temporary unit bindings.
///
/// Nested filter evaluation (adjacency tests, location filters that test
/// occupants) pushes on top of the outer binding; popping restores the outer
/// one.
#[derive(Debug, Default)]
pub struct UnitScope {
    stack: RefCell<Vec<ScopedBinding>>,
}

impl UnitScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `unit` under `alias` until the returned guard is dropped.
    #[must_use = "the binding is released when the guard is dropped"]
    pub fn bind(&self, alias: &str, unit: &Unit, location: MapLocation) -> ScopedUnit<'_> {
        self.stack.borrow_mut().push(ScopedBinding {
            alias: alias.to_string(),
            unit_id: unit.id.clone(),
            location,
        });
        ScopedUnit { scope: self }
    }

    /// The innermost binding for `alias`.
    pub fn current(&self, alias: &str) -> Option<ScopedBinding> {
        self.stack
            .borrow()
            .iter()
            .rev()
            .find(|binding| binding.alias == alias)
            .cloned()
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }
}

/// Guard returned by [`UnitScope::bind`].
#[derive(Debug)]
pub struct ScopedUnit<'a> {
    scope: &'a UnitScope,
}

impl Drop for ScopedUnit<'_> {
    fn drop(&mut self) {
        self.scope.stack.borrow_mut().pop();
    }
}
