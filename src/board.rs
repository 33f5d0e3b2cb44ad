//! In-memory game board implementing [`FilterContext`].

use std::collections::HashMap;

use tracing::warn;

use crate::context::{FilterContext, FormulaEvaluator, ScriptHook, TimeOfDay, UnitScope};
use crate::location::MapLocation;
use crate::map::GameMap;
use crate::team::{Team, recompute_alliances};
use crate::unit::Unit;
use crate::unit_map::UnitMap;
use crate::unit_types::UnitTypes;
use crate::variables::GameData;

/// Everything a filter can look at, owned in one place.
pub struct GameBoard {
    map: GameMap,
    units: UnitMap,
    teams: Vec<Team>,
    unit_types: UnitTypes,
    game_data: Option<GameData>,
    formula: Option<Box<dyn FormulaEvaluator>>,
    script: Option<Box<dyn ScriptHook>>,
    time_of_day: TimeOfDay,
    illumination: HashMap<MapLocation, i32>,
    scope: UnitScope,
}

impl GameBoard {
    pub fn new(map: GameMap) -> Self {
        Self {
            map,
            units: UnitMap::new(),
            teams: Vec::new(),
            unit_types: UnitTypes::new(),
            game_data: None,
            formula: None,
            script: None,
            time_of_day: TimeOfDay::default(),
            illumination: HashMap::new(),
            scope: UnitScope::new(),
        }
    }

    /// Set the sides and derive alliances from their team names.
    pub fn with_teams(mut self, mut teams: Vec<Team>) -> Self {
        recompute_alliances(&mut teams);
        self.teams = teams;
        self
    }

    /// Place a unit. Units on invalid or occupied locations are dropped with
    /// a warning.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        if let Err(unit) = self.place_unit(unit) {
            warn!(id = %unit.id, location = %unit.location, "cannot place unit");
        }
        self
    }

    pub fn with_unit_types(mut self, unit_types: UnitTypes) -> Self {
        self.unit_types = unit_types;
        self
    }

    pub fn with_game_data(mut self, data: GameData) -> Self {
        self.game_data = Some(data);
        self
    }

    pub fn with_formula_evaluator(mut self, evaluator: impl FormulaEvaluator + 'static) -> Self {
        self.formula = Some(Box::new(evaluator));
        self
    }

    pub fn with_script_hook(mut self, hook: impl ScriptHook + 'static) -> Self {
        self.script = Some(Box::new(hook));
        self
    }

    pub fn with_time_of_day(mut self, tod: TimeOfDay) -> Self {
        self.time_of_day = tod;
        self
    }

    /// Add a local lawful bonus delta at `loc` (e.g. from an illuminating
    /// unit or a cave).
    pub fn with_illumination(mut self, loc: MapLocation, delta: i32) -> Self {
        self.illumination.insert(loc, delta);
        self
    }

    /// Returns the unit back when its location is off the board or occupied.
    pub fn place_unit(&mut self, unit: Unit) -> Result<(), Unit> {
        if !self.map.on_board(unit.location) {
            return Err(unit);
        }
        self.units.insert(unit)
    }
}

impl FilterContext for GameBoard {
    fn units(&self) -> &UnitMap {
        &self.units
    }

    fn map(&self) -> &GameMap {
        &self.map
    }

    fn teams(&self) -> &[Team] {
        &self.teams
    }

    fn unit_types(&self) -> &UnitTypes {
        &self.unit_types
    }

    fn time_of_day_at(&self, loc: MapLocation, flat: bool) -> TimeOfDay {
        let mut tod = self.time_of_day.clone();
        if !flat {
            tod.lawful_bonus += self.illumination.get(&loc).copied().unwrap_or(0);
        }
        tod
    }

    fn unit_scope(&self) -> &UnitScope {
        &self.scope
    }

    fn game_data(&self) -> Option<&GameData> {
        self.game_data.as_ref()
    }

    fn formula_evaluator(&self) -> Option<&dyn FormulaEvaluator> {
        self.formula.as_deref()
    }

    fn script_hook(&self) -> Option<&dyn ScriptHook> {
        self.script.as_deref()
    }
}
