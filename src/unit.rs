//! The read-only unit view consumed by filters.

use std::collections::HashMap;

use crate::config::Config;
use crate::ids::UnitUid;
use crate::location::MapLocation;
use crate::map::{GameMap, terrain_matches};

/// Chance to be hit on terrain the unit has no entry for.
pub const DEFAULT_DEFENSE: i32 = 100;

/// Movement cost on terrain the unit has no entry for.
pub const UNREACHABLE: i32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// `female` maps to [`Gender::Female`]; every other token is male.
    pub fn from_token(token: &str) -> Gender {
        if token.trim() == "female" {
            Gender::Female
        } else {
            Gender::Male
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// An attack definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attack {
    pub id: String,
    pub range: String,
    pub damage: i32,
    pub number: i32,
}

impl Attack {
    pub fn new(id: impl Into<String>, range: impl Into<String>, damage: i32, number: i32) -> Self {
        Self {
            id: id.into(),
            range: range.into(),
            damage,
            number,
        }
    }

    fn write(&self) -> Config {
        Config::new()
            .with("name", self.id.as_str())
            .with("range", self.range.as_str())
            .with("damage", self.damage)
            .with("number", self.number)
    }
}

/// A unit as seen by filters.
#[derive(Debug, Clone)]
pub struct Unit {
    pub uid: UnitUid,
    pub id: String,
    pub name: String,
    pub type_id: String,
    /// Empty unless the unit is a variation of its base type.
    pub variation: String,
    pub race: String,
    pub side: i32,
    pub gender: Gender,
    pub role: String,
    pub guardian: bool,
    pub can_recruit: bool,
    pub recall_cost: i64,
    pub level: i64,
    pub hitpoints: i32,
    pub max_hitpoints: i32,
    pub experience: i32,
    pub attacks: Vec<Attack>,
    pub abilities: Vec<String>,
    /// Chance to be hit, keyed by terrain code.
    pub defense: HashMap<String, i32>,
    /// Movement cost, keyed by terrain code.
    pub movement_costs: HashMap<String, i32>,
    /// Terrain patterns on which the unit is concealed.
    pub concealment: Vec<String>,
    pub variables: Config,
    pub location: MapLocation,
}

impl Unit {
    /// Create an off-map level 1 unit on side 1.
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            uid: UnitUid::new(),
            id: id.into(),
            name: String::new(),
            type_id: type_id.into(),
            variation: String::new(),
            race: String::new(),
            side: 1,
            gender: Gender::Male,
            role: String::new(),
            guardian: false,
            can_recruit: false,
            recall_cost: 20,
            level: 1,
            hitpoints: 30,
            max_hitpoints: 30,
            experience: 0,
            attacks: Vec::new(),
            abilities: Vec::new(),
            defense: HashMap::new(),
            movement_costs: HashMap::new(),
            concealment: Vec::new(),
            variables: Config::new(),
            location: MapLocation::null_location(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_side(mut self, side: i32) -> Self {
        self.side = side;
        self
    }

    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = variation.into();
        self
    }

    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = race.into();
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }

    pub fn with_recall_cost(mut self, cost: i64) -> Self {
        self.recall_cost = cost;
        self
    }

    pub fn guardian(mut self) -> Self {
        self.guardian = true;
        self
    }

    pub fn leader(mut self) -> Self {
        self.can_recruit = true;
        self
    }

    pub fn with_attack(mut self, attack: Attack) -> Self {
        self.attacks.push(attack);
        self
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.abilities.push(ability.into());
        self
    }

    pub fn with_defense(mut self, terrain: impl Into<String>, chance_to_hit: i32) -> Self {
        self.defense.insert(terrain.into(), chance_to_hit);
        self
    }

    pub fn with_movement_cost(mut self, terrain: impl Into<String>, cost: i32) -> Self {
        self.movement_costs.insert(terrain.into(), cost);
        self
    }

    pub fn concealed_on(mut self, pattern: impl Into<String>) -> Self {
        self.concealment.push(pattern.into());
        self
    }

    pub fn with_variables(mut self, variables: Config) -> Self {
        self.variables = variables;
        self
    }

    /// Place the unit at one-based scenario coordinates.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.location = MapLocation::from_one_based(x, y);
        self
    }

    pub fn has_ability_by_id(&self, ability: &str) -> bool {
        self.abilities.iter().any(|a| a == ability)
    }

    pub fn has_weapon(&self, weapon: &str) -> bool {
        self.attacks.iter().any(|a| a.id == weapon)
    }

    pub fn defense_modifier(&self, terrain: &str) -> i32 {
        self.defense.get(terrain).copied().unwrap_or(DEFAULT_DEFENSE)
    }

    pub fn movement_cost(&self, terrain: &str) -> i32 {
        self.movement_costs.get(terrain).copied().unwrap_or(UNREACHABLE)
    }

    /// Whether the unit conceals itself at `loc`.
    pub fn invisible(&self, loc: MapLocation, map: &GameMap) -> bool {
        if !map.on_board(loc) {
            return false;
        }
        let terrain = map.terrain(loc);
        self.concealment
            .iter()
            .any(|pattern| terrain_matches(pattern, terrain))
    }

    /// Serialize to a structural snapshot for `[filter_wml]` matching.
    pub fn write(&self) -> Config {
        let mut cfg = Config::new()
            .with("id", self.id.as_str())
            .with("underlying_id", self.uid.0 as i64)
            .with("name", self.name.as_str())
            .with("type", self.type_id.as_str())
            .with("race", self.race.as_str())
            .with("side", self.side)
            .with("gender", self.gender.as_str())
            .with("canrecruit", self.can_recruit)
            .with("recall_cost", self.recall_cost)
            .with("level", self.level)
            .with("hitpoints", self.hitpoints)
            .with("max_hitpoints", self.max_hitpoints)
            .with("experience", self.experience);
        if !self.variation.is_empty() {
            cfg.set("variation", self.variation.as_str());
        }
        if !self.role.is_empty() {
            cfg.set("role", self.role.as_str());
        }
        if self.guardian {
            cfg.set("ai_special", "guardian");
        }
        if self.location.valid() {
            cfg.set("x", self.location.x + 1);
            cfg.set("y", self.location.y + 1);
        } else {
            cfg.set("x", "recall");
            cfg.set("y", "recall");
        }
        for attack in &self.attacks {
            cfg.add_child("attack", attack.write());
        }
        if !self.abilities.is_empty() {
            let abilities = cfg.add_child("abilities", Config::new());
            for ability in &self.abilities {
                abilities.add_child(ability.clone(), Config::new().with("id", ability.as_str()));
            }
        }
        cfg.add_child("variables", self.variables.clone());
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_tables_fall_back_to_defaults() {
        let unit = Unit::new("u1", "Merman Fighter")
            .with_defense("Ww", 30)
            .with_movement_cost("Ww", 1);
        assert_eq!(unit.defense_modifier("Ww"), 30);
        assert_eq!(unit.defense_modifier("Gg"), DEFAULT_DEFENSE);
        assert_eq!(unit.movement_cost("Ww"), 1);
        assert_eq!(unit.movement_cost("Mm"), UNREACHABLE);
    }

    #[test]
    fn test_invisible_on_concealing_terrain_only() {
        let map = GameMap::from_rows(&[&["Gg", "Gs^Fp"]]);
        let unit = Unit::new("u1", "Woodland Sprite").concealed_on("*^F*");
        assert!(unit.invisible(MapLocation::new(1, 0), &map));
        assert!(!unit.invisible(MapLocation::new(0, 0), &map));
        assert!(!unit.invisible(MapLocation::null_location(), &map));
    }

    #[test]
    fn test_write_snapshot() {
        let unit = Unit::new("Konrad", "Commander")
            .with_side(1)
            .leader()
            .with_attack(Attack::new("sword", "melee", 8, 4))
            .with_ability("leadership")
            .with_variables(Config::new().with("quest", "scepter"))
            .at(3, 4);
        let cfg = unit.write();
        assert_eq!(cfg.get("id").str(), "Konrad");
        assert_eq!(cfg.get("canrecruit").str(), "yes");
        assert_eq!(cfg.get("x").to_int(0), 3);
        assert!(cfg.matches(
            &Config::new().with_child("attack", Config::new().with("name", "sword"))
        ));
        assert!(cfg.matches(
            &Config::new().with_child("variables", Config::new().with("quest", "scepter"))
        ));
        assert!(cfg.child("abilities").is_some_and(|a| a.child("leadership").is_some()));
    }

    #[test]
    fn test_recall_unit_snapshot() {
        let cfg = Unit::new("Vet", "Spearman").write();
        assert_eq!(cfg.get("x").str(), "recall");
        assert_eq!(cfg.get("y").str(), "recall");
    }
}
