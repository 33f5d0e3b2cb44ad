//! Unit type registry.

use std::collections::HashMap;

/// A unit type and the variations defined on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitType {
    pub id: String,
    /// The type this one is a variation of; equal to `id` for base types.
    pub base_id: String,
    pub race: String,
    pub variations: Vec<String>,
}

impl UnitType {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            base_id: id.clone(),
            id,
            race: String::new(),
            variations: Vec::new(),
        }
    }

    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = race.into();
        self
    }

    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variations.push(variation.into());
        self
    }

    pub fn with_base(mut self, base_id: impl Into<String>) -> Self {
        self.base_id = base_id.into();
        self
    }

    pub fn has_variation(&self, variation: &str) -> bool {
        self.variations.iter().any(|v| v == variation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnitTypes {
    types: HashMap<String, UnitType>,
}

impl UnitTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit_type: UnitType) {
        self.types.insert(unit_type.id.clone(), unit_type);
    }

    pub fn with(mut self, unit_type: UnitType) -> Self {
        self.insert(unit_type);
        self
    }

    pub fn find(&self, id: &str) -> Option<&UnitType> {
        self.types.get(id)
    }

    /// The type whose variations apply to a unit: its own type, or the base
    /// type when the unit is itself a variation.
    pub fn variation_host(&self, type_id: &str, variation: &str) -> Option<&UnitType> {
        let own = self.find(type_id)?;
        if variation.is_empty() {
            Some(own)
        } else {
            self.find(&own.base_id)
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
