//! Units placed on the map, in insertion order.

use std::collections::HashMap;
use std::rc::Rc;

use crate::location::MapLocation;
use crate::unit::Unit;

/// Ordered collection of on-map units, indexed by location.
///
/// Iteration order is insertion order and is stable across lookups.
#[derive(Debug, Clone, Default)]
pub struct UnitMap {
    units: Vec<Rc<Unit>>,
    by_location: HashMap<MapLocation, usize>,
}

impl UnitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a unit at its own location. Returns the unit back if the
    /// location is invalid or already occupied.
    pub fn insert(&mut self, unit: Unit) -> Result<(), Unit> {
        if !unit.location.valid() || self.by_location.contains_key(&unit.location) {
            return Err(unit);
        }
        self.by_location.insert(unit.location, self.units.len());
        self.units.push(Rc::new(unit));
        Ok(())
    }

    /// Remove and return the unit at `loc`.
    pub fn extract(&mut self, loc: MapLocation) -> Option<Rc<Unit>> {
        let idx = self.by_location.remove(&loc)?;
        let unit = self.units.remove(idx);
        for slot in self.by_location.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(unit)
    }

    pub fn find(&self, loc: MapLocation) -> Option<&Unit> {
        self.find_shared(loc).map(Rc::as_ref)
    }

    pub fn find_shared(&self, loc: MapLocation) -> Option<&Rc<Unit>> {
        self.by_location.get(&loc).map(|&idx| &self.units[idx])
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Rc<Unit>> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Unit>> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut units = UnitMap::new();
        units.insert(Unit::new("a", "Spearman").at(1, 1)).expect("free hex");
        units.insert(Unit::new("b", "Bowman").at(2, 1)).expect("free hex");
        assert_eq!(units.find(MapLocation::new(1, 0)).map(|u| u.id.as_str()), Some("b"));
        assert!(units.find(MapLocation::new(5, 5)).is_none());
        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_insert_rejects_occupied_and_offmap() {
        let mut units = UnitMap::new();
        units.insert(Unit::new("a", "Spearman").at(1, 1)).expect("free hex");
        assert!(units.insert(Unit::new("b", "Bowman").at(1, 1)).is_err());
        assert!(units.insert(Unit::new("c", "Bowman")).is_err());
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_extract_reindexes() {
        let mut units = UnitMap::new();
        units.insert(Unit::new("a", "Spearman").at(1, 1)).expect("free hex");
        units.insert(Unit::new("b", "Bowman").at(2, 1)).expect("free hex");
        units.insert(Unit::new("c", "Cavalryman").at(3, 1)).expect("free hex");
        let removed = units.extract(MapLocation::new(0, 0)).expect("occupied");
        assert_eq!(removed.id, "a");
        assert_eq!(units.find(MapLocation::new(2, 0)).map(|u| u.id.as_str()), Some("c"));
        assert_eq!(units.find_by_id("b").map(|u| u.location), Some(MapLocation::new(1, 0)));
    }
}
