use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for auto-incrementing underlying unit IDs (starts at 1, 0 is reserved).
static UNIT_UID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Underlying unit identifier, monotonically increasing.
///
/// Distinct from the scenario-facing string `id` of a unit: two units may
/// briefly share a string id (e.g. while a copy is being placed), but never a
/// uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitUid(pub u64);

impl UnitUid {
    /// Create a new uid with auto-incrementing counter.
    pub fn new() -> Self {
        Self(UNIT_UID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a uid from a specific value (for when you need explicit control).
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl Default for UnitUid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_uid_auto_increment() {
        let u1 = UnitUid::new();
        let u2 = UnitUid::new();
        assert_ne!(u1, u2);
        assert!(u2 > u1);
    }

    #[test]
    fn test_unit_uid_from_raw() {
        let u1 = UnitUid::from_raw(100);
        let u2 = UnitUid::from_raw(200);
        assert_ne!(u1, u2);
        assert_eq!(u1.0, 100);
        assert_eq!(u2.0, 200);
    }
}
