pub mod board;
pub mod conditional;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod ids;
pub mod lazy_list;
pub mod location;
pub mod location_filter;
pub mod map;
pub mod range;
pub mod side_filter;
pub mod team;
pub mod unit;
pub mod unit_filter;
pub mod unit_map;
pub mod unit_types;
pub mod variables;


pub use board::GameBoard;
pub use conditional::Conditional;
#[cfg(feature = "serialization")]
pub use config::ConfigError;
pub use config::{AttributeValue, Config};
pub use context::{
    FilterContext, FormulaEvaluator, ScopedBinding, ScopedUnit, ScriptHook, THIS_UNIT, TimeOfDay,
    UnitScope,
};
pub use editor::{
    ActionChain, Color, EditorAction, LabelAction, LabelDeleteAction, MapContext, MapLabels,
    TerrainLabel,
};
pub use error::FilterError;
pub use ids::UnitUid;
pub use lazy_list::{LazyStringList, split_list};
pub use location::{Direction, MapLocation};
pub use location_filter::{Illumination, LocationFilter};
pub use map::{GameMap, OFF_MAP_TERRAIN, terrain_matches};
pub use range::RangeSet;
pub use side_filter::SideFilter;
pub use team::{Controller, Team, recompute_alliances, team_for_side};
pub use unit::{Attack, Gender, Unit};
pub use unit_filter::UnitFilter;
pub use unit_map::UnitMap;
pub use unit_types::{UnitType, UnitTypes};
pub use variables::{GameData, VariableError};
