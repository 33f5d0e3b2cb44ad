//! Scenario editor state and its undoable actions.

pub mod action;
pub mod label;

pub use action::{ActionChain, EditorAction, LabelAction, LabelDeleteAction};
pub use label::{Color, MapLabels, ParseColorError, TerrainLabel};

use crate::map::GameMap;

/// The map being edited together with its labels.
#[derive(Debug, Clone)]
pub struct MapContext {
    map: GameMap,
    labels: MapLabels,
}

impl MapContext {
    pub fn new(map: GameMap) -> Self {
        Self {
            map,
            labels: MapLabels::new(),
        }
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut GameMap {
        &mut self.map
    }

    pub fn labels(&self) -> &MapLabels {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut MapLabels {
        &mut self.labels
    }
}
