//! Map labels.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::location::MapLocation;

/// An RGB label color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Error parsing a `r,g,b` color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color `{0}`; expected `r,g,b` with components 0-255")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u8> = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ParseColorError(s.to_string()))?;
        match parts.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

/// A text label placed on a hex.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TerrainLabel {
    pub text: String,
    /// Teams the label is shown to; empty means everyone.
    pub team_name: String,
    pub color: Color,
    pub visible_in_fog: bool,
    pub visible_in_shroud: bool,
    /// Players cannot remove an immutable label in game.
    pub immutable: bool,
}

impl TerrainLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            team_name: String::new(),
            color: Color::default(),
            visible_in_fog: true,
            visible_in_shroud: false,
            immutable: true,
        }
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = team_name.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn hidden_in_fog(mut self) -> Self {
        self.visible_in_fog = false;
        self
    }

    pub fn visible_in_shroud(mut self) -> Self {
        self.visible_in_shroud = true;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.immutable = false;
        self
    }
}

impl Default for TerrainLabel {
    fn default() -> Self {
        TerrainLabel::new("")
    }
}

/// All labels on a map, at most one per location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapLabels {
    labels: BTreeMap<MapLocation, TerrainLabel>,
}

impl MapLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_label(&self, loc: MapLocation) -> Option<&TerrainLabel> {
        self.labels.get(&loc)
    }

    /// Place `label` at `loc`, replacing any existing one. A label with empty
    /// text removes whatever was there.
    pub fn set_label(&mut self, loc: MapLocation, label: TerrainLabel) {
        if label.text.is_empty() {
            self.labels.remove(&loc);
        } else {
            self.labels.insert(loc, label);
        }
    }

    pub fn clear_label(&mut self, loc: MapLocation) -> Option<TerrainLabel> {
        self.labels.remove(&loc)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MapLocation, &TerrainLabel)> {
        self.labels.iter().map(|(loc, label)| (*loc, label))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(feature = "serialization")]
mod json {
    use serde::{Deserialize, Serialize};

    use super::{MapLabels, TerrainLabel};
    use crate::location::MapLocation;

    #[derive(Serialize, Deserialize)]
    struct PlacedLabel {
        #[serde(flatten)]
        loc: MapLocation,
        #[serde(flatten)]
        label: TerrainLabel,
    }

    impl MapLabels {
        /// Serialize as an array of labels, each carrying its zero-based
        /// `x`/`y`.
        pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
            let placed: Vec<PlacedLabel> = self
                .iter()
                .map(|(loc, label)| PlacedLabel {
                    loc,
                    label: label.clone(),
                })
                .collect();
            serde_json::to_value(placed)
        }

        /// Inverse of [`MapLabels::to_json`]. Missing label fields take their
        /// defaults.
        pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
            let placed: Vec<PlacedLabel> = serde_json::from_value(value)?;
            let mut labels = MapLabels::new();
            for PlacedLabel { loc, label } in placed {
                labels.set_label(loc, label);
            }
            Ok(labels)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_removes_label() {
        let loc = MapLocation::new(3, 4);
        let mut labels = MapLabels::new();
        labels.set_label(loc, TerrainLabel::new("Ford"));
        assert_eq!(labels.get_label(loc).map(|l| l.text.as_str()), Some("Ford"));
        labels.set_label(loc, TerrainLabel::new(""));
        assert!(labels.get_label(loc).is_none());
        assert!(labels.is_empty());
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_json_round_trip_fills_defaults() {
        let value = serde_json::json!([
            {"x": 1, "y": 2, "text": "Ford", "color": {"r": 0, "g": 0, "b": 255}},
            {"x": 0, "y": 0, "text": ""}
        ]);
        let labels = MapLabels::from_json(value).expect("valid labels");
        assert_eq!(labels.len(), 1);
        let ford = labels.get_label(MapLocation::new(1, 2)).expect("placed");
        assert_eq!(ford.color, Color::rgb(0, 0, 255));
        assert!(ford.visible_in_fog);
        let json = labels.to_json().expect("labels serialize");
        assert_eq!(MapLabels::from_json(json).ok(), Some(labels));
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("255, 0,128".parse::<Color>(), Ok(Color::rgb(255, 0, 128)));
        assert!("255,0".parse::<Color>().is_err());
        assert!("256,0,0".parse::<Color>().is_err());
        assert_eq!(Color::WHITE.to_string(), "255,255,255");
    }
}
