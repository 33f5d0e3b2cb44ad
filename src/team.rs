//! Sides, alliances and fog.

use std::collections::HashSet;

use crate::lazy_list::split_list;
use crate::location::MapLocation;

/// Who drives a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Controller {
    #[default]
    Human,
    Ai,
    /// An empty side slot.
    Null,
}

impl Controller {
    pub fn as_str(self) -> &'static str {
        match self {
            Controller::Human => "human",
            Controller::Ai => "ai",
            Controller::Null => "null",
        }
    }

    pub fn parse(token: &str) -> Option<Controller> {
        match token.trim() {
            "human" => Some(Controller::Human),
            "ai" => Some(Controller::Ai),
            "null" => Some(Controller::Null),
            _ => None,
        }
    }
}

/// A side of the scenario. Sides are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    side: i32,
    team_names: Vec<String>,
    controller: Controller,
    fog: bool,
    cleared: HashSet<MapLocation>,
    enemies: HashSet<i32>,
}

impl Team {
    /// A side whose team name defaults to its own number, so every side is
    /// an enemy of every other until team names say otherwise.
    pub fn new(side: i32) -> Self {
        Self {
            side,
            team_names: vec![side.to_string()],
            controller: Controller::Human,
            fog: false,
            cleared: HashSet::new(),
            enemies: HashSet::new(),
        }
    }

    /// Set the comma-separated team names.
    pub fn with_team_name(mut self, names: &str) -> Self {
        self.team_names = split_list(names);
        self
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Enable fog; every location is fogged until cleared.
    pub fn with_fog(mut self) -> Self {
        self.fog = true;
        self
    }

    pub fn clear_fog(&mut self, loc: MapLocation) {
        self.cleared.insert(loc);
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    pub fn team_names(&self) -> &[String] {
        &self.team_names
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn fogged(&self, loc: MapLocation) -> bool {
        self.fog && !self.cleared.contains(&loc)
    }

    pub fn is_enemy(&self, side: i32) -> bool {
        self.enemies.contains(&side)
    }

    pub fn shares_team_name(&self, other: &Team) -> bool {
        self.team_names
            .iter()
            .any(|name| other.team_names.contains(name))
    }

    /// Declare `side` an enemy regardless of team names.
    pub fn set_enemy(&mut self, side: i32, enemy: bool) {
        if enemy {
            self.enemies.insert(side);
        } else {
            self.enemies.remove(&side);
        }
    }
}

/// Recompute every side's enemy set: two distinct sides are enemies when they
/// share no team name.
pub fn recompute_alliances(teams: &mut [Team]) {
    let snapshot: Vec<(i32, Vec<String>)> = teams
        .iter()
        .map(|team| (team.side, team.team_names.clone()))
        .collect();
    for team in teams.iter_mut() {
        team.enemies = snapshot
            .iter()
            .filter(|(side, names)| {
                *side != team.side && !names.iter().any(|n| team.team_names.contains(n))
            })
            .map(|(side, _)| *side)
            .collect();
    }
}

/// Look up a team by its side number. Sides need not be contiguous or
/// stored in order.
pub fn team_for_side(teams: &[Team], side: i32) -> Option<&Team> {
    teams.iter().find(|team| team.side == side)
}
