//! Undoable editor actions.
//!
//! Every action returns its own inverse from [`EditorAction::perform`], so an
//! undo stack is just a stack of the returned boxes.

use std::fmt;

use tracing::debug;

use super::MapContext;
use super::label::TerrainLabel;
use crate::location::MapLocation;

/// An editor operation on a [`MapContext`].
pub trait EditorAction: fmt::Debug + 'static {
    /// Apply the action and return the action that reverts it, or `None`
    /// when the action changed nothing.
    fn perform(&self, mc: &mut MapContext) -> Option<Box<dyn EditorAction>>;

    /// Apply the action without computing an inverse.
    fn perform_without_undo(&self, mc: &mut MapContext);

    /// Short human-readable description for undo menus.
    fn description(&self) -> String;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn EditorAction>;
}

impl Clone for Box<dyn EditorAction> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Place a label, replacing whatever is at the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAction {
    pub loc: MapLocation,
    pub label: TerrainLabel,
}

impl LabelAction {
    pub fn new(loc: MapLocation, label: TerrainLabel) -> Self {
        Self { loc, label }
    }
}

impl EditorAction for LabelAction {
    fn perform(&self, mc: &mut MapContext) -> Option<Box<dyn EditorAction>> {
        let undo: Box<dyn EditorAction> = match mc.labels().get_label(self.loc) {
            Some(old) => Box::new(LabelAction::new(self.loc, old.clone())),
            None => Box::new(LabelDeleteAction::new(self.loc)),
        };
        self.perform_without_undo(mc);
        Some(undo)
    }

    fn perform_without_undo(&self, mc: &mut MapContext) {
        debug!(loc = %self.loc, text = %self.label.text, "set label");
        mc.labels_mut().set_label(self.loc, self.label.clone());
    }

    fn description(&self) -> String {
        format!("label {} at {}", self.label.text, self.loc)
    }

    fn clone_box(&self) -> Box<dyn EditorAction> {
        Box::new(self.clone())
    }
}

/// Remove the label at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelDeleteAction {
    pub loc: MapLocation,
}

impl LabelDeleteAction {
    pub fn new(loc: MapLocation) -> Self {
        Self { loc }
    }
}

impl EditorAction for LabelDeleteAction {
    fn perform(&self, mc: &mut MapContext) -> Option<Box<dyn EditorAction>> {
        let deleted = mc.labels().get_label(self.loc)?.clone();
        self.perform_without_undo(mc);
        Some(Box::new(LabelAction::new(self.loc, deleted)))
    }

    fn perform_without_undo(&self, mc: &mut MapContext) {
        debug!(loc = %self.loc, "delete label");
        mc.labels_mut().clear_label(self.loc);
    }

    fn description(&self) -> String {
        format!("delete label at {}", self.loc)
    }

    fn clone_box(&self) -> Box<dyn EditorAction> {
        Box::new(*self)
    }
}

/// A sequence of actions performed as one undo step.
#[derive(Debug, Clone, Default)]
pub struct ActionChain {
    actions: Vec<Box<dyn EditorAction>>,
}

impl ActionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: impl EditorAction) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn prepend_action(&mut self, action: Box<dyn EditorAction>) {
        self.actions.insert(0, action);
    }

    pub fn actions(&self) -> &[Box<dyn EditorAction>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl EditorAction for ActionChain {
    /// Performs every action in order. The returned chain holds their
    /// inverses in reverse order; actions that changed nothing contribute no
    /// inverse.
    fn perform(&self, mc: &mut MapContext) -> Option<Box<dyn EditorAction>> {
        let mut undo = ActionChain::new();
        for action in &self.actions {
            if let Some(inverse) = action.perform(mc) {
                undo.prepend_action(inverse);
            }
        }
        Some(Box::new(undo))
    }

    fn perform_without_undo(&self, mc: &mut MapContext) {
        for action in &self.actions {
            action.perform_without_undo(mc);
        }
    }

    fn description(&self) -> String {
        match self.actions.as_slice() {
            [] => "nothing".to_string(),
            [only] => only.description(),
            [first, rest @ ..] => format!("{} and {} more", first.description(), rest.len()),
        }
    }

    fn clone_box(&self) -> Box<dyn EditorAction> {
        Box::new(self.clone())
    }
}
