//! Actions and action lists.
//!
//! User intents ([`Action::ExpandRequested`] and friends) are turned into
//! an [`ActionList`] of mutation commands by the action manager; the
//! reducer plays the list back step by step.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row index in the live grid
    pub row: usize,
    /// Column index in the live grid
    pub col: usize,
}

impl Coord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Payload-free discriminant of [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    ExpandRequested,
    PackupRequested,
    ReplaceDataRequested,
    AppendRow,
    ShowCell,
    HideCell,
    ReplaceCell,
    AnimateReplace,
    ReplaceFinish,
    PreRemoveRow,
    RemoveRow,
    RefreshGrid,
    HideWidget,
    ShowWidget,
}

/// Payload carried by an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// A single cell
    Cell(Coord),
    /// A whole row
    Row(usize),
}

/// Immutable command: either a user intent or a grid mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// User asked to expand the table
    ExpandRequested,
    /// User asked to collapse the table
    PackupRequested,
    /// The data source was swapped
    ReplaceDataRequested,
    /// Append the next row with transparent animated cells
    AppendRow,
    /// Fade a freshly appended cell in
    ShowCell(Coord),
    /// Fade a cell of a row about to be removed out
    HideCell(Coord),
    /// Wrap a cell and its replacement into a cross-fade
    ReplaceCell(Coord),
    /// Run a cross-fade
    AnimateReplace(Coord),
    /// Collapse a finished cross-fade to its replacement
    ReplaceFinish(Coord),
    /// Turn a row into fade-out cells
    PreRemoveRow {
        /// Row to prepare
        row: usize,
    },
    /// Drop the last row
    RemoveRow,
    /// Recompute the whole grid from the data table
    RefreshGrid,
    /// Fade the widget out
    HideWidget,
    /// Fade the widget in
    ShowWidget,
}

impl Action {
    /// Discriminant.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::ExpandRequested => ActionKind::ExpandRequested,
            Self::PackupRequested => ActionKind::PackupRequested,
            Self::ReplaceDataRequested => ActionKind::ReplaceDataRequested,
            Self::AppendRow => ActionKind::AppendRow,
            Self::ShowCell(_) => ActionKind::ShowCell,
            Self::HideCell(_) => ActionKind::HideCell,
            Self::ReplaceCell(_) => ActionKind::ReplaceCell,
            Self::AnimateReplace(_) => ActionKind::AnimateReplace,
            Self::ReplaceFinish(_) => ActionKind::ReplaceFinish,
            Self::PreRemoveRow { .. } => ActionKind::PreRemoveRow,
            Self::RemoveRow => ActionKind::RemoveRow,
            Self::RefreshGrid => ActionKind::RefreshGrid,
            Self::HideWidget => ActionKind::HideWidget,
            Self::ShowWidget => ActionKind::ShowWidget,
        }
    }

    /// Payload, if the action has one.
    #[must_use]
    pub const fn payload(&self) -> Option<Payload> {
        match self {
            Self::ShowCell(c)
            | Self::HideCell(c)
            | Self::ReplaceCell(c)
            | Self::AnimateReplace(c)
            | Self::ReplaceFinish(c) => Some(Payload::Cell(*c)),
            Self::PreRemoveRow { row } => Some(Payload::Row(*row)),
            _ => None,
        }
    }

    /// Cell the action targets, if any.
    #[must_use]
    pub const fn target(&self) -> Option<Coord> {
        match self.payload() {
            Some(Payload::Cell(coord)) => Some(coord),
            _ => None,
        }
    }

    /// Whether this is a user intent rather than a mutation command.
    #[must_use]
    pub const fn is_intent(&self) -> bool {
        matches!(
            self,
            Self::ExpandRequested | Self::PackupRequested | Self::ReplaceDataRequested
        )
    }

    /// The three-step cross-fade for one coordinate.
    #[must_use]
    pub const fn replace_group(coord: Coord) -> [Self; 3] {
        [
            Self::ReplaceCell(coord),
            Self::AnimateReplace(coord),
            Self::ReplaceFinish(coord),
        ]
    }
}

/// One element of an [`ActionList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Run one action and wait for it
    Single(Action),
    /// Start all actions together and wait for all of them
    Batch(Vec<Action>),
}

impl Step {
    /// Number of actions in this step.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(actions) => actions.len(),
        }
    }

    /// Whether this step holds no action.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered sequence of steps for one full transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionList {
    steps: VecDeque<Step>,
}

impl ActionList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single action.
    pub fn push(&mut self, action: Action) {
        self.steps.push_back(Step::Single(action));
    }

    /// Append several single actions, in order.
    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.push(action);
        }
    }

    /// Append a parallel batch. Empty batches are dropped.
    pub fn push_batch(&mut self, actions: Vec<Action>) {
        if !actions.is_empty() {
            self.steps.push_back(Step::Batch(actions));
        }
    }

    /// Take the next step.
    pub fn next_step(&mut self) -> Option<Step> {
        self.steps.pop_front()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of actions across all steps.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.steps.iter().map(Step::len).sum()
    }

    /// Iterate over remaining steps.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Flatten the remaining steps into actions, batches in listed order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.steps.iter().flat_map(|step| match step {
            Step::Single(action) => std::slice::from_ref(action),
            Step::Batch(actions) => actions.as_slice(),
        })
    }
}

impl From<Vec<Step>> for ActionList {
    fn from(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into_iter().filter(|step| !step.is_empty()).collect(),
        }
    }
}

impl IntoIterator for ActionList {
    type Item = Step;
    type IntoIter = std::collections::vec_deque::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Action Tests =====

    #[test]
    fn test_action_kind_and_payload() {
        let show = Action::ShowCell(Coord::new(2, 1));
        assert_eq!(show.kind(), ActionKind::ShowCell);
        assert_eq!(show.payload(), Some(Payload::Cell(Coord::new(2, 1))));
        assert_eq!(show.target(), Some(Coord::new(2, 1)));

        let pre = Action::PreRemoveRow { row: 3 };
        assert_eq!(pre.payload(), Some(Payload::Row(3)));
        assert_eq!(pre.target(), None);

        assert_eq!(Action::RefreshGrid.payload(), None);
    }

    #[test]
    fn test_action_is_intent() {
        assert!(Action::ExpandRequested.is_intent());
        assert!(Action::ReplaceDataRequested.is_intent());
        assert!(!Action::AppendRow.is_intent());
        assert!(!Action::HideWidget.is_intent());
    }

    #[test]
    fn test_replace_group_order() {
        let c = Coord::new(1, 2);
        assert_eq!(
            Action::replace_group(c),
            [
                Action::ReplaceCell(c),
                Action::AnimateReplace(c),
                Action::ReplaceFinish(c)
            ]
        );
    }

    #[test]
    fn test_action_serialized_shape() {
        let json = serde_json::to_string(&Action::ShowCell(Coord::new(2, 0))).unwrap();
        assert_eq!(json, r#"{"ShowCell":{"row":2,"col":0}}"#);
        let json = serde_json::to_string(&Action::RemoveRow).unwrap();
        assert_eq!(json, r#""RemoveRow""#);
    }

    // ===== ActionList Tests =====

    #[test]
    fn test_action_list_order() {
        let mut list = ActionList::new();
        list.push(Action::AppendRow);
        list.push_batch(vec![
            Action::ShowCell(Coord::new(0, 0)),
            Action::ShowCell(Coord::new(0, 1)),
        ]);
        list.push(Action::RefreshGrid);

        assert_eq!(list.len(), 3);
        assert_eq!(list.action_count(), 4);
        assert_eq!(list.next_step(), Some(Step::Single(Action::AppendRow)));
        assert!(matches!(list.next_step(), Some(Step::Batch(b)) if b.len() == 2));
        assert_eq!(list.next_step(), Some(Step::Single(Action::RefreshGrid)));
        assert!(list.next_step().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_action_list_drops_empty_batch() {
        let mut list = ActionList::new();
        list.push_batch(Vec::new());
        assert!(list.is_empty());

        let list = ActionList::from(vec![Step::Batch(vec![]), Step::Single(Action::RemoveRow)]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_action_list_flattened() {
        let mut list = ActionList::new();
        list.extend([Action::HideWidget, Action::RefreshGrid]);
        list.push_batch(vec![Action::ShowWidget]);
        let kinds: Vec<ActionKind> = list.actions().map(Action::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::HideWidget,
                ActionKind::RefreshGrid,
                ActionKind::ShowWidget
            ]
        );
    }
}
