//! Turns user intents into action lists by diffing the live grid against
//! the target grid.
//!
//! # Algorithm
//!
//! Expanding walks rows top to bottom: rows present in both grids get a
//! cross-fade for every column whose cell kind differs, new rows get an
//! `AppendRow` and all their non-empty cells fade in together at the end.
//!
//! Collapsing walks rows bottom to top and columns right to left: rows
//! missing from the target are faded out and removed, surviving rows get
//! their cross-fades in one batch after the removals.
//!
//! Both lists end with a `RefreshGrid` that snaps the live grid to the
//! target.

use crate::action::{Action, ActionList, Coord};
use crate::cell::Cell;
use crate::error::{GridError, Result};
use crate::render_table::RenderTable;
use tracing::debug;

/// Stateless generator of action lists.
///
/// Only ever reads the render table, so it cannot run while a reducer
/// holds the table mutably.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionManager;

impl ActionManager {
    /// Create an action manager.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Build the action list for a user intent.
    ///
    /// Fails with `UnsupportedOperation` for mutation commands.
    pub fn dispatch_intent(&self, intent: &Action, table: &RenderTable) -> Result<ActionList> {
        let list = match intent {
            Action::ExpandRequested => self.on_expand_requested(table),
            Action::PackupRequested => self.on_packup_requested(table),
            Action::ReplaceDataRequested => self.on_replace_data_requested(),
            other => {
                return Err(GridError::UnsupportedOperation(format!(
                    "{:?} is not a user intent",
                    other.kind()
                )))
            }
        };
        debug!(
            intent = ?intent.kind(),
            steps = list.len(),
            actions = list.action_count(),
            "generated action list"
        );
        Ok(list)
    }

    /// Action list that grows the live grid into the expanded grid.
    #[must_use]
    pub fn on_expand_requested(&self, table: &RenderTable) -> ActionList {
        let current = table.grid();
        let target = table.compute_target_grid(true);
        let mut list = ActionList::new();
        let mut shows = Vec::new();

        for (row, wanted) in target.iter().enumerate() {
            match current.get(row) {
                Some(live) => {
                    for col in changed_columns(live, wanted) {
                        list.extend(Action::replace_group(Coord::new(row, col)));
                    }
                }
                None => {
                    list.push(Action::AppendRow);
                    shows.extend(
                        non_empty_columns(wanted).map(|col| Action::ShowCell(Coord::new(row, col))),
                    );
                }
            }
        }

        list.push_batch(shows);
        list.push(Action::RefreshGrid);
        list
    }

    /// Action list that shrinks the live grid into the brief grid.
    #[must_use]
    pub fn on_packup_requested(&self, table: &RenderTable) -> ActionList {
        let current = table.grid();
        let target = table.compute_target_grid(false);
        let mut pre_removes = Vec::new();
        let mut hides = Vec::new();
        let mut removes = Vec::new();
        let mut replaces = Vec::new();

        for (row, live) in current.iter().enumerate().rev() {
            match target.get(row) {
                Some(wanted) => {
                    let mut changed: Vec<usize> = changed_columns(live, wanted).collect();
                    changed.reverse();
                    for col in changed {
                        replaces.extend(Action::replace_group(Coord::new(row, col)));
                    }
                }
                None => {
                    pre_removes.push(Action::PreRemoveRow { row });
                    let mut cols: Vec<usize> = non_empty_columns(live).collect();
                    cols.reverse();
                    hides.extend(cols.into_iter().map(|col| Action::HideCell(Coord::new(row, col))));
                    removes.push(Action::RemoveRow);
                }
            }
        }

        let mut list = ActionList::new();
        list.extend(pre_removes);
        list.push_batch(hides);
        list.extend(removes);
        list.push_batch(replaces);
        list.push(Action::RefreshGrid);
        list
    }

    /// Action list for a data source swap: fade out, rebuild, fade in.
    #[must_use]
    pub fn on_replace_data_requested(&self) -> ActionList {
        let mut list = ActionList::new();
        list.extend([Action::HideWidget, Action::RefreshGrid, Action::ShowWidget]);
        list
    }
}

/// Columns of `wanted` whose kind differs from the live row.
fn changed_columns<'a>(live: &'a [Cell], wanted: &'a [Cell]) -> impl Iterator<Item = usize> + 'a {
    wanted
        .iter()
        .enumerate()
        .filter(move |(col, cell)| live.get(*col).map(Cell::kind) != Some(cell.kind()))
        .map(|(col, _)| col)
}

fn non_empty_columns(row: &[Cell]) -> impl Iterator<Item = usize> + '_ {
    row.iter()
        .enumerate()
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(col, _)| col)
}
