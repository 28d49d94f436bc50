//! Grid diffing and animated playback for expandable cell selectors.
//!
//! This crate provides the engine behind an expandable cell grid:
//! - Data model: [`DataTable`], [`TableShape`] and the [`Cell`] variants
//! - Live grid: [`RenderTable`] derives the target grid and mutates the
//!   live one step by step
//! - Diffing: [`ActionManager`] turns user intents into an [`ActionList`]
//! - Playback: [`Reducer`] runs the list, awaiting every step through the
//!   [`View`] and [`WidgetVisibility`] collaborators
//!
//! Everything is single-threaded and completion driven: each mutation
//! returns a [`Completion`] future and the reducer awaits it before moving
//! on.

mod action;
mod action_manager;
mod animation;
mod cell;
mod data_table;
mod error;
mod reducer;
mod render_table;
mod view;

pub use action::{Action, ActionKind, ActionList, Coord, Payload, Step};
pub use action_manager::ActionManager;
pub use animation::{EasedValue, Easing, Fade, Opacity, DEFAULT_FADE_DURATION};
pub use cell::{AnimatedCell, AnimatedReplaceCell, Cell, CellKind, DataCell, ExpandCell};
pub use data_table::{DataTable, TableShape};
pub use error::{GridError, Result};
pub use reducer::{CancelHandle, PlaybackOutcome, Reducer, ReducerState};
pub use render_table::{layout_of, RenderTable};
pub use view::{Completion, View, WidgetVisibility};

/// Whether a table with these options collapses to brief mode.
///
/// True when packup is allowed and the items do not fit in
/// `max_rows_when_brief` full rows.
#[must_use]
pub const fn needs_packup(
    can_packup: bool,
    item_count: usize,
    width: usize,
    max_rows_when_brief: usize,
) -> bool {
    can_packup && item_count > width.saturating_mul(max_rows_when_brief)
}
