//! Collaborator traits the engine awaits on.

use crate::animation::Fade;
use crate::cell::Cell;
use futures::future::LocalBoxFuture;

/// Completion signal for one asynchronous step. Resolves exactly once.
pub type Completion = LocalBoxFuture<'static, ()>;

/// The visual side of a cell grid.
pub trait View {
    /// Commit `grid` to the visual tree.
    ///
    /// The returned completion must resolve only after the new grid is
    /// visible (a frame-ready acknowledgment).
    fn request_repaint(&self, grid: &[Vec<Cell>]) -> Completion;

    /// Drive `fade` until its opacity handle reaches the target value.
    fn animate(&self, fade: Fade) -> Completion;
}

/// Whole-widget fade used to bracket a data source swap.
pub trait WidgetVisibility {
    /// Fade the widget out.
    fn hide_widget(&self) -> Completion;

    /// Fade the widget back in.
    fn show_widget(&self) -> Completion;
}
