//! Plays an action list back against a render table.
//!
//! The reducer is a three-state machine (`Idle`, `Running`, `Cancelled`).
//! Steps run strictly in list order; every step is awaited before the next
//! one starts. A parallel batch starts all its actions, then waits until
//! every one of them has signalled completion. Cancellation is checked at
//! step boundaries only, so in-flight animations always finish.

use crate::action::{Action, ActionList, Coord, Step};
use crate::error::{GridError, Result};
use crate::render_table::RenderTable;
use crate::view::{Completion, WidgetVisibility};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::cell::Cell as SharedState;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Reducer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReducerState {
    /// Nothing playing
    #[default]
    Idle,
    /// Playing an action list
    Running,
    /// Asked to stop after the current step
    Cancelled,
}

/// How a playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackOutcome {
    /// Every step ran
    Completed {
        /// Steps executed
        steps: usize,
    },
    /// Stopped early by [`Reducer::cancel`]
    Cancelled {
        /// Steps executed before stopping
        steps: usize,
        /// Steps discarded
        remaining: usize,
    },
}

impl PlaybackOutcome {
    /// Whether the playback was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Cloneable handle that cancels a running playback.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Rc<SharedState<ReducerState>>,
}

impl CancelHandle {
    /// Request cancellation. No effect unless a playback is running.
    pub fn cancel(&self) {
        match self.state.get() {
            ReducerState::Running => {
                debug!("playback cancellation requested");
                self.state.set(ReducerState::Cancelled);
            }
            ReducerState::Cancelled => {}
            ReducerState::Idle => warn!("cancel requested on an idle reducer"),
        }
    }

    /// Current state of the reducer.
    #[must_use]
    pub fn state(&self) -> ReducerState {
        self.state.get()
    }
}

/// Sequencer for action lists.
#[derive(Debug, Default)]
pub struct Reducer {
    state: Rc<SharedState<ReducerState>>,
}

impl Reducer {
    /// Create an idle reducer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ReducerState {
        self.state.get()
    }

    /// Whether a playback is in progress (running or winding down).
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.get() != ReducerState::Idle
    }

    /// Handle for cancelling from outside the playback future.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            state: Rc::clone(&self.state),
        }
    }

    /// Stop after the current step.
    pub fn cancel(&self) {
        self.cancel_handle().cancel();
    }

    /// Play `actions` against `table`.
    ///
    /// `on_finished` runs exactly once when the playback completes or is
    /// cancelled; the reducer is `Idle` again by then. A fatal error also
    /// returns the reducer to `Idle` but skips `on_finished`.
    ///
    /// Fails with `IllegalState` when a playback is already in progress.
    pub async fn start<F>(
        &self,
        actions: ActionList,
        table: &mut RenderTable,
        widget: &dyn WidgetVisibility,
        on_finished: F,
    ) -> Result<PlaybackOutcome>
    where
        F: FnOnce(),
    {
        if self.is_busy() {
            return Err(GridError::illegal_state("reducer is already running"));
        }
        self.state.set(ReducerState::Running);
        let _idle = IdleOnDrop(&self.state);
        debug!(steps = actions.len(), "playback started");

        let result = self.play(actions, table, widget).await;
        self.state.set(ReducerState::Idle);

        match result {
            Ok(outcome) => {
                debug!(?outcome, "playback finished");
                on_finished();
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "playback aborted");
                Err(err)
            }
        }
    }

    async fn play(
        &self,
        mut actions: ActionList,
        table: &mut RenderTable,
        widget: &dyn WidgetVisibility,
    ) -> Result<PlaybackOutcome> {
        let mut steps = 0;
        loop {
            if self.state.get() == ReducerState::Cancelled {
                return Ok(PlaybackOutcome::Cancelled {
                    steps,
                    remaining: actions.len(),
                });
            }
            let Some(step) = actions.next_step() else {
                return Ok(PlaybackOutcome::Completed { steps });
            };
            match step {
                Step::Single(action) => dispatch(action, table, widget)?.await,
                Step::Batch(batch) => run_batch(batch, table, widget).await?,
            }
            steps += 1;
        }
    }
}

/// Resets the reducer when a playback future is dropped mid-flight.
struct IdleOnDrop<'a>(&'a SharedState<ReducerState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(ReducerState::Idle);
    }
}

/// Start every lane of a batch and wait for all of them.
///
/// Actions on the same cell form one lane and run in listed order, so a
/// cross-fade group inside a batch still wraps, animates and settles in
/// sequence. Distinct lanes run concurrently.
async fn run_batch(
    batch: Vec<Action>,
    table: &mut RenderTable,
    widget: &dyn WidgetVisibility,
) -> Result<()> {
    let mut lanes = into_lanes(batch);
    let mut pending: FuturesUnordered<LocalBoxFuture<'static, usize>> = FuturesUnordered::new();

    for (lane, queue) in lanes.iter_mut().enumerate() {
        if let Some(action) = queue.pop_front() {
            pending.push(tagged(dispatch(action, table, widget)?, lane));
        }
    }
    while let Some(lane) = pending.next().await {
        if let Some(action) = lanes[lane].pop_front() {
            pending.push(tagged(dispatch(action, table, widget)?, lane));
        }
    }
    Ok(())
}

fn into_lanes(batch: Vec<Action>) -> Vec<VecDeque<Action>> {
    let mut lanes: Vec<(Option<Coord>, VecDeque<Action>)> = Vec::new();
    for action in batch {
        let target = action.target();
        match lanes
            .iter_mut()
            .find(|(coord, _)| target.is_some() && *coord == target)
        {
            Some((_, lane)) => lane.push_back(action),
            None => lanes.push((target, VecDeque::from([action]))),
        }
    }
    lanes.into_iter().map(|(_, lane)| lane).collect()
}

fn tagged(done: Completion, lane: usize) -> LocalBoxFuture<'static, usize> {
    done.map(move |()| lane).boxed_local()
}

/// Perform the mutation for `action` and return its completion.
fn dispatch(
    action: Action,
    table: &mut RenderTable,
    widget: &dyn WidgetVisibility,
) -> Result<Completion> {
    trace!(?action, "dispatching action");
    match action {
        Action::AppendRow => table.append_row_with_animated_cell(),
        Action::ShowCell(c) | Action::HideCell(c) | Action::AnimateReplace(c) => {
            table.animate_cell(c.row, c.col)
        }
        Action::ReplaceCell(c) => table.replace_cell(c.row, c.col),
        Action::ReplaceFinish(c) => table.replace_cell_finish(c.row, c.col),
        Action::PreRemoveRow { row } => table.pre_remove_row(row),
        Action::RemoveRow => table.remove_row(),
        Action::RefreshGrid => Ok(table.refresh()),
        Action::HideWidget => Ok(widget.hide_widget()),
        Action::ShowWidget => Ok(widget.show_widget()),
        Action::ExpandRequested | Action::PackupRequested | Action::ReplaceDataRequested => {
            Err(GridError::UnsupportedOperation(format!(
                "{:?} cannot be played back",
                action.kind()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_manager::ActionManager;
    use crate::animation::Fade;
    use crate::cell::{Cell, CellKind};
    use crate::data_table::TableShape;
    use crate::view::View;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::task::{Context, Poll};

    /// Repaints resolve at once; fades wait for the test to release them.
    #[derive(Default)]
    struct ManualView {
        fades: RefCell<Vec<(Fade, oneshot::Sender<()>)>>,
        repaints: SharedState<usize>,
    }

    impl ManualView {
        fn release_all(&self) -> usize {
            let fades: Vec<_> = self.fades.borrow_mut().drain(..).collect();
            let n = fades.len();
            for (fade, tx) in fades {
                fade.opacity.set(fade.to);
                let _ = tx.send(());
            }
            n
        }

        fn release_last(&self) -> bool {
            let next = self.fades.borrow_mut().pop();
            next.is_some_and(|(fade, tx)| {
                fade.opacity.set(fade.to);
                tx.send(()).is_ok()
            })
        }

        fn pending(&self) -> usize {
            self.fades.borrow().len()
        }
    }

    impl View for ManualView {
        fn request_repaint(&self, _grid: &[Vec<Cell>]) -> Completion {
            self.repaints.set(self.repaints.get() + 1);
            futures::future::ready(()).boxed_local()
        }

        fn animate(&self, fade: Fade) -> Completion {
            let (tx, rx) = oneshot::channel();
            self.fades.borrow_mut().push((fade, tx));
            rx.map(drop).boxed_local()
        }
    }

    /// Widget fades complete immediately.
    #[derive(Default)]
    struct InstantWidget {
        calls: RefCell<Vec<&'static str>>,
    }

    impl WidgetVisibility for InstantWidget {
        fn hide_widget(&self) -> Completion {
            self.calls.borrow_mut().push("hide");
            futures::future::ready(()).boxed_local()
        }

        fn show_widget(&self) -> Completion {
            self.calls.borrow_mut().push("show");
            futures::future::ready(()).boxed_local()
        }
    }

    fn brief_table(view: &Rc<ManualView>) -> RenderTable {
        let shape = TableShape::new(7, 3).unwrap();
        RenderTable::new(shape, true, false, 2, view.clone()).unwrap()
    }

    fn poll_once<F: std::future::Future + Unpin>(fut: &mut F) -> Poll<F::Output> {
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        std::pin::Pin::new(fut).poll(&mut cx)
    }

    // ===== Playback Tests =====

    #[test]
    fn test_expand_playback_reaches_target() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        table.set_expanding(true);
        let actions = ActionManager::new().on_expand_requested(&table);

        let reducer = Reducer::new();
        let finished = SharedState::new(0);
        let outcome = {
            let mut run = Box::pin(reducer.start(actions, &mut table, &widget, || {
                finished.set(finished.get() + 1);
            }));
            loop {
                if let Poll::Ready(out) = poll_once(&mut run) {
                    break out.unwrap();
                }
                assert!(view.release_all() > 0, "playback stalled");
            }
        };

        assert_eq!(outcome, PlaybackOutcome::Completed { steps: 6 });
        assert_eq!(finished.get(), 1);
        assert_eq!(reducer.state(), ReducerState::Idle);
        assert!(table.matches_target(true));
    }

    #[test]
    fn test_batch_waits_for_every_completion() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        table.set_expanding(true);
        drop(table.append_row_with_animated_cell().unwrap());

        let mut actions = ActionList::new();
        actions.push_batch(vec![
            Action::ShowCell(Coord::new(2, 0)),
            Action::ShowCell(Coord::new(2, 1)),
        ]);
        actions.push(Action::RefreshGrid);

        let reducer = Reducer::new();
        let mut run = Box::pin(reducer.start(actions, &mut table, &widget, || {}));
        assert!(poll_once(&mut run).is_pending());
        assert_eq!(view.pending(), 2);
        let repaints = view.repaints.get();

        // Release out of order; the refresh must wait for the second one.
        assert!(view.release_last());
        assert!(poll_once(&mut run).is_pending());
        assert_eq!(view.repaints.get(), repaints);

        assert!(view.release_last());
        assert!(matches!(
            poll_once(&mut run),
            Poll::Ready(Ok(PlaybackOutcome::Completed { steps: 2 }))
        ));
        assert_eq!(view.repaints.get(), repaints + 1);
    }

    #[test]
    fn test_cancel_stops_after_current_step() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        table.set_expanding(true);
        let actions = ActionManager::new().on_expand_requested(&table);

        let reducer = Reducer::new();
        let handle = reducer.cancel_handle();
        let finished = SharedState::new(0);
        {
            let mut run = Box::pin(reducer.start(actions, &mut table, &widget, || {
                finished.set(finished.get() + 1);
            }));

            // ReplaceCell ran, AnimateReplace is waiting on its two fades.
            assert!(poll_once(&mut run).is_pending());
            assert_eq!(view.pending(), 2);
            handle.cancel();
            assert_eq!(handle.state(), ReducerState::Cancelled);
            assert!(poll_once(&mut run).is_pending());

            view.release_all();
            match poll_once(&mut run) {
                Poll::Ready(Ok(PlaybackOutcome::Cancelled { steps, remaining })) => {
                    assert_eq!(steps, 2);
                    assert_eq!(remaining, 4);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(view.pending(), 0);
        assert_eq!(finished.get(), 1);
        assert_eq!(reducer.state(), ReducerState::Idle);
        assert_eq!(table.layout()[1][2], CellKind::AnimatedReplace);
    }

    #[test]
    fn test_replace_group_in_batch_runs_in_order() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let shape = TableShape::new(7, 3).unwrap();
        let mut table = RenderTable::new(shape, true, true, 2, view.clone()).unwrap();
        table.set_expanding(false);
        let actions = ActionManager::new().on_packup_requested(&table);

        let reducer = Reducer::new();
        let outcome = {
            let mut run = Box::pin(reducer.start(actions, &mut table, &widget, || {}));
            loop {
                match poll_once(&mut run) {
                    Poll::Ready(out) => break out.unwrap(),
                    Poll::Pending => assert!(view.release_all() > 0, "playback stalled"),
                }
            }
        };
        assert!(!outcome.is_cancelled());
        assert!(table.matches_target(false));
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_replace_data_uses_widget_fades() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        table.set_shape(TableShape::new(2, 3).unwrap());
        table.set_needs_packup(false);
        let actions = ActionManager::new().on_replace_data_requested();

        let outcome = block_on(Reducer::new().start(actions, &mut table, &widget, || {})).unwrap();
        assert_eq!(outcome, PlaybackOutcome::Completed { steps: 3 });
        assert_eq!(*widget.calls.borrow(), vec!["hide", "show"]);
        assert_eq!(table.row_count(), 1);
    }

    // ===== Error Tests =====

    #[test]
    fn test_intent_in_list_is_unsupported() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        let mut actions = ActionList::new();
        actions.push(Action::ExpandRequested);

        let reducer = Reducer::new();
        let finished = SharedState::new(false);
        let err = block_on(reducer.start(actions, &mut table, &widget, || finished.set(true)))
            .unwrap_err();
        assert!(matches!(err, GridError::UnsupportedOperation(_)));
        assert!(!finished.get());
        assert_eq!(reducer.state(), ReducerState::Idle);
    }

    #[test]
    fn test_failed_mutation_propagates() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        let mut actions = ActionList::new();
        actions.push(Action::ShowCell(Coord::new(0, 0)));

        let err = block_on(Reducer::new().start(actions, &mut table, &widget, || {})).unwrap_err();
        assert!(matches!(err, GridError::IllegalState(_)));
    }

    #[test]
    fn test_start_while_running_is_illegal() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut first = brief_table(&view);
        let mut second = brief_table(&view);
        first.set_expanding(true);
        let actions = ActionManager::new().on_expand_requested(&first);

        let reducer = Reducer::new();
        let mut run = Box::pin(reducer.start(actions, &mut first, &widget, || {}));
        assert!(poll_once(&mut run).is_pending());

        let err = block_on(reducer.start(ActionList::new(), &mut second, &widget, || {}))
            .unwrap_err();
        assert!(matches!(err, GridError::IllegalState(_)));

        drop(run);
        assert_eq!(reducer.state(), ReducerState::Idle);
    }

    #[test]
    fn test_empty_list_finishes_immediately() {
        let view = Rc::new(ManualView::default());
        let widget = InstantWidget::default();
        let mut table = brief_table(&view);
        let finished = SharedState::new(0);
        let outcome = block_on(Reducer::new().start(ActionList::new(), &mut table, &widget, || {
            finished.set(finished.get() + 1);
        }))
        .unwrap();
        assert_eq!(outcome, PlaybackOutcome::Completed { steps: 0 });
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn test_cancel_on_idle_is_noop() {
        let reducer = Reducer::new();
        reducer.cancel();
        assert_eq!(reducer.state(), ReducerState::Idle);
    }

    #[test]
    fn test_lanes_group_by_target() {
        let a = Coord::new(0, 0);
        let b = Coord::new(0, 1);
        let lanes = into_lanes(vec![
            Action::ReplaceCell(a),
            Action::ReplaceCell(b),
            Action::AnimateReplace(a),
            Action::RemoveRow,
            Action::RemoveRow,
        ]);
        assert_eq!(lanes.len(), 4);
        assert_eq!(
            lanes[0],
            VecDeque::from([Action::ReplaceCell(a), Action::AnimateReplace(a)])
        );
    }
}
