//! Expandable grid of caller-rendered items.
//!
//! [`CellSelector`] owns the data, the live grid and the playback machinery.
//! The host supplies render callbacks through [`CellSelector::draw`] and
//! switches modes through the async [`CellSelector::toggle_expanding`] and
//! [`CellSelector::replace_items`] calls, which resolve once the grid has
//! settled.

use crate::config::CellSelectorConfig;
use cellselector_core::{
    Action, ActionList, ActionManager, CancelHandle, Cell, CellKind, DataTable, GridError,
    PlaybackOutcome, Reducer, ReducerState, RenderTable, Result, View, WidgetVisibility,
};
use std::cell::Cell as Flag;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// What the host should draw at one grid position.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawnCell<E> {
    /// Nothing
    Empty,
    /// Fully visible element
    Element(E),
    /// Element mid-fade
    Faded {
        /// Current opacity, 0 to 1
        opacity: f64,
        /// Rendered element
        element: E,
    },
    /// Two elements cross-fading in the same slot
    Crossfade {
        /// Outgoing element
        current: Box<DrawnCell<E>>,
        /// Incoming element
        replacement: Box<DrawnCell<E>>,
    },
}

impl<E> DrawnCell<E> {
    /// Whether nothing is drawn.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Fully visible element, if this is one.
    #[must_use]
    pub const fn element(&self) -> Option<&E> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Opacity the host should apply to this cell.
    #[must_use]
    pub const fn opacity(&self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Faded { opacity, .. } => *opacity,
            Self::Element(_) | Self::Crossfade { .. } => 1.0,
        }
    }

    fn faded(self, opacity: f64) -> Self {
        match self {
            Self::Element(element) => Self::Faded { opacity, element },
            other => other,
        }
    }
}

/// Handed to the expand renderer; records a toggle request when fired.
///
/// The host collects requests with [`CellSelector::take_toggle_request`]
/// and then awaits [`CellSelector::toggle_expanding`].
#[derive(Debug, Clone, Default)]
pub struct ToggleTrigger(Rc<Flag<bool>>);

impl ToggleTrigger {
    /// Request a mode switch.
    pub fn trigger(&self) {
        self.0.set(true);
    }

    /// Whether a request is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0.get()
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Expandable cell grid widget.
pub struct CellSelector<T> {
    config: CellSelectorConfig,
    data: DataTable<T>,
    table: RenderTable,
    manager: ActionManager,
    reducer: Reducer,
    visibility: Rc<dyn WidgetVisibility>,
    toggle: ToggleTrigger,
}

impl<T> fmt::Debug for CellSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellSelector")
            .field("config", &self.config)
            .field("items", &self.data.items().len())
            .field("table", &self.table)
            .field("reducer", &self.reducer.state())
            .finish_non_exhaustive()
    }
}

impl<T> CellSelector<T> {
    /// Build a selector over `items`.
    ///
    /// Fails with `InvalidArgument` when the config does not validate.
    pub fn new(
        items: Vec<T>,
        config: CellSelectorConfig,
        view: Rc<dyn View>,
        visibility: Rc<dyn WidgetVisibility>,
    ) -> Result<Self> {
        config.validate()?;
        let data = DataTable::new(items, config.width)?;
        let needs_packup = config.needs_packup(data.items().len());
        let table = RenderTable::new(
            data.shape(),
            needs_packup,
            config.default_expanded,
            config.max_rows_when_brief,
            view,
        )?
        .with_fade_duration(config.animation_duration());
        debug!(
            items = data.items().len(),
            width = config.width,
            needs_packup,
            "cell selector created"
        );
        Ok(Self {
            config,
            data,
            table,
            manager: ActionManager::new(),
            reducer: Reducer::new(),
            visibility,
            toggle: ToggleTrigger::default(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Construction options.
    #[must_use]
    pub const fn config(&self) -> &CellSelectorConfig {
        &self.config
    }

    /// Items currently shown.
    #[must_use]
    pub const fn data(&self) -> &DataTable<T> {
        &self.data
    }

    /// Live render table.
    #[must_use]
    pub const fn render_table(&self) -> &RenderTable {
        &self.table
    }

    /// Whether the grid is expanded.
    #[must_use]
    pub const fn is_expanding(&self) -> bool {
        self.table.is_expanding()
    }

    /// Whether the grid shows an expand toggle.
    #[must_use]
    pub const fn needs_packup(&self) -> bool {
        self.table.needs_packup()
    }

    /// Cell kinds of the live grid.
    #[must_use]
    pub fn layout(&self) -> Vec<Vec<CellKind>> {
        self.table.layout()
    }

    /// Playback state.
    #[must_use]
    pub fn state(&self) -> ReducerState {
        self.reducer.state()
    }

    /// Handle that stops the running playback after its current step.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.reducer.cancel_handle()
    }

    /// Trigger handed to the expand renderer.
    #[must_use]
    pub fn toggle_trigger(&self) -> ToggleTrigger {
        self.toggle.clone()
    }

    /// Consume a pending toggle request.
    pub fn take_toggle_request(&self) -> bool {
        self.toggle.take()
    }

    // =========================================================================
    // Mode switches
    // =========================================================================

    /// Switch between brief and expanded mode.
    ///
    /// Animates through the engine when the config allows it, otherwise
    /// snaps to the new grid with a single repaint (reported as one step).
    /// A cancelled playback is followed by a refresh so the grid always
    /// settles on the new mode.
    ///
    /// Fails with `IllegalState` when the grid has no expand toggle.
    pub async fn toggle_expanding(&mut self) -> Result<PlaybackOutcome> {
        if !self.table.needs_packup() {
            warn!("toggle requested on a selector without an expand cell");
            return Err(GridError::IllegalState(
                "selector has no expand cell to toggle".into(),
            ));
        }
        let expanding = !self.table.is_expanding();
        self.table.set_expanding(expanding);
        debug!(expanding, animate = self.config.can_animate, "toggling selector");

        if !self.config.can_animate {
            self.table.refresh().await;
            return Ok(PlaybackOutcome::Completed { steps: 1 });
        }

        let intent = if expanding {
            Action::ExpandRequested
        } else {
            Action::PackupRequested
        };
        let actions = self.manager.dispatch_intent(&intent, &self.table)?;
        let outcome = self.play(actions).await?;
        if outcome.is_cancelled() {
            self.table.refresh().await;
        }
        Ok(outcome)
    }

    /// Swap the items shown by the selector.
    ///
    /// The packup decision is recomputed for the new item count. With
    /// animations on, the widget fades out, rebuilds and fades back in.
    pub async fn replace_items(&mut self, items: Vec<T>) -> Result<PlaybackOutcome> {
        let data = DataTable::new(items, self.config.width)?;
        let needs_packup = self.config.needs_packup(data.items().len());
        debug!(items = data.items().len(), needs_packup, "replacing items");
        self.table.set_shape(data.shape());
        self.table.set_needs_packup(needs_packup);
        self.data = data;

        if !self.config.can_animate {
            self.table.refresh().await;
            return Ok(PlaybackOutcome::Completed { steps: 1 });
        }

        let actions = self
            .manager
            .dispatch_intent(&Action::ReplaceDataRequested, &self.table)?;
        let outcome = self.play(actions).await?;
        if outcome.is_cancelled() {
            self.table.refresh().await;
            self.visibility.show_widget().await;
        }
        Ok(outcome)
    }

    async fn play(&mut self, actions: ActionList) -> Result<PlaybackOutcome> {
        let expanding = self.table.is_expanding();
        self.reducer
            .start(actions, &mut self.table, self.visibility.as_ref(), || {
                debug!(expanding, "selector settled");
            })
            .await
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Map the live grid to drawable cells.
    ///
    /// `render_cell` receives the flat item index and the item;
    /// `render_expand` receives the toggle state and the trigger to fire
    /// when the toggle is activated.
    pub fn draw<E, C, X>(&self, render_cell: C, render_expand: X) -> Vec<Vec<DrawnCell<E>>>
    where
        C: FnMut(usize, &T) -> E,
        X: FnMut(bool, ToggleTrigger) -> E,
    {
        draw_grid(
            self.table.grid(),
            &self.data,
            &self.toggle,
            render_cell,
            render_expand,
        )
    }
}

/// Map any grid, such as a [`crate::FrameScheduler`] snapshot, to drawable
/// cells over `data`.
///
/// Data positions with no matching item draw as [`DrawnCell::Empty`].
pub fn draw_grid<T, E, C, X>(
    grid: &[Vec<Cell>],
    data: &DataTable<T>,
    trigger: &ToggleTrigger,
    mut render_cell: C,
    mut render_expand: X,
) -> Vec<Vec<DrawnCell<E>>>
where
    C: FnMut(usize, &T) -> E,
    X: FnMut(bool, ToggleTrigger) -> E,
{
    let mut painter = Painter {
        data,
        trigger,
        render_cell: &mut render_cell,
        render_expand: &mut render_expand,
    };
    grid.iter()
        .map(|row| row.iter().map(|cell| painter.paint(cell)).collect())
        .collect()
}

struct Painter<'a, T, C, X> {
    data: &'a DataTable<T>,
    trigger: &'a ToggleTrigger,
    render_cell: &'a mut C,
    render_expand: &'a mut X,
}

impl<T, E, C, X> Painter<'_, T, C, X>
where
    C: FnMut(usize, &T) -> E,
    X: FnMut(bool, ToggleTrigger) -> E,
{
    fn paint(&mut self, cell: &Cell) -> DrawnCell<E> {
        match cell {
            Cell::Empty => DrawnCell::Empty,
            Cell::Data(_) | Cell::Expand(_) => self.paint_plain(cell),
            Cell::AnimatedData(animated) => self
                .paint_plain(&cell.settled())
                .faded(animated.opacity().get()),
            Cell::AnimatedExpand(animated) => self
                .paint_plain(&cell.settled())
                .faded(animated.opacity().get()),
            Cell::AnimatedReplace(replace) => {
                let current = self
                    .paint_plain(&replace.current().settled())
                    .faded(replace.current_opacity().get());
                let replacement = self
                    .paint_plain(&replace.replacement().settled())
                    .faded(replace.replacement_opacity().get());
                DrawnCell::Crossfade {
                    current: Box::new(current),
                    replacement: Box::new(replacement),
                }
            }
        }
    }

    fn paint_plain(&mut self, cell: &Cell) -> DrawnCell<E> {
        match cell {
            Cell::Data(position) => self
                .data
                .to_flat_index(position.row, position.col)
                .ok()
                .and_then(|index| self.data.get_flat(index).map(|item| (index, item)))
                .map_or(DrawnCell::Empty, |(index, item)| {
                    DrawnCell::Element((self.render_cell)(index, item))
                }),
            Cell::Expand(toggle) => {
                DrawnCell::Element((self.render_expand)(toggle.is_expanding, self.trigger.clone()))
            }
            _ => DrawnCell::Empty,
        }
    }
}
