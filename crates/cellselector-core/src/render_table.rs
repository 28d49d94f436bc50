//! Live grid of visible cells and the mutations that animate it.
//!
//! The target grid is a pure function of the table shape and the mode
//! flags. The live grid starts equal to it and is then mutated one step at
//! a time while an action list plays; a final refresh snaps it back to the
//! target.

use crate::action::Coord;
use crate::animation::DEFAULT_FADE_DURATION;
use crate::cell::{AnimatedCell, AnimatedReplaceCell, Cell, CellKind, DataCell, ExpandCell};
use crate::data_table::TableShape;
use crate::error::{GridError, Result};
use crate::view::{Completion, View};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

/// Whether generated cells are plain or wrapped for a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    Plain,
    Animated { display: bool },
}

/// Owner of the live grid.
pub struct RenderTable {
    shape: TableShape,
    grid: Vec<Vec<Cell>>,
    needs_packup: bool,
    is_expanding: bool,
    max_rows_when_brief: usize,
    fade_duration: Duration,
    view: Rc<dyn View>,
}

impl fmt::Debug for RenderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTable")
            .field("shape", &self.shape)
            .field("rows", &self.grid.len())
            .field("needs_packup", &self.needs_packup)
            .field("is_expanding", &self.is_expanding)
            .field("max_rows_when_brief", &self.max_rows_when_brief)
            .finish_non_exhaustive()
    }
}

impl RenderTable {
    /// Create a render table and generate its initial grid.
    ///
    /// Fails with `InvalidArgument` when `max_rows_when_brief` is zero.
    pub fn new(
        shape: TableShape,
        needs_packup: bool,
        is_expanding: bool,
        max_rows_when_brief: usize,
        view: Rc<dyn View>,
    ) -> Result<Self> {
        if max_rows_when_brief == 0 {
            return Err(GridError::invalid_argument(
                "max rows when brief must be greater than 0",
            ));
        }
        let mut table = Self {
            shape,
            grid: Vec::new(),
            needs_packup,
            is_expanding,
            max_rows_when_brief,
            fade_duration: DEFAULT_FADE_DURATION,
            view,
        };
        table.grid = table.compute_target_grid(is_expanding);
        Ok(table)
    }

    /// Set the duration of every fade this table creates.
    #[must_use]
    pub fn with_fade_duration(mut self, duration: Duration) -> Self {
        self.fade_duration = duration;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Live grid.
    #[must_use]
    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    /// Cell kinds of the live grid, row by row.
    #[must_use]
    pub fn layout(&self) -> Vec<Vec<CellKind>> {
        layout_of(&self.grid)
    }

    /// Cell at `(row, col)`.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|cells| cells.get(col))
    }

    /// Number of live rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Shape of the backing data table.
    #[must_use]
    pub const fn shape(&self) -> TableShape {
        self.shape
    }

    /// Whether the table can collapse to brief mode.
    #[must_use]
    pub const fn needs_packup(&self) -> bool {
        self.needs_packup
    }

    /// Whether the table is in expanded mode.
    #[must_use]
    pub const fn is_expanding(&self) -> bool {
        self.is_expanding
    }

    /// Rows shown in brief mode.
    #[must_use]
    pub const fn max_rows_when_brief(&self) -> usize {
        self.max_rows_when_brief
    }

    /// Duration of the fades this table creates.
    #[must_use]
    pub const fn fade_duration(&self) -> Duration {
        self.fade_duration
    }

    /// Switch mode without touching the live grid.
    pub fn set_expanding(&mut self, is_expanding: bool) {
        self.is_expanding = is_expanding;
    }

    /// Enable or disable packup without touching the live grid.
    pub fn set_needs_packup(&mut self, needs_packup: bool) {
        self.needs_packup = needs_packup;
    }

    /// Swap the data shape. The live grid keeps showing the old data until
    /// the next [`RenderTable::refresh`].
    pub fn set_shape(&mut self, shape: TableShape) {
        self.shape = shape;
    }

    /// Whether the live grid is structurally equal to the target grid.
    #[must_use]
    pub fn matches_target(&self, expanding: bool) -> bool {
        let target = self.compute_target_grid(expanding);
        self.grid.len() == target.len()
            && self.grid.iter().zip(&target).all(|(live, want)| {
                live.len() == want.len()
                    && live.iter().zip(want).all(|(a, b)| a.same_structure(b))
            })
    }

    // =========================================================================
    // Target grid
    // =========================================================================

    /// Grid that should be visible in the given mode.
    #[must_use]
    pub fn compute_target_grid(&self, expanding: bool) -> Vec<Vec<Cell>> {
        (0..=self.shape.row_count())
            .filter_map(|row| self.target_row(row, expanding, CellStyle::Plain))
            .collect()
    }

    /// Target row `row`, including the synthetic toggle row, or `None`
    /// when the row is not part of the target grid.
    fn target_row(&self, row: usize, expanding: bool, style: CellStyle) -> Option<Vec<Cell>> {
        if row < self.shape.row_count() {
            self.includes_row(row, expanding)
                .then(|| self.render_row(row, expanding, style))
        } else if row == self.shape.row_count() && self.needs_expand_row(expanding) {
            Some(self.expand_row(expanding, style))
        } else {
            None
        }
    }

    fn includes_row(&self, row: usize, expanding: bool) -> bool {
        !(self.needs_packup && !expanding && row >= self.max_rows_when_brief)
    }

    /// A full last data row leaves no room for the toggle, so it moves to
    /// its own row.
    fn needs_expand_row(&self, expanding: bool) -> bool {
        self.needs_packup && expanding && self.shape.last_row_is_full()
    }

    fn render_row(&self, row: usize, expanding: bool, style: CellStyle) -> Vec<Cell> {
        let width = self.shape.width();
        let len = self.shape.row_len(row);
        let is_last = self.shape.last_row() == Some(row);

        let mut cells: Vec<Cell> = (0..len)
            .map(|col| self.data_cell(DataCell::new(row, col), style))
            .collect();

        if self.needs_packup && expanding {
            if is_last && len < width {
                cells.push(self.expand_cell(ExpandCell::new(expanding), style));
            }
        } else if self.needs_packup && row + 1 == self.max_rows_when_brief {
            cells.pop();
            cells.push(self.expand_cell(ExpandCell::new(expanding), style));
        }

        if is_last {
            pad(&mut cells, width);
        }
        cells
    }

    fn expand_row(&self, expanding: bool, style: CellStyle) -> Vec<Cell> {
        let mut cells = vec![self.expand_cell(ExpandCell::new(expanding), style)];
        pad(&mut cells, self.shape.width());
        cells
    }

    fn data_cell(&self, cell: DataCell, style: CellStyle) -> Cell {
        match style {
            CellStyle::Plain => Cell::Data(cell),
            CellStyle::Animated { display } => {
                Cell::AnimatedData(AnimatedCell::new(display, cell, self.fade_duration))
            }
        }
    }

    fn expand_cell(&self, cell: ExpandCell, style: CellStyle) -> Cell {
        match style {
            CellStyle::Plain => Cell::Expand(cell),
            CellStyle::Animated { display } => {
                Cell::AnimatedExpand(AnimatedCell::new(display, cell, self.fade_duration))
            }
        }
    }

    /// Position of the expand toggle in the live grid.
    ///
    /// Fails with `NotFound` when the grid has none; callers only ask while
    /// packup is enabled, so this is a contract violation.
    pub fn expand_cell_coordinate(&self) -> Result<Coord> {
        self.grid
            .iter()
            .enumerate()
            .find_map(|(row, cells)| {
                cells
                    .iter()
                    .position(Cell::is_expand)
                    .map(|col| Coord::new(row, col))
            })
            .ok_or_else(|| GridError::NotFound("there is no expand cell in the grid".into()))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn repaint(&self) -> Completion {
        self.view.request_repaint(&self.grid)
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row < self.grid.len() {
            Ok(())
        } else {
            Err(GridError::invalid_argument(format!(
                "row {row} is outside the grid ({} rows)",
                self.grid.len()
            )))
        }
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        self.check_row(row)?;
        let width = self.grid[row].len();
        if col < width {
            Ok(())
        } else {
            Err(GridError::invalid_argument(format!(
                "column {col} is outside row {row} ({width} cells)"
            )))
        }
    }

    /// Append the next row with transparent animated cells.
    ///
    /// Appends the next data row, or the synthetic toggle row once every
    /// data row is present. Fails with `IllegalState` when neither applies.
    pub fn append_row_with_animated_cell(&mut self) -> Result<Completion> {
        let next = self.grid.len();
        let style = CellStyle::Animated { display: false };
        let row = self
            .target_row(next, self.is_expanding, style)
            .ok_or_else(|| GridError::illegal_state("there is no render row to append"))?;
        self.grid.push(row);
        trace!(row = next, "appended animated row");
        Ok(self.repaint())
    }

    /// Run the animation of the cell at `(row, col)`.
    ///
    /// Fails with `IllegalState` when the cell is not an animated variant.
    pub fn animate_cell(&self, row: usize, col: usize) -> Result<Completion> {
        self.check_cell(row, col)?;
        trace!(row, col, "animating cell");
        self.grid[row][col]
            .animate(self.view.as_ref())
            .ok_or_else(|| {
                GridError::illegal_state(format!(
                    "cell at ({row}, {col}) is {:?}, which cannot animate",
                    self.grid[row][col].kind()
                ))
            })
    }

    /// Wrap the cell at `(row, col)` and its target-mode replacement into a
    /// cross-fade. Does not start the fade.
    pub fn replace_cell(&mut self, row: usize, col: usize) -> Result<Completion> {
        self.check_cell(row, col)?;
        let replacement = self
            .target_row(row, self.is_expanding, CellStyle::Animated { display: false })
            .and_then(|cells| cells.into_iter().nth(col))
            .ok_or_else(|| {
                GridError::illegal_state(format!("no replacement for cell ({row}, {col})"))
            })?;
        let current = std::mem::replace(&mut self.grid[row][col], Cell::Empty);
        trace!(row, col, from = ?current.kind(), to = ?replacement.kind(), "replacing cell");
        self.grid[row][col] = Cell::AnimatedReplace(AnimatedReplaceCell::new(
            current,
            replacement,
            self.fade_duration,
        ));
        Ok(self.repaint())
    }

    /// Collapse the cross-fade at `(row, col)` to its plain replacement.
    pub fn replace_cell_finish(&mut self, row: usize, col: usize) -> Result<Completion> {
        self.check_cell(row, col)?;
        let settled = match &self.grid[row][col] {
            Cell::AnimatedReplace(replace) => match replace.replacement().settled() {
                Cell::Expand(_) => Cell::expand(self.is_expanding),
                other => other,
            },
            other => {
                return Err(GridError::illegal_state(format!(
                    "cell at ({row}, {col}) is {:?}, not a replace cell",
                    other.kind()
                )))
            }
        };
        self.grid[row][col] = settled;
        Ok(self.repaint())
    }

    /// Turn every non-empty cell of `row` into a fade-out.
    pub fn pre_remove_row(&mut self, row: usize) -> Result<Completion> {
        self.check_row(row)?;
        let duration = self.fade_duration;
        for cell in &mut self.grid[row] {
            *cell = cell.fading_out(duration);
        }
        trace!(row, "row prepared for removal");
        Ok(self.repaint())
    }

    /// Drop the last row.
    pub fn remove_row(&mut self) -> Result<Completion> {
        self.grid
            .pop()
            .ok_or_else(|| GridError::illegal_state("there is no render row to remove"))?;
        trace!(rows = self.grid.len(), "removed last row");
        Ok(self.repaint())
    }

    /// Regenerate the live grid from the current mode.
    pub fn refresh(&mut self) -> Completion {
        self.grid = self.compute_target_grid(self.is_expanding);
        trace!(rows = self.grid.len(), expanding = self.is_expanding, "grid refreshed");
        self.repaint()
    }
}

fn pad(cells: &mut Vec<Cell>, width: usize) {
    while cells.len() < width {
        cells.push(Cell::Empty);
    }
}

/// Cell kinds of `grid`, row by row.
#[must_use]
pub fn layout_of(grid: &[Vec<Cell>]) -> Vec<Vec<CellKind>> {
    grid.iter()
        .map(|row| row.iter().map(Cell::kind).collect())
        .collect()
}
