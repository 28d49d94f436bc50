//! Grid position markers: data, expand toggle, padding and their
//! transient animated forms.

use crate::animation::{Fade, Opacity};
use crate::view::{Completion, View};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A position backed by a real data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataCell {
    /// Data row
    pub row: usize,
    /// Data column
    pub col: usize,
}

impl DataCell {
    /// Create a data cell.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The expand/collapse toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpandCell {
    /// Whether the table is expanded while this toggle is shown
    pub is_expanding: bool,
}

impl ExpandCell {
    /// Create an expand cell.
    #[must_use]
    pub const fn new(is_expanding: bool) -> Self {
        Self { is_expanding }
    }
}

/// A cell wrapped with a pending visibility toggle.
///
/// A cell created with `display == true` starts fully visible and fades
/// out; with `display == false` it starts transparent and fades in.
#[derive(Debug, Clone)]
pub struct AnimatedCell<C> {
    display: bool,
    inner: C,
    opacity: Opacity,
    duration: Duration,
}

impl<C> AnimatedCell<C> {
    /// Wrap `inner` with a fade of `duration`.
    #[must_use]
    pub fn new(display: bool, inner: C, duration: Duration) -> Self {
        let opacity = if display {
            Opacity::visible()
        } else {
            Opacity::hidden()
        };
        Self {
            display,
            inner,
            opacity,
            duration,
        }
    }

    /// Whether the cell was visible before the fade.
    #[must_use]
    pub const fn display(&self) -> bool {
        self.display
    }

    /// Wrapped cell.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Animation progress handle.
    #[must_use]
    pub const fn opacity(&self) -> &Opacity {
        &self.opacity
    }

    /// Fade duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Toggle visibility; the completion resolves once when the fade ends.
    pub fn animate(&self, view: &dyn View) -> Completion {
        let target = if self.display { 0.0 } else { 1.0 };
        view.animate(Fade::to(&self.opacity, target, self.duration))
    }
}

/// Cross-fade between the cell currently shown and its replacement.
#[derive(Debug, Clone)]
pub struct AnimatedReplaceCell {
    current: Box<Cell>,
    replacement: Box<Cell>,
    current_opacity: Opacity,
    replacement_opacity: Opacity,
    duration: Duration,
}

impl AnimatedReplaceCell {
    /// Create a cross-fade from `current` to `replacement`.
    #[must_use]
    pub fn new(current: Cell, replacement: Cell, duration: Duration) -> Self {
        Self {
            current: Box::new(current),
            replacement: Box::new(replacement),
            current_opacity: Opacity::visible(),
            replacement_opacity: Opacity::hidden(),
            duration,
        }
    }

    /// Cell being faded out.
    #[must_use]
    pub fn current(&self) -> &Cell {
        &self.current
    }

    /// Cell being faded in.
    #[must_use]
    pub fn replacement(&self) -> &Cell {
        &self.replacement
    }

    /// Opacity of the outgoing cell.
    #[must_use]
    pub const fn current_opacity(&self) -> &Opacity {
        &self.current_opacity
    }

    /// Opacity of the incoming cell.
    #[must_use]
    pub const fn replacement_opacity(&self) -> &Opacity {
        &self.replacement_opacity
    }

    /// Run both fades; resolves when both have finished.
    pub fn animate(&self, view: &dyn View) -> Completion {
        let out = view.animate(Fade::to(&self.current_opacity, 0.0, self.duration));
        let inn = view.animate(Fade::to(&self.replacement_opacity, 1.0, self.duration));
        futures::future::join(out, inn).map(drop).boxed_local()
    }
}

/// Discriminant of [`Cell`], used for structural comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Data,
    Expand,
    Empty,
    AnimatedData,
    AnimatedExpand,
    AnimatedReplace,
}

/// What occupies one grid position.
#[derive(Debug, Clone)]
pub enum Cell {
    /// Real data item
    Data(DataCell),
    /// Expand/collapse toggle
    Expand(ExpandCell),
    /// Padding after a short last row
    Empty,
    /// Data cell mid-fade
    AnimatedData(AnimatedCell<DataCell>),
    /// Toggle mid-fade
    AnimatedExpand(AnimatedCell<ExpandCell>),
    /// Cross-fade between two cells
    AnimatedReplace(AnimatedReplaceCell),
}

impl Cell {
    /// Plain data cell.
    #[must_use]
    pub const fn data(row: usize, col: usize) -> Self {
        Self::Data(DataCell::new(row, col))
    }

    /// Plain expand cell.
    #[must_use]
    pub const fn expand(is_expanding: bool) -> Self {
        Self::Expand(ExpandCell::new(is_expanding))
    }

    /// Discriminant.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        match self {
            Self::Data(_) => CellKind::Data,
            Self::Expand(_) => CellKind::Expand,
            Self::Empty => CellKind::Empty,
            Self::AnimatedData(_) => CellKind::AnimatedData,
            Self::AnimatedExpand(_) => CellKind::AnimatedExpand,
            Self::AnimatedReplace(_) => CellKind::AnimatedReplace,
        }
    }

    /// Padding cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Expand toggle, plain or animated.
    #[must_use]
    pub const fn is_expand(&self) -> bool {
        matches!(self, Self::Expand(_) | Self::AnimatedExpand(_))
    }

    /// Whether [`Cell::animate`] applies.
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        matches!(
            self,
            Self::AnimatedData(_) | Self::AnimatedExpand(_) | Self::AnimatedReplace(_)
        )
    }

    /// Underlying data position, plain or animated.
    #[must_use]
    pub const fn data_cell(&self) -> Option<DataCell> {
        match self {
            Self::Data(cell) => Some(*cell),
            Self::AnimatedData(animated) => Some(animated.inner),
            _ => None,
        }
    }

    /// Underlying toggle, plain or animated.
    #[must_use]
    pub const fn expand_cell(&self) -> Option<ExpandCell> {
        match self {
            Self::Expand(cell) => Some(*cell),
            Self::AnimatedExpand(animated) => Some(animated.inner),
            _ => None,
        }
    }

    /// Plain cell this one settles into once its animation is over.
    #[must_use]
    pub fn settled(&self) -> Self {
        match self {
            Self::Data(cell) => Self::Data(*cell),
            Self::Expand(cell) => Self::Expand(*cell),
            Self::Empty => Self::Empty,
            Self::AnimatedData(animated) => Self::Data(animated.inner),
            Self::AnimatedExpand(animated) => Self::Expand(animated.inner),
            Self::AnimatedReplace(replace) => replace.replacement.settled(),
        }
    }

    /// Fade-out counterpart used before a row is removed.
    #[must_use]
    pub fn fading_out(&self, duration: Duration) -> Self {
        match self.settled() {
            Self::Data(cell) => Self::AnimatedData(AnimatedCell::new(true, cell, duration)),
            Self::Expand(cell) => Self::AnimatedExpand(AnimatedCell::new(true, cell, duration)),
            other => other,
        }
    }

    /// Start this cell's animation, or `None` for a static cell.
    pub fn animate(&self, view: &dyn View) -> Option<Completion> {
        match self {
            Self::AnimatedData(animated) => Some(animated.animate(view)),
            Self::AnimatedExpand(animated) => Some(animated.animate(view)),
            Self::AnimatedReplace(replace) => Some(replace.animate(view)),
            _ => None,
        }
    }

    /// Same kind and same inner position/toggle state.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.data_cell() == other.data_cell()
            && self.expand_cell() == other.expand_cell()
    }
}
