//! Flat item list viewed as a fixed-width 2-D grid.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Row/column shape of a [`DataTable`], detached from its items.
///
/// The render side only needs the shape, so it can stay non-generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    item_count: usize,
    width: usize,
}

impl TableShape {
    /// Create a shape. Fails when `width` is zero.
    pub fn new(item_count: usize, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(GridError::invalid_argument(
                "table width must be greater than 0",
            ));
        }
        Ok(Self { item_count, width })
    }

    /// Number of items.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Items per row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of data rows, `ceil(item_count / width)`.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.item_count.div_ceil(self.width)
    }

    /// Number of items in `row`, zero when the row does not exist.
    #[must_use]
    pub fn row_len(&self, row: usize) -> usize {
        let start = row.saturating_mul(self.width);
        self.item_count.saturating_sub(start).min(self.width)
    }

    /// Index of the last data row, if any.
    #[must_use]
    pub const fn last_row(&self) -> Option<usize> {
        self.row_count().checked_sub(1)
    }

    /// Whether the last data row is exactly `width` items long.
    #[must_use]
    pub fn last_row_is_full(&self) -> bool {
        self.last_row()
            .is_some_and(|row| self.row_len(row) == self.width)
    }

    /// Convert `(row, col)` to a flat index.
    pub fn to_flat_index(&self, row: usize, col: usize) -> Result<usize> {
        if col >= self.width {
            return Err(GridError::invalid_argument(format!(
                "column {col} is outside table width {}",
                self.width
            )));
        }
        row.checked_mul(self.width)
            .and_then(|base| base.checked_add(col))
            .ok_or_else(|| GridError::invalid_argument(format!("row {row} overflows")))
    }

    /// Convert a flat index to `(row, col)`.
    #[must_use]
    pub const fn to_row_col(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }
}

/// Immutable logical data source chunked into rows of `width` items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable<T> {
    items: Vec<T>,
    shape: TableShape,
}

impl<T> DataTable<T> {
    /// Create a table. Fails with `InvalidArgument` when `width` is zero.
    pub fn new(items: Vec<T>, width: usize) -> Result<Self> {
        let shape = TableShape::new(items.len(), width)?;
        Ok(Self { items, shape })
    }

    /// Item at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        let index = self.shape.to_flat_index(row, col).ok()?;
        self.items.get(index)
    }

    /// Item at a flat index.
    #[must_use]
    pub fn get_flat(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Rows in order; the last one may be shorter than `width`.
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.items.chunks(self.shape.width)
    }

    /// A single row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[T]> {
        self.rows().nth(row)
    }

    /// Items per row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.shape.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.shape.row_count()
    }

    /// All items in flat order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Shape of this table.
    #[must_use]
    pub const fn shape(&self) -> TableShape {
        self.shape
    }

    /// See [`TableShape::to_flat_index`].
    pub fn to_flat_index(&self, row: usize, col: usize) -> Result<usize> {
        self.shape.to_flat_index(row, col)
    }

    /// See [`TableShape::to_row_col`].
    #[must_use]
    pub const fn to_row_col(&self, index: usize) -> (usize, usize) {
        self.shape.to_row_col(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seven() -> DataTable<u32> {
        DataTable::new((1..=7).collect(), 3).unwrap()
    }

    // ===== Construction Tests =====

    #[test]
    fn test_data_table_zero_width_rejected() {
        let err = DataTable::new(vec![1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, GridError::InvalidArgument(_)));
    }

    #[test]
    fn test_data_table_empty() {
        let table: DataTable<u32> = DataTable::new(vec![], 4).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.rows().count(), 0);
        assert!(table.shape().last_row().is_none());
        assert!(!table.shape().last_row_is_full());
    }

    // ===== Row Tests =====

    #[test]
    fn test_data_table_rows_chunked() {
        let table = seven();
        let rows: Vec<&[u32]> = table.rows().collect();
        assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..], &[7][..]]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_data_table_row_len() {
        let shape = seven().shape();
        assert_eq!(shape.row_len(0), 3);
        assert_eq!(shape.row_len(2), 1);
        assert_eq!(shape.row_len(3), 0);
        assert!(!shape.last_row_is_full());
    }

    #[test]
    fn test_data_table_full_last_row() {
        let table = DataTable::new((0..6).collect::<Vec<u8>>(), 3).unwrap();
        assert!(table.shape().last_row_is_full());
        assert_eq!(table.shape().last_row(), Some(1));
    }

    #[test]
    fn test_data_table_get() {
        let table = seven();
        assert_eq!(table.get(0, 0), Some(&1));
        assert_eq!(table.get(1, 2), Some(&6));
        assert_eq!(table.get(2, 0), Some(&7));
        assert_eq!(table.get(2, 1), None);
        assert_eq!(table.get(0, 3), None);
        assert_eq!(table.row(1), Some(&[4, 5, 6][..]));
    }

    // ===== Coordinate Tests =====

    #[test]
    fn test_data_table_coordinates() {
        let table = seven();
        assert_eq!(table.to_flat_index(2, 0).unwrap(), 6);
        assert_eq!(table.to_row_col(4), (1, 1));
    }

    #[test]
    fn test_data_table_column_out_of_width() {
        let err = seven().to_flat_index(0, 3).unwrap_err();
        assert!(matches!(err, GridError::InvalidArgument(_)));
    }

    proptest! {
        #[test]
        fn prop_flat_index_round_trip(width in 1usize..16, row in 0usize..1000, col_seed in 0usize..16) {
            let shape = TableShape::new(0, width).unwrap();
            let col = col_seed % width;
            let index = shape.to_flat_index(row, col).unwrap();
            prop_assert_eq!(shape.to_row_col(index), (row, col));
        }

        #[test]
        fn prop_row_count_is_ceil(len in 0usize..200, width in 1usize..12) {
            let table = DataTable::new(vec![0u8; len], width).unwrap();
            prop_assert_eq!(table.row_count(), table.rows().count());
            let total: usize = (0..table.row_count()).map(|r| table.shape().row_len(r)).sum();
            prop_assert_eq!(total, len);
        }
    }
}
