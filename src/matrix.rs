//! Binary-matrix adapter contract and the sparse row-indexed container used by one of the
//! two Sudoku reduction variants to materialize its exact-cover instance.

use std::collections::BTreeMap;

use crate::error::CoreError;

/// Abstract read-only view the DLX mesh builder consumes: dimensions plus a cell predicate.
/// The predicate must be pure for the duration of a solve — implementors may compute
/// membership on the fly (see `reduction::DescriptorMatrix`) or back it with storage (see
/// `SparseMatrix` below).
pub trait BinaryMatrix {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn present(&self, row: usize, col: usize) -> bool;
}

/// A sparse, row-indexed matrix. Each row is an ordered mapping from column index to value;
/// entries equal to `T::default()` are never stored, so the entry count always equals the
/// number of non-default cells.
#[derive(Debug, Clone)]
pub struct SparseMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<BTreeMap<usize, T>>,
}

impl<T> SparseMatrix<T>
where
    T: PartialEq + Default + Clone,
{
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![BTreeMap::new(); rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored (non-default) entries across the whole matrix.
    pub fn len(&self) -> usize {
        self.data.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), CoreError> {
        if row >= self.rows || col >= self.cols {
            return Err(CoreError::OutOfRange {
                row,
                col,
                size: self.rows.max(self.cols),
            });
        }
        Ok(())
    }

    /// Sets `(row, col)` to `value`. Storing the default value removes the entry instead,
    /// preserving the "no default-valued entry is ever stored" invariant.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), CoreError> {
        self.check_bounds(row, col)?;

        let bucket = &mut self.data[row];
        if value == T::default() {
            bucket.remove(&col);
        } else {
            bucket.insert(col, value);
        }
        Ok(())
    }

    /// Returns the stored value at `(row, col)`, or the default ("zero") if absent.
    pub fn get(&self, row: usize, col: usize) -> Result<T, CoreError> {
        self.check_bounds(row, col)?;
        Ok(self.data[row].get(&col).cloned().unwrap_or_default())
    }
}

impl BinaryMatrix for SparseMatrix<bool> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn present(&self, row: usize, col: usize) -> bool {
        self.data[row].contains_key(&col)
    }
}
