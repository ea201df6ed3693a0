// SPDX-License-Identifier: MIT

use std::fmt;

use num_traits::PrimInt;

use crate::config::Limits;
use crate::error::{ReduceError, Result};

mod sealed {
    pub trait Sealed {}
}

/// Integer types a [`Field`] can hold: the signed and unsigned primitives of
/// at most 64 bits.
///
/// Sums are accumulated in `i128`, which is strictly wider than every
/// element, so a field within the default limits cannot overflow it.
///
/// ```compile_fail
/// let field = matrixsum::Field::new(1, 2, |_, _| i128::MAX);
/// ```
pub trait Element:
    PrimInt + Into<i128> + fmt::Debug + Send + Sync + 'static + sealed::Sealed
{
}

macro_rules! impl_element {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Element for $ty {}
        )*
    };
}

impl_element!(i8, i16, i32, i64, u8, u16, u32, u64);

/// A `(row, col)` location inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    /// Creates the position of `(row, col)`.
    pub fn new(row: usize, col: usize) -> Self {
        CellPosition { row, col }
    }
}

impl fmt::Display for CellPosition {
    /// Formats as `(x , y)`, column first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} , {})", self.col, self.row)
    }
}

/// Dense row-major grid of integers, fully populated on construction and
/// never mutated afterwards. Workers share it by reference without locking.
#[derive(Clone, PartialEq, Eq)]
pub struct Field<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Element> Field<T> {
    /// Builds a `rows` x `cols` field under the default [`Limits`], calling
    /// `fill(row, col)` once per cell in row-major order.
    pub fn new<F>(rows: usize, cols: usize, fill: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        Self::with_limits(rows, cols, &Limits::default(), fill)
    }

    /// Like [`Field::new`] but validates the dimensions against `limits`.
    pub fn with_limits<F>(
        rows: usize,
        cols: usize,
        limits: &Limits,
        mut fill: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        limits.check_size("row count", rows)?;
        limits.check_size("column count", cols)?;

        let cell_count = rows
            .checked_mul(cols)
            .ok_or_else(|| ReduceError::invalid("row count", rows, usize::MAX / cols))?;

        let mut cells = Vec::with_capacity(cell_count);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(fill(row, col));
            }
        }

        Ok(Field { rows, cols, cells })
    }

    /// Builds a square field, the shape every variant runs on.
    pub fn square<F>(size: usize, limits: &Limits, fill: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        Self::with_limits(size, size, limits, fill)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Reads one cell.
    ///
    /// # Panics
    /// If `(row, col)` lies outside the field.
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} field",
            self.rows,
            self.cols
        );
        self.cells[row * self.cols + col]
    }

    /// Reads the cell at `pos`.
    pub fn at(&self, pos: CellPosition) -> T {
        self.get(pos.row, pos.col)
    }

    /// Borrows one full row.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Iterates over the rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks_exact(self.cols)
    }
}

impl<T: Element> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

impl<T: Element + fmt::Display> fmt::Display for Field<T> {
    /// One line per row, `[  v v v ]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            write!(f, "[ ")?;
            for value in row {
                write!(f, " {value}")?;
            }
            writeln!(f, " ]")?;
        }
        Ok(())
    }
}
