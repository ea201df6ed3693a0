// SPDX-License-Identifier: MIT

use std::fmt;

use crate::field::{CellPosition, Element, Field};
use crate::partition::WorkAssignment;

/// An extremal value and the first position found holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremum<T> {
    pub value: T,
    pub pos: CellPosition,
}

impl<T: Element> Extremum<T> {
    /// Pairs `value` with the position it was found at.
    pub fn new(value: T, pos: CellPosition) -> Self {
        Extremum { value, pos }
    }

    /// Adopts `other` only if it is strictly smaller.
    fn lower(slot: &mut Option<Self>, other: Option<Self>) {
        if let Some(other) = other {
            if slot.map_or(true, |current| other.value < current.value) {
                *slot = Some(other);
            }
        }
    }

    /// Adopts `other` only if it is strictly larger.
    fn raise(slot: &mut Option<Self>, other: Option<Self>) {
        if let Some(other) = other {
            if slot.map_or(true, |current| other.value > current.value) {
                *slot = Some(other);
            }
        }
    }
}

/// Sum, minimum and maximum over one worker's assigned cells.
///
/// `min` and `max` are `None` only when the assignment was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialResult<T> {
    /// Exact sum of the visited cells.
    pub sum: i128,
    /// Number of rows the result covers.
    pub rows: usize,
    pub min: Option<Extremum<T>>,
    pub max: Option<Extremum<T>>,
}

impl<T: Element> PartialResult<T> {
    /// The identity for [`PartialResult::merge`].
    pub fn empty() -> Self {
        PartialResult {
            sum: 0,
            rows: 0,
            min: None,
            max: None,
        }
    }

    /// Folds `other` into `self`.
    ///
    /// Sums and row counts add. An extremum is replaced only on a strict
    /// improvement, so on ties whatever was merged first keeps its position.
    pub fn merge(&mut self, other: &PartialResult<T>) {
        self.sum += other.sum;
        self.rows += other.rows;
        Extremum::lower(&mut self.min, other.min);
        Extremum::raise(&mut self.max, other.max);
    }

    /// Merges `partials` in slice order, so on ties the lowest index wins.
    pub fn combine<'a, I>(partials: I) -> Self
    where
        I: IntoIterator<Item = &'a PartialResult<T>>,
    {
        let mut total = PartialResult::empty();
        for partial in partials {
            total.merge(partial);
        }
        total
    }
}

/// Reduces the cells of `assignment` in row-major order.
///
/// A later cell equal to the current minimum or maximum does not replace its
/// recorded position.
pub fn reduce<T: Element>(
    field: &Field<T>,
    assignment: &WorkAssignment,
) -> PartialResult<T> {
    let rows = assignment.rows();
    let mut partial = PartialResult {
        rows: rows.len(),
        ..PartialResult::empty()
    };
    let mut min: Option<Extremum<T>> = None;
    let mut max: Option<Extremum<T>> = None;

    for row in rows {
        for (col, &value) in field.row(row).iter().enumerate() {
            let wide: i128 = value.into();
            partial.sum += wide;
            if min.map_or(true, |m| value < m.value) {
                min = Some(Extremum::new(value, CellPosition::new(row, col)));
            }
            if max.map_or(true, |m| value > m.value) {
                max = Some(Extremum::new(value, CellPosition::new(row, col)));
            }
        }
    }

    partial.min = min;
    partial.max = max;
    partial
}

/// The merged statistics for a whole field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalResult<T> {
    pub total_sum: i128,
    pub min: Extremum<T>,
    pub max: Extremum<T>,
    /// Rows reduced during the run. Equals the field's row count on success.
    pub cells_processed: usize,
}

impl<T: Element> GlobalResult<T> {
    /// Finalizes a fully merged partial. Returns `None` if no cell was seen.
    pub fn from_partial(partial: PartialResult<T>) -> Option<Self> {
        Some(GlobalResult {
            total_sum: partial.sum,
            min: partial.min?,
            max: partial.max?,
            cells_processed: partial.rows,
        })
    }
}

impl<T: Element + fmt::Display> fmt::Display for GlobalResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The total is {}", self.total_sum)?;
        writeln!(f, "The min element is {} at {}", self.min.value, self.min.pos)?;
        write!(f, "The max element is {} at {}", self.max.value, self.max.pos)
    }
}
