// SPDX-License-Identifier: MIT

use std::ops::Range;
use std::sync::Mutex;

use crate::error::Result;

/// How rows are handed to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// One contiguous row range per worker, fixed before the run starts.
    Static,
    /// Single rows claimed one at a time from a shared counter.
    Dynamic,
}

/// The rows a worker must visit for one reduction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkAssignment {
    /// Contiguous half-open range of rows. May be empty.
    Rows(Range<usize>),
    /// A single row obtained from a [`DynamicRowPartitioner`].
    Row(usize),
}

impl WorkAssignment {
    /// The half-open range of rows covered by this assignment.
    pub fn rows(&self) -> Range<usize> {
        match self {
            WorkAssignment::Rows(range) => range.clone(),
            WorkAssignment::Row(row) => *row..*row + 1,
        }
    }

    /// Number of rows covered.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// True when the assignment covers no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First and last row (inclusive), or `None` for an empty range.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        let rows = self.rows();
        if rows.is_empty() {
            None
        } else {
            Some((rows.start, rows.end - 1))
        }
    }
}

/// Splits `rows` into one contiguous strip per worker.
///
/// Every worker gets `rows / worker_count` rows; the last worker also takes
/// the remainder. When there are more workers than rows the strip size is
/// zero, so every worker but the last receives an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRangePartitioner {
    /// Number of workers sharing the rows.
    worker_count: usize,
    /// Total number of rows to cover.
    rows: usize,
    /// Rows per worker before the remainder is added to the last one.
    strip_size: usize,
}

impl StaticRangePartitioner {
    /// Creates a partitioner for `worker_count` workers over `rows` rows.
    ///
    /// # Panics
    /// If `worker_count` is zero. Callers validate it against
    /// [`Limits`](crate::config::Limits) first.
    pub fn new(worker_count: usize, rows: usize) -> Self {
        assert!(worker_count > 0, "static partition needs at least one worker");
        StaticRangePartitioner {
            worker_count,
            rows,
            strip_size: rows / worker_count,
        }
    }

    /// Rows per worker, excluding the remainder taken by the last worker.
    pub fn strip_size(&self) -> usize {
        self.strip_size
    }

    /// The strip belonging to `worker`.
    ///
    /// # Arguments
    /// - `worker`: worker index in `0..worker_count`.
    ///
    /// # Returns
    /// The worker's [`WorkAssignment::Rows`], possibly empty.
    pub fn assignment(&self, worker: usize) -> WorkAssignment {
        debug_assert!(worker < self.worker_count);
        let first = worker * self.strip_size;
        let end = if worker == self.worker_count - 1 {
            self.rows
        } else {
            first + self.strip_size
        };
        WorkAssignment::Rows(first..end)
    }

    /// All assignments in worker order.
    pub fn assignments(&self) -> impl Iterator<Item = WorkAssignment> + '_ {
        (0..self.worker_count).map(move |worker| self.assignment(worker))
    }
}

/// Hands out row indices one at a time from a mutex-guarded counter.
///
/// The lock is held only to read and bump the counter; no reduction work
/// happens while it is held.
#[derive(Debug)]
pub struct DynamicRowPartitioner {
    /// Next row to hand out. Never exceeds `rows`.
    next_row: Mutex<usize>,
    /// Total number of rows.
    rows: usize,
}

impl DynamicRowPartitioner {
    /// Creates a partitioner over `rows` rows, starting at row 0.
    pub fn new(rows: usize) -> Self {
        DynamicRowPartitioner {
            next_row: Mutex::new(0),
            rows,
        }
    }

    /// Claims the next unclaimed row.
    ///
    /// # Returns
    /// - `Ok(Some(row))` for each row in `0..rows`, exactly once across all
    ///   callers.
    /// - `Ok(None)` once every row has been handed out.
    pub fn claim(&self) -> Result<Option<usize>> {
        let mut next_row = self.next_row.lock()?;
        if *next_row == self.rows {
            return Ok(None);
        }
        let row = *next_row;
        *next_row += 1;
        Ok(Some(row))
    }

    /// Claims the next row wrapped as a [`WorkAssignment`].
    pub fn next_assignment(&self) -> Result<Option<WorkAssignment>> {
        Ok(self.claim()?.map(WorkAssignment::Row))
    }

    /// Number of rows handed out so far.
    pub fn claimed(&self) -> Result<usize> {
        Ok(*self.next_row.lock()?)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_static_even_split() {
        let partitioner = StaticRangePartitioner::new(2, 4);
        let ranges: Vec<_> = partitioner.assignments().map(|a| a.rows()).collect();
        assert_eq!(ranges, vec![0..2, 2..4]);
    }

    #[test]
    fn test_static_last_worker_takes_remainder() {
        let partitioner = StaticRangePartitioner::new(3, 10);
        assert_eq!(partitioner.strip_size(), 3);
        assert_eq!(partitioner.assignment(0).bounds(), Some((0, 2)));
        assert_eq!(partitioner.assignment(1).bounds(), Some((3, 5)));
        assert_eq!(partitioner.assignment(2).bounds(), Some((6, 9)));
    }

    #[test]
    fn test_static_more_workers_than_rows() {
        let partitioner = StaticRangePartitioner::new(5, 3);
        let assignments: Vec<_> = partitioner.assignments().collect();
        assert!(assignments[..4].iter().all(WorkAssignment::is_empty));
        assert_eq!(assignments[4].rows(), 0..3);
    }

    #[test]
    fn test_dynamic_claims_each_row_once() {
        let partitioner = DynamicRowPartitioner::new(3);
        assert_eq!(partitioner.claim().unwrap(), Some(0));
        assert_eq!(partitioner.claim().unwrap(), Some(1));
        assert_eq!(partitioner.claim().unwrap(), Some(2));
        assert_eq!(partitioner.claim().unwrap(), None);
        assert_eq!(partitioner.claim().unwrap(), None);
        assert_eq!(partitioner.claimed().unwrap(), 3);
    }

    #[test]
    fn test_dynamic_concurrent_claims() {
        let rows = 1000;
        let partitioner = Arc::new(DynamicRowPartitioner::new(rows));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let partitioner = partitioner.clone();
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(row) = partitioner.claim().unwrap() {
                        mine.push(row);
                    }
                    mine
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for row in handle.join().unwrap() {
                assert!(seen.insert(row), "row {row} claimed twice");
            }
        }
        assert_eq!(seen.len(), rows);
    }
}
