// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

use matrixsum::ClaimObserver;

/// Counts how many times each row was claimed, and by whom.
pub struct ClaimRecorder {
    /// Claims per row index.
    per_row: Vec<AtomicUsize>,
    /// Claims per worker index.
    per_worker: Vec<AtomicUsize>,
}

impl ClaimRecorder {
    /// Creates a recorder for `rows` rows and `workers` workers.
    pub fn new(rows: usize, workers: usize) -> Self {
        ClaimRecorder {
            per_row: (0..rows).map(|_| AtomicUsize::new(0)).collect(),
            per_worker: (0..workers).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Claim count for each row.
    pub fn row_counts(&self) -> Vec<usize> {
        self.per_row.iter().map(|count| count.load(SeqCst)).collect()
    }

    /// Claim count for each worker.
    pub fn worker_counts(&self) -> Vec<usize> {
        self.per_worker.iter().map(|count| count.load(SeqCst)).collect()
    }

    /// True if every row was claimed exactly once.
    pub fn each_row_once(&self) -> bool {
        self.row_counts().iter().all(|&count| count == 1)
    }
}

impl ClaimObserver for ClaimRecorder {
    fn on_claim(&self, worker: usize, row: usize) {
        self.per_row[row].fetch_add(1, SeqCst);
        self.per_worker[worker].fetch_add(1, SeqCst);
    }
}
