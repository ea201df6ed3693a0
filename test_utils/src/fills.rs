// SPDX-License-Identifier: MIT

use matrixsum::{CellPosition, Field, Limits};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Limits wide enough for every test field.
pub fn test_limits() -> Limits {
    Limits::new(4096, 64).unwrap()
}

/// Square field holding `0..size*size` in row-major order.
pub fn sequence_field(size: usize) -> Field<i64> {
    Field::square(size, &test_limits(), |r, c| (r * size + c) as i64).unwrap()
}

/// Field where every cell holds `value`.
pub fn constant_field(rows: usize, cols: usize, value: i32) -> Field<i32> {
    Field::with_limits(rows, cols, &test_limits(), |_, _| value).unwrap()
}

/// Reproducible random field with values in `low..high`.
pub fn random_field(rows: usize, cols: usize, low: i32, high: i32, seed: u64) -> Field<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Field::with_limits(rows, cols, &test_limits(), |_, _| rng.gen_range(low..high)).unwrap()
}

/// Sequential sum, min and max for checking parallel results.
pub struct Reference<T> {
    pub sum: i128,
    pub min: T,
    pub max: T,
    /// Every position holding the minimum.
    pub min_positions: Vec<CellPosition>,
    /// Every position holding the maximum.
    pub max_positions: Vec<CellPosition>,
}

/// Computes a [`Reference`] with a plain nested loop.
pub fn reference<T: matrixsum::Element>(field: &Field<T>) -> Reference<T> {
    let mut sum = 0i128;
    let mut min = field.get(0, 0);
    let mut max = field.get(0, 0);
    for row in 0..field.rows() {
        for col in 0..field.cols() {
            let value = field.get(row, col);
            let wide: i128 = value.into();
            sum += wide;
            min = min.min(value);
            max = max.max(value);
        }
    }

    let positions = |target: T| {
        let mut found = Vec::new();
        for row in 0..field.rows() {
            for col in 0..field.cols() {
                if field.get(row, col) == target {
                    found.push(CellPosition::new(row, col));
                }
            }
        }
        found
    };

    Reference {
        sum,
        min,
        max,
        min_positions: positions(min),
        max_positions: positions(max),
    }
}
