// SPDX-License-Identifier: MIT

use matrixsum::{
    CellPosition, Field, Limits, PartitionKind, ReduceError, SyncKind, Variant,
    WorkerPool,
};
use test_utils::claims::ClaimRecorder;
use test_utils::fills::{constant_field, random_field, reference, sequence_field, test_limits};

const VARIANTS: [Variant; 3] = [Variant::A, Variant::B, Variant::C];

#[test]
fn test_sequence_4x4_with_two_workers() {
    let field = sequence_field(4);
    let pool = WorkerPool::new(2, &test_limits()).unwrap();

    for variant in VARIANTS {
        let result = pool.run_variant(&field, variant).unwrap();
        assert_eq!(result.total_sum, 120, "{variant:?}");
        assert_eq!(result.min.value, 0);
        assert_eq!(result.min.pos, CellPosition::new(0, 0));
        assert_eq!(result.max.value, 15);
        assert_eq!(result.max.pos, CellPosition::new(3, 3));
    }
}

#[test]
fn test_constant_3x3_dynamic_three_workers() {
    let field = constant_field(3, 3, 1);
    let pool = WorkerPool::new(3, &test_limits()).unwrap();
    let recorder = ClaimRecorder::new(3, 3);

    let result = pool
        .run_observed(
            &field,
            PartitionKind::Dynamic,
            SyncKind::LockedAccumulate,
            &recorder,
        )
        .unwrap();

    assert_eq!(result.total_sum, 9);
    assert_eq!(result.min.value, 1);
    assert_eq!(result.max.value, 1);
    assert_eq!(result.cells_processed, 3);
    assert!(recorder.each_row_once());
}

#[test]
fn test_dynamic_claims_cover_every_row_once() {
    let rows = 1000;
    let workers = 16;
    let field = random_field(rows, 8, -50, 50, 7);
    let pool = WorkerPool::new(workers, &test_limits()).unwrap();
    let recorder = ClaimRecorder::new(rows, workers);

    let result = pool
        .run_observed(
            &field,
            PartitionKind::Dynamic,
            SyncKind::LockedAccumulate,
            &recorder,
        )
        .unwrap();

    assert_eq!(result.cells_processed, rows);
    assert!(recorder.each_row_once());
    assert_eq!(recorder.worker_counts().iter().sum::<usize>(), rows);
    assert_eq!(result.total_sum, reference(&field).sum);
}

#[test]
fn test_static_variants_never_report_claims() {
    let field = sequence_field(6);
    let pool = WorkerPool::new(4, &test_limits()).unwrap();
    let recorder = ClaimRecorder::new(6, 4);
    pool.run_observed(
        &field,
        PartitionKind::Static,
        SyncKind::BarrierLeaderReduce,
        &recorder,
    )
    .unwrap();
    assert!(recorder.row_counts().iter().all(|&count| count == 0));
}

#[test]
fn test_uneven_rows_are_not_dropped() {
    // 13 rows over 4 workers: strips of 3, the last takes 4.
    let field = random_field(13, 5, 0, 99, 42);
    let expected = reference(&field);
    let pool = WorkerPool::new(4, &test_limits()).unwrap();

    for variant in VARIANTS {
        let result = pool.run_variant(&field, variant).unwrap();
        assert_eq!(result.total_sum, expected.sum);
        assert_eq!(result.cells_processed, 13);
    }
}

#[test]
fn test_workers_exceeding_rows() {
    let field = sequence_field(3);
    let pool = WorkerPool::new(10, &test_limits()).unwrap();

    for variant in VARIANTS {
        let result = pool.run_variant(&field, variant).unwrap();
        assert_eq!(result.total_sum, 36);
        assert_eq!(result.min.value, 0);
        assert_eq!(result.max.value, 8);
    }
}

#[test]
fn test_single_worker_matches_many() {
    let field = random_field(64, 64, -1000, 1000, 3);
    let single = WorkerPool::new(1, &test_limits()).unwrap();
    let many = WorkerPool::new(12, &test_limits()).unwrap();

    for variant in VARIANTS {
        let one = single.run_variant(&field, variant).unwrap();
        let twelve = many.run_variant(&field, variant).unwrap();
        assert_eq!(one.total_sum, twelve.total_sum);
        assert_eq!(one.min.value, twelve.min.value);
        assert_eq!(one.max.value, twelve.max.value);
    }
}

#[test]
fn test_repeated_runs_are_stable() {
    // Few distinct values, so extrema are tied across many cells.
    let field = random_field(40, 40, 0, 3, 11);
    let expected = reference(&field);
    let pool = WorkerPool::new(7, &test_limits()).unwrap();

    for _ in 0..20 {
        for variant in VARIANTS {
            let result = pool.run_variant(&field, variant).unwrap();
            assert_eq!(result.total_sum, expected.sum);
            assert_eq!(result.min.value, expected.min);
            assert_eq!(result.max.value, expected.max);
            assert!(expected.min_positions.contains(&result.min.pos));
            assert!(expected.max_positions.contains(&result.max.pos));
        }
    }
}

#[test]
fn test_barrier_variant_positions_are_deterministic() {
    let field = random_field(40, 40, 0, 3, 11);
    let pool = WorkerPool::new(7, &test_limits()).unwrap();
    let first = pool.run_variant(&field, Variant::A).unwrap();

    for _ in 0..20 {
        let again = pool.run_variant(&field, Variant::A).unwrap();
        assert_eq!(again, first);
    }
    // Lowest worker's strip, first cell in row-major order.
    let expected = reference(&field);
    assert_eq!(first.min.pos, expected.min_positions[0]);
    assert_eq!(first.max.pos, expected.max_positions[0]);
}

#[test]
fn test_wide_element_types() {
    let field = Field::new(3, 3, |r, c| if r == c { i64::MAX } else { i64::MIN }).unwrap();
    let pool = WorkerPool::new(2, &Limits::default()).unwrap();
    // The barrier variant breaks the (0, 1) vs (1, 0) tie by worker order.
    let result = pool.run_variant(&field, Variant::A).unwrap();
    assert_eq!(
        result.total_sum,
        3 * i64::MAX as i128 + 6 * i64::MIN as i128
    );
    assert_eq!(result.min.value, i64::MIN);
    assert_eq!(result.min.pos, CellPosition::new(0, 1));
    assert_eq!(result.max.pos, CellPosition::new(0, 0));
}

#[test]
fn test_panicking_worker_fails_the_run() {
    let field = sequence_field(8);
    let pool = WorkerPool::new(4, &test_limits()).unwrap();
    let observer = |_worker: usize, row: usize| {
        if row == 3 {
            panic!("observer rejected row {row}");
        }
    };

    let outcome = pool.run_observed(
        &field,
        PartitionKind::Dynamic,
        SyncKind::LockedAccumulate,
        &observer,
    );
    assert!(matches!(outcome, Err(ReduceError::Synchronization(_))));

    // The pool is reusable after a failed run.
    let result = pool.run_variant(&field, Variant::C).unwrap();
    assert_eq!(result.total_sum, reference(&field).sum);
}

#[test]
fn test_dimension_errors_before_spawning() {
    let limits = Limits::new(8, 2).unwrap();
    assert!(matches!(
        Field::<i32>::with_limits(9, 1, &limits, |_, _| 0),
        Err(ReduceError::InvalidDimension { .. })
    ));
    assert!(matches!(
        WorkerPool::new(3, &limits),
        Err(ReduceError::InvalidDimension { .. })
    ));
}
