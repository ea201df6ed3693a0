// SPDX-License-Identifier: MIT

use matrixsum::{Field, StaticRangePartitioner, Variant, WorkerPool};
use proptest::prelude::*;
use test_utils::fills::{reference, test_limits};

fn arb_field() -> impl Strategy<Value = Field<i32>> {
    (1usize..=24, 1usize..=24).prop_flat_map(|(rows, cols)| {
        proptest::collection::vec(-500i32..500, rows * cols).prop_map(move |cells| {
            Field::with_limits(rows, cols, &test_limits(), |r, c| cells[r * cols + c])
                .expect("dimensions within test limits")
        })
    })
}

fn arb_variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::A), Just(Variant::B), Just(Variant::C)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reduction_matches_sequential(
        field in arb_field(),
        workers in 1usize..=16,
        variant in arb_variant(),
    ) {
        let expected = reference(&field);
        let pool = WorkerPool::new(workers, &test_limits()).unwrap();
        let result = pool.run_variant(&field, variant).unwrap();

        prop_assert_eq!(result.total_sum, expected.sum);
        prop_assert_eq!(result.min.value, expected.min);
        prop_assert_eq!(result.max.value, expected.max);
        prop_assert_eq!(field.at(result.min.pos), result.min.value);
        prop_assert_eq!(field.at(result.max.pos), result.max.value);
        prop_assert_eq!(result.cells_processed, field.rows());
    }

    #[test]
    fn worker_count_does_not_change_values(
        field in arb_field(),
        workers in 2usize..=16,
        variant in arb_variant(),
    ) {
        let one = WorkerPool::new(1, &test_limits()).unwrap().run_variant(&field, variant).unwrap();
        let many = WorkerPool::new(workers, &test_limits()).unwrap().run_variant(&field, variant).unwrap();

        prop_assert_eq!(one.total_sum, many.total_sum);
        prop_assert_eq!(one.min.value, many.min.value);
        prop_assert_eq!(one.max.value, many.max.value);
    }

    #[test]
    fn static_strips_cover_rows_exactly_once(rows in 1usize..=500, workers in 1usize..=64) {
        let partitioner = StaticRangePartitioner::new(workers, rows);
        let mut seen = vec![0u8; rows];
        let mut next = 0;
        for assignment in partitioner.assignments() {
            let range = assignment.rows();
            // Strips are contiguous and in worker order.
            prop_assert_eq!(range.start, next);
            next = range.end;
            for row in range {
                seen[row] += 1;
            }
        }
        prop_assert_eq!(next, rows);
        prop_assert!(seen.iter().all(|&count| count == 1));
    }
}
