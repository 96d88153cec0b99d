//! Property tests: watcher observations over random write sequences.

use proptest::prelude::*;
use rebind_core::{IntegerProperty, NumberExpression};
use rebind_harness::{ChangeRecorder, InvalidationCounter};

proptest! {
    /// With a change listener attached the sum is revalidated after every
    /// notification, so each effective write produces exactly one
    /// invalidation and one change whose endpoints chain together.
    #[test]
    fn recorded_changes_chain_and_match_invalidations(
        writes in prop::collection::vec((any::<bool>(), -50i32..50), 0..40)
    ) {
        let a = IntegerProperty::new(0);
        let b = IntegerProperty::new(0);
        let sum = a.add(&b);
        let counter = InvalidationCounter::attach(&sum);
        let changes = ChangeRecorder::attach(&sum);

        let mut model = (0_i32, 0_i32);
        let mut expected = Vec::new();
        let mut invalidations = 0;
        for (left, value) in writes {
            let before = model.0 + model.1;
            let target = if left { &a } else { &b };
            let slot = if left { &mut model.0 } else { &mut model.1 };
            if *slot != value {
                invalidations += 1;
            }
            *slot = value;
            target.set(value);
            let after = model.0 + model.1;
            if before != after {
                expected.push((before, after));
            }
        }

        prop_assert_eq!(counter.count(), invalidations);
        prop_assert_eq!(changes.changes(), expected);
        for pair in changes.changes().windows(2) {
            prop_assert_eq!(pair[0].1, pair[1].0);
        }
        prop_assert_eq!(sum.get().ok(), Some(model.0 + model.1));
    }
}
