use arbor::{MeasureSpec, SizePolicy, SpecMode, child_measure_spec};
use proptest::prelude::*;

proptest! {
    #[test]
    fn exactly_always_grants_the_spec_size(size in 0..10_000i32, desired in -100..20_000i32) {
        let (granted, too_small) = MeasureSpec::exactly(size).resolve(desired);
        prop_assert_eq!(granted, size);
        prop_assert!(!too_small);
    }

    #[test]
    fn at_most_never_exceeds_the_bound(size in 0..10_000i32, desired in -100..20_000i32) {
        let (granted, too_small) = MeasureSpec::at_most(size).resolve(desired);
        prop_assert!(granted <= size);
        prop_assert!(granted >= 0);
        prop_assert_eq!(too_small, desired.max(0) > size);
        if desired >= 0 && desired <= size {
            prop_assert_eq!(granted, desired);
        }
    }

    #[test]
    fn unspecified_grants_any_nonnegative_desire(desired in -100..20_000i32) {
        let (granted, too_small) = MeasureSpec::unspecified().resolve(desired);
        prop_assert_eq!(granted, desired.max(0));
        prop_assert!(!too_small);
    }

    #[test]
    fn child_specs_fit_in_the_remaining_room(
        size in 0..10_000i32,
        used in 0..12_000i32,
        fixed in 0..500i32,
    ) {
        let room = (size - used).max(0);
        for parent in [MeasureSpec::exactly(size), MeasureSpec::at_most(size)] {
            for policy in [SizePolicy::MatchParent, SizePolicy::WrapContent] {
                let child = child_measure_spec(parent, used, policy);
                prop_assert!(child.mode != SpecMode::Unspecified);
                prop_assert_eq!(child.size, room);
            }
            // Fixed children get their size regardless of room.
            let child = child_measure_spec(parent, used, SizePolicy::Fixed(fixed));
            prop_assert_eq!(child, MeasureSpec::exactly(fixed));
        }
    }

    #[test]
    fn unconstrained_parents_pass_the_lack_of_constraint_down(used in 0..100i32) {
        for policy in [SizePolicy::MatchParent, SizePolicy::WrapContent] {
            let child = child_measure_spec(MeasureSpec::unspecified(), used, policy);
            prop_assert_eq!(child.mode, SpecMode::Unspecified);
        }
    }
}
