//! Property-based tests for the vacation balance arithmetic.

use permio_shared::EmployeeId;
use proptest::prelude::*;

use crate::ledger::error::LedgerError;
use crate::ledger::types::VacationBalance;

/// One step a balance can go through.
#[derive(Debug, Clone, Copy)]
enum Op {
    Reserve(u32),
    Commit(u32),
    Release(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..15).prop_map(Op::Reserve),
        (0u32..15).prop_map(Op::Commit),
        (0u32..15).prop_map(Op::Release),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

/// Applies an operation the way a store would: settles only track days that
/// were actually reserved first, so we cap settle amounts at the held total.
fn apply(balance: &mut VacationBalance, held: &mut u32, op: Op) {
    match op {
        Op::Reserve(days) => {
            if balance.try_reserve(days).is_ok() {
                *held += days;
            }
        }
        Op::Commit(days) => {
            let days = days.min(*held);
            balance.settle_commit(days);
            *held -= days;
        }
        Op::Release(days) => {
            let days = days.min(*held);
            balance.settle_release(days);
            *held -= days;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance invariant holds after every operation in any sequence.
    #[test]
    fn prop_invariant_holds_under_any_sequence(
        available in 0u32..40,
        ops in ops_strategy(30),
    ) {
        let mut balance = VacationBalance::new(EmployeeId::new(), 2026, available);
        let mut held = 0u32;

        for op in ops {
            apply(&mut balance, &mut held, op);
            prop_assert!(
                balance.holds_invariant(),
                "invariant broken: taken={} reserved={} available={}",
                balance.days_taken,
                balance.days_reserved,
                balance.available_days
            );
        }
    }

    /// Reserved days always equal the days actually held by live reservations.
    #[test]
    fn prop_reserved_tracks_held(
        available in 0u32..40,
        ops in ops_strategy(30),
    ) {
        let mut balance = VacationBalance::new(EmployeeId::new(), 2026, available);
        let mut held = 0u32;

        for op in ops {
            apply(&mut balance, &mut held, op);
            prop_assert_eq!(balance.days_reserved, held);
        }
    }

    /// A failed reservation leaves the balance byte-identical.
    #[test]
    fn prop_failed_reserve_has_no_effect(
        available in 0u32..10,
        days in 11u32..50,
    ) {
        let mut balance = VacationBalance::new(EmployeeId::new(), 2026, available);
        let before = balance.clone();

        let result = balance.try_reserve(days);
        let matched = matches!(result, Err(LedgerError::InsufficientBalance { .. }));
        prop_assert!(matched);
        prop_assert_eq!(balance, before);
    }

    /// Conservation: commit moves exactly the reserved days into taken.
    #[test]
    fn prop_commit_conserves_days(
        available in 1u32..40,
        days in 1u32..40,
    ) {
        prop_assume!(days <= available);
        let mut balance = VacationBalance::new(EmployeeId::new(), 2026, available);
        balance.try_reserve(days).unwrap();

        let reserved_before = balance.days_reserved;
        let taken_before = balance.days_taken;
        balance.settle_commit(days);

        prop_assert_eq!(balance.days_reserved, reserved_before - days);
        prop_assert_eq!(balance.days_taken, taken_before + days);
        prop_assert!(balance.holds_invariant());
    }

    /// Conservation: release restores exactly the reserved days.
    #[test]
    fn prop_release_restores_days(
        available in 1u32..40,
        days in 1u32..40,
    ) {
        prop_assume!(days <= available);
        let mut balance = VacationBalance::new(EmployeeId::new(), 2026, available);
        let remaining_before = balance.remaining();
        balance.try_reserve(days).unwrap();
        balance.settle_release(days);

        prop_assert_eq!(balance.remaining(), remaining_before);
        prop_assert_eq!(balance.days_taken, 0);
    }
}
