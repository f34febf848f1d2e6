//! Exhaustive checks of the two-stack dequeue protocol.

use sq_model::{check_two_stack, DequeueMode, TwoStackAction};

#[test]
fn test_atomic_mode_holds_for_small_configs() {
    for consumers in 1..=2 {
        for values in 1..=4 {
            let report = check_two_stack(DequeueMode::Atomic, consumers, values);
            assert!(report.fifo_holds, "{}", report.format());
            assert!(report.conserved, "{}", report.format());
        }
    }
}

#[test]
fn test_split_mode_reorders() {
    let report = check_two_stack(DequeueMode::Split, 2, 3);
    assert!(!report.fifo_holds);
    assert!(report.conserved);

    // The trace must contain a partial transfer.
    assert!(report
        .fifo_counterexample
        .iter()
        .any(|a| matches!(a, TwoStackAction::TransferStep(_))));

    let text = report.format();
    assert!(text.starts_with("[FAIL] Split"));
    assert!(text.contains("fifo violated by:"));
}

#[test]
fn test_single_value_cannot_reorder() {
    let report = check_two_stack(DequeueMode::Split, 2, 1);
    assert!(report.fifo_holds, "{}", report.format());
}
