//! Property tests for the seeded tab model simulation

use proptest::prelude::*;
use tabkeeper_core::{SimulationConfig, run_simulation};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// No seed drives the model into an inconsistent state.
    #[test]
    fn any_seed_keeps_invariants(seed in any::<u64>()) {
        let report = run_simulation(&SimulationConfig::new(Some(seed), 200));
        prop_assert!(report.is_ok(), "{:?}", report.err());
        let report = report.expect("checked above");
        prop_assert_eq!(report.seed, seed);
        prop_assert_eq!(report.steps, 200);
        prop_assert_eq!(report.log.len(), 200);
    }

    /// A seed fully determines the run.
    #[test]
    fn same_seed_replays_identically(seed in any::<u64>(), steps in 1usize..150) {
        let config = SimulationConfig::new(Some(seed), steps);
        let first = run_simulation(&config).expect("first run");
        let second = run_simulation(&config).expect("second run");
        prop_assert_eq!(first.log, second.log);
        prop_assert_eq!(first.regular_tabs, second.regular_tabs);
        prop_assert_eq!(first.groups, second.groups);
    }
}

#[test]
fn zero_steps_is_an_empty_run() {
    let report = run_simulation(&SimulationConfig::new(Some(7), 0)).expect("run");
    assert!(report.log.is_empty());
    assert_eq!(report.regular_tabs + report.incognito_tabs, 0);
}
