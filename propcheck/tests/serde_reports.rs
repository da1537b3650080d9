#![cfg(feature = "serde")]

use propcheck::{
    FailureKind, ParallelConfig, Runner, ShrinkOutcome, TallyReport, TestConfig, TestResult,
    int_range, property,
};

fn runner() -> Runner {
    Runner::new(TestConfig::default().with_iterations(200).with_seed(3))
}

#[test]
fn test_failed_result_round_trips_through_json() {
    let prop = property("x<50", int_range(0, 1000), |x: &i32| *x < 50);
    let result = runner().check(&prop).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let decoded: TestResult = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, result);
    assert_eq!(decoded.shrunk_counterexample.as_deref(), Some("50"));
    assert_eq!(decoded.shrink_outcome, Some(ShrinkOutcome::Minimized));
    assert!(matches!(
        decoded.failure.map(|record| record.kind),
        Some(FailureKind::PredicateFalse { .. })
    ));
}

#[test]
fn test_report_fields_are_named_in_json() {
    let prop = property("always", int_range(0, 10), |_: &i32| true);
    let value = serde_json::to_value(runner().check(&prop).unwrap()).unwrap();

    assert_eq!(value["property_name"], "always");
    assert_eq!(value["passed"], true);
    assert_eq!(value["num_tests"], 200);
    assert_eq!(value["seed"], 3);
    assert_eq!(value["draws"], 200);
}

#[test]
fn test_tally_report_round_trips() {
    let prop = property("under 900", int_range(0, 999), |x: &i32| *x < 900);
    let report = runner()
        .tally(&prop, &ParallelConfig::with_threads(2))
        .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let decoded: TallyReport = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, report);
}
