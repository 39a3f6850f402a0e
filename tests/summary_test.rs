use approx::assert_abs_diff_eq;
use tracewin::summary::{Statistics, TraceSummary};
use tracewin::types::Duration;
use tracewin::{compute_subtrace, Interval};

use test_helpers::{at, NestedScenario};

#[test]
fn test_statistics() {
    let mut stats = Statistics::new();
    assert_eq!(stats.count(), 0);
    assert_eq!(stats.min(), None);
    assert_eq!(stats.mean(), None);
    assert_eq!(stats.median(), None);

    for value in [4.0, 1.0, 3.0, 2.0] {
        stats.add_value(value);
    }
    assert_eq!(stats.count(), 4);
    assert_eq!(stats.min(), Some(1.0));
    assert_eq!(stats.max(), Some(4.0));
    assert_abs_diff_eq!(stats.mean().unwrap(), 2.5);
    assert_abs_diff_eq!(stats.median().unwrap(), 2.5);

    stats.add_value(10.0);
    assert_abs_diff_eq!(stats.median().unwrap(), 3.0);
    assert_eq!(stats.max(), Some(10.0));
}

#[test]
fn test_summary_of_full_trace() {
    let scenario = NestedScenario::new();
    let summary = TraceSummary::of(&scenario.trace);

    assert_eq!(summary.start_time, at(0));
    assert_eq!(summary.runtime, Duration(1000));
    assert_eq!(summary.locations.len(), 2);

    let rank0 = &summary.locations[0];
    assert_eq!(rank0.location, scenario.l0);
    assert_eq!(rank0.slot_count, 3);
    assert_eq!(rank0.busy_time, Duration(1000));
    assert_abs_diff_eq!(rank0.slot_durations.mean().unwrap(), 1700.0 / 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(rank0.slot_durations.median().unwrap(), 400.0);

    let regions: Vec<(&str, i64)> = summary
        .regions
        .iter()
        .map(|region| (&*region.name, region.inclusive_time.ticks()))
        .collect();
    assert_eq!(regions, vec![("A", 1000), ("D", 1000), ("C", 400), ("B", 300)]);
}

#[test]
fn test_summary_of_window_uses_clipped_durations() {
    let scenario = NestedScenario::with(|builder, l0, l1| {
        builder.add_communication(l0, l1, at(150), at(250), 0).unwrap();
        builder.add_communication(l1, l0, at(800), at(850), 0).unwrap();
    });
    let window = Interval::new(at(200), at(600)).unwrap();
    let summary = TraceSummary::of(&compute_subtrace(&scenario.trace, window));

    assert_eq!(summary.start_time, at(200));
    assert_eq!(summary.runtime, Duration(400));
    assert_eq!(summary.communication_count, 1);
    assert_eq!(summary.collective_count, 0);

    let rank0 = &summary.locations[0];
    assert_eq!(rank0.busy_time, Duration(400));
    assert_abs_diff_eq!(rank0.slot_durations.mean().unwrap(), 700.0 / 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(rank0.slot_durations.median().unwrap(), 200.0);

    let names: Vec<&str> = summary.regions.iter().map(|region| &*region.name).collect();
    assert_eq!(names, vec!["A", "D", "B", "C"]);

    let report = summary.report(2);
    assert!(report.starts_with("window [200, 600)"));
    assert!(report.contains("region A: 1 calls"));
    assert!(report.contains("region D"));
    assert!(!report.contains("region B"));
    assert!(report.contains("slot length min 100 max 400 mean 233.3 median 200.0"));
}

#[test]
fn test_report_of_location_without_slots() {
    let scenario = NestedScenario::with(|builder, _, _| {
        builder.add_location("rank 2", "node-b");
    });
    let summary = TraceSummary::of(&scenario.trace);
    let idle = &summary.locations[2];
    assert_eq!(idle.slot_count, 0);
    assert_eq!(idle.slot_durations.min(), None);

    let report = summary.report(0);
    let idle_line = report
        .lines()
        .find(|line| line.contains("rank 2"))
        .unwrap();
    assert_eq!(idle_line, "  L2 rank 2: 0 slots, busy 0 ticks");
    assert!(!report.contains("region"));
}
