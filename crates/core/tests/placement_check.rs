use codeheap_core::model::SegmentKind;
use codeheap_core::scenarios::{self, NamePredicate, Scenario};
use codeheap_core::services::{CheckError, HotExpectation, PlacementCheck, ViolationKind};

const SEGMENTED: &str = include_str!("fixtures/segmented_codecache.txt");
const UNSEGMENTED: &str = include_str!("fixtures/unsegmented_codecache.txt");

const HOT_AND_NON_PROFILED: &str = "\
CodeHeap 'extra-hot': size=8Kb used=1Kb max_used=1Kb free=7Kb
 bounds [0x1000,0x1500,0x2000]
CodeHeap 'non-profiled nmethods': size=8Kb used=1Kb max_used=1Kb free=7Kb
 bounds [0x3000,0x3500,0x4000]
";

fn java_scenario() -> Scenario {
    Scenario::new("java-hot", NamePredicate::prefix("java"))
}

#[test]
fn method_in_hot_segment_passes() {
    let input = format!(
        "{HOT_AND_NON_PROFILED}1 4 0 java.lang.Object.hashCode()I [0x1200, 0x1300 - 0x1400]\n"
    );
    let scenario = java_scenario();
    let report = PlacementCheck::new(&scenario).unwrap().run(&input).expect("report");

    assert_eq!(report.methods_in(SegmentKind::Hot), ["java.lang.Object.hashCode"]);
    assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);
}

#[test]
fn expected_hot_method_outside_hot_is_a_violation() {
    let input = format!(
        "{HOT_AND_NON_PROFILED}1 4 0 java.lang.String.length()I [0x3200, 0x3300 - 0x3400]\n"
    );
    let scenario = java_scenario().with_hot(HotExpectation::Unchecked);
    let report = PlacementCheck::new(&scenario).unwrap().run(&input).expect("report");

    assert_eq!(report.methods_in(SegmentKind::NonProfiled), ["java.lang.String.length"]);
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.kind, ViolationKind::ExpectedHotOutside);
    assert_eq!(violation.method.as_deref(), Some("java.lang.String.length"));
    assert_eq!(violation.expected, Some(SegmentKind::Hot));
    assert_eq!(violation.actual, Some(SegmentKind::NonProfiled));
}

#[test]
fn no_optimized_methods_reports_empty_hot_segment_once() {
    let input = format!(
        "{HOT_AND_NON_PROFILED}1 3 0 java.lang.Object.hashCode()I [0x1200, 0x1300 - 0x1400]\n"
    );
    let scenario = java_scenario();
    let report = PlacementCheck::new(&scenario).unwrap().run(&input).expect("report");

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, ViolationKind::HotSegmentEmpty);
    assert_eq!(report.violations[0].message, "hot segment is empty");
}

#[test]
fn capacity_constrained_spillover_into_profiled_is_accepted() {
    let input = format!(
        "{HOT_AND_NON_PROFILED}\
CodeHeap 'profiled nmethods': size=8Kb used=1Kb max_used=1Kb free=7Kb
 bounds [0x5000,0x5500,0x6000]
1 4 0 java.lang.Object.hashCode()I [0x1200, 0x1300 - 0x1400]
2 4 0 java.lang.String.length()I [0x5200, 0x5300 - 0x5400]
"
    );
    let scenario = scenarios::preset("small-hot-segment").unwrap();
    let report = PlacementCheck::new(&scenario).unwrap().run(&input).expect("report");

    assert_eq!(report.methods_in(SegmentKind::Profiled), ["java.lang.String.length"]);
    assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);

    let strict = java_scenario();
    let strict_report = PlacementCheck::new(&strict).unwrap().run(&input).expect("report");
    assert_eq!(strict_report.violations.len(), 1);
    assert_eq!(strict_report.violations[0].kind, ViolationKind::ExpectedHotOutside);
}

#[test]
fn unclassifiable_address_is_an_error_not_a_violation() {
    let input = format!(
        "{HOT_AND_NON_PROFILED}1 4 0 java.lang.Object.hashCode()I [0x9200, 0x9300 - 0x9400]\n"
    );
    let scenario = java_scenario();
    let err = PlacementCheck::new(&scenario).unwrap().run(&input).unwrap_err();

    assert!(matches!(err, CheckError::UnclassifiableMethods(_)));
    assert_eq!(err.unclassified_methods()[0].name, "java.lang.Object.hashCode");
    assert!(err.to_string().contains("0x9200"));
}

#[test]
fn invalid_scenario_is_rejected_before_parsing() {
    let scenario = Scenario::new("", NamePredicate::prefix("java"));
    assert!(matches!(PlacementCheck::new(&scenario), Err(CheckError::Scenario(_))));
}

#[test]
fn segmented_capture_passes_directives_preset() {
    let scenario = scenarios::preset("directives-file").unwrap();
    let report = PlacementCheck::new(&scenario).unwrap().run(SEGMENTED).expect("report");

    assert_eq!(report.scenario, "directives-file");
    assert_eq!(report.segments.len(), 4);
    assert_eq!(report.methods_in(SegmentKind::Hot).len(), 2);
    assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);
}

#[test]
fn segmented_capture_fails_empty_hot_preset() {
    let scenario = scenarios::preset("empty-hot-segment").unwrap();
    let report = PlacementCheck::new(&scenario).unwrap().run(SEGMENTED).expect("report");

    assert_eq!(report.violations.len(), 2);
    assert!(report.violations.iter().all(|v| v.kind == ViolationKind::HotSegmentNotEmpty));
}

#[test]
fn unsegmented_capture_passes_non_segmented_preset() {
    let scenario = scenarios::preset("non-segmented").unwrap();
    let report = PlacementCheck::new(&scenario).unwrap().run(UNSEGMENTED).expect("report");
    assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let scenario = scenarios::preset("command-file").unwrap();
    let check = PlacementCheck::new(&scenario).unwrap();
    let first = check.run(SEGMENTED).unwrap();
    let second = check.run(SEGMENTED).unwrap();
    assert_eq!(first, second);
}

#[test]
fn report_serializes_segment_keys_as_names() {
    let scenario = scenarios::preset("command-file").unwrap();
    let report = PlacementCheck::new(&scenario).unwrap().run(SEGMENTED).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["methods"]["hot"][0], "java.lang.Enum.ordinal");
    assert_eq!(json["segments"][0]["kind"], "hot");
    assert_eq!(json["segments"][0]["label"], "extra-hot");
    assert!(json["violations"].as_array().unwrap().is_empty());
}
