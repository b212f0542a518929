use lantern_grade::compare::MatchMode;
use lantern_plan::parse::parse_plan;
use lantern_plan::time::TimePoint;
use lantern_plan::validate::{validate_plan, PlanError};

const FULL_PLAN: &str = r#"{
    "probes": [
        {"target": "esp", "signal": "D26", "label": "LED"},
        {"target": "esp", "signal": "D4",  "label": "BTN"},
        {"target": "esp", "signal": "D5",  "label": "D5"}
    ],
    "stimulus": {
        "target": "btn1",
        "control": "pressed",
        "events": [
            {"assert_time": 0.50, "deassert_time": 0.70},
            {"assert_time": 0.90, "deassert_time": 1.10}
        ]
    },
    "schedule": {
        "fixed_times": [0.48, 0.70, 0.90, 1.10],
        "random_count": 6,
        "window": [0.2, 1.6],
        "seed": 1337
    },
    "run": {
        "timeout_secs": 6.0,
        "guard_band_secs": 0.002,
        "sentinel": "DONE"
    },
    "golden": {
        "capture": "tests/expected_serial.txt",
        "capture_mode": "subsequence",
        "probes": "tests/expected_probes.csv"
    }
}"#;

#[test]
fn test_parse_full_plan() {
    let plan = parse_plan(FULL_PLAN).unwrap();
    assert_eq!(plan.probes.len(), 3);
    assert_eq!(plan.probes[0].label, "LED");
    assert_eq!(plan.stimulus.target, "btn1");
    assert_eq!(plan.stimulus.events.len(), 2);
    assert_eq!(plan.schedule.seed, Some(1337));
    assert_eq!(plan.schedule.window.0, TimePoint::from_secs(0.2));
    assert_eq!(plan.run.sentinel, "DONE");
    assert_eq!(plan.golden.capture_mode, MatchMode::Subsequence);
    assert_eq!(plan.golden.probes_mode, MatchMode::Exact);
    assert!(validate_plan(&plan).is_ok());
}

#[test]
fn test_parse_minimal_plan_uses_defaults() {
    let plan = parse_plan(
        r#"{
            "probes": [{"target": "esp", "signal": "D26", "label": "LED"}],
            "stimulus": {"target": "btn1", "control": "pressed"},
            "schedule": {"fixed_times": [0.5], "window": [0.0, 1.0]}
        }"#,
    )
    .unwrap();
    assert_eq!(plan.run.timeout_secs, 6.0);
    assert_eq!(plan.run.guard_band_secs, 0.002);
    assert_eq!(plan.run.sentinel, "DONE");
    assert!(plan.run.capture);
    assert!(plan.run.sampling);
    assert_eq!(plan.artifacts.dir, std::path::PathBuf::from("artifacts"));
    assert_eq!(plan.artifacts.capture_path().to_str().unwrap(), "artifacts/serial.txt");
    assert!(plan.golden.capture.is_none());
    assert!(validate_plan(&plan).is_ok());
}

#[test]
fn test_parse_garbage_fails() {
    assert!(parse_plan("not json").is_err());
}

#[test]
fn test_duplicate_labels_rejected() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.probes[1].label = "LED".to_string();
    let errors = validate_plan(&plan).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, PlanError::DuplicateLabel { label } if label == "LED")));
}

#[test]
fn test_inverted_event_rejected() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.stimulus.events[0].deassert_time = TimePoint::from_secs(0.4);
    let errors = validate_plan(&plan).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, PlanError::InvertedEvent { index: 0, .. })));
}

#[test]
fn test_overlapping_events_rejected() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.stimulus.events[1].assert_time = TimePoint::from_secs(0.6);
    let errors = validate_plan(&plan).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, PlanError::OverlappingEvents { index: 1 })));
}

#[test]
fn test_inverted_window_rejected() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.schedule.window = (TimePoint::from_secs(1.6), TimePoint::from_secs(0.2));
    let errors = validate_plan(&plan).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, PlanError::InvertedWindow { .. })));
}

#[test]
fn test_sampling_without_probes_rejected() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.probes.clear();
    let errors = validate_plan(&plan).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, PlanError::NoProbes)));
}

#[test]
fn test_empty_sentinel_rejected() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.run.sentinel = "   ".to_string();
    let errors = validate_plan(&plan).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, PlanError::EmptySentinel)));
}

#[test]
fn test_probes_disabled_allows_empty_probe_set() {
    let mut plan = parse_plan(FULL_PLAN).unwrap();
    plan.probes.clear();
    plan.run.sampling = false;
    assert!(validate_plan(&plan).is_ok());
}
