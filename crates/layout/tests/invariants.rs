//! Properties of the size-ratio and non-overlap invariants and of `evaluate`.

use test_case::test_case;
use toolbox_layout::{evaluate, report, Invariant, LayoutError, Measurements, Rectangle};

fn rect(y: f64, height: f64) -> Rectangle {
    Rectangle::new(0.0, y, 100.0, height)
}

fn pair(a: Rectangle, b: Rectangle) -> Measurements {
    Measurements::from([("A".to_string(), a), ("B".to_string(), b)])
}

#[test_case(100.0, 100.0, 1.0, true ; "equal heights pass")]
#[test_case(150.0, 100.0, 1.5, true ; "boundary is inclusive")]
#[test_case(150.5, 100.0, 1.5, false ; "just over the bound")]
#[test_case(600.0, 200.0, 1.5, false ; "input covering the page")]
#[test_case(10.0, 200.0, 2.0, true ; "much smaller subject")]
fn size_ratio_bound(a_height: f64, b_height: f64, factor: f64, expected: bool) {
    let invariants = [Invariant::size_ratio("ratio", "A", "B", factor)];
    let results = evaluate(&invariants, &pair(rect(0.0, a_height), rect(0.0, b_height))).unwrap();
    assert_eq!(results[0].passed, expected);
}

#[test_case(100.0, 0.0, 50.0, true ; "below the bottom edge")]
#[test_case(50.0, 0.0, 50.0, true ; "touching edges do not overlap")]
#[test_case(49.9, 0.0, 50.0, false ; "starts inside")]
#[test_case(0.0, 0.0, 40.0, false ; "same top")]
#[test_case(-10.0, 0.0, 40.0, false ; "starts above")]
fn non_overlap(a_y: f64, b_y: f64, b_height: f64, expected: bool) {
    let invariants = [Invariant::non_overlap("overlap", "A", "B")];
    let results = evaluate(&invariants, &pair(rect(a_y, 50.0), rect(b_y, b_height))).unwrap();
    assert_eq!(results[0].passed, expected);
}

#[test]
fn evaluate_preserves_order_and_length() {
    let measurements = pair(rect(0.0, 600.0), rect(50.0, 200.0));
    let invariants = [
        Invariant::size_ratio("I1", "A", "B", 1.5),
        Invariant::size_ratio("I2", "A", "B", 5.0),
        Invariant::non_overlap("I3", "A", "B"),
    ];

    let results = evaluate(&invariants, &measurements).unwrap();
    let names: Vec<_> = results
        .iter()
        .map(|r| r.invariant_description.as_str())
        .collect();
    assert_eq!(names, ["I1", "I2", "I3"]);
    assert_eq!(
        results.iter().map(|r| r.passed).collect::<Vec<_>>(),
        [false, true, false]
    );
}

#[test]
fn evaluate_is_repeatable() {
    let measurements = pair(rect(0.0, 600.0), rect(50.0, 200.0));
    let invariants = [
        Invariant::size_ratio("I1", "A", "B", 1.5),
        Invariant::non_overlap("I2", "B", "A"),
    ];
    assert_eq!(
        evaluate(&invariants, &measurements).unwrap(),
        evaluate(&invariants, &measurements).unwrap()
    );
}

#[test]
fn missing_measurement_yields_no_partial_results() {
    let measurements = pair(rect(0.0, 600.0), rect(50.0, 200.0));
    let invariants = [
        Invariant::size_ratio("ratio", "A", "B", 1.5),
        Invariant::non_overlap("under header", "A", "header"),
    ];

    let err = evaluate(&invariants, &measurements).unwrap_err();
    assert_eq!(
        err,
        LayoutError::MissingMeasurement {
            invariant: "under header".to_string(),
            name: "header".to_string(),
        }
    );
}

#[test]
fn upload_area_scenario() {
    let mut measurements = Measurements::new();
    measurements.insert("A".into(), Rectangle::new(0.0, 0.0, 100.0, 600.0));
    measurements.insert("B".into(), Rectangle::new(0.0, 50.0, 100.0, 200.0));
    measurements.insert("header".into(), Rectangle::new(0.0, 0.0, 500.0, 40.0));

    let invariants = [
        Invariant::size_ratio("input fits drop zone", "A", "B", 1.5),
        Invariant::non_overlap("input below header", "A", "header"),
    ];
    let results = evaluate(&invariants, &measurements).unwrap();

    assert_eq!(
        report(&results),
        "FAIL input fits drop zone: height(A)=600 > height(B)*1.5=300\n\
         FAIL input below header: A.y=0 < header.y+header.height=40\n"
    );
}

#[test]
fn stacked_elements_pass() {
    let measurements = pair(rect(100.0, 50.0), rect(0.0, 50.0));
    let results = evaluate(&[Invariant::non_overlap("stacked", "A", "B")], &measurements).unwrap();
    assert_eq!(report(&results), "PASS stacked: A.y=100 >= B.y+B.height=50\n");
}
