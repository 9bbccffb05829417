use super::*;
use crate::records::RatioRecord;
use crate::standards::{ReferenceStandard, StandardTable};

fn standards(delta_known: f64) -> StandardTable {
    StandardTable::new(vec![ReferenceStandard::new("18O", delta_known)]).unwrap()
}

fn reference_run() -> Vec<RatioRecord> {
    vec![
        RatioRecord::sample(1, "18O", 0.00650, 0.00003),
        RatioRecord::reference(2, "18O", 0.00602, 0.00002),
        RatioRecord::sample(3, "18O", 0.00650, 0.00003),
        RatioRecord::reference(4, "18O", 0.00602, 0.00002),
        RatioRecord::reference(6, "18O", 0.00602, 0.00002),
    ]
}

#[test]
fn test_nitrate_scenario() {
    let records = reference_run();
    let deltas = bracketed_deltas(&records, &standards(57.5)).unwrap();

    // injection 1 has no reference at 0
    assert_eq!(deltas.len(), 1);
    let row = &deltas[0];
    assert_eq!(row.injection, 3);
    assert_eq!(row.ref_before_injection, 2);
    assert_eq!(row.ref_after_injection, 4);
    assert_eq!(row.ref_ratio, (0.00602 + 0.00602) / 2.0);
    assert!((row.ref_ratio - 0.00602).abs() < 1e-15);

    let expected_delta = (0.00650 / row.ref_ratio) * 1057.5 - 1000.0;
    assert_eq!(row.delta, expected_delta);
    assert!((row.delta - 141.8189).abs() < 1e-3);

    let ref_sem = 0.5 * (0.00002f64.powi(2) * 2.0).sqrt();
    let expected_sem = (expected_delta + 1000.0)
        * ((0.00003f64 / 0.00650).powi(2) + (ref_sem / row.ref_ratio).powi(2)).sqrt();
    assert!((row.ref_ratio_sem - ref_sem).abs() < 1e-18);
    assert!((row.delta_sem - expected_sem).abs() < 1e-9);
}

#[test]
fn test_bracket_average_symmetry() {
    let avg = BracketAverage::new(0.0060, 0.00002, 0.0062, 0.00004);
    assert_eq!(avg.ratio, (0.0060 + 0.0062) / 2.0);
    assert_eq!(
        avg.ratio_sem,
        0.5 * (0.00002f64.powi(2) + 0.00004f64.powi(2)).sqrt()
    );

    let swapped = BracketAverage::new(0.0062, 0.00004, 0.0060, 0.00002);
    assert_eq!(avg, swapped);
}

#[test]
fn test_delta_identity() {
    let reference = BracketAverage::new(0.006, 0.00001, 0.006, 0.00001);
    let calibrated = calibrate(
        3,
        "18O",
        0.006,
        0.00001,
        reference,
        &ReferenceStandard::new("18O", 0.0),
    )
    .unwrap();
    assert_eq!(calibrated.delta, 0.0);
}

#[test]
fn test_known_delta_passes_through() {
    // a sample identical to the standard reproduces the certified value
    let reference = BracketAverage::new(0.006, 0.0, 0.006, 0.0);
    let calibrated = calibrate(
        3,
        "18O",
        0.006,
        0.0,
        reference,
        &ReferenceStandard::new("18O", 57.5),
    )
    .unwrap();
    assert!((calibrated.delta - 57.5).abs() < 1e-10);
    assert_eq!(calibrated.delta_sem, 0.0);
}

#[test]
fn test_uncertainty_scales_linearly() {
    let standard = ReferenceStandard::new("18O", 57.5);
    let single = calibrate(
        3,
        "18O",
        0.0065,
        0.00003,
        BracketAverage::new(0.00602, 0.00002, 0.00604, 0.00001),
        &standard,
    )
    .unwrap();
    let doubled = calibrate(
        3,
        "18O",
        0.0065,
        0.00006,
        BracketAverage::new(0.00602, 0.00004, 0.00604, 0.00002),
        &standard,
    )
    .unwrap();

    assert_eq!(single.delta, doubled.delta);
    assert!((doubled.delta_sem - 2.0 * single.delta_sem).abs() < 1e-12 * single.delta_sem.abs().max(1.0));
}

#[test]
fn test_non_positive_ratio() {
    let standard = ReferenceStandard::new("18O", 57.5);
    let err = calibrate(
        3,
        "18O",
        0.0,
        0.0,
        BracketAverage::new(0.006, 0.0, 0.006, 0.0),
        &standard,
    )
    .unwrap_err();
    assert!(matches!(err, DeltaError::NonPositiveRatio { field: "ratio", .. }));

    let records = vec![
        RatioRecord::reference(2, "18O", -0.006, 0.0),
        RatioRecord::sample(3, "18O", 0.0065, 0.0),
        RatioRecord::reference(4, "18O", 0.0, 0.0),
    ];
    let err = bracketed_deltas(&records, &standards(57.5)).unwrap_err();
    assert!(matches!(err, DeltaError::NonPositiveRatio { field: "ref_ratio", injection: 3, .. }));
}

#[test]
fn test_missing_standard() {
    let records = vec![
        RatioRecord::reference(1, "15N", 0.0037, 0.0),
        RatioRecord::sample(2, "15N", 0.0038, 0.0),
        RatioRecord::reference(3, "15N", 0.0037, 0.0),
    ];
    let err = bracketed_deltas(&records, &standards(57.5)).unwrap_err();
    assert!(matches!(
        err,
        DeltaError::StandardsError(StandardsError::MissingStandard(ref iso)) if iso == "15N"
    ));
}

#[test]
fn test_unbracketed_isotopocule_needs_no_standard() {
    let mut records = reference_run();
    records.push(RatioRecord::sample(9, "15N", 0.0038, 0.0));
    let deltas = bracketed_deltas(&records, &standards(57.5)).unwrap();
    assert_eq!(deltas.len(), 1);
}

#[test]
fn test_labels_are_carried() {
    let records = vec![
        RatioRecord::reference(1, "18O", 0.006, 0.0).with_condition("AGC"),
        RatioRecord::sample(2, "18O", 0.0065, 0.0)
            .with_condition("AGC")
            .with_sample("USGS-34")
            .with_basepeak("M0"),
        RatioRecord::reference(3, "18O", 0.006, 0.0).with_condition("AGC"),
    ];
    let deltas = bracketed_deltas(&records, &standards(57.5)).unwrap();
    // basepeak differs from the references, so no bracket
    assert!(deltas.is_empty());

    let records: Vec<_> = records
        .into_iter()
        .map(|r| r.with_basepeak("M0"))
        .collect();
    let deltas = bracketed_deltas(&records, &standards(57.5)).unwrap();
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].sample.as_deref(), Some("USGS-34"));
    assert_eq!(deltas[0].partition_key().condition.as_deref(), Some("AGC"));
}
