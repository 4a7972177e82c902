extern crate vigil_detect;

mod support;

use vigil_detect::common::{Category, DetectionVerdict, OutputLayout, ScorerConfig};
use vigil_detect::AnomalyScorer;
use support::{raw_output, init_logger, KNIFE, PERSON};

fn default_scorer() -> (AnomalyScorer, OutputLayout) {
    init_logger();
    let config = ScorerConfig::default();
    let layout = config.layout;
    (AnomalyScorer::new(config).unwrap(), layout)
}

#[test]
fn fallen_person_at_full_resolution() {
    let (mut scorer, layout) = default_scorer();
    assert_eq!(layout.expected_len(), 84 * 8400);

    let raw = raw_output(&layout, 4321, (320., 0.9 * 640., 80., 120.), &[(PERSON, 0.7)]);
    let verdict = scorer.score(&raw);

    assert!(verdict.is_anomalous);
    assert_eq!(verdict.category, Category::PersonDown);
    assert_eq!(verdict.confidence, 0.88);
}

#[test]
fn best_anchor_wins_and_its_box_is_used() {
    let (mut scorer, layout) = default_scorer();
    // a weaker person lying down at the bottom, a stronger one standing
    let mut raw = raw_output(&layout, 10, (320., 620., 200., 50.), &[(PERSON, 0.6)]);
    let strong = raw_output(&layout, 8399, (300., 250., 50., 150.), &[(PERSON, 0.95)]);
    for (dst, src) in raw.iter_mut().zip(strong) {
        if src != 0. {
            *dst = src;
        }
    }

    assert_eq!(scorer.score(&raw), DetectionVerdict::normal(0.95));
    let latest = scorer.history().latest().unwrap();
    assert_eq!((latest.cx, latest.cy), (300., 250.));
}

#[test]
fn threshold_is_strict() {
    let (mut scorer, layout) = default_scorer();
    let raw = raw_output(&layout, 0, (320., 300., 60., 160.), &[(PERSON, 0.5)]);
    let verdict = scorer.score(&raw);
    assert_eq!(verdict.category, Category::NoneDetected);
    assert!(!verdict.is_anomalous);
}

#[test]
fn malformed_output_degrades() {
    let (mut scorer, layout) = default_scorer();
    let mut raw = raw_output(&layout, 0, (320., 300., 60., 160.), &[(PERSON, 0.9)]);
    raw.push(0.);

    let verdict = scorer.score(&raw);
    assert_eq!(verdict, DetectionVerdict { is_anomalous: false, confidence: 0., category: Category::DecodeError });
    assert_eq!(verdict.category.label(), "decode-error");
    assert!(scorer.history().is_empty());
}

#[test]
fn weapon_needs_consecutive_frames() {
    let (mut scorer, layout) = default_scorer();
    let frame = |knife: f32| raw_output(&layout, 77, (320., 300., 60., 160.), &[(PERSON, 0.9), (KNIFE, knife)]);

    let labels: Vec<String> = [0.9, 0.2, 0.9, 0.9, 0.9, 0.2, 0.2, 0.9]
        .into_iter()
        .map(|c| scorer.score(&frame(c)).category.label().to_string())
        .collect();

    assert_eq!(
        labels,
        ["normal", "normal", "normal", "weapon", "weapon", "normal", "normal", "weapon"]
    );
}

#[test]
fn errors_decay_weapon_counter() {
    let (mut scorer, layout) = default_scorer();
    let armed = raw_output(&layout, 77, (320., 300., 60., 160.), &[(PERSON, 0.9), (KNIFE, 0.9)]);

    scorer.score(&armed);
    assert_eq!(scorer.debounce_hits("weapon"), Some(1));
    scorer.score(&[]);
    assert_eq!(scorer.debounce_hits("weapon"), Some(0));
    // the earlier hit is gone, so this one alone cannot confirm
    assert_eq!(scorer.score(&armed).category, Category::Normal);
}

#[test]
fn verdict_serializes_with_label() {
    let json = serde_json::to_value(DetectionVerdict::anomaly(0.82, Category::UnusualPosture)).unwrap();
    assert_eq!(json["is_anomalous"], true);
    assert_eq!(json["category"], "unusual-posture");
}
