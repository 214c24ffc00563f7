#![allow(dead_code)]

use lift_core::model::Ranked;

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

/// Scores strictly positive and non-increasing.
pub fn assert_ranked<T>(ranked: &[Ranked<'_, T>]) {
    assert!(ranked.iter().all(|r| r.score > 0), "zero score in ranking");
    for pair in ranked.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "ranking not descending: {} before {}",
            pair[0].score,
            pair[1].score
        );
    }
}
