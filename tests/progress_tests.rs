// Tests for progress accounting: bounded percentages, monotonicity, and the
// model-loading clamp.

use voxpipe::progress::{loading_percent, ProgressTracker, PROGRESS_CAP};

#[test]
fn test_percent_is_monotonic_and_bounded() {
    let mut tracker = ProgressTracker::new();
    tracker.set_total(4);

    let mut last = 0.0;
    for _ in 0..10 {
        let percent = tracker.record_chunk();
        assert!(percent >= last, "Progress must never go backwards");
        assert!(percent <= PROGRESS_CAP, "Progress is capped below 100");
        last = percent;
    }

    // Well past the estimate, the cap holds
    assert_eq!(tracker.percent(), PROGRESS_CAP);
}

#[test]
fn test_percent_values_for_known_totals() {
    let mut tracker = ProgressTracker::new();
    tracker.set_total(3);

    assert!((tracker.record_chunk() - 100.0 / 3.0).abs() < 1e-9);
    assert!((tracker.record_chunk() - 200.0 / 3.0).abs() < 1e-9);
    // The third chunk would be 100%, but completion owns that value
    assert_eq!(tracker.record_chunk(), 99.0);
}

#[test]
fn test_zero_total_is_clamped() {
    let mut tracker = ProgressTracker::new();
    tracker.set_total(0);

    assert_eq!(tracker.total_chunks(), 1);
    // Finite and capped rather than a division blowup
    assert_eq!(tracker.record_chunk(), 99.0);
}

#[test]
fn test_set_total_resets_processed() {
    let mut tracker = ProgressTracker::new();
    tracker.set_total(5);
    tracker.record_chunk();
    tracker.record_chunk();
    assert_eq!(tracker.processed_chunks(), 2);

    tracker.set_total(10);
    assert_eq!(tracker.processed_chunks(), 0);
    assert_eq!(tracker.percent(), 0.0);
}

#[test]
fn test_reset_returns_to_initial_state() {
    let mut tracker = ProgressTracker::new();
    tracker.set_total(2);
    tracker.record_chunk();

    tracker.reset();
    assert_eq!(tracker.processed_chunks(), 0);
    assert_eq!(tracker.total_chunks(), 1);
}

#[test]
fn test_loading_percent_scales_fractions() {
    assert_eq!(loading_percent(0.0), 0.0);
    assert_eq!(loading_percent(0.5), 50.0);
    assert_eq!(loading_percent(1.0), 100.0);
}

#[test]
fn test_loading_percent_clamps_bad_values() {
    assert_eq!(loading_percent(f64::NAN), 0.0);
    assert_eq!(loading_percent(f64::INFINITY), 0.0);
    assert_eq!(loading_percent(-0.5), 0.0);
    assert_eq!(loading_percent(2.0), 100.0);
}
