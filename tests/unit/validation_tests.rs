/*!
 * Tests for timing validation and correction
 */

use subtiming::validation::{apply_auto_fix, auto_fix, validate, TimingConstraints, ViolationKind};
use crate::common::{entry, lenient_constraints};

/// A 2-character subtitle shown for 200ms is too short
#[test]
fn test_validate_withShortDisplay_shouldReportTooShort() {
    let constraints = TimingConstraints { min_display_ms: 500, ..lenient_constraints() };
    let entries = vec![entry(1, 0, 200, "Hi")];

    let violations = validate(&entries, &constraints);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::TooShort);
    assert_eq!(violations[0].measured_value, 200.0);
    assert_eq!(violations[0].allowed_value, 500.0);

    let fixed = auto_fix(&entries, &constraints);
    assert_eq!(fixed[0].end_time_ms, 500);
}

/// 25 characters in one second at max 20 cps need 1250ms
#[test]
fn test_validate_withFastReading_shouldReportTooFastAndFixTo1250() {
    let constraints = TimingConstraints { max_cps: 20.0, ..lenient_constraints() };
    let entries = vec![entry(1, 0, 1000, "Twenty-five characters!!!")];
    assert_eq!(entries[0].lines[0].chars().count(), 25);

    let violations = validate(&entries, &constraints);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::TooFast);

    let fixed = auto_fix(&entries, &constraints);
    assert_eq!(fixed[0].end_time_ms, 1250);
}

/// A 50ms gap with min gap 100 moves the first end back to 950
#[test]
fn test_validate_withSmallGap_shouldReportAndShrinkEarlierEntry() {
    let constraints = TimingConstraints { min_gap_ms: 100, ..lenient_constraints() };
    let entries = vec![entry(1, 0, 1000, "First"), entry(2, 1050, 2000, "Second")];

    let violations = validate(&entries, &constraints);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::GapTooSmall);

    let fixed = auto_fix(&entries, &constraints);
    assert_eq!(fixed[0].end_time_ms, 950);
    assert_eq!(fixed[1].start_time_ms, 1050);
    assert!(validate(&fixed, &constraints).is_empty());
}

/// Overlapping entries are reported as a negative gap
#[test]
fn test_validate_withOverlap_shouldReportNegativeGap() {
    let constraints = lenient_constraints();
    let entries = vec![entry(1, 0, 1500, "First"), entry(2, 1000, 2000, "Second")];

    let violations = validate(&entries, &constraints);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::GapTooSmall);
    assert_eq!(violations[0].measured_value, -500.0);
}

/// Whitespace only counts when ignore_space is off
#[test]
fn test_validate_withIgnoreSpace_shouldChangeCps() {
    let entries = vec![entry(1, 0, 1000, "a b c d e f")];

    let strict = TimingConstraints { max_cps: 8.0, ..lenient_constraints() };
    assert_eq!(validate(&entries, &strict)[0].kind, ViolationKind::TooFast);

    let ignoring = TimingConstraints { ignore_space: true, ..strict };
    assert!(validate(&entries, &ignoring).is_empty());
}

/// Empty input gives no violations and no corrections
#[test]
fn test_validate_withNoEntries_shouldReturnEmpty() {
    let constraints = TimingConstraints::default();

    assert!(validate(&[], &constraints).is_empty());
    assert!(auto_fix(&[], &constraints).is_empty());
}

/// Violation messages carry both values
#[test]
fn test_violation_display_shouldDescribeProblem() {
    let constraints = TimingConstraints { max_chars_per_line: 4, ..lenient_constraints() };
    let violations = validate(&[entry(3, 0, 5000, "ok\ntoo long")], &constraints);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].to_string(), "#3: Line 2 too long: 8 characters (max: 4)");
}

/// Correction never touches start times and converges in one pass
#[test]
fn test_auto_fix_withMixedProblems_shouldBeIdempotent() {
    let constraints = TimingConstraints::default();
    let entries = vec![
        entry(1, 0, 300, "Way too quick for anybody"),
        entry(2, 350, 3000, "Fine"),
        entry(3, 2990, 4000, "Overlapping start"),
        entry(4, 6000, 5000, "Inverted"),
        entry(5, 5100, 5400, "Crammed"),
    ];

    let mut once = entries.clone();
    let adjustments = apply_auto_fix(&mut once, &constraints);
    assert!(!adjustments.is_empty());

    let mut twice = once.clone();
    assert!(apply_auto_fix(&mut twice, &constraints).is_empty());
    assert_eq!(once, twice);

    for (before, after) in entries.iter().zip(&once) {
        assert_eq!(before.start_time_ms, after.start_time_ms);
    }
}

/// Entries already within limits are returned untouched
#[test]
fn test_auto_fix_withCompliantEntries_shouldReturnUnchanged() {
    let constraints = TimingConstraints::default();
    let entries = vec![
        entry(1, 1000, 3000, "Good evening."),
        entry(2, 3200, 6000, "Welcome to the show\ntonight."),
    ];

    assert!(validate(&entries, &constraints).is_empty());
    assert_eq!(auto_fix(&entries, &constraints), entries);
}
