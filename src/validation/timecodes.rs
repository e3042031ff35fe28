/*!
 * Timing validation for subtitle entries.
 *
 * This module checks every entry against a `TimingConstraints` snapshot:
 * - Reading speed within [min_cps, max_cps]
 * - Display duration at least min_display_ms (end <= start counts as too short)
 * - Line length and line count limits
 * - Gap to the following entry (in start-time order) at least min_gap_ms
 */

use log::debug;
use serde::Serialize;

use crate::subtitle_processor::SubtitleEntry;

use super::constraints::TimingConstraints;

/// Kind of timing violation
///
/// Declaration order is the reporting order for violations of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ViolationKind {
    /// Reading speed above max_cps
    TooFast,
    /// Reading speed below min_cps
    TooSlow,
    /// Not enough idle time before the next entry
    GapTooSmall,
    /// Displayed for less than min_display_ms
    TooShort,
    /// A line holds more than max_chars_per_line characters
    LineTooLong,
    /// More than max_lines_per_subtitle lines
    TooManyLines,
}

impl ViolationKind {
    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::TooFast => "too fast",
            ViolationKind::TooSlow => "too slow",
            ViolationKind::GapTooSmall => "gap too small",
            ViolationKind::TooShort => "too short",
            ViolationKind::LineTooLong => "line too long",
            ViolationKind::TooManyLines => "too many lines",
        }
    }
}

/// A single constraint violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Position of the entry in the checked slice
    pub entry_index: usize,
    /// Sequence number of the entry
    pub seq_num: usize,
    pub kind: ViolationKind,
    /// cps, ms or character/line count depending on `kind`
    pub measured_value: f64,
    /// The limit that was crossed, in the same unit
    pub allowed_value: f64,
    /// Offending line for `LineTooLong`
    pub line_index: Option<usize>,
}

impl Violation {
    fn new(entry_index: usize, entry: &SubtitleEntry, kind: ViolationKind, measured_value: f64, allowed_value: f64) -> Self {
        Self {
            entry_index,
            seq_num: entry.seq_num,
            kind,
            measured_value,
            allowed_value,
            line_index: None,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: ", self.seq_num)?;
        match self.kind {
            ViolationKind::TooFast => write!(
                f,
                "Reading speed too high: {:.1} CPS (max: {:.1})",
                self.measured_value, self.allowed_value
            ),
            ViolationKind::TooSlow => write!(
                f,
                "Reading speed too low: {:.1} CPS (min: {:.1})",
                self.measured_value, self.allowed_value
            ),
            ViolationKind::GapTooSmall => write!(
                f,
                "Gap to next subtitle too small: {}ms (min: {}ms)",
                self.measured_value, self.allowed_value
            ),
            ViolationKind::TooShort => write!(
                f,
                "Duration too short: {}ms (min: {}ms)",
                self.measured_value, self.allowed_value
            ),
            ViolationKind::LineTooLong => write!(
                f,
                "Line {} too long: {} characters (max: {})",
                self.line_index.map_or(0, |i| i + 1),
                self.measured_value,
                self.allowed_value
            ),
            ViolationKind::TooManyLines => write!(
                f,
                "Too many lines: {} (max: {})",
                self.measured_value, self.allowed_value
            ),
        }
    }
}

/// Timing validator for subtitle entries
pub struct TimecodeValidator<'a> {
    constraints: &'a TimingConstraints,
}

impl<'a> TimecodeValidator<'a> {
    pub fn new(constraints: &'a TimingConstraints) -> Self {
        Self { constraints }
    }

    /// Number of characters counted for reading speed
    pub fn count_chars(&self, entry: &SubtitleEntry) -> usize {
        entry
            .lines
            .iter()
            .flat_map(|line| line.chars())
            .filter(|c| !(self.constraints.ignore_space && c.is_whitespace()))
            .count()
    }

    /// Characters per second for a given count and duration
    ///
    /// Returns infinity for non-positive durations.
    pub fn calculate_cps(char_count: usize, duration_ms: i64) -> f64 {
        if duration_ms <= 0 {
            return f64::INFINITY;
        }
        char_count as f64 * 1000.0 / duration_ms as f64
    }

    /// Check one entry on its own, without looking at neighbours
    pub fn validate_entry(&self, entry_index: usize, entry: &SubtitleEntry) -> Vec<Violation> {
        let c = self.constraints;
        let mut violations = Vec::new();
        let duration_ms = entry.duration_ms();

        if duration_ms <= 0 {
            violations.push(Violation::new(
                entry_index,
                entry,
                ViolationKind::TooShort,
                duration_ms as f64,
                c.min_display_ms as f64,
            ));
        } else {
            let cps = Self::calculate_cps(self.count_chars(entry), duration_ms);

            // max_cps wins when the limits are inconsistent
            if cps > c.max_cps {
                violations.push(Violation::new(entry_index, entry, ViolationKind::TooFast, cps, c.max_cps));
            } else if cps < c.min_cps {
                violations.push(Violation::new(entry_index, entry, ViolationKind::TooSlow, cps, c.min_cps));
            }

            if (duration_ms as u64) < c.min_display_ms {
                violations.push(Violation::new(
                    entry_index,
                    entry,
                    ViolationKind::TooShort,
                    duration_ms as f64,
                    c.min_display_ms as f64,
                ));
            }
        }

        for (line_index, line) in entry.lines.iter().enumerate() {
            let len = line.chars().count();
            if len > c.max_chars_per_line {
                let mut violation = Violation::new(
                    entry_index,
                    entry,
                    ViolationKind::LineTooLong,
                    len as f64,
                    c.max_chars_per_line as f64,
                );
                violation.line_index = Some(line_index);
                violations.push(violation);
            }
        }

        if entry.lines.len() > c.max_lines_per_subtitle {
            violations.push(Violation::new(
                entry_index,
                entry,
                ViolationKind::TooManyLines,
                entry.lines.len() as f64,
                c.max_lines_per_subtitle as f64,
            ));
        }

        violations
    }

    /// Check gaps between neighbours in start-time order
    ///
    /// A violation is attributed to the earlier entry of the pair.
    pub fn validate_gaps(&self, entries: &[SubtitleEntry]) -> Vec<Violation> {
        let min_gap = self.constraints.min_gap_ms as i64;

        start_order(entries)
            .windows(2)
            .filter_map(|pair| {
                let (current_idx, next_idx) = (pair[0], pair[1]);
                let gap = entries[next_idx].start_time_ms as i64 - entries[current_idx].end_time_ms as i64;
                (gap < min_gap).then(|| {
                    Violation::new(
                        current_idx,
                        &entries[current_idx],
                        ViolationKind::GapTooSmall,
                        gap as f64,
                        min_gap as f64,
                    )
                })
            })
            .collect()
    }

    /// Validate a collection of subtitle entries
    ///
    /// Violations come in document order, then kind declaration order.
    pub fn validate(&self, entries: &[SubtitleEntry]) -> Vec<Violation> {
        let mut violations: Vec<Violation> = entries
            .iter()
            .enumerate()
            .flat_map(|(index, entry)| self.validate_entry(index, entry))
            .collect();

        violations.extend(self.validate_gaps(entries));

        // Stable: several LineTooLong of one entry stay in line order
        violations.sort_by_key(|v| (v.entry_index, v.kind));

        debug!(
            "Timing validation: {} entries, {} violations",
            entries.len(),
            violations.len()
        );

        violations
    }
}

/// Validate entries against a constraint snapshot
pub fn validate(entries: &[SubtitleEntry], constraints: &TimingConstraints) -> Vec<Violation> {
    TimecodeValidator::new(constraints).validate(entries)
}

/// Entry indices sorted by start time; ties keep document order
pub(crate) fn start_order(entries: &[SubtitleEntry]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| entries[i].start_time_ms);
    order
}
