/*!
 * Automatic timing correction.
 *
 * Only end times move; start times are where the user put them. An entry
 * is touched only when it currently violates a constraint:
 * - GapTooSmall: end is pulled back to `next.start - min_gap`
 * - TooShort / TooFast: end is pushed forward to reach the required
 *   duration, but never past `next.start - min_gap`
 * - TooSlow is left for the user
 *
 * When no adjustment fits, the entry is left as is and the violation
 * shows up again on the next validation.
 */

use log::debug;
use serde::Serialize;

use crate::subtitle_processor::SubtitleEntry;

use super::constraints::TimingConstraints;
use super::timecodes::{start_order, TimecodeValidator, ViolationKind};

/// Longest duration the engine will ever ask for (24 hours)
const MAX_REQUIRED_DURATION_MS: u64 = 86_400_000;

/// A change made to one entry's end time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub entry_index: usize,
    pub seq_num: usize,
    pub old_end_ms: u64,
    pub new_end_ms: u64,
    /// Violation the change addresses
    pub reason: ViolationKind,
}

/// Correct entries in place, returning what was changed
///
/// Does nothing unless `constraints.auto_check` is set.
pub fn apply_auto_fix(entries: &mut [SubtitleEntry], constraints: &TimingConstraints) -> Vec<Adjustment> {
    if !constraints.auto_check {
        debug!("Auto timing check disabled, skipping correction");
        return Vec::new();
    }

    let validator = TimecodeValidator::new(constraints);
    let min_gap = constraints.min_gap_ms as i64;

    // Latest end each entry may have without crowding its successor
    let mut ceilings: Vec<Option<i64>> = vec![None; entries.len()];
    for pair in start_order(entries).windows(2) {
        ceilings[pair[0]] = Some(entries[pair[1]].start_time_ms as i64 - min_gap);
    }

    let mut adjustments = Vec::new();

    for (index, entry) in entries.iter_mut().enumerate() {
        let start = entry.start_time_ms as i64;
        let end = entry.end_time_ms as i64;
        let ceiling = ceilings[index];

        if let Some(ceiling) = ceiling.filter(|&ceiling| end > ceiling) {
            if ceiling > start {
                adjustments.push(set_end(index, entry, ceiling as u64, ViolationKind::GapTooSmall));
            } else {
                debug!("Entry {}: next subtitle too close, gap left unresolved", entry.seq_num);
            }
            continue;
        }

        let Some(reason) = duration_violation(&validator, constraints, entry) else {
            continue;
        };

        let Some(required) = required_duration_ms(&validator, constraints, entry) else {
            debug!("Entry {}: no duration satisfies max cps {}", entry.seq_num, constraints.max_cps);
            continue;
        };

        let target = start + required as i64;
        let new_end = ceiling.map_or(target, |ceiling| target.min(ceiling));

        if new_end > end && new_end > start {
            if new_end < target {
                debug!(
                    "Entry {}: extension capped at {}ms by next subtitle, {} left unresolved",
                    entry.seq_num,
                    new_end,
                    reason.label()
                );
            }
            adjustments.push(set_end(index, entry, new_end as u64, reason));
        } else {
            debug!("Entry {}: no room to extend, {} left unresolved", entry.seq_num, reason.label());
        }
    }

    debug!("Auto timing correction: {} adjustment(s)", adjustments.len());
    adjustments
}

/// Return corrected copies of the entries
pub fn auto_fix(entries: &[SubtitleEntry], constraints: &TimingConstraints) -> Vec<SubtitleEntry> {
    let mut corrected = entries.to_vec();
    apply_auto_fix(&mut corrected, constraints);
    corrected
}

fn set_end(index: usize, entry: &mut SubtitleEntry, new_end_ms: u64, reason: ViolationKind) -> Adjustment {
    let adjustment = Adjustment {
        entry_index: index,
        seq_num: entry.seq_num,
        old_end_ms: entry.end_time_ms,
        new_end_ms,
        reason,
    };
    entry.end_time_ms = new_end_ms;
    adjustment
}

/// TooShort or TooFast if the entry needs a longer duration
fn duration_violation(validator: &TimecodeValidator, constraints: &TimingConstraints, entry: &SubtitleEntry) -> Option<ViolationKind> {
    let duration = entry.duration_ms();
    if duration <= 0 || (duration as u64) < constraints.min_display_ms {
        return Some(ViolationKind::TooShort);
    }

    let cps = TimecodeValidator::calculate_cps(validator.count_chars(entry), duration);
    (cps > constraints.max_cps).then_some(ViolationKind::TooFast)
}

/// Shortest duration meeting both min_display and max_cps
fn required_duration_ms(validator: &TimecodeValidator, constraints: &TimingConstraints, entry: &SubtitleEntry) -> Option<u64> {
    let chars = validator.count_chars(entry);
    if chars == 0 {
        return Some(constraints.min_display_ms);
    }

    let exact = chars as f64 * 1000.0 / constraints.max_cps;
    if !exact.is_finite() || exact < 0.0 || exact > MAX_REQUIRED_DURATION_MS as f64 {
        return None;
    }

    // Measured the same way the validator measures
    let mut duration = (exact.ceil() as u64).max(1);
    while TimecodeValidator::calculate_cps(chars, duration as i64) > constraints.max_cps {
        duration += 1;
    }

    Some(duration.max(constraints.min_display_ms))
}
