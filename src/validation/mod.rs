/*!
 * Subtitle timing checks.
 *
 * # Architecture
 *
 * - `constraints`: Constraint snapshot read from the "timing" settings group
 * - `timecodes`: Pure validation of entries against a snapshot
 * - `correction`: End-time corrections for fixable violations
 * - `service`: Keeps a snapshot current and runs checks on change
 */

pub mod constraints;
pub mod timecodes;
pub mod correction;
pub mod service;

// Re-export main types
pub use constraints::TimingConstraints;
pub use timecodes::{validate, TimecodeValidator, Violation, ViolationKind};
pub use correction::{apply_auto_fix, auto_fix, Adjustment};
pub use service::{TimingReport, TimingService};
