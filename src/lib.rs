/*!
 * # subtiming - Subtitle timing checker
 *
 * A Rust library for validating and correcting subtitle timing.
 *
 * ## Features
 *
 * - Reading speed limits (characters per second), optionally ignoring spaces
 * - Minimum display time and minimum gap between subtitles
 * - Line length and line count limits
 * - Automatic end-time correction for fixable violations
 * - Settings grouped like the editor's preference pages, with change notification
 * - SRT reading and writing
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Grouped settings store and log level
 * - `subtitle_processor`: Subtitle entries, documents and SRT handling
 * - `validation`: Timing checks:
 *   - `validation::constraints`: Constraint snapshot from the "timing" group
 *   - `validation::timecodes`: Violation detection
 *   - `validation::correction`: Automatic correction
 *   - `validation::service`: Change-driven re-checking
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
// Test names follow the test_subject_withCondition_shouldOutcome convention
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod validation;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{ConfigStore, SettingsStore};
pub use subtitle_processor::{SubtitleDocument, SubtitleEntry};
pub use validation::{auto_fix, validate, TimingConstraints, TimingReport, TimingService, Violation, ViolationKind};
pub use errors::{SettingsError, SubtitleError};
