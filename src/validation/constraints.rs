/*!
 * Timing constraint snapshot built from the "timing" settings group.
 *
 * A `TimingConstraints` value is immutable once built; when the settings
 * change, callers build a new one.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::{ConfigStore, TIMING_GROUP};
use crate::errors::SettingsError;

pub const KEY_MIN_CPS: &str = "min-characters-per-second";
pub const KEY_MAX_CPS: &str = "max-characters-per-second";
pub const KEY_MIN_GAP: &str = "min-gap-between-subtitles";
pub const KEY_MIN_DISPLAY: &str = "min-display";
pub const KEY_MAX_CHARS_PER_LINE: &str = "max-characters-per-line";
pub const KEY_MAX_LINES: &str = "max-line-per-subtitle";
pub const KEY_IGNORE_SPACE: &str = "ignore-space";
pub const KEY_AUTO_CHECK: &str = "do-auto-timing-check";

/// Minimum reading speed in characters per second
const DEFAULT_MIN_CPS: f64 = 5.0;

/// Maximum reading speed in characters per second
const DEFAULT_MAX_CPS: f64 = 25.0;

/// Minimum gap between two subtitles in milliseconds
const DEFAULT_MIN_GAP_MS: u64 = 100;

/// Minimum display time in milliseconds
const DEFAULT_MIN_DISPLAY_MS: u64 = 1000;

const DEFAULT_MAX_CHARS_PER_LINE: usize = 40;

const DEFAULT_MAX_LINES_PER_SUBTITLE: usize = 2;

/// Timing constraints applied to every subtitle entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConstraints {
    /// Below this reading speed a subtitle stays on screen too long
    pub min_cps: f64,
    /// Above this reading speed a subtitle is too fast to read
    pub max_cps: f64,
    /// Minimum idle time between consecutive subtitles
    pub min_gap_ms: u64,
    /// Minimum display duration
    pub min_display_ms: u64,
    pub max_chars_per_line: usize,
    pub max_lines_per_subtitle: usize,
    /// Exclude whitespace from the character count used for cps
    pub ignore_space: bool,
    /// Run the correction pass after validation
    pub auto_check: bool,
}

impl Default for TimingConstraints {
    fn default() -> Self {
        Self {
            min_cps: DEFAULT_MIN_CPS,
            max_cps: DEFAULT_MAX_CPS,
            min_gap_ms: DEFAULT_MIN_GAP_MS,
            min_display_ms: DEFAULT_MIN_DISPLAY_MS,
            max_chars_per_line: DEFAULT_MAX_CHARS_PER_LINE,
            max_lines_per_subtitle: DEFAULT_MAX_LINES_PER_SUBTITLE,
            ignore_space: true,
            auto_check: true,
        }
    }
}

impl TimingConstraints {
    /// Build a snapshot from the "timing" group, falling back to defaults
    /// for absent keys. Negative integers are clamped to zero.
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();
        let int = |key: &str, default: u64| -> u64 {
            store
                .get_int(TIMING_GROUP, key)
                .map(|value| value.max(0) as u64)
                .unwrap_or(default)
        };

        let constraints = Self {
            min_cps: store.get_float(TIMING_GROUP, KEY_MIN_CPS).unwrap_or(defaults.min_cps),
            max_cps: store.get_float(TIMING_GROUP, KEY_MAX_CPS).unwrap_or(defaults.max_cps),
            min_gap_ms: int(KEY_MIN_GAP, defaults.min_gap_ms),
            min_display_ms: int(KEY_MIN_DISPLAY, defaults.min_display_ms),
            max_chars_per_line: int(KEY_MAX_CHARS_PER_LINE, defaults.max_chars_per_line as u64) as usize,
            max_lines_per_subtitle: int(KEY_MAX_LINES, defaults.max_lines_per_subtitle as u64) as usize,
            ignore_space: store.get_bool(TIMING_GROUP, KEY_IGNORE_SPACE).unwrap_or(defaults.ignore_space),
            auto_check: store.get_bool(TIMING_GROUP, KEY_AUTO_CHECK).unwrap_or(defaults.auto_check),
        };

        debug!("Built timing constraints: {:?}", constraints);
        constraints
    }

    /// Persist every field of this snapshot into the "timing" group
    pub fn write_to(&self, store: &mut dyn ConfigStore) {
        store.set_float(TIMING_GROUP, KEY_MIN_CPS, self.min_cps);
        store.set_float(TIMING_GROUP, KEY_MAX_CPS, self.max_cps);
        store.set_int(TIMING_GROUP, KEY_MIN_GAP, self.min_gap_ms as i64);
        store.set_int(TIMING_GROUP, KEY_MIN_DISPLAY, self.min_display_ms as i64);
        store.set_int(TIMING_GROUP, KEY_MAX_CHARS_PER_LINE, self.max_chars_per_line as i64);
        store.set_int(TIMING_GROUP, KEY_MAX_LINES, self.max_lines_per_subtitle as i64);
        store.set_bool(TIMING_GROUP, KEY_IGNORE_SPACE, self.ignore_space);
        store.set_bool(TIMING_GROUP, KEY_AUTO_CHECK, self.auto_check);
    }
}

/// Set one timing key from its textual form, using the key's own type
pub fn set_timing_value(store: &mut dyn ConfigStore, key: &str, raw: &str) -> Result<(), SettingsError> {
    let invalid = || SettingsError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };
    let raw = raw.trim();

    match key {
        KEY_MIN_CPS | KEY_MAX_CPS => {
            let value: f64 = raw.parse().map_err(|_| invalid())?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid());
            }
            store.set_float(TIMING_GROUP, key, value);
        }
        KEY_MIN_GAP | KEY_MIN_DISPLAY | KEY_MAX_CHARS_PER_LINE | KEY_MAX_LINES => {
            let value: u32 = raw.parse().map_err(|_| invalid())?;
            store.set_int(TIMING_GROUP, key, i64::from(value));
        }
        KEY_IGNORE_SPACE | KEY_AUTO_CHECK => {
            let value = match raw.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => return Err(invalid()),
            };
            store.set_bool(TIMING_GROUP, key, value);
        }
        _ => {
            return Err(SettingsError::UnknownKey {
                group: TIMING_GROUP.to_string(),
                key: key.to_string(),
            });
        }
    }

    Ok(())
}
