/*!
 * Common test utilities for the subtiming test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use subtiming::{SubtitleEntry, TimingConstraints};

/// Route library logs to the test output (RUST_LOG=debug to see them)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file with a few timing problems
///
/// Entry 1 is too short, entry 2 ends 40ms before entry 3 starts,
/// entry 4 has end before start.
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:01,300
Hi!

2
00:00:02,000 --> 00:00:04,960
This is a test subtitle.

3
00:00:05,000 --> 00:00:08,000
It contains multiple entries.

4
00:00:10,000 --> 00:00:09,000
Broken timing.
"#;
    create_test_file(dir, filename, content)
}

/// Shorthand for building an entry from text
pub fn entry(seq: usize, start: u64, end: u64, text: &str) -> SubtitleEntry {
    SubtitleEntry::new(seq, start, end, text)
}

/// Constraints that only flag what a test explicitly tightens
pub fn lenient_constraints() -> TimingConstraints {
    TimingConstraints {
        min_cps: 0.0,
        max_cps: 1000.0,
        min_gap_ms: 0,
        min_display_ms: 0,
        max_chars_per_line: 1000,
        max_lines_per_subtitle: 100,
        ignore_space: false,
        auto_check: true,
    }
}
