/*!
 * Tests for subtitle document functionality
 */

use std::fmt::Write;
use anyhow::Result;
use subtiming::subtitle_processor::{SubtitleDocument, SubtitleEntry};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Test invalid timestamps are rejected
#[test]
fn test_timestamp_parsing_withInvalidTimestamp_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("12:34").is_err());
    assert!(SubtitleEntry::parse_timestamp("aa:bb:cc,ddd").is_err());
    assert!(SubtitleEntry::parse_timestamp("00:00:75,000").is_err());
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withMultipleLines_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(7, 5000, 10000, "First line\nSecond line");
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "7\n00:00:05,000 --> 00:00:10,000\nFirst line\nSecond line\n\n");
}

/// Test entry helpers
#[test]
fn test_subtitle_entry_properties_withValidEntry_shouldHaveCorrectValues() {
    let entry = SubtitleEntry::new(42, 61234, 65432, "Hello\nWorld");

    assert_eq!(entry.lines, vec!["Hello".to_string(), "World".to_string()]);
    assert_eq!(entry.text(), "Hello\nWorld");
    assert_eq!(entry.duration_ms(), 4198);
    assert_eq!(entry.format_start_time(), "00:01:01,234");
    assert_eq!(entry.format_end_time(), "00:01:05,432");
}

/// Test loading a file keeps document order and malformed entries
#[test]
fn test_from_file_withSampleSubtitle_shouldLoadAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let document = SubtitleDocument::from_file(&path)?;

    assert_eq!(document.len(), 4);
    assert_eq!(document.source_file.as_deref(), Some(path.as_path()));
    assert_eq!(document.entries()[0].lines, vec!["Hi!".to_string()]);
    assert_eq!(document.entries()[3].duration_ms(), -1000);

    Ok(())
}

/// Test writing and reading back an SRT file
#[test]
fn test_write_to_srt_thenReload_shouldPreserveEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("written.srt");

    let document = SubtitleDocument::new(vec![
        common::entry(1, 0, 1500, "One"),
        common::entry(2, 2000, 3500, "Two\nlines"),
    ]);
    document.write_to_srt(&path)?;

    let reloaded = SubtitleDocument::from_file(&path)?;
    assert_eq!(reloaded.entries(), document.entries());

    Ok(())
}

/// Test loading a missing file reports an error
#[test]
fn test_from_file_withMissingFile_shouldFail() {
    assert!(SubtitleDocument::from_file("missing_file_12345.srt").is_err());
}
