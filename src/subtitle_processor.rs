use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};
use tokio::sync::watch;

use crate::errors::SubtitleError;

// @module: Subtitle document model and SRT handling

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{3})")
        .expect("timestamp regex is valid")
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, one string per displayed line
    pub lines: Vec<String>,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry, splitting `text` on newlines
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: &str) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Creates a new subtitle entry from already separated lines
    pub fn from_lines(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines,
        }
    }

    /// Display duration in ms; zero or negative for malformed timings
    pub fn duration_ms(&self) -> i64 {
        self.end_time_ms as i64 - self.start_time_ms as i64
    }

    /// Whole text with lines joined by newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());

        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut values = [0u64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.parse().map_err(|_| invalid())?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(invalid());
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Ordered subtitle entries with change notification
///
/// The document owns its entries; readers borrow them through `entries()`
/// and writers go through `update_entries`, which bumps the revision that
/// subscribers observe.
#[derive(Debug)]
pub struct SubtitleDocument {
    /// Source filename, if loaded from disk
    pub source_file: Option<PathBuf>,

    entries: Vec<SubtitleEntry>,

    revision: watch::Sender<u64>,
}

impl SubtitleDocument {
    /// Create a document holding the given entries
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        let (revision, _) = watch::channel(0);
        SubtitleDocument {
            source_file: None,
            entries,
            revision,
        }
    }

    /// Load a document from an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        let entries = Self::parse_srt_string(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;

        debug!("Loaded {} entries from {}", entries.len(), path.display());

        let mut document = Self::new(entries);
        document.source_file = Some(path.to_path_buf());
        Ok(document)
    }

    /// Entries in document order
    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mutate the entries and notify subscribers
    pub fn update_entries<F, R>(&mut self, update: F) -> R
    where
        F: FnOnce(&mut Vec<SubtitleEntry>) -> R,
    {
        let result = update(&mut self.entries);
        self.revision.send_modify(|revision| *revision += 1);
        result
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision (number of updates so far)
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        Ok(())
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Entries keep their file order. Timings with end <= start are kept
    /// (with a warning) so they can be reported instead of vanishing.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_lines: Vec<String> = Vec::new();

        let finish_entry = |seq_num: Option<usize>, times: Option<(u64, u64)>, lines: &mut Vec<String>, entries: &mut Vec<SubtitleEntry>| {
            let Some((start_ms, end_ms)) = times else {
                lines.clear();
                return;
            };
            let seq_num = seq_num.unwrap_or(entries.len() + 1);

            if lines.is_empty() {
                warn!("Skipping empty subtitle entry {}", seq_num);
                return;
            }
            if end_ms <= start_ms {
                warn!("Subtitle entry {} has end {}ms <= start {}ms", seq_num, end_ms, start_ms);
            }

            entries.push(SubtitleEntry::from_lines(seq_num, start_ms, end_ms, std::mem::take(lines)));
        };

        // Strip a UTF-8 byte order mark if present
        let content = content.trim_start_matches('\u{feff}');
        let raw_lines: Vec<&str> = content.lines().collect();

        // A sequence number directly followed by a timing line
        let opens_entry = |idx: usize| {
            raw_lines[idx].trim().parse::<usize>().is_ok()
                && raw_lines
                    .get(idx + 1)
                    .is_some_and(|next| TIMESTAMP_REGEX.is_match(next.trim()))
        };

        // Set after a bad timing line, until the next blank line
        let mut skipping = false;

        for (line_idx, line) in raw_lines.iter().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if current_times.is_some() {
                    finish_entry(current_seq_num.take(), current_times.take(), &mut current_lines, &mut entries);
                }
                current_seq_num = None;
                skipping = false;
                continue;
            }

            if skipping {
                continue;
            }

            if current_times.is_some() {
                if !opens_entry(line_idx) {
                    current_lines.push(line.trim_end_matches('\r').to_string());
                    continue;
                }
                // Next entry starts without a separating blank line
                finish_entry(current_seq_num.take(), current_times.take(), &mut current_lines, &mut entries);
            }

            // Sequence number only opens a new entry
            if current_seq_num.is_none() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) else {
                warn!("Unexpected text at line {} before timestamp: {}", line_idx + 1, trimmed);
                current_seq_num = None;
                continue;
            };

            match Self::parse_time_range(&caps) {
                Ok(times) => current_times = Some(times),
                Err(e) => {
                    warn!("Skipping subtitle block at line {}: {}", line_idx + 1, e);
                    current_seq_num = None;
                    skipping = true;
                }
            }
        }

        finish_entry(current_seq_num, current_times, &mut current_lines, &mut entries);

        if entries.is_empty() {
            warn!("No valid subtitle entries found in content");
            return Err(SubtitleError::NoEntries);
        }

        Ok(entries)
    }

    /// Parse the start and end timestamps of a captured timing line
    fn parse_time_range(caps: &regex::Captures) -> Result<(u64, u64), SubtitleError> {
        let start_ms = SubtitleEntry::parse_timestamp(&caps[1])?;
        let end_ms = SubtitleEntry::parse_timestamp(&caps[2])?;
        Ok((start_ms, end_ms))
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Document")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
