/*!
 * Tests for the settings store
 */

use std::fs;
use anyhow::Result;
use subtiming::app_config::{ConfigStore, LogLevel, SettingsStore, TIMING_GROUP};
use subtiming::validation::constraints::{KEY_IGNORE_SPACE, KEY_MAX_CPS, KEY_MIN_GAP};
use subtiming::{SettingsError, TimingConstraints};
use crate::common;

/// Test that a missing file yields an empty store with defaults
#[test]
fn test_load_withMissingFile_shouldUseDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("settings.json");

    let store = SettingsStore::load(&path)?;

    assert_eq!(TimingConstraints::from_store(&store), TimingConstraints::default());

    store.save()?;
    assert!(path.exists());
    Ok(())
}

/// Test that saved settings survive a reload
#[test]
fn test_save_thenLoad_shouldKeepValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("settings.json");

    let mut store = SettingsStore::load(&path)?;
    store.set_float(TIMING_GROUP, KEY_MAX_CPS, 17.5);
    store.set_int(TIMING_GROUP, KEY_MIN_GAP, 120);
    store.set_bool(TIMING_GROUP, KEY_IGNORE_SPACE, false);
    store.save()?;

    let reloaded = SettingsStore::load(&path)?;
    assert_eq!(reloaded.get_float(TIMING_GROUP, KEY_MAX_CPS), Some(17.5));
    assert_eq!(reloaded.get_int(TIMING_GROUP, KEY_MIN_GAP), Some(120));
    assert_eq!(reloaded.get_bool(TIMING_GROUP, KEY_IGNORE_SPACE), Some(false));

    let keys: Vec<&str> = reloaded.group(TIMING_GROUP).map(|(key, _)| key).collect();
    assert_eq!(keys.len(), 3);
    Ok(())
}

/// Test that the settings file uses group -> key -> value layout
#[test]
fn test_load_withHandWrittenFile_shouldReadGroups() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "settings.json",
        r#"{ "timing": { "min-display": 750, "do-auto-timing-check": false } }"#,
    )?;

    let store = SettingsStore::load(&path)?;
    let constraints = TimingConstraints::from_store(&store);

    assert_eq!(constraints.min_display_ms, 750);
    assert!(!constraints.auto_check);
    assert_eq!(constraints.max_cps, TimingConstraints::default().max_cps);
    Ok(())
}

/// Test that a corrupt file is a parse error
#[test]
fn test_load_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, "{ not json")?;

    let result = SettingsStore::load(&path);

    assert!(matches!(result, Err(SettingsError::Parse { .. })));
    Ok(())
}

/// Test log level mapping
#[test]
fn test_log_level_default_shouldBeInfo() {
    assert_eq!(LogLevel::default(), LogLevel::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
}
