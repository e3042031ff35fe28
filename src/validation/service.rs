/*!
 * Timing service that ties settings, document and checks together.
 *
 * The service keeps the current `TimingConstraints` snapshot, rebuilds it
 * when the settings store reports a change, and re-runs validation (and
 * correction when enabled) when either the settings or the document
 * changed since the last run.
 */

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;
use tokio::sync::watch;

use crate::app_config::{ConfigStore, SettingsStore};
use crate::subtitle_processor::SubtitleDocument;

use super::constraints::TimingConstraints;
use super::correction::{apply_auto_fix, Adjustment};
use super::timecodes::{validate, Violation, ViolationKind};

/// Outcome of one timing check
#[derive(Debug, Clone, Serialize)]
pub struct TimingReport {
    /// Violations left after correction (all of them when correction is off)
    pub violations: Vec<Violation>,
    /// End-time changes applied to the document
    pub adjustments: Vec<Adjustment>,
    /// Number of entries checked
    pub entry_count: usize,
}

impl TimingReport {
    /// Whether the document satisfies every constraint
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violation count per kind, only kinds that occurred
    pub fn counts_by_kind(&self) -> BTreeMap<ViolationKind, usize> {
        let mut counts = BTreeMap::new();
        for violation in &self.violations {
            *counts.entry(violation.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Violations belonging to one entry
    pub fn violations_for(&self, entry_index: usize) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.entry_index == entry_index)
    }
}

/// Keeps timing checks in sync with settings and document changes
pub struct TimingService {
    constraints: TimingConstraints,
    settings_changes: watch::Receiver<u64>,
    document_changes: Option<watch::Receiver<u64>>,
}

impl TimingService {
    /// Snapshot the store's timing settings and subscribe to its changes
    pub fn new(store: &SettingsStore) -> Self {
        Self {
            constraints: TimingConstraints::from_store(store),
            settings_changes: store.subscribe(),
            document_changes: None,
        }
    }

    /// Current constraint snapshot
    pub fn constraints(&self) -> &TimingConstraints {
        &self.constraints
    }

    /// Follow changes of a document; `poll` then reacts to its updates
    pub fn watch_document(&mut self, document: &SubtitleDocument) {
        let mut changes = document.subscribe();
        changes.mark_changed();
        self.document_changes = Some(changes);
    }

    /// Rebuild the constraint snapshot if the store changed
    ///
    /// Returns whether a rebuild happened.
    pub fn refresh(&mut self, store: &dyn ConfigStore) -> bool {
        if !matches!(self.settings_changes.has_changed(), Ok(true)) {
            return false;
        }

        let revision = *self.settings_changes.borrow_and_update();
        self.constraints = TimingConstraints::from_store(store);
        debug!("Timing constraints rebuilt at settings revision {}", revision);
        true
    }

    /// Validate the document, correcting it first when auto check is on
    pub fn check(&mut self, store: &dyn ConfigStore, document: &mut SubtitleDocument) -> TimingReport {
        self.refresh(store);

        let constraints = &self.constraints;
        let mut adjustments = Vec::new();

        if constraints.auto_check && !validate(document.entries(), constraints).is_empty() {
            // Probe on a copy so an unfixable document is not reported as changed
            let mut corrected = document.entries().to_vec();
            let applied = apply_auto_fix(&mut corrected, constraints);
            if !applied.is_empty() {
                document.update_entries(|entries| *entries = corrected);
                adjustments = applied;
            }
        }

        let violations = validate(document.entries(), constraints);

        if let Some(changes) = self.document_changes.as_mut() {
            changes.borrow_and_update();
        }

        info!(
            "Timing check: {} entries, {} adjustment(s), {} violation(s) remaining",
            document.len(),
            adjustments.len(),
            violations.len()
        );

        TimingReport {
            violations,
            adjustments,
            entry_count: document.len(),
        }
    }

    /// Run `check` only if settings or the watched document changed
    pub fn poll(&mut self, store: &dyn ConfigStore, document: &mut SubtitleDocument) -> Option<TimingReport> {
        let settings_changed = matches!(self.settings_changes.has_changed(), Ok(true));
        let document_changed = self
            .document_changes
            .as_ref()
            .is_some_and(|changes| matches!(changes.has_changed(), Ok(true)));

        if !settings_changed && !document_changed {
            return None;
        }

        Some(self.check(store, document))
    }
}
