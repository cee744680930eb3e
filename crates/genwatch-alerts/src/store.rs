//! In-memory snapshot and alert stores.
//!
//! This module provides:
//! - [`MemorySnapshotStore`] - ordered snapshot history with a capacity bound
//! - [`MemoryAlertStore`] - alert records with all-or-nothing commits
//!
//! Both are thread-safe and cheap to share behind an `Arc`.

use std::collections::{HashSet, VecDeque};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{AlertError, Result};
use crate::telemetry::TelemetrySnapshot;
use crate::traits::{AlertChangeSet, AlertStore, SnapshotReader, SnapshotStore};
use crate::types::Alert;

/// Thread-safe in-memory snapshot history.
///
/// Timestamps must strictly increase. When the history exceeds its
/// capacity the oldest snapshots are dropped.
#[derive(Debug)]
pub struct MemorySnapshotStore {
    max_snapshots: usize,
    snapshots: RwLock<VecDeque<TelemetrySnapshot>>,
}

impl MemorySnapshotStore {
    /// Creates a store with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(StoreConfig::default().max_snapshots)
    }

    /// Creates a store keeping at most `max_snapshots` readings.
    #[must_use]
    pub fn with_capacity(max_snapshots: usize) -> Self {
        Self {
            max_snapshots: max_snapshots.max(1),
            snapshots: RwLock::new(VecDeque::new()),
        }
    }

    /// Creates a store sized from configuration.
    #[must_use]
    pub fn with_config(config: &StoreConfig) -> Self {
        Self::with_capacity(config.max_snapshots)
    }

    /// Returns the stored snapshots, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<TelemetrySnapshot> {
        self.snapshots.read().iter().copied().collect()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotReader for MemorySnapshotStore {
    fn latest(&self) -> Result<Option<TelemetrySnapshot>> {
        Ok(self.snapshots.read().back().copied())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn append(&self, snapshot: TelemetrySnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write();

        if let Some(latest) = snapshots.back() {
            if snapshot.timestamp_ms <= latest.timestamp_ms {
                return Err(AlertError::SnapshotOutOfOrder {
                    timestamp_ms: snapshot.timestamp_ms,
                    latest_ms: latest.timestamp_ms,
                });
            }
        }

        snapshots.push_back(snapshot);
        while snapshots.len() > self.max_snapshots {
            snapshots.pop_front();
        }

        debug!(timestamp_ms = snapshot.timestamp_ms, "stored snapshot");
        Ok(())
    }

    fn len(&self) -> usize {
        self.snapshots.read().len()
    }
}

/// Thread-safe in-memory alert store.
///
/// Commits are staged on a copy of the records and swapped in only when
/// every change applied, so readers never observe half a cycle. Records
/// beyond `max_alert_history` are dropped oldest-first; active records are
/// never dropped.
#[derive(Debug)]
pub struct MemoryAlertStore {
    max_alert_history: usize,
    alerts: RwLock<Vec<Alert>>,
}

impl MemoryAlertStore {
    /// Creates a store with the default history limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(StoreConfig::default().max_alert_history)
    }

    /// Creates a store keeping at most `max_alert_history` records.
    #[must_use]
    pub fn with_capacity(max_alert_history: usize) -> Self {
        Self {
            max_alert_history: max_alert_history.max(1),
            alerts: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store sized from configuration.
    #[must_use]
    pub fn with_config(config: &StoreConfig) -> Self {
        Self::with_capacity(config.max_alert_history)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    /// Returns true if no alert was ever stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }

    fn stage(current: &[Alert], changes: &AlertChangeSet) -> Result<Vec<Alert>> {
        let active: HashSet<&str> = current
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.id.as_str())
            .collect();
        let expected: HashSet<&str> = changes.retire.iter().map(String::as_str).collect();

        if active != expected {
            return Err(AlertError::StoreConflict {
                reason: format!(
                    "expected {} active alerts, found {}",
                    expected.len(),
                    active.len()
                ),
            });
        }

        let mut staged = current.to_vec();
        for alert in staged.iter_mut().filter(|a| expected.contains(a.id.as_str())) {
            alert.deactivate(changes.at);
        }

        let mut known: HashSet<&str> = current.iter().map(|a| a.id.as_str()).collect();
        let mut types = HashSet::new();
        for alert in &changes.create {
            if !alert.is_active() {
                return Err(AlertError::StoreWrite {
                    reason: format!("alert {} is not active", alert.id),
                });
            }
            if !known.insert(alert.id.as_str()) {
                return Err(AlertError::StoreWrite {
                    reason: format!("alert id {} already stored", alert.id),
                });
            }
            if !types.insert(alert.alert_type) {
                return Err(AlertError::StoreConflict {
                    reason: format!("two active {} alerts in one commit", alert.alert_type),
                });
            }
        }
        staged.extend(changes.create.iter().cloned());

        Ok(staged)
    }

    fn trim(&self, alerts: &mut Vec<Alert>) {
        let mut excess = alerts.len().saturating_sub(self.max_alert_history);
        if excess == 0 {
            return;
        }
        alerts.retain(|a| {
            if excess > 0 && !a.is_active() {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }
}

impl Default for MemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertStore for MemoryAlertStore {
    fn active_alerts(&self) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .read()
            .iter()
            .filter(|a| a.is_active())
            .cloned()
            .collect())
    }

    fn history(&self) -> Result<Vec<Alert>> {
        Ok(self.alerts.read().clone())
    }

    fn commit(&self, changes: &AlertChangeSet) -> Result<()> {
        let mut alerts = self.alerts.write();

        let mut staged = match Self::stage(&alerts, changes) {
            Ok(staged) => staged,
            Err(e) => {
                warn!(error = %e, "rejected alert commit");
                return Err(e);
            }
        };
        self.trim(&mut staged);
        *alerts = staged;

        debug!(
            retired = changes.retire.len(),
            created = changes.create.len(),
            stored = alerts.len(),
            "committed alert changes"
        );
        Ok(())
    }
}
