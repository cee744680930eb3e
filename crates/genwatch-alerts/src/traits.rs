//! Traits for the stores the engine reads from and writes to.
//!
//! The engine never reaches a store directly; it is handed a
//! [`SnapshotReader`] and an [`AlertStore`] at construction, so any backend
//! (in-memory, database, remote service) can be substituted.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::telemetry::TelemetrySnapshot;
use crate::types::Alert;

/// Read access to the snapshot history.
pub trait SnapshotReader: Send + Sync {
    /// Returns the most recent snapshot, or `None` if none was ingested yet.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the backend cannot be read.
    fn latest(&self) -> Result<Option<TelemetrySnapshot>>;
}

/// A snapshot history that accepts new readings.
pub trait SnapshotStore: SnapshotReader {
    /// Appends a snapshot to the history.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::SnapshotOutOfOrder` if the timestamp is not
    /// strictly after the newest stored snapshot.
    fn append(&self, snapshot: TelemetrySnapshot) -> Result<()>;

    /// Returns the number of stored snapshots.
    fn len(&self) -> usize;

    /// Returns true if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The changes of one evaluation cycle.
///
/// `retire` lists every alert id the engine saw active when it read the
/// store. A store applies the set only if that is still exactly the active
/// set, so a commit either retires all of them and inserts all of `create`,
/// or changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertChangeSet {
    /// Ids of the alerts to deactivate.
    pub retire: Vec<String>,
    /// New active alerts.
    pub create: Vec<Alert>,
    /// Evaluation time, stamped on retired alerts.
    pub at: DateTime<Utc>,
}

impl AlertChangeSet {
    /// Returns true if committing the set would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retire.is_empty() && self.create.is_empty()
    }
}

/// Storage for alert records.
pub trait AlertStore: Send + Sync {
    /// Returns the currently active alerts.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the backend cannot be read.
    fn active_alerts(&self) -> Result<Vec<Alert>>;

    /// Returns every stored alert, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the backend cannot be read.
    fn history(&self) -> Result<Vec<Alert>>;

    /// Applies a change set atomically.
    ///
    /// # Errors
    ///
    /// - `AlertError::StoreConflict` if the active set no longer matches
    ///   `changes.retire`, or the result would hold two active alerts of one type
    /// - `AlertError::StoreWrite` if the backend fails
    ///
    /// On error nothing is applied.
    fn commit(&self, changes: &AlertChangeSet) -> Result<()>;
}
