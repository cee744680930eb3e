//! Snapshot replay command implementation.
//!
//! Feeds recorded snapshots, in file order, into an in-memory snapshot
//! store and runs one evaluation cycle after each append.

use std::io::Write;
use std::sync::Arc;

use genwatch_alerts::{
    AlertEngine, AlertStore, EngineConfig, MemoryAlertStore, MemorySnapshotStore, SnapshotStore,
    TelemetrySnapshot,
};
use tracing::info;

use crate::cli::EvaluateArgs;
use crate::error::Result;
use crate::input::read_snapshots;
use crate::output::{CycleReport, EvaluationReport, OutputFormat};

/// Evaluate command executor.
pub struct EvaluateCommand<'a> {
    config: &'a EngineConfig,
}

impl<'a> EvaluateCommand<'a> {
    /// Create a new evaluate command.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Execute the evaluate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot file cannot be read, a snapshot is
    /// out of order, an evaluation fails, or output fails.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &EvaluateArgs,
    ) -> Result<()> {
        let snapshots = read_snapshots(&args.snapshots)?;
        info!(
            path = %args.snapshots.display(),
            count = snapshots.len(),
            "replaying snapshots"
        );

        let report = self.replay(&snapshots, args.history)?;
        format.write(writer, &report)
    }

    /// Replays snapshots through a fresh engine.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot is out of order or an evaluation fails.
    pub fn replay(
        &self,
        snapshots: &[TelemetrySnapshot],
        history: bool,
    ) -> Result<EvaluationReport> {
        let snapshot_store = Arc::new(MemorySnapshotStore::with_config(&self.config.store));
        let alert_store = Arc::new(MemoryAlertStore::with_config(&self.config.store));
        let engine =
            AlertEngine::from_config(self.config, snapshot_store.clone(), alert_store.clone())?;

        let mut cycles = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            snapshot_store.append(*snapshot)?;
            let result = engine.evaluate()?;
            cycles.push(CycleReport {
                snapshot_timestamp_ms: snapshot.timestamp_ms,
                retired: result.retired.len(),
                created: result.created,
            });
        }

        Ok(EvaluationReport {
            cycles,
            active: alert_store.active_alerts()?,
            history: if history {
                Some(alert_store.history()?)
            } else {
                None
            },
        })
    }
}
