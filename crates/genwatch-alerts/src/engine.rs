//! Alert engine for evaluating telemetry and managing alert lifecycles.
//!
//! This module provides the [`AlertEngine`], the main entry point of the
//! crate. Each evaluation cycle:
//! 1. reads the latest snapshot (no snapshot means no cycle),
//! 2. retires every active alert, whatever the new snapshot says,
//! 3. raises one new alert per rule that holds for the snapshot,
//! 4. commits steps 2 and 3 to the alert store as one change set.
//!
//! An alert whose condition stays true is therefore re-created every cycle;
//! the history keeps one record per cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::rules::RuleSet;
use crate::telemetry::TelemetrySnapshot;
use crate::traits::{AlertChangeSet, AlertStore, SnapshotReader};
use crate::types::Alert;

/// The result of an evaluation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Timestamp of the evaluated snapshot; `None` if there was no data.
    pub snapshot_timestamp_ms: Option<i64>,
    /// Number of rules evaluated.
    pub rules_evaluated: usize,
    /// Ids of the alerts that were retired.
    pub retired: Vec<String>,
    /// Alerts raised by this cycle, in rule order.
    pub created: Vec<Alert>,
}

impl EvaluationResult {
    /// Returns true if no snapshot was available and nothing was evaluated.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.snapshot_timestamp_ms.is_none()
    }
}

/// Evaluates the rule table against the latest snapshot and keeps the
/// alert store in step.
///
/// Evaluations through one engine are serialized; concurrent callers wait
/// for the running cycle to commit.
pub struct AlertEngine {
    /// Rules evaluated every cycle.
    rules: RuleSet,
    /// Source of the latest snapshot.
    snapshots: Arc<dyn SnapshotReader>,
    /// Destination of the alert changes.
    alerts: Arc<dyn AlertStore>,
    /// Held for the whole read-plan-commit sequence.
    evaluation_lock: Mutex<()>,
}

impl AlertEngine {
    /// Creates an engine with the standard rule table.
    #[must_use]
    pub fn new(snapshots: Arc<dyn SnapshotReader>, alerts: Arc<dyn AlertStore>) -> Self {
        Self::with_rules(RuleSet::standard(), snapshots, alerts)
    }

    /// Creates an engine with a custom rule table.
    #[must_use]
    pub fn with_rules(
        rules: RuleSet,
        snapshots: Arc<dyn SnapshotReader>,
        alerts: Arc<dyn AlertStore>,
    ) -> Self {
        info!(rules = rules.len(), "alert engine created");
        Self {
            rules,
            snapshots,
            alerts,
            evaluation_lock: Mutex::new(()),
        }
    }

    /// Creates an engine whose rule table is built from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidConfig` if the rule configuration is invalid.
    pub fn from_config(
        config: &EngineConfig,
        snapshots: Arc<dyn SnapshotReader>,
        alerts: Arc<dyn AlertStore>,
    ) -> Result<Self> {
        let rules = RuleSet::from_config(&config.rules)?;
        Ok(Self::with_rules(rules, snapshots, alerts))
    }

    /// Returns the rule table.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decides the changes of one cycle.
    ///
    /// Every alert in `active` is retired; every rule that holds for
    /// `snapshot` yields a new alert created at `now`. This is a pure
    /// function of its inputs apart from the generated alert ids.
    #[must_use]
    pub fn plan(
        rules: &RuleSet,
        snapshot: &TelemetrySnapshot,
        active: &[Alert],
        now: DateTime<Utc>,
    ) -> AlertChangeSet {
        let create = rules
            .evaluate(snapshot)
            .into_iter()
            .map(|m| Alert::new(m.alert_type, m.severity, m.message, now))
            .collect();

        AlertChangeSet {
            retire: active.iter().map(|a| a.id.clone()).collect(),
            create,
            at: now,
        }
    }

    /// Evaluates the latest snapshot now.
    ///
    /// Returns an empty result, without touching the alert store, if no
    /// snapshot has been ingested yet.
    ///
    /// # Errors
    ///
    /// Returns a store error if reading either store or committing fails;
    /// in that case the alert store is unchanged.
    pub fn evaluate(&self) -> Result<EvaluationResult> {
        self.evaluate_at(Utc::now())
    }

    /// Evaluates the latest snapshot with an explicit evaluation time.
    ///
    /// # Errors
    ///
    /// See [`AlertEngine::evaluate`].
    pub fn evaluate_at(&self, now: DateTime<Utc>) -> Result<EvaluationResult> {
        let _cycle = self.evaluation_lock.lock();

        let Some(snapshot) = self.snapshots.latest()? else {
            debug!("no snapshot available, skipping evaluation");
            return Ok(EvaluationResult::default());
        };

        self.run_cycle(&snapshot, now)
    }

    /// Evaluates a caller-supplied snapshot now.
    ///
    /// Used when evaluation is triggered per incoming reading; lifecycle
    /// semantics are the same as [`AlertEngine::evaluate`].
    ///
    /// # Errors
    ///
    /// See [`AlertEngine::evaluate`].
    pub fn evaluate_snapshot(&self, snapshot: &TelemetrySnapshot) -> Result<EvaluationResult> {
        self.evaluate_snapshot_at(snapshot, Utc::now())
    }

    /// Evaluates a caller-supplied snapshot with an explicit evaluation time.
    ///
    /// # Errors
    ///
    /// See [`AlertEngine::evaluate`].
    pub fn evaluate_snapshot_at(
        &self,
        snapshot: &TelemetrySnapshot,
        now: DateTime<Utc>,
    ) -> Result<EvaluationResult> {
        let _cycle = self.evaluation_lock.lock();
        self.run_cycle(snapshot, now)
    }

    /// Returns the currently active alerts.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the alert store cannot be read.
    pub fn active_alerts(&self) -> Result<Vec<Alert>> {
        self.alerts.active_alerts()
    }

    /// Returns every stored alert, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the alert store cannot be read.
    pub fn history(&self) -> Result<Vec<Alert>> {
        self.alerts.history()
    }

    fn run_cycle(
        &self,
        snapshot: &TelemetrySnapshot,
        now: DateTime<Utc>,
    ) -> Result<EvaluationResult> {
        let active = self.alerts.active_alerts()?;
        let changes = Self::plan(&self.rules, snapshot, &active, now);

        if !changes.is_empty() {
            if let Err(e) = self.alerts.commit(&changes) {
                warn!(
                    snapshot_timestamp_ms = snapshot.timestamp_ms,
                    error = %e,
                    "failed to commit alert changes"
                );
                return Err(e);
            }
        }

        for alert in &changes.create {
            info!(
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                message = %alert.message,
                "alert raised"
            );
        }

        info!(
            snapshot_timestamp_ms = snapshot.timestamp_ms,
            rules_evaluated = self.rules.len(),
            retired = changes.retire.len(),
            created = changes.create.len(),
            "evaluation complete"
        );

        Ok(EvaluationResult {
            snapshot_timestamp_ms: Some(snapshot.timestamp_ms),
            rules_evaluated: self.rules.len(),
            retired: changes.retire,
            created: changes.create,
        })
    }
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
