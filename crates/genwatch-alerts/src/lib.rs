//! Alert evaluation and lifecycle management for standby generator telemetry.
//!
//! `genwatch-alerts` evaluates a fixed table of rules against the most
//! recent telemetry snapshot of a generator controller and keeps the set of
//! active alerts in step with it.
//!
//! # Features
//!
//! - **Data-driven rules**: Each alert type is a conjunction of threshold
//!   conditions on named telemetry fields, with a message template
//! - **Reset-and-re-evaluate lifecycle**: Every cycle retires all active
//!   alerts and raises one alert per rule that holds
//! - **Atomic commits**: Retirements and creations land together or not at all
//! - **Pluggable stores**: The engine only sees the [`SnapshotReader`] and
//!   [`AlertStore`] traits; in-memory implementations are included
//! - **Control audit log**: Operator commands are recorded as [`ControlAction`]s
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use genwatch_alerts::{
//!     AlertEngine, AlertStore, AlertType, MemoryAlertStore, MemorySnapshotStore,
//!     SnapshotStore, TelemetrySnapshot,
//! };
//!
//! let snapshots = Arc::new(MemorySnapshotStore::new());
//! let alerts = Arc::new(MemoryAlertStore::new());
//! let engine = AlertEngine::new(snapshots.clone(), alerts.clone());
//!
//! // Nothing ingested yet: the cycle is skipped.
//! assert!(engine.evaluate().unwrap().is_noop());
//!
//! // Mains present, generator idle, fuel at 10%.
//! let snapshot = TelemetrySnapshot::builder(1_700_000_000_000)
//!     .grid_frequency(50.0)
//!     .fuel_level(10.0)
//!     .build();
//! snapshots.append(snapshot).unwrap();
//!
//! let result = engine.evaluate().unwrap();
//! assert_eq!(result.created.len(), 1);
//! assert_eq!(result.created[0].alert_type, AlertType::FuelLow);
//! assert_eq!(result.created[0].message, "Fuel level low (10%)");
//!
//! let active = alerts.active_alerts().unwrap();
//! assert_eq!(active.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod rules;
pub mod store;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use config::{EngineConfig, RulesConfig, StoreConfig};
pub use control::{
    ActionStatus, ControlAction, ControlActionLog, ControlCommand, MemoryControlActionLog,
};
pub use engine::{AlertEngine, EvaluationResult};
pub use error::{AlertError, Result};
pub use rules::{AlertCondition, AlertRule, AlertRuleBuilder, RuleMatch, RuleSet};
pub use store::{MemoryAlertStore, MemorySnapshotStore};
pub use telemetry::{
    EngineReading, GeneratorReading, GridReading, HealthFlags, OperatingMode, TelemetryField,
    TelemetrySnapshot, TelemetrySnapshotBuilder,
};
pub use traits::{AlertChangeSet, AlertStore, SnapshotReader, SnapshotStore};
pub use types::{Alert, AlertSeverity, AlertType, ComparisonOperator};
