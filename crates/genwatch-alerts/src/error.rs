//! Error types for the genwatch-alerts crate.

use thiserror::Error;

/// Errors that can occur while evaluating or storing alerts.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Reading from a snapshot or alert store failed.
    #[error("store read failed: {reason}")]
    StoreRead {
        /// The reason the read failed.
        reason: String,
    },

    /// Writing to the alert store failed. Nothing was applied.
    #[error("store write failed: {reason}")]
    StoreWrite {
        /// The reason the write failed.
        reason: String,
    },

    /// The active alert set changed between read and commit.
    #[error("store conflict: {reason}")]
    StoreConflict {
        /// What the store found instead of the expected state.
        reason: String,
    },

    /// A snapshot was appended with a timestamp that does not advance the history.
    #[error("snapshot out of order: timestamp {timestamp_ms} is not after {latest_ms}")]
    SnapshotOutOfOrder {
        /// Timestamp of the rejected snapshot (epoch milliseconds).
        timestamp_ms: i64,
        /// Timestamp of the newest stored snapshot (epoch milliseconds).
        latest_ms: i64,
    },

    /// Invalid alert rule definition.
    #[error("invalid alert rule: {reason}")]
    InvalidRule {
        /// The reason the rule is invalid.
        reason: String,
    },

    /// Two rules in one rule set raise the same alert type.
    #[error("duplicate rule for alert type {alert_type}")]
    DuplicateRule {
        /// The alert type that appears twice.
        alert_type: String,
    },

    /// A control action field failed validation.
    #[error("invalid control action: {reason}")]
    InvalidControlAction {
        /// The reason the action is invalid.
        reason: String,
    },

    /// A control action was moved out of a terminal status.
    #[error("invalid transition from {from}: {reason}")]
    InvalidTransition {
        /// The status the action was in.
        from: String,
        /// Why the transition was refused.
        reason: String,
    },

    /// Configuration could not be read or failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl AlertError {
    /// Returns true for failures of the underlying stores.
    ///
    /// Callers use this to decide whether re-running the whole evaluation
    /// makes sense.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::StoreRead { .. } | Self::StoreWrite { .. } | Self::StoreConflict { .. }
        )
    }
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_store_read() {
        let err = AlertError::StoreRead {
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "store read failed: connection reset");
    }

    #[test]
    fn error_display_store_write() {
        let err = AlertError::StoreWrite {
            reason: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "store write failed: disk full");
    }

    #[test]
    fn error_display_out_of_order() {
        let err = AlertError::SnapshotOutOfOrder {
            timestamp_ms: 10,
            latest_ms: 20,
        };
        assert_eq!(
            err.to_string(),
            "snapshot out of order: timestamp 10 is not after 20"
        );
    }

    #[test]
    fn error_display_duplicate_rule() {
        let err = AlertError::DuplicateRule {
            alert_type: "FUEL_LOW".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate rule for alert type FUEL_LOW");
    }

    #[test]
    fn error_display_invalid_transition() {
        let err = AlertError::InvalidTransition {
            from: "SUCCESS".to_string(),
            reason: "action already finished".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid transition from SUCCESS: action already finished"
        );
    }

    #[test]
    fn store_failures_are_classified() {
        assert!(AlertError::StoreRead { reason: String::new() }.is_store_failure());
        assert!(AlertError::StoreWrite { reason: String::new() }.is_store_failure());
        assert!(AlertError::StoreConflict { reason: String::new() }.is_store_failure());
        assert!(!AlertError::InvalidRule { reason: String::new() }.is_store_failure());
        assert!(!AlertError::SnapshotOutOfOrder { timestamp_ms: 1, latest_ms: 2 }.is_store_failure());
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json");
        assert!(json_err.is_err());
        let alert_err: AlertError = json_err.unwrap_err().into();
        assert!(matches!(alert_err, AlertError::SerializationError(_)));
    }
}
