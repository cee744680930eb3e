//! Operator control actions.
//!
//! A [`ControlAction`] records a command an operator sent to the generator
//! controller. Actions are audit records only; they never feed back into
//! alert evaluation.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AlertError, Result};

/// Maximum length of an action description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Maximum length of a client IP address.
pub const MAX_IP_ADDRESS_LEN: usize = 45;

/// Maximum length of a result text.
pub const MAX_RESULT_LEN: usize = 500;

/// Commands an operator can send to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlCommand {
    /// Start the generator.
    Start,
    /// Stop the generator.
    Stop,
    /// Switch to automatic mode.
    Auto,
    /// Switch to manual mode.
    Manual,
    /// Run a test cycle.
    Test,
    /// Emergency stop.
    EmergencyStop,
}

impl ControlCommand {
    /// Returns the wire code of this command.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Auto => "AUTO",
            Self::Manual => "MANUAL",
            Self::Test => "TEST",
            Self::EmergencyStop => "EMERGENCY_STOP",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Execution status of a control action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    /// Sent, outcome not yet known.
    #[default]
    Pending,
    /// The controller accepted the command.
    Success,
    /// The command failed.
    Failed,
}

impl ActionStatus {
    /// Returns the wire code of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Returns true if no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An operator command and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlAction {
    /// Unique identifier.
    pub id: String,
    /// Operator who issued the command.
    pub user_name: String,
    /// The command.
    pub command: ControlCommand,
    /// Free-text description.
    pub description: Option<String>,
    /// When the command was requested.
    pub requested_at: DateTime<Utc>,
    /// Address of the client that issued the command.
    pub ip_address: Option<String>,
    /// Whether the controller executed the command.
    pub executed: bool,
    /// When the command was executed.
    pub executed_at: Option<DateTime<Utc>>,
    /// Current status.
    pub status: ActionStatus,
    /// Controller response or failure reason.
    pub result: Option<String>,
}

impl ControlAction {
    /// Creates a pending action.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidControlAction` if the user name is empty.
    pub fn new(
        user_name: impl Into<String>,
        command: ControlCommand,
        requested_at: DateTime<Utc>,
    ) -> Result<Self> {
        let user_name = user_name.into();
        if user_name.trim().is_empty() {
            return Err(AlertError::InvalidControlAction {
                reason: "user name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_name,
            command,
            description: None,
            requested_at,
            ip_address: None,
            executed: false,
            executed_at: None,
            status: ActionStatus::Pending,
            result: None,
        })
    }

    /// Sets the description.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidControlAction` if it is too long.
    pub fn with_description(mut self, description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        check_len("description", &description, MAX_DESCRIPTION_LEN)?;
        self.description = Some(description);
        Ok(self)
    }

    /// Sets the client IP address.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidControlAction` if it is too long.
    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Result<Self> {
        let ip_address = ip_address.into();
        check_len("ip address", &ip_address, MAX_IP_ADDRESS_LEN)?;
        self.ip_address = Some(ip_address);
        Ok(self)
    }

    /// Records a successful execution.
    ///
    /// # Errors
    ///
    /// - `AlertError::InvalidTransition` if the action already finished
    /// - `AlertError::InvalidControlAction` if the result text is too long
    pub fn mark_executed(&mut self, result: impl Into<String>, at: DateTime<Utc>) -> Result<()> {
        let result = result.into();
        self.check_pending("mark executed")?;
        check_len("result", &result, MAX_RESULT_LEN)?;

        self.executed = true;
        self.executed_at = Some(at);
        self.status = ActionStatus::Success;
        self.result = Some(result);
        Ok(())
    }

    /// Records a failed execution.
    ///
    /// # Errors
    ///
    /// - `AlertError::InvalidTransition` if the action already finished
    /// - `AlertError::InvalidControlAction` if the result text is too long
    pub fn mark_failed(&mut self, result: impl Into<String>) -> Result<()> {
        let result = result.into();
        self.check_pending("mark failed")?;
        check_len("result", &result, MAX_RESULT_LEN)?;

        self.status = ActionStatus::Failed;
        self.result = Some(result);
        Ok(())
    }

    fn check_pending(&self, attempted: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(AlertError::InvalidTransition {
                from: self.status.to_string(),
                reason: format!("cannot {attempted} a finished action"),
            });
        }
        Ok(())
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(AlertError::InvalidControlAction {
            reason: format!("{field} is {len} characters, maximum is {max}"),
        });
    }
    Ok(())
}

/// Destination for control action records.
pub trait ControlActionLog: Send + Sync {
    /// Records an action, replacing any earlier record with the same id.
    ///
    /// A finished (`SUCCESS`/`FAILED`) record is final: only an identical
    /// copy may be recorded over it.
    ///
    /// # Errors
    ///
    /// - `AlertError::InvalidTransition` if a finished record would change
    /// - `AlertError::StoreWrite` if the backend fails
    fn record(&self, action: &ControlAction) -> Result<()>;

    /// Returns the action with the given id.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the backend fails.
    fn get(&self, id: &str) -> Result<Option<ControlAction>>;

    /// Returns up to `limit` actions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::StoreRead` if the backend fails.
    fn recent(&self, limit: usize) -> Result<Vec<ControlAction>>;
}

/// In-memory control action log.
///
/// Every recorded action is also emitted as a `tracing` event: pending and
/// successful actions at info level, failed ones at warn level.
#[derive(Debug)]
pub struct MemoryControlActionLog {
    max_entries: usize,
    actions: RwLock<VecDeque<ControlAction>>,
}

impl MemoryControlActionLog {
    /// Creates a log keeping up to 10,000 actions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    /// Creates a log keeping up to `max_entries` actions.
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            actions: RwLock::new(VecDeque::new()),
        }
    }

    /// Returns the number of stored actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    /// Returns true if no action has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }
}

impl Default for MemoryControlActionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlActionLog for MemoryControlActionLog {
    fn record(&self, action: &ControlAction) -> Result<()> {
        {
            let mut actions = self.actions.write();
            if let Some(existing) = actions.iter_mut().find(|a| a.id == action.id) {
                if existing.status.is_terminal() && *existing != *action {
                    return Err(AlertError::InvalidTransition {
                        from: existing.status.to_string(),
                        reason: format!("cannot record {} over a finished action", action.status),
                    });
                }
                *existing = action.clone();
            } else {
                actions.push_back(action.clone());
                while actions.len() > self.max_entries {
                    actions.pop_front();
                }
            }
        }

        emit(action);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ControlAction>> {
        Ok(self.actions.read().iter().find(|a| a.id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ControlAction>> {
        Ok(self.actions.read().iter().rev().take(limit).cloned().collect())
    }
}

fn emit(action: &ControlAction) {
    let result = action.result.as_deref().unwrap_or("");
    match action.status {
        ActionStatus::Pending | ActionStatus::Success => {
            tracing::info!(
                target: "genwatch_control",
                action_id = %action.id,
                user = %action.user_name,
                command = %action.command,
                status = %action.status,
                result,
                "control action"
            );
        }
        ActionStatus::Failed => {
            tracing::warn!(
                target: "genwatch_control",
                action_id = %action.id,
                user = %action.user_name,
                command = %action.command,
                status = %action.status,
                result,
                "control action failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(command: ControlCommand) -> ControlAction {
        ControlAction::new("operator", command, Utc::now()).unwrap()
    }

    mod action_tests {
        use super::*;

        #[test]
        fn new_action_is_pending() {
            let action = action(ControlCommand::Start);
            assert_eq!(action.status, ActionStatus::Pending);
            assert!(!action.executed);
            assert!(action.executed_at.is_none());
            assert!(Uuid::parse_str(&action.id).is_ok());
        }

        #[test]
        fn empty_user_rejected() {
            let result = ControlAction::new("  ", ControlCommand::Stop, Utc::now());
            assert!(matches!(result, Err(AlertError::InvalidControlAction { .. })));
        }

        #[test]
        fn field_limits() {
            let ok = action(ControlCommand::Test)
                .with_description("d".repeat(MAX_DESCRIPTION_LEN))
                .and_then(|a| a.with_ip_address("2001:0db8:85a3:0000:0000:8a2e:0370:7334"));
            assert!(ok.is_ok());

            let long_description =
                action(ControlCommand::Test).with_description("d".repeat(MAX_DESCRIPTION_LEN + 1));
            assert!(matches!(
                long_description,
                Err(AlertError::InvalidControlAction { .. })
            ));

            let long_ip = action(ControlCommand::Test).with_ip_address("1".repeat(46));
            assert!(long_ip.is_err());
        }

        #[test]
        fn mark_executed() {
            let mut action = action(ControlCommand::Auto);
            let at = Utc::now();
            action.mark_executed("mode set", at).unwrap();

            assert_eq!(action.status, ActionStatus::Success);
            assert!(action.executed);
            assert_eq!(action.executed_at, Some(at));
            assert_eq!(action.result.as_deref(), Some("mode set"));
        }

        #[test]
        fn mark_failed() {
            let mut action = action(ControlCommand::Manual);
            action.mark_failed("controller timeout").unwrap();

            assert_eq!(action.status, ActionStatus::Failed);
            assert!(!action.executed);
            assert_eq!(action.result.as_deref(), Some("controller timeout"));
        }

        #[test]
        fn terminal_status_is_final() {
            let mut action = action(ControlCommand::EmergencyStop);
            action.mark_executed("stopped", Utc::now()).unwrap();

            let err = action.mark_failed("late failure").unwrap_err();
            assert!(matches!(err, AlertError::InvalidTransition { ref from, .. } if from == "SUCCESS"));
            assert!(action.mark_executed("again", Utc::now()).is_err());
            assert_eq!(action.status, ActionStatus::Success);
        }

        #[test]
        fn long_result_rejected_without_transition() {
            let mut action = action(ControlCommand::Start);
            assert!(action.mark_failed("r".repeat(MAX_RESULT_LEN + 1)).is_err());
            assert_eq!(action.status, ActionStatus::Pending);
        }

        #[test]
        fn serde_codes() {
            let json = serde_json::to_string(&ControlCommand::EmergencyStop).unwrap();
            assert_eq!(json, "\"EMERGENCY_STOP\"");
            let status: ActionStatus = serde_json::from_str("\"FAILED\"").unwrap();
            assert_eq!(status, ActionStatus::Failed);
            assert_eq!(ActionStatus::default(), ActionStatus::Pending);
        }
    }

    mod log_tests {
        use super::*;

        #[test]
        fn record_and_get() {
            let log = MemoryControlActionLog::new();
            let action = action(ControlCommand::Start);
            log.record(&action).unwrap();

            assert_eq!(log.get(&action.id).unwrap(), Some(action));
            assert!(log.get("missing").unwrap().is_none());
        }

        #[test]
        fn record_replaces_same_id() {
            let log = MemoryControlActionLog::new();
            let mut action = action(ControlCommand::Stop);
            log.record(&action).unwrap();

            action.mark_failed("no response").unwrap();
            log.record(&action).unwrap();

            assert_eq!(log.len(), 1);
            let stored = log.get(&action.id).unwrap().unwrap();
            assert_eq!(stored.status, ActionStatus::Failed);
        }

        #[test]
        fn finished_record_is_not_overwritten() {
            let log = MemoryControlActionLog::new();
            let pending = action(ControlCommand::Start);
            let mut done = pending.clone();
            done.mark_executed("started", Utc::now()).unwrap();
            log.record(&done).unwrap();

            let err = log.record(&pending).unwrap_err();
            assert!(matches!(err, AlertError::InvalidTransition { ref from, .. } if from == "SUCCESS"));

            let mut failed = pending.clone();
            failed.mark_failed("no response").unwrap();
            assert!(log.record(&failed).is_err());

            let stored = log.get(&done.id).unwrap().unwrap();
            assert_eq!(stored.status, ActionStatus::Success);
            assert_eq!(log.len(), 1);
        }

        #[test]
        fn identical_finished_record_is_accepted() {
            let log = MemoryControlActionLog::new();
            let mut action = action(ControlCommand::Stop);
            action.mark_failed("no response").unwrap();

            log.record(&action).unwrap();
            log.record(&action).unwrap();
            assert_eq!(log.len(), 1);
        }

        #[test]
        fn recent_is_newest_first() {
            let log = MemoryControlActionLog::new();
            let first = action(ControlCommand::Start);
            let second = action(ControlCommand::Stop);
            log.record(&first).unwrap();
            log.record(&second).unwrap();

            let recent = log.recent(10).unwrap();
            assert_eq!(recent.len(), 2);
            assert_eq!(recent[0].id, second.id);

            assert_eq!(log.recent(1).unwrap().len(), 1);
        }

        #[test]
        fn capacity_drops_oldest() {
            let log = MemoryControlActionLog::with_capacity(2);
            let actions: Vec<_> = (0..3).map(|_| action(ControlCommand::Test)).collect();
            for a in &actions {
                log.record(a).unwrap();
            }

            assert_eq!(log.len(), 2);
            assert!(log.get(&actions[0].id).unwrap().is_none());
            assert!(log.get(&actions[2].id).unwrap().is_some());
        }
    }
}
