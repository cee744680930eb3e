//! Core types for the alerting system.
//!
//! This module provides the fundamental types used throughout the genwatch-alerts crate:
//! - [`AlertType`]: The closed set of condition codes an alert can carry
//! - [`AlertSeverity`]: The severity level of an alert
//! - [`ComparisonOperator`]: Operators for comparing telemetry readings
//! - [`Alert`]: One raised condition and its active flag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The condition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Fuel level below the configured threshold.
    FuelLow,
    /// Neither grid nor generator is supplying power.
    NoPower,
    /// Grid and generator are both supplying power.
    DualPower,
}

impl AlertType {
    /// Every alert type, in rule order.
    pub const ALL: [Self; 3] = [Self::FuelLow, Self::NoPower, Self::DualPower];

    /// Returns the condition code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FuelLow => "FUEL_LOW",
            Self::NoPower => "NO_POWER",
            Self::DualPower => "DUAL_POWER",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The severity level of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational alert, no action required.
    Info,
    /// Warning alert, should be investigated.
    #[default]
    Warning,
    /// Critical alert, requires immediate attention.
    Critical,
}

impl AlertSeverity {
    /// Returns the severity as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Returns the priority of this severity (higher = more urgent).
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operators for rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Greater than (>).
    #[serde(rename = ">")]
    GreaterThan,
    /// Greater than or equal (>=).
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    /// Less than (<).
    #[serde(rename = "<")]
    LessThan,
    /// Less than or equal (<=).
    #[serde(rename = "<=")]
    LessThanOrEqual,
    /// Equal (==).
    #[serde(rename = "==")]
    Equal,
    /// Not equal (!=).
    #[serde(rename = "!=")]
    NotEqual,
}

impl ComparisonOperator {
    /// Evaluates the comparison between two values.
    ///
    /// Any comparison involving NaN is false, including `!=`. Equality is
    /// exact, so `0.0 == -0.0` holds but no tolerance is applied.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn evaluate(&self, left: f64, right: f64) -> bool {
        if left.is_nan() || right.is_nan() {
            return false;
        }
        match self {
            Self::GreaterThan => left > right,
            Self::GreaterThanOrEqual => left >= right,
            Self::LessThan => left < right,
            Self::LessThanOrEqual => left <= right,
            Self::Equal => left == right,
            Self::NotEqual => left != right,
        }
    }

    /// Returns the operator as a string symbol.
    #[must_use]
    pub const fn as_symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_symbol())
    }
}

/// One raised condition.
///
/// Alerts are never deleted. An alert is active for exactly the evaluation
/// cycle that created it and is deactivated by the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier for this alert record.
    pub id: String,
    /// The condition this alert reports.
    pub alert_type: AlertType,
    /// Severity copied from the rule that raised it.
    pub severity: AlertSeverity,
    /// Human-readable message.
    pub message: String,
    /// Whether this alert belongs to the current cycle.
    pub active: bool,
    /// When the alert was raised (evaluation time).
    pub created_at: DateTime<Utc>,
    /// When the alert was retired (None while active).
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Creates a new active alert.
    #[must_use]
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            alert_type,
            severity,
            message: message.into(),
            active: true,
            created_at,
            deactivated_at: None,
        }
    }

    /// Marks the alert inactive. Retiring an inactive alert is a no-op.
    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        if self.active {
            self.active = false;
            self.deactivated_at = Some(at);
        }
    }

    /// Returns true if the alert belongs to the current cycle.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod alert_type_tests {
        use super::*;

        #[test]
        fn codes() {
            assert_eq!(AlertType::FuelLow.as_str(), "FUEL_LOW");
            assert_eq!(AlertType::NoPower.as_str(), "NO_POWER");
            assert_eq!(AlertType::DualPower.as_str(), "DUAL_POWER");
        }

        #[test]
        fn serde_uses_codes() {
            for alert_type in AlertType::ALL {
                let json = serde_json::to_string(&alert_type).unwrap();
                assert_eq!(json, format!("\"{alert_type}\""));
                let back: AlertType = serde_json::from_str(&json).unwrap();
                assert_eq!(back, alert_type);
            }
        }
    }

    mod severity_tests {
        use super::*;

        #[test]
        fn severity_as_str() {
            assert_eq!(AlertSeverity::Info.as_str(), "info");
            assert_eq!(AlertSeverity::Warning.as_str(), "warning");
            assert_eq!(AlertSeverity::Critical.as_str(), "critical");
        }

        #[test]
        fn severity_priority() {
            assert!(AlertSeverity::Info.priority() < AlertSeverity::Warning.priority());
            assert!(AlertSeverity::Warning.priority() < AlertSeverity::Critical.priority());
        }

        #[test]
        fn severity_default() {
            assert_eq!(AlertSeverity::default(), AlertSeverity::Warning);
        }
    }

    mod operator_tests {
        use super::*;
        use test_case::test_case;

        #[test_case(ComparisonOperator::GreaterThan, 5.0, 4.0, true ; "gt true")]
        #[test_case(ComparisonOperator::GreaterThan, 4.0, 4.0, false ; "gt equal")]
        #[test_case(ComparisonOperator::GreaterThanOrEqual, 4.0, 4.0, true ; "ge equal")]
        #[test_case(ComparisonOperator::LessThan, 24.9, 25.0, true ; "lt true")]
        #[test_case(ComparisonOperator::LessThan, 25.0, 25.0, false ; "lt boundary")]
        #[test_case(ComparisonOperator::LessThanOrEqual, 25.0, 25.0, true ; "le boundary")]
        #[test_case(ComparisonOperator::Equal, 0.0, 0.0, true ; "eq zero")]
        #[test_case(ComparisonOperator::Equal, -0.0, 0.0, true ; "eq negative zero")]
        #[test_case(ComparisonOperator::Equal, 0.1, 0.0, false ; "eq differs")]
        #[test_case(ComparisonOperator::NotEqual, 0.1, 0.0, true ; "ne differs")]
        #[test_case(ComparisonOperator::Equal, 1e-17, 0.0, false ; "eq tiny positive")]
        #[test_case(ComparisonOperator::Equal, f64::MIN_POSITIVE, 0.0, false ; "eq min positive")]
        #[test_case(ComparisonOperator::NotEqual, 1e-17, 0.0, true ; "ne tiny positive")]
        #[test_case(ComparisonOperator::NotEqual, -0.0, 0.0, false ; "ne negative zero")]
        fn evaluate(op: ComparisonOperator, left: f64, right: f64, expected: bool) {
            assert_eq!(op.evaluate(left, right), expected);
        }

        #[test]
        fn nan_never_matches() {
            let ops = [
                ComparisonOperator::GreaterThan,
                ComparisonOperator::GreaterThanOrEqual,
                ComparisonOperator::LessThan,
                ComparisonOperator::LessThanOrEqual,
                ComparisonOperator::Equal,
                ComparisonOperator::NotEqual,
            ];
            for op in ops {
                assert!(!op.evaluate(f64::NAN, 0.0), "{op} matched NaN");
                assert!(!op.evaluate(0.0, f64::NAN), "{op} matched NaN threshold");
            }
        }

        #[test]
        fn symbols() {
            assert_eq!(ComparisonOperator::LessThan.to_string(), "<");
            assert_eq!(ComparisonOperator::Equal.as_symbol(), "==");
        }

        #[test]
        fn serde_uses_symbols() {
            let json = serde_json::to_string(&ComparisonOperator::GreaterThanOrEqual).unwrap();
            assert_eq!(json, "\">=\"");
        }
    }

    mod alert_tests {
        use super::*;

        #[test]
        fn new_alert_is_active() {
            let now = Utc::now();
            let alert = Alert::new(AlertType::FuelLow, AlertSeverity::Warning, "low", now);
            assert!(alert.is_active());
            assert_eq!(alert.created_at, now);
            assert!(alert.deactivated_at.is_none());
            assert!(!alert.id.is_empty());
        }

        #[test]
        fn ids_are_unique() {
            let now = Utc::now();
            let a = Alert::new(AlertType::NoPower, AlertSeverity::Critical, "x", now);
            let b = Alert::new(AlertType::NoPower, AlertSeverity::Critical, "x", now);
            assert_ne!(a.id, b.id);
        }

        #[test]
        fn deactivate_once() {
            let now = Utc::now();
            let later = now + chrono::Duration::seconds(5);
            let mut alert = Alert::new(AlertType::DualPower, AlertSeverity::Critical, "x", now);

            alert.deactivate(now);
            assert!(!alert.is_active());
            assert_eq!(alert.deactivated_at, Some(now));

            alert.deactivate(later);
            assert_eq!(alert.deactivated_at, Some(now));
        }

        #[test]
        fn serializes_type_code() {
            let alert = Alert::new(AlertType::FuelLow, AlertSeverity::Warning, "m", Utc::now());
            let json = serde_json::to_value(&alert).unwrap();
            assert_eq!(json["alert_type"], "FUEL_LOW");
            assert_eq!(json["active"], true);
        }
    }
}
