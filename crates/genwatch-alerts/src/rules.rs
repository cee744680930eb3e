//! Data-driven alert rules.
//!
//! A rule is a conjunction of [`AlertCondition`]s over telemetry fields, the
//! [`AlertType`] it raises and a message template. Templates may reference
//! any [`TelemetryField`] as `{field_name}`; the placeholder is replaced with
//! the snapshot's reading when the rule fires.
//!
//! Adding a rule means adding an entry to a [`RuleSet`]; the engine evaluates
//! every entry the same way.

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::error::{AlertError, Result};
use crate::telemetry::{TelemetryField, TelemetrySnapshot};
use crate::types::{AlertSeverity, AlertType, ComparisonOperator};

/// Fuel level (percent) below which [`AlertType::FuelLow`] fires by default.
pub const DEFAULT_FUEL_LOW_THRESHOLD: f64 = 25.0;

/// A comparison of one telemetry field against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    /// The reading to compare.
    pub field: TelemetryField,
    /// The comparison operator.
    pub operator: ComparisonOperator,
    /// The threshold value to compare against.
    pub threshold: f64,
}

impl AlertCondition {
    /// Creates a new condition.
    #[must_use]
    pub const fn new(field: TelemetryField, operator: ComparisonOperator, threshold: f64) -> Self {
        Self {
            field,
            operator,
            threshold,
        }
    }

    /// Evaluates the condition against a snapshot.
    #[must_use]
    pub fn evaluate(&self, snapshot: &TelemetrySnapshot) -> bool {
        self.operator
            .evaluate(snapshot.value(self.field), self.threshold)
    }
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.threshold)
    }
}

/// A rule that raises one alert type when all of its conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// The alert type this rule raises.
    pub alert_type: AlertType,
    /// Severity of the raised alert.
    pub severity: AlertSeverity,
    /// Conditions that must all be true.
    pub conditions: Vec<AlertCondition>,
    /// Message template with `{field_name}` placeholders.
    pub message: String,
}

impl AlertRule {
    /// Creates a new alert rule builder.
    pub fn builder(alert_type: AlertType) -> AlertRuleBuilder {
        AlertRuleBuilder::new(alert_type)
    }

    /// Returns true if every condition holds for the snapshot.
    #[must_use]
    pub fn matches(&self, snapshot: &TelemetrySnapshot) -> bool {
        self.conditions.iter().all(|c| c.evaluate(snapshot))
    }

    /// Renders the message template against a snapshot.
    #[must_use]
    pub fn render_message(&self, snapshot: &TelemetrySnapshot) -> String {
        render_template(&self.message, snapshot)
    }

    /// Evaluates the rule, returning the rendered message when it fires.
    #[must_use]
    pub fn evaluate(&self, snapshot: &TelemetrySnapshot) -> Option<String> {
        self.matches(snapshot)
            .then(|| self.render_message(snapshot))
    }

    /// Checks that the rule can fire and render its message.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if:
    /// - There are no conditions
    /// - A threshold is NaN
    /// - The message is empty
    /// - The message references an unknown field
    pub fn validate(&self) -> Result<()> {
        if self.conditions.is_empty() {
            return Err(AlertError::InvalidRule {
                reason: format!("rule {} has no conditions", self.alert_type),
            });
        }

        if let Some(c) = self.conditions.iter().find(|c| c.threshold.is_nan()) {
            return Err(AlertError::InvalidRule {
                reason: format!("rule {} has a NaN threshold on {}", self.alert_type, c.field),
            });
        }

        if self.message.trim().is_empty() {
            return Err(AlertError::InvalidRule {
                reason: format!("rule {} has an empty message", self.alert_type),
            });
        }

        if let Some(name) = unknown_placeholder(&self.message) {
            return Err(AlertError::InvalidRule {
                reason: format!("message references unknown field '{name}'"),
            });
        }
        Ok(())
    }

    /// Returns the conditions joined with `AND`.
    #[must_use]
    pub fn describe(&self) -> String {
        self.conditions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Builder for creating [`AlertRule`] instances.
#[derive(Debug)]
pub struct AlertRuleBuilder {
    alert_type: AlertType,
    severity: AlertSeverity,
    conditions: Vec<AlertCondition>,
    message: Option<String>,
}

impl AlertRuleBuilder {
    fn new(alert_type: AlertType) -> Self {
        Self {
            alert_type,
            severity: AlertSeverity::Warning,
            conditions: Vec::new(),
            message: None,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub const fn severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Adds a condition; all conditions must hold for the rule to fire.
    #[must_use]
    pub fn when(
        mut self,
        field: TelemetryField,
        operator: ComparisonOperator,
        threshold: f64,
    ) -> Self {
        self.conditions
            .push(AlertCondition::new(field, operator, threshold));
        self
    }

    /// Sets the message template.
    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(template.into());
        self
    }

    /// Builds the [`AlertRule`].
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRule` if the rule fails
    /// [`AlertRule::validate`]; a missing message counts as empty.
    pub fn build(self) -> Result<AlertRule> {
        let rule = AlertRule {
            alert_type: self.alert_type,
            severity: self.severity,
            conditions: self.conditions,
            message: self.message.unwrap_or_default(),
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// An alert decided by a rule, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// The alert type raised.
    pub alert_type: AlertType,
    /// Severity of the alert.
    pub severity: AlertSeverity,
    /// Rendered message.
    pub message: String,
}

/// An ordered list of rules with at most one rule per alert type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<AlertRule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules with default thresholds:
    ///
    /// | Alert | Condition |
    /// |---|---|
    /// | `FUEL_LOW` | fuel level < 25 |
    /// | `NO_POWER` | grid frequency == 0 AND generator output power == 0 |
    /// | `DUAL_POWER` | grid frequency > 0 AND generator output power > 0 |
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: vec![
                fuel_low_rule(DEFAULT_FUEL_LOW_THRESHOLD),
                no_power_rule(),
                dual_power_rule(),
            ],
        }
    }

    /// Builds the built-in rules from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidConfig` if the configuration is invalid.
    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        config.validate()?;

        let mut set = Self::new();
        if config.fuel_low {
            set.push(fuel_low_rule(config.fuel_low_threshold_percent))?;
        }
        if config.no_power {
            set.push(no_power_rule())?;
        }
        if config.dual_power {
            set.push(dual_power_rule())?;
        }
        Ok(set)
    }

    /// Appends a rule.
    ///
    /// # Errors
    ///
    /// - `AlertError::InvalidRule` if the rule fails [`AlertRule::validate`]
    /// - `AlertError::DuplicateRule` if a rule for the same alert type is
    ///   already present
    pub fn push(&mut self, rule: AlertRule) -> Result<()> {
        rule.validate()?;
        if self.get(rule.alert_type).is_some() {
            return Err(AlertError::DuplicateRule {
                alert_type: rule.alert_type.to_string(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Returns the rule for an alert type.
    #[must_use]
    pub fn get(&self, alert_type: AlertType) -> Option<&AlertRule> {
        self.rules.iter().find(|r| r.alert_type == alert_type)
    }

    /// Returns the rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every rule, in order, against a snapshot.
    #[must_use]
    pub fn evaluate(&self, snapshot: &TelemetrySnapshot) -> Vec<RuleMatch> {
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.evaluate(snapshot).map(|message| RuleMatch {
                    alert_type: rule.alert_type,
                    severity: rule.severity,
                    message,
                })
            })
            .collect()
    }
}

fn fuel_low_rule(threshold: f64) -> AlertRule {
    AlertRule {
        alert_type: AlertType::FuelLow,
        severity: AlertSeverity::Warning,
        conditions: vec![AlertCondition::new(
            TelemetryField::FuelLevel,
            ComparisonOperator::LessThan,
            threshold,
        )],
        message: "Fuel level low ({fuel_level}%)".to_string(),
    }
}

fn no_power_rule() -> AlertRule {
    AlertRule {
        alert_type: AlertType::NoPower,
        severity: AlertSeverity::Critical,
        conditions: vec![
            AlertCondition::new(TelemetryField::GridFrequency, ComparisonOperator::Equal, 0.0),
            AlertCondition::new(
                TelemetryField::GeneratorOutputPower,
                ComparisonOperator::Equal,
                0.0,
            ),
        ],
        message: "No power source found (neither grid nor generator)".to_string(),
    }
}

fn dual_power_rule() -> AlertRule {
    AlertRule {
        alert_type: AlertType::DualPower,
        severity: AlertSeverity::Critical,
        conditions: vec![
            AlertCondition::new(
                TelemetryField::GridFrequency,
                ComparisonOperator::GreaterThan,
                0.0,
            ),
            AlertCondition::new(
                TelemetryField::GeneratorOutputPower,
                ComparisonOperator::GreaterThan,
                0.0,
            ),
        ],
        message: "Abnormal state \u{2014} grid and generator running simultaneously".to_string(),
    }
}

/// Yields `(start, end, name)` for each `{name}` placeholder in a template.
fn placeholders(template: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        let rest = &template[offset..];
        let open = rest.find('{')?;
        let close = rest[open..].find('}')?;
        let start = offset + open;
        let end = start + close + 1;
        offset = end;
        Some((start, end, &template[start + 1..end - 1]))
    })
}

fn field_by_name(name: &str) -> Option<TelemetryField> {
    TelemetryField::ALL
        .into_iter()
        .find(|f| f.as_str() == name)
}

fn unknown_placeholder(template: &str) -> Option<&str> {
    placeholders(template)
        .map(|(_, _, name)| name)
        .find(|name| field_by_name(name).is_none())
}

fn render_template(template: &str, snapshot: &TelemetrySnapshot) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for (start, end, name) in placeholders(template) {
        out.push_str(&template[last..start]);
        match field_by_name(name) {
            Some(field) => out.push_str(&snapshot.value(field).to_string()),
            None => out.push_str(&template[start..end]),
        }
        last = end;
    }
    out.push_str(&template[last..]);
    out
}
