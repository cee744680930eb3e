//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use genwatch_alerts::{Alert, AlertSeverity, AlertType, RuleSet};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Timestamp of the evaluated snapshot.
    pub snapshot_timestamp_ms: i64,
    /// Number of alerts retired.
    pub retired: usize,
    /// Alerts raised by the cycle.
    pub created: Vec<Alert>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// One entry per snapshot, in input order.
    pub cycles: Vec<CycleReport>,
    /// Alerts active after the last cycle.
    pub active: Vec<Alert>,
    /// Every stored alert, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Alert>>,
}

impl TableDisplay for EvaluationReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.cycles.is_empty() {
            writeln!(writer, "No snapshots evaluated")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:>5}  {:>15}  {:>7}  CREATED",
            "CYCLE", "SNAPSHOT (ms)", "RETIRED"
        )?;
        writeln!(writer, "{}", "─".repeat(64))?;

        for (idx, cycle) in self.cycles.iter().enumerate() {
            let created = if cycle.created.is_empty() {
                "-".to_string()
            } else {
                cycle
                    .created
                    .iter()
                    .map(|a| a.alert_type.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(
                writer,
                "{:>5}  {:>15}  {:>7}  {}",
                idx + 1,
                cycle.snapshot_timestamp_ms,
                cycle.retired,
                created
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Active Alerts")?;
        writeln!(writer, "══════════════════════════════════")?;
        if self.active.is_empty() {
            writeln!(writer, "No active alerts")?;
        } else {
            write_alerts(writer, &self.active)?;
        }

        if let Some(history) = &self.history {
            writeln!(writer)?;
            writeln!(writer, "History")?;
            writeln!(writer, "══════════════════════════════════")?;
            write_alerts(writer, history)?;
            writeln!(writer)?;
            writeln!(writer, "Total: {} alert(s)", history.len())?;
        }
        Ok(())
    }
}

fn write_alerts<W: Write>(writer: &mut W, alerts: &[Alert]) -> Result<(), CliError> {
    writeln!(
        writer,
        "{:<10}  {:<8}  {:<6}  {:<20}  MESSAGE",
        "TYPE", "SEVERITY", "ACTIVE", "CREATED"
    )?;
    for alert in alerts {
        writeln!(
            writer,
            "{:<10}  {:<8}  {:<6}  {:<20}  {}",
            alert.alert_type.as_str(),
            alert.severity.as_str(),
            if alert.active { "yes" } else { "no" },
            alert.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate(&alert.message, 60)
        )?;
    }
    Ok(())
}

/// One rule of the table.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    /// Alert type raised by the rule.
    pub alert_type: AlertType,
    /// Severity of raised alerts.
    pub severity: AlertSeverity,
    /// Conditions joined with AND.
    pub condition: String,
    /// Message template.
    pub message: String,
}

/// The configured rule table.
#[derive(Debug, Clone, Serialize)]
pub struct RuleList {
    /// Rules in evaluation order.
    pub rules: Vec<RuleInfo>,
}

impl From<&RuleSet> for RuleList {
    fn from(set: &RuleSet) -> Self {
        Self {
            rules: set
                .rules()
                .iter()
                .map(|rule| RuleInfo {
                    alert_type: rule.alert_type,
                    severity: rule.severity,
                    condition: rule.describe(),
                    message: rule.message.clone(),
                })
                .collect(),
        }
    }
}

impl TableDisplay for RuleList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.rules.is_empty() {
            writeln!(writer, "No rules enabled")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<10}  {:<8}  {:<52}  MESSAGE",
            "TYPE", "SEVERITY", "CONDITION"
        )?;
        writeln!(writer, "{}", "─".repeat(96))?;

        for rule in &self.rules {
            writeln!(
                writer,
                "{:<10}  {:<8}  {:<52}  {}",
                rule.alert_type.as_str(),
                rule.severity.as_str(),
                truncate(&rule.condition, 52),
                rule.message
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} rule(s)", self.rules.len())?;
        Ok(())
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
