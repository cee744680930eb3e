//! Snapshot file parsing.
//!
//! Accepts either a JSON array of snapshots or one JSON snapshot per line.
//! Omitted readings default to zero.

use std::path::Path;

use genwatch_alerts::TelemetrySnapshot;

use crate::error::{CliError, Result};

/// Reads snapshots from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_snapshots(path: &Path) -> Result<Vec<TelemetrySnapshot>> {
    let content = std::fs::read_to_string(path)?;
    parse_snapshots(&content)
}

/// Parses snapshots from a JSON array or JSON lines.
///
/// # Errors
///
/// Returns `CliError::Input` naming the offending line for JSON lines input.
pub fn parse_snapshots(content: &str) -> Result<Vec<TelemetrySnapshot>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|e| CliError::Input(e.to_string()));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            TelemetrySnapshot::from_json(line)
                .map_err(|e| CliError::Input(format!("line {}: {e}", idx + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_array() {
        let snapshots = parse_snapshots(
            r#"[
                {"timestamp_ms": 1, "engine": {"fuel_level_percent": 10.0}},
                {"timestamp_ms": 2, "grid": {"frequency_hz": 50.0}}
            ]"#,
        )
        .unwrap();

        assert_eq!(snapshots.len(), 2);
        assert!((snapshots[0].engine.fuel_level_percent - 10.0).abs() < f64::EPSILON);
        assert!((snapshots[1].grid.frequency_hz - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_lines_skip_blank_lines() {
        let snapshots = parse_snapshots(
            "{\"timestamp_ms\": 1}\n\n{\"timestamp_ms\": 2}\n",
        )
        .unwrap();
        let stamps: Vec<_> = snapshots.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(stamps, vec![1, 2]);
    }

    #[test]
    fn json_lines_error_names_line() {
        let err = parse_snapshots("{\"timestamp_ms\": 1}\n{oops}\n").unwrap_err();
        match err {
            CliError::Input(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("expected input error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(parse_snapshots("").unwrap().is_empty());
    }

    #[test]
    fn missing_file() {
        let err = read_snapshots(Path::new("/nonexistent/readings.json")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
