//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`evaluate`] - Replay snapshots through the alert engine
//! - [`rules`] - Rule table listing

pub mod evaluate;
pub mod rules;

pub use evaluate::EvaluateCommand;
pub use rules::RulesCommand;
