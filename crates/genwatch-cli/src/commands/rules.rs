//! Rule table listing.

use std::io::Write;

use genwatch_alerts::{EngineConfig, RuleSet};

use crate::error::{CliError, Result};
use crate::output::{OutputFormat, RuleList};

/// Rules command executor.
pub struct RulesCommand<'a> {
    config: &'a EngineConfig,
}

impl<'a> RulesCommand<'a> {
    /// Create a new rules command.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Execute the rules command.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule configuration is invalid or output fails.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<()> {
        let rules = RuleSet::from_config(&self.config.rules).map_err(CliError::from)?;
        format.write(writer, &RuleList::from(&rules))
    }
}
