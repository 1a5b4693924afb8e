use async_trait::async_trait;

use stratus_core::Record;

use crate::registry::Command;
use crate::{Provider, ProviderError};

/// The command listing. Ignores the search term, never fails, never empty.
pub struct HelpProvider {
    entries: Vec<(&'static str, &'static str)>,
}

impl HelpProvider {
    /// One entry per registered command, the help listing itself excluded.
    pub fn registered() -> Self {
        let entries = Command::ALL
            .iter()
            .filter(|command| **command != Command::Help)
            .map(|command| (command.token(), command.describe()))
            .collect();
        Self { entries }
    }
}

#[async_trait]
impl Provider for HelpProvider {
    fn name(&self) -> &'static str {
        "Help"
    }

    async fn run(&self, _search_term: &str) -> Result<Vec<Record>, ProviderError> {
        Ok(self
            .entries
            .iter()
            .map(|(token, describe)| Record::new().with("Name", *token).with("Help", *describe))
            .collect())
    }
}
