//! Execution modes

use crate::error::SpecificError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Apply the selected migrations that are pending
    #[default]
    Default,
    /// Revert the selected migrations
    Rollback,
    /// Revert the selected migrations, then apply them again
    Refresh,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Default, Mode::Rollback, Mode::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Rollback => "rollback",
            Mode::Refresh => "refresh",
        }
    }

    /// Past participle used in "The following migrations will be ..."
    pub fn action_word(&self) -> &'static str {
        match self {
            Mode::Default => "migrated",
            Mode::Rollback => "rolled back",
            Mode::Refresh => "refreshed",
        }
    }

    /// Consequence shown before confirmation; none for the default mode
    pub fn warning(&self) -> Option<String> {
        let consequence = match self {
            Mode::Default => return None,
            Mode::Rollback => "roll back specific migrations.",
            Mode::Refresh => "refresh specific migrations and then re-run them.",
        };
        Some(format!(
            "Warning: You have switched to {} mode, migrate-specific will {}",
            self.as_str(),
            consequence
        ))
    }

    /// Whether the mode reverts migrations, and so moves them to the head batch
    pub fn reverts(&self) -> bool {
        matches!(self, Mode::Rollback | Mode::Refresh)
    }
}

impl FromStr for Mode {
    type Err = SpecificError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| SpecificError::InvalidMode(value.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
