//! Operator confirmation before anything is changed

use crate::mode::Mode;
use crate::utils::Console;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Asks the operator a yes/no question
pub trait Prompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Interactive prompt on the terminal
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Flags that decide whether the prompt is shown
#[derive(Debug, Clone, Copy, Default)]
pub struct GateFlags {
    pub assume_yes: bool,
    pub quiet: bool,
    pub no_interaction: bool,
    pub pretend: bool,
}

impl GateFlags {
    pub fn should_bypass(&self) -> bool {
        self.assume_yes || self.quiet || self.no_interaction || self.pretend
    }
}

pub const CONTINUE_PROMPT: &str = "Do you want to continue?";

/// Preview the plan and ask for confirmation; `true` means go ahead
pub fn confirm_execution(
    mode: Mode,
    migrations: &[String],
    flags: GateFlags,
    skip_foreign_key_checks: bool,
    console: &Console,
    prompter: &mut dyn Prompter,
) -> Result<bool> {
    if flags.should_bypass() {
        return Ok(true);
    }

    if skip_foreign_key_checks {
        console.comment("\nWarning: Option 'skip-foreign-key-checks' is enabled.");
    }

    if let Some(warning) = mode.warning() {
        console.comment(&format!("\n{}\n", warning));
    }

    console.comment(&format!("The following migrations will be {}:", mode.action_word()));
    for migration in migrations {
        console.line(&format!("  {}", migration));
    }

    prompter.confirm(CONTINUE_PROMPT)
}
