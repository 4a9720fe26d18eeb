//! External command execution
//!
//! The prepare steps only describe *what* to run ([`CommandSpec`]); running it
//! goes through the [`CommandRunner`] trait so orchestration can be tested
//! without `bundle` or `gem` installed.
//!
//! - [`executor::SystemRunner`]: spawns real processes and forwards their output live
//! - [`mock::MockRunner`]: records invocations and replays canned output

pub mod executor;
pub mod mock;

pub use executor::SystemRunner;
pub use mock::{MockResponse, MockRunner, RecordedCommand};

use std::fmt;

use crate::context::Context;
use crate::error::{GemPrepareError, Result};

/// A program and its arguments. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a command line into program and arguments.
    ///
    /// The line is trimmed and split on runs of spaces. A backslash right
    /// before a space keeps that space inside the argument. Quotes have no
    /// special meaning.
    ///
    /// # Example
    /// ```ignore
    /// let spec = CommandSpec::parse(r"bundle install --path vendor\ dir")?;
    /// assert_eq!(spec.args, vec!["install", "--path", "vendor dir"]);
    /// ```
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut tokens: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut chars = command_line.trim().chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&' ') => {
                    current.push(' ');
                    chars.next();
                }
                ' ' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                other => current.push(other),
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        let mut tokens = tokens.into_iter();
        let program = tokens
            .next()
            .ok_or_else(|| GemPrepareError::config("command must not be empty"))?;

        Ok(CommandSpec {
            program,
            args: tokens.collect(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external commands on behalf of the prepare steps.
///
/// ## Contract
///
/// Implementations run `command` in `ctx.cwd` with `ctx.env` applied on top of
/// the inherited environment, forward its stdout and stderr to the context
/// sinks while it runs (never closing them), and return only once the process
/// has exited.
///
/// ## Errors
///
/// * [`GemPrepareError::Spawn`] - The process could not be started
/// * [`GemPrepareError::CommandFailed`] - The process exited unsuccessfully
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandSpec, ctx: &mut Context<'_>) -> Result<()>;
}
