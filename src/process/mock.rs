use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::context::Context;
use crate::error::{GemPrepareError, Result};
use crate::process::{CommandRunner, CommandSpec};

/// One command as the mock runner saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    pub command: CommandSpec,
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
}

/// Canned behavior for a program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockResponse {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code; anything but 0 makes the run fail
    pub exit_code: i32,
}

impl MockResponse {
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        MockResponse {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        MockResponse {
            stderr: stderr.into(),
            exit_code,
            ..Default::default()
        }
    }
}

/// Mock runner for testing without spawning processes
///
/// Programs without a registered response succeed silently. Programs listed
/// with [`MockRunner::missing`] fail as if they were not installed.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<String, MockResponse>,
    missing: Vec<String>,
    calls: Mutex<Vec<RecordedCommand>>,
}

impl MockRunner {
    /// Create a runner where every program succeeds with no output
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response for a program
    pub fn respond(mut self, program: impl Into<String>, response: MockResponse) -> Self {
        self.responses.insert(program.into(), response);
        self
    }

    /// Make a program fail to spawn
    pub fn missing(mut self, program: impl Into<String>) -> Self {
        self.missing.push(program.into());
        self
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| call.command.to_string())
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &CommandSpec, ctx: &mut Context<'_>) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCommand {
                command: command.clone(),
                cwd: ctx.cwd.clone(),
                env: ctx.env.clone(),
            });

        if self.missing.contains(&command.program) {
            return Err(GemPrepareError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"),
            });
        }

        let Some(response) = self.responses.get(&command.program) else {
            return Ok(());
        };

        ctx.stdout.write_all(&response.stdout)?;
        ctx.stderr.write_all(&response.stderr)?;

        if response.exit_code != 0 {
            return Err(GemPrepareError::CommandFailed {
                command: command.to_string(),
                code: Some(response.exit_code),
            });
        }

        Ok(())
    }
}
