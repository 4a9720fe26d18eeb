//! Per-invocation context supplied by the release host

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ui::Logger;

/// Everything a prepare step needs from its host for a single call.
///
/// Nothing is retained between invocations; the host builds a fresh context
/// each time. The output sinks are borrowed, so forwarded subprocess output
/// never closes them and the host can keep writing afterwards.
pub struct Context<'a> {
    /// Working directory; relative paths in the configuration resolve here
    pub cwd: PathBuf,
    /// Variables set on subprocesses, on top of the inherited environment
    pub env: HashMap<String, String>,
    pub logger: &'a dyn Logger,
    pub stdout: &'a mut (dyn Write + Send),
    pub stderr: &'a mut (dyn Write + Send),
}

impl<'a> Context<'a> {
    pub fn new(
        cwd: impl Into<PathBuf>,
        logger: &'a dyn Logger,
        stdout: &'a mut (dyn Write + Send),
        stderr: &'a mut (dyn Write + Send),
    ) -> Self {
        Context {
            cwd: cwd.into(),
            env: HashMap::new(),
            logger,
            stdout,
            stderr,
        }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Resolve a configured path against the working directory.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }
}
