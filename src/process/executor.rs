use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::context::Context;
use crate::error::{GemPrepareError, Result};
use crate::process::{CommandRunner, CommandSpec};

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    /// Spawn the command and forward its output until it exits.
    ///
    /// stdout and stderr are each copied to their sink on a scoped thread as
    /// the bytes arrive, so nothing is buffered whole. stdin is closed. The
    /// sinks are flushed but stay open for the caller.
    ///
    /// Completion waits for both pipes to close, not just for the process to
    /// exit: a grandchild that inherits and holds the pipes blocks this call.
    ///
    /// # Returns
    /// * `Ok(())` if the command exits with code 0
    /// * `Err` if the command cannot be spawned, output forwarding fails, or
    ///   it exits unsuccessfully
    fn run(&self, command: &CommandSpec, ctx: &mut Context<'_>) -> Result<()> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&ctx.cwd)
            .envs(&ctx.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GemPrepareError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let child_stdout = child
            .stdout
            .take()
            .ok_or_else(|| GemPrepareError::process("failed to capture stdout"))?;
        let child_stderr = child
            .stderr
            .take()
            .ok_or_else(|| GemPrepareError::process("failed to capture stderr"))?;

        let out_sink = &mut *ctx.stdout;
        let err_sink = &mut *ctx.stderr;
        let (out_result, err_result) = thread::scope(|scope| {
            let out = scope.spawn(move || forward(child_stdout, out_sink));
            let err = scope.spawn(move || forward(child_stderr, err_sink));
            (out.join(), err.join())
        });

        // Reap the child before reporting forwarding problems
        let status = child.wait()?;

        for (stream, result) in [("stdout", out_result), ("stderr", err_result)] {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(GemPrepareError::process(format!(
                        "forwarding {} of `{}` failed: {}",
                        stream, command, e
                    )))
                }
                Err(_) => {
                    return Err(GemPrepareError::process(format!(
                        "{} forwarding thread of `{}` panicked",
                        stream, command
                    )))
                }
            }
        }

        if !status.success() {
            return Err(GemPrepareError::CommandFailed {
                command: command.to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

fn forward<R: Read, W: Write + ?Sized>(mut source: R, sink: &mut W) -> io::Result<()> {
    io::copy(&mut source, sink)?;
    sink.flush()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ui::MemoryLogger;
    use std::collections::HashMap;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    #[test]
    fn test_forwards_stdout_and_stderr_separately() {
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        {
            let mut ctx = Context::new(".", &logger, &mut out, &mut err);
            SystemRunner
                .run(&sh("echo to-out; echo to-err 1>&2"), &mut ctx)
                .unwrap();
        }

        assert_eq!(String::from_utf8(out).unwrap(), "to-out\n");
        assert_eq!(String::from_utf8(err).unwrap(), "to-err\n");
    }

    #[test]
    fn test_sinks_stay_usable_after_run() {
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        {
            let mut ctx = Context::new(".", &logger, &mut out, &mut err);
            SystemRunner.run(&sh("printf first"), &mut ctx).unwrap();
            ctx.stdout.write_all(b" second").unwrap();
        }

        assert_eq!(String::from_utf8(out).unwrap(), "first second");
    }

    #[test]
    fn test_runs_in_cwd_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        {
            let env = HashMap::from([("GEM_PREPARE_TEST".to_string(), "hello".to_string())]);
            let mut ctx = Context::new(dir.path(), &logger, &mut out, &mut err).with_env(env);
            SystemRunner
                .run(&sh("echo $GEM_PREPARE_TEST; touch marker"), &mut ctx)
                .unwrap();
        }

        assert_eq!(String::from_utf8(out).unwrap(), "hello\n");
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_stdin_is_closed() {
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        {
            let mut ctx = Context::new(".", &logger, &mut out, &mut err);
            SystemRunner.run(&sh("cat"), &mut ctx).unwrap();
        }

        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_non_zero_exit_reports_code() {
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let mut ctx = Context::new(".", &logger, &mut out, &mut err);

        let result = SystemRunner.run(&sh("echo failing 1>&2; exit 3"), &mut ctx);
        match result {
            Err(GemPrepareError::CommandFailed { command, code }) => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(code, Some(3));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let mut ctx = Context::new(".", &logger, &mut out, &mut err);

        let result = SystemRunner.run(
            &CommandSpec::new("gem-prepare-no-such-program", ["build"]),
            &mut ctx,
        );
        assert!(matches!(result, Err(GemPrepareError::Spawn { .. })));
    }
}
