//! The prepare step: bump the version, refresh the lock file, build the gem.

use std::path::Path;

use crate::config::{LockfileUpdate, PluginConfig};
use crate::context::Context;
use crate::error::Result;
use crate::process::{CommandRunner, CommandSpec};
use crate::version::{self, NextRelease, VersionPattern};

/// Result of a successful prepare step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareResult {
    /// File name of the built gem, relative to the working directory
    pub gem_file: String,
}

/// Expected artifact name for a gem build.
///
/// Uses the release version verbatim, dashes included, even though the
/// version file receives the dash-normalized form.
pub fn gem_file_name(gem_name: &str, version: &str) -> String {
    format!("{}-{}.gem", gem_name, version)
}

/// Regenerates the lock file if the configuration asks for it.
///
/// # Returns
/// * `Ok(true)` - The lock file command ran successfully
/// * `Ok(false)` - The update is disabled; nothing ran
/// * `Err` - The command is blank, could not start, or failed
pub fn update_lockfile<R: CommandRunner + ?Sized>(
    update: &LockfileUpdate,
    ctx: &mut Context<'_>,
    runner: &R,
) -> Result<bool> {
    let Some(command_line) = update.command() else {
        return Ok(false);
    };

    ctx.logger.log(&format!(
        "Updating lock file with command `{}`",
        command_line
    ));
    let command = CommandSpec::parse(command_line)?;
    runner.run(&command, ctx)?;

    Ok(true)
}

/// Builds the gem with `gem build <gemspec>`.
///
/// The returned file name is computed from `gem_name` and `version`; the
/// build output is not inspected.
// TODO: read the file name from the "File:" line gem build prints
pub fn build_gem<R: CommandRunner + ?Sized>(
    gemspec: &Path,
    gem_name: &str,
    version: &str,
    ctx: &mut Context<'_>,
    runner: &R,
) -> Result<String> {
    let gem_file = gem_file_name(gem_name, version);
    ctx.logger.log(&format!("Building gem `{}`", gem_file));

    let command = CommandSpec::new("gem", ["build".to_string(), gemspec.display().to_string()]);
    runner.run(&command, ctx)?;

    Ok(gem_file)
}

/// Main prepare workflow
///
/// Orchestrates, strictly in order:
/// 1. Write the release version into the version file
/// 2. Update the lock file (only when enabled)
/// 3. Build the gem
///
/// The first failure aborts the remaining steps. Nothing is rolled back, so a
/// failed build leaves the version file modified.
///
/// # Arguments
///
/// * `config` - Plugin configuration
/// * `release` - The version being released
/// * `ctx` - Working directory, environment, logger and output sinks
/// * `runner` - Executes `bundle`/`gem`
pub fn prepare<R: CommandRunner + ?Sized>(
    config: &PluginConfig,
    release: &NextRelease,
    ctx: &mut Context<'_>,
    runner: &R,
) -> Result<PrepareResult> {
    let pattern = VersionPattern::from_config(config.version_pattern.as_deref())?;

    version::write_version(ctx, &config.version_file, &release.version, &pattern)?;
    update_lockfile(&config.update_gemfile_lock, ctx, runner)?;
    let gem_file = build_gem(
        &config.gemspec,
        &config.gem_name,
        &release.version,
        ctx,
        runner,
    )?;

    Ok(PrepareResult { gem_file })
}
