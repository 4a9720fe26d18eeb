//! Pre-flight checks run before the prepare step

use std::fs;

use crate::config::PluginConfig;
use crate::context::Context;
use crate::error::{GemPrepareError, Result};
use crate::version::{NextRelease, VersionPattern};

/// Checks that a prepare run can succeed before anything is modified.
///
/// Fails when the gem name is blank, the gemspec or version file is missing,
/// the version pattern matches nothing in the version file, or the release
/// version is not valid semver. `prepare` does not call this itself.
pub fn verify_conditions(
    config: &PluginConfig,
    release: &NextRelease,
    ctx: &Context<'_>,
) -> Result<()> {
    if config.gem_name.trim().is_empty() {
        return Err(GemPrepareError::verify("gem_name must not be empty"));
    }

    let gemspec = ctx.resolve(&config.gemspec);
    if !gemspec.is_file() {
        return Err(GemPrepareError::verify(format!(
            "gemspec not found: {}",
            gemspec.display()
        )));
    }

    let version_file = ctx.resolve(&config.version_file);
    let contents = fs::read_to_string(&version_file).map_err(|e| {
        GemPrepareError::verify(format!(
            "cannot read version file {}: {}",
            version_file.display(),
            e
        ))
    })?;

    let pattern = VersionPattern::from_config(config.version_pattern.as_deref())?;
    if pattern.count_matches(&contents) == 0 {
        return Err(GemPrepareError::verify(format!(
            "no version string matching `{}` in {}",
            pattern.as_str(),
            config.version_file.display()
        )));
    }

    release.semver()?;

    ctx.logger.success(&format!(
        "Verified {} ({})",
        config.gem_name,
        config.gemspec.display()
    ));
    Ok(())
}
