use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GemPrepareError, Result};

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "gemprepare.toml";

/// Command used when the lock file update is enabled without a custom command.
pub const DEFAULT_LOCKFILE_COMMAND: &str = "bundle install";

/// Represents the complete configuration for one prepare invocation.
///
/// Holds where the version marker lives, how to build the gem and whether the
/// lock file should be regenerated after the version bump.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PluginConfig {
    /// Version marker file, relative to the working directory
    pub version_file: PathBuf,

    /// Gemspec passed to `gem build`
    pub gemspec: PathBuf,

    /// Declared gem name, used for the artifact file name
    pub gem_name: String,

    #[serde(default)]
    pub update_gemfile_lock: LockfileUpdate,

    /// Custom version pattern; must have a prefix and a suffix capture group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_pattern: Option<String>,
}

impl PluginConfig {
    /// Create a configuration with the lock file update disabled and the
    /// default version pattern.
    pub fn new(
        version_file: impl Into<PathBuf>,
        gemspec: impl Into<PathBuf>,
        gem_name: impl Into<String>,
    ) -> Self {
        PluginConfig {
            version_file: version_file.into(),
            gemspec: gemspec.into(),
            gem_name: gem_name.into(),
            update_gemfile_lock: LockfileUpdate::Disabled,
            version_pattern: None,
        }
    }

    pub fn with_lockfile_update(mut self, update: LockfileUpdate) -> Self {
        self.update_gemfile_lock = update;
        self
    }

    pub fn with_version_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.version_pattern = Some(pattern.into());
        self
    }
}

/// Whether and how to regenerate `Gemfile.lock` after writing the version.
///
/// In TOML this is either a boolean (`true` runs [`DEFAULT_LOCKFILE_COMMAND`])
/// or a string holding the literal command. A blank string disables it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "LockfileSetting", into = "LockfileSetting")]
pub enum LockfileUpdate {
    #[default]
    Disabled,
    DefaultCommand,
    CustomCommand(String),
}

impl LockfileUpdate {
    /// The command to run, or `None` when disabled
    pub fn command(&self) -> Option<&str> {
        match self {
            LockfileUpdate::Disabled => None,
            LockfileUpdate::DefaultCommand => Some(DEFAULT_LOCKFILE_COMMAND),
            LockfileUpdate::CustomCommand(cmd) => Some(cmd.as_str()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, LockfileUpdate::Disabled)
    }
}

/// On-disk shape of [`LockfileUpdate`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum LockfileSetting {
    Flag(bool),
    Command(String),
}

impl From<LockfileSetting> for LockfileUpdate {
    fn from(setting: LockfileSetting) -> Self {
        match setting {
            LockfileSetting::Flag(false) => LockfileUpdate::Disabled,
            LockfileSetting::Flag(true) => LockfileUpdate::DefaultCommand,
            LockfileSetting::Command(cmd) if cmd.trim().is_empty() => LockfileUpdate::Disabled,
            LockfileSetting::Command(cmd) => LockfileUpdate::CustomCommand(cmd),
        }
    }
}

impl From<LockfileUpdate> for LockfileSetting {
    fn from(update: LockfileUpdate) -> Self {
        match update {
            LockfileUpdate::Disabled => LockfileSetting::Flag(false),
            LockfileUpdate::DefaultCommand => LockfileSetting::Flag(true),
            LockfileUpdate::CustomCommand(cmd) => LockfileSetting::Command(cmd),
        }
    }
}

/// Parses a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<PluginConfig> {
    let config: PluginConfig = toml::from_str(content)?;
    Ok(config)
}

/// Loads configuration from file.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gemprepare.toml` in the working directory
/// 3. `gemprepare.toml` in the user config directory
///
/// Unlike tag patterns, the gem settings have no sensible defaults, so a
/// missing file is an error.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `cwd` - Working directory of the release
pub fn load_config(config_path: Option<&Path>, cwd: &Path) -> Result<PluginConfig> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file(cwd).ok_or_else(|| {
            GemPrepareError::config(format!(
                "no configuration file found (looked for {} in {} and the user config directory)",
                CONFIG_FILE_NAME,
                cwd.display()
            ))
        })?,
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        GemPrepareError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&content)
}

fn find_config_file(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let global = dirs::config_dir()?.join(CONFIG_FILE_NAME);
    global.is_file().then_some(global)
}
