use regex::{Captures, Regex};
use std::fs;
use std::path::Path;

use crate::context::Context;
use crate::error::{GemPrepareError, Result};

/// Matches the Ruby `VERSION = "x.y.z"` constant.
///
/// Group 1 is everything up to and including the opening quote, group 2 the
/// closing quote. The version token in between may not span lines.
pub const DEFAULT_VERSION_PATTERN: &str = r#"(\bVERSION\s*=\s*['"])[^'"\r\n]*(['"])"#;

/// The release version handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextRelease {
    pub version: String,
}

impl NextRelease {
    pub fn new(version: impl Into<String>) -> Self {
        NextRelease {
            version: version.into(),
        }
    }

    /// Parses the version as a semantic version.
    ///
    /// # Returns
    /// * `Ok(semver::Version)` - If the version is valid semver (e.g. "2.0.0-rc.1")
    /// * `Err(GemPrepareError::Version)` - Otherwise
    pub fn semver(&self) -> Result<semver::Version> {
        semver::Version::parse(&self.version).map_err(|e| {
            GemPrepareError::version(format!(
                "'{}' is not a valid semantic version: {}",
                self.version, e
            ))
        })
    }
}

/// Rewrites every `-` to `.`.
///
/// RubyGems turns `-` into `.pre.`, which makes the published gem version
/// drift from the release tag; a plain `.` keeps the difference small.
///
/// # Example
/// ```ignore
/// assert_eq!(normalize_version("2.0.0-rc.1"), "2.0.0.rc.1");
/// ```
pub fn normalize_version(version: &str) -> String {
    version.replace('-', ".")
}

/// A compiled version pattern with a prefix and a suffix capture group.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Compiles a pattern.
    ///
    /// Group 1 must capture the text before the version token and group 2 the
    /// text after it.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 3 {
            return Err(GemPrepareError::config(format!(
                "version pattern '{}' needs a prefix and a suffix capture group",
                pattern
            )));
        }
        Ok(VersionPattern { regex })
    }

    /// Compiles the configured pattern, or the default one.
    pub fn from_config(pattern: Option<&str>) -> Result<Self> {
        Self::new(pattern.unwrap_or(DEFAULT_VERSION_PATTERN))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of version tokens found in `contents`
    pub fn count_matches(&self, contents: &str) -> usize {
        self.regex.find_iter(contents).count()
    }

    /// Replaces every version token with the normalized `version`.
    ///
    /// Prefix and suffix text is kept byte for byte. The version is inserted
    /// literally, `$` included.
    ///
    /// # Returns
    /// The new contents and the number of replaced tokens. With zero matches
    /// the contents come back unchanged.
    pub fn substitute(&self, contents: &str, version: &str) -> (String, usize) {
        let normalized = normalize_version(version);
        let mut replaced = 0;
        let updated = self.regex.replace_all(contents, |caps: &Captures| {
            replaced += 1;
            // Optional groups that sat out the match contribute nothing
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let suffix = caps.get(2).map_or("", |m| m.as_str());
            format!("{}{}{}", prefix, normalized, suffix)
        });
        (updated.into_owned(), replaced)
    }
}

impl Default for VersionPattern {
    fn default() -> Self {
        VersionPattern {
            regex: Regex::new(DEFAULT_VERSION_PATTERN).expect("default version pattern compiles"),
        }
    }
}

/// Writes `version` into the version marker file.
///
/// Reads the whole file, substitutes every pattern match and writes the file
/// back in full (not atomically). A file without any match is rewritten
/// unchanged; the logger gets a warning but no error is raised.
///
/// # Arguments
/// * `ctx` - Invocation context; `version_file` resolves against its cwd
/// * `version_file` - Path of the version marker file
/// * `version` - Release version, before dash normalization
/// * `pattern` - Version pattern to substitute
///
/// # Returns
/// * `Ok(usize)` - Number of replaced version tokens
/// * `Err(GemPrepareError::Io)` - If the file cannot be read or written
pub fn write_version(
    ctx: &Context<'_>,
    version_file: &Path,
    version: &str,
    pattern: &VersionPattern,
) -> Result<usize> {
    let full_path = ctx.resolve(version_file);
    let contents = fs::read_to_string(&full_path)?;

    let (updated, replaced) = pattern.substitute(&contents, version);
    if replaced == 0 {
        ctx.logger.warn(&format!(
            "No version string matching `{}` found in `{}`; file left unchanged",
            pattern.as_str(),
            version_file.display()
        ));
    }

    ctx.logger.log(&format!(
        "Writing version {} to `{}`",
        version,
        version_file.display()
    ));
    fs::write(&full_path, updated)?;

    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION_RB: &str = "module Mygem\n  VERSION = \"1.2.3\"\nend\n";

    #[test]
    fn test_normalize_version_replaces_every_dash() {
        assert_eq!(normalize_version("2.0.0-rc.1"), "2.0.0.rc.1");
        assert_eq!(normalize_version("1.0.0-beta-2"), "1.0.0.beta.2");
        assert_eq!(normalize_version("1.0.0"), "1.0.0");
    }

    #[test]
    fn test_substitute_default_pattern() {
        let pattern = VersionPattern::default();
        let (updated, replaced) = pattern.substitute(VERSION_RB, "2.0.0-rc.1");
        assert_eq!(replaced, 1);
        assert_eq!(updated, "module Mygem\n  VERSION = \"2.0.0.rc.1\"\nend\n");
    }

    #[test]
    fn test_substitute_single_quotes_and_freeze() {
        let pattern = VersionPattern::default();
        let (updated, _) = pattern.substitute("VERSION = '0.1.0'.freeze\n", "0.2.0");
        assert_eq!(updated, "VERSION = '0.2.0'.freeze\n");
    }

    #[test]
    fn test_substitute_is_idempotent() {
        let pattern = VersionPattern::default();
        let (once, _) = pattern.substitute(VERSION_RB, "3.1.0-alpha");
        let (twice, _) = pattern.substitute(&once, "3.1.0-alpha");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_substitute_zero_matches_returns_input() {
        let pattern = VersionPattern::default();
        let contents = "# no version here\n";
        let (updated, replaced) = pattern.substitute(contents, "1.0.0");
        assert_eq!(replaced, 0);
        assert_eq!(updated, contents);
    }

    #[test]
    fn test_substitute_replaces_all_matches() {
        let pattern = VersionPattern::default();
        let contents = "VERSION = \"1.0.0\"\nOTHER::VERSION = \"1.0.0\"\n";
        let (updated, replaced) = pattern.substitute(contents, "1.1.0");
        assert_eq!(replaced, 2);
        assert_eq!(updated, "VERSION = \"1.1.0\"\nOTHER::VERSION = \"1.1.0\"\n");
    }

    #[test]
    fn test_substitute_inserts_dollar_literally() {
        let pattern = VersionPattern::default();
        let (updated, _) = pattern.substitute("VERSION = \"1\"", "$1");
        assert_eq!(updated, "VERSION = \"$1\"");
    }

    #[test]
    fn test_substitute_does_not_cross_lines() {
        let pattern = VersionPattern::default();
        let contents = "VERSION = \"\nunterminated\n";
        let (updated, replaced) = pattern.substitute(contents, "1.0.0");
        assert_eq!(replaced, 0);
        assert_eq!(updated, contents);
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = VersionPattern::new(r#"(version = ")[^"]*(")"#).unwrap();
        let (updated, replaced) = pattern.substitute("version = \"1.2.3\"", "2.0.0-rc.1");
        assert_eq!(replaced, 1);
        assert_eq!(updated, "version = \"2.0.0.rc.1\"");
    }

    #[test]
    fn test_substitute_with_unmatched_optional_prefix() {
        let pattern = VersionPattern::new(r#"(VERSION = ")?[0-9]+\.[0-9]+\.[0-9]+(")"#).unwrap();
        let (updated, replaced) = pattern.substitute("1.2.3\"\n", "2.0.0-rc.1");
        assert_eq!(replaced, 1);
        assert_eq!(updated, "2.0.0.rc.1\"\n");
    }

    #[test]
    fn test_write_version_with_unmatched_optional_suffix() {
        use crate::ui::MemoryLogger;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("version.rb"), "VERSION = \"1.2.3\n").unwrap();
        let pattern = VersionPattern::new(r#"(VERSION = ")[0-9.]+(")?"#).unwrap();
        let logger = MemoryLogger::new();
        let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
        let ctx = Context::new(dir.path(), &logger, &mut out, &mut err);

        let replaced = write_version(&ctx, Path::new("version.rb"), "1.3.0", &pattern).unwrap();

        assert_eq!(replaced, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("version.rb")).unwrap(),
            "VERSION = \"1.3.0\n"
        );
    }

    #[test]
    fn test_pattern_without_groups_rejected() {
        let result = VersionPattern::new(r#"VERSION = "[^"]*""#);
        assert!(matches!(result, Err(GemPrepareError::Config(_))));
    }

    #[test]
    fn test_pattern_with_one_group_rejected() {
        assert!(VersionPattern::new(r#"(VERSION = ")[^"]*""#).is_err());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let result = VersionPattern::new("(unclosed");
        assert!(matches!(result, Err(GemPrepareError::Pattern(_))));
    }

    #[test]
    fn test_from_config_defaults() {
        let pattern = VersionPattern::from_config(None).unwrap();
        assert_eq!(pattern.as_str(), DEFAULT_VERSION_PATTERN);
    }

    #[test]
    fn test_count_matches() {
        let pattern = VersionPattern::default();
        assert_eq!(pattern.count_matches(VERSION_RB), 1);
        assert_eq!(pattern.count_matches("nothing"), 0);
    }

    #[test]
    fn test_next_release_semver() {
        let release = NextRelease::new("2.0.0-rc.1");
        let version = release.semver().unwrap();
        assert_eq!(version.major, 2);
        assert_eq!(version.pre.as_str(), "rc.1");
    }

    #[test]
    fn test_next_release_invalid_semver() {
        let result = NextRelease::new("2.0").semver();
        assert!(matches!(result, Err(GemPrepareError::Version(_))));
    }
}
