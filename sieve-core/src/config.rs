//! Converter configuration.
//!
//! Configuration can be built in code, parsed from TOML (with `${VAR}`
//! interpolation), or read from `SIEVE_*` environment variables.
//!
//! ```rust
//! use sieve_core::config::{ConvertConfig, FailurePolicy};
//!
//! let config = ConvertConfig::from_str(r#"
//!     failure_policy = "best_effort"
//!     like_wildcard = "*"
//! "#).unwrap();
//! assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
//! assert_eq!(config.like_wildcard, "*");
//! assert!(config.warn_on_missing_method);
//! ```

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult, ErrorCode};

/// Environment variable selecting the failure policy.
pub const ENV_FAILURE_POLICY: &str = "SIEVE_FAILURE_POLICY";
/// Environment variable overriding the `Like` wildcard.
pub const ENV_LIKE_WILDCARD: &str = "SIEVE_LIKE_WILDCARD";
/// Environment variable toggling missing-method warnings.
pub const ENV_WARN_MISSING: &str = "SIEVE_WARN_MISSING";

/// What a conversion does when a criteria method fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and return it with field context.
    #[default]
    Atomic,
    /// Attempt every field and collect failures in the report.
    BestEffort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic => f.write_str("atomic"),
            Self::BestEffort => f.write_str("best_effort"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "atomic" => Ok(Self::Atomic),
            "best_effort" => Ok(Self::BestEffort),
            other => Err(ConvertError::invalid_config(format!(
                "unknown failure policy `{}`",
                other
            ))
            .with_suggestion("Use `atomic` or `best_effort`")),
        }
    }
}

/// Settings shared by every conversion of a converter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    /// Failure handling for criteria method errors.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Marker placed on both sides of `Like` values.
    #[serde(default = "default_wildcard")]
    pub like_wildcard: String,

    /// Emit a warning when a field's target method does not exist.
    #[serde(default = "default_true")]
    pub warn_on_missing_method: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            like_wildcard: default_wildcard(),
            warn_on_missing_method: true,
        }
    }
}

fn default_wildcard() -> String {
    "%".to_string()
}

fn default_true() -> bool {
    true
}

impl ConvertConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the `Like` wildcard.
    pub fn like_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.like_wildcard = wildcard.into();
        self
    }

    /// Enable or disable missing-method warnings.
    pub fn warn_on_missing_method(mut self, enabled: bool) -> Self {
        self.warn_on_missing_method = enabled;
        self
    }

    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::new(
                ErrorCode::ConfigurationIo,
                format!("failed to read config file: {}", path.display()),
            )
            .with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ConvertResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self = toml::from_str(&expanded)
            .map_err(|e| ConvertError::invalid_config(e.message().to_string()).with_source(e))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by any `SIEVE_*` environment variables.
    pub fn from_env() -> ConvertResult<Self> {
        Self::default().with_env()
    }

    /// Apply `SIEVE_*` environment overrides to this configuration.
    pub fn with_env(mut self) -> ConvertResult<Self> {
        if let Ok(policy) = env::var(ENV_FAILURE_POLICY) {
            self.failure_policy = policy.parse()?;
        }
        if let Ok(wildcard) = env::var(ENV_LIKE_WILDCARD) {
            self.like_wildcard = wildcard;
        }
        if let Ok(warn) = env::var(ENV_WARN_MISSING) {
            self.warn_on_missing_method = parse_flag(&warn).ok_or_else(|| {
                ConvertError::invalid_config(format!("{} must be a boolean, got `{}`", ENV_WARN_MISSING, warn))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.like_wildcard.is_empty() {
            return Err(ConvertError::invalid_config("like_wildcard must not be empty")
                .with_suggestion("Use \"%\" for SQL LIKE patterns"));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Replace `${VAR}` with the variable's value; unknown variables are left as-is.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.failure_policy, FailurePolicy::Atomic);
        assert_eq!(config.like_wildcard, "%");
        assert!(config.warn_on_missing_method);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = ConvertConfig::from_str("").unwrap();
        assert_eq!(config, ConvertConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = ConvertConfig::from_str("strict = true").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_empty_wildcard_rejected() {
        let err = ConvertConfig::from_str("like_wildcard = \"\"").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!("atomic".parse::<FailurePolicy>().unwrap(), FailurePolicy::Atomic);
        assert_eq!("Best-Effort".parse::<FailurePolicy>().unwrap(), FailurePolicy::BestEffort);
        assert!("partial".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: This test runs single-threaded and we clean up after
        unsafe {
            env::set_var("SIEVE_TEST_WILDCARD", "*");
        }
        let expanded = expand_env_vars("like_wildcard = \"${SIEVE_TEST_WILDCARD}\"");
        assert_eq!(expanded, "like_wildcard = \"*\"");
        unsafe {
            env::remove_var("SIEVE_TEST_WILDCARD");
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "failure_policy = \"best_effort\"").unwrap();
        writeln!(file, "warn_on_missing_method = false").unwrap();

        let config = ConvertConfig::from_file(file.path()).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        assert!(!config.warn_on_missing_method);
    }

    #[test]
    fn test_missing_file() {
        let err = ConvertConfig::from_file("/nonexistent/sieve.toml").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationIo);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("YES"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
