//! Mirror configuration
//!
//! Closures (filter, selector, orderer) are supplied in code through the
//! builder. Everything that is plain data lives here and can be loaded from a
//! TOML file, overridden from the environment, and merged.
//!
//! ```toml
//! label = "inbox"
//! removal_policy = "first_equivalent"
//! translate_filtered_positions = true
//! ```

use crate::errors::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `AURA_MIRROR_LABEL`.
pub const ENV_PREFIX: &str = "AURA_MIRROR_";

/// What an ordered mirror removes when one source item leaves.
///
/// Ordered targets are matched by the orderer's equivalence, not by source
/// position, so several target entries can match one removed item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Remove every entry equivalent to the removed item.
    #[default]
    AllEquivalent,
    /// Remove only the first equivalent entry.
    FirstEquivalent,
}

impl std::str::FromStr for RemovalPolicy {
    type Err = MirrorError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all_equivalent" | "all" => Ok(Self::AllEquivalent),
            "first_equivalent" | "first" => Ok(Self::FirstEquivalent),
            other => Err(MirrorError::config(format!(
                "unknown removal policy '{other}'"
            ))),
        }
    }
}

/// Data configuration for one mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Name reported in every log line emitted for this mirror.
    pub label: String,
    /// Tie handling for removals from ordered mirrors.
    pub removal_policy: RemovalPolicy,
    /// Translate source positions into target positions when a filter is set.
    ///
    /// Turning this off applies raw source positions to the target, which
    /// only stays consistent while no filtered-out item precedes a change.
    pub translate_filtered_positions: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            label: "mirror".to_string(),
            removal_policy: RemovalPolicy::default(),
            translate_filtered_positions: true,
        }
    }
}

impl MirrorConfig {
    /// Config with the given label and defaults elsewhere.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the removal policy.
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MirrorError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `AURA_MIRROR_*` variables from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `AURA_MIRROR_*` overrides from an explicit variable list.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            if let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) {
                self.set_from_string(&field.to_ascii_lowercase(), value.as_ref())?;
            }
        }
        self.validate()
    }

    /// Set one field from its string form.
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "label" => self.label = value.to_string(),
            "removal_policy" => self.removal_policy = value.parse()?,
            "translate_filtered_positions" => {
                self.translate_filtered_positions = value.trim().parse().map_err(|_| {
                    MirrorError::config(format!(
                        "translate_filtered_positions expects true or false, got '{value}'"
                    ))
                })?;
            }
            other => {
                return Err(MirrorError::config(format!(
                    "unknown configuration key '{other}'"
                )))
            }
        }
        Ok(())
    }

    /// Overlay every field of `other` that differs from the default.
    pub fn merge_with(&mut self, other: &Self) {
        let defaults = Self::default();
        if other.label != defaults.label {
            self.label.clone_from(&other.label);
        }
        if other.removal_policy != defaults.removal_policy {
            self.removal_policy = other.removal_policy;
        }
        if other.translate_filtered_positions != defaults.translate_filtered_positions {
            self.translate_filtered_positions = other.translate_filtered_positions;
        }
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(MirrorError::config("label must not be empty"));
        }
        if self.label.chars().any(char::is_control) {
            return Err(MirrorError::config(
                "label must not contain control characters",
            ));
        }
        Ok(())
    }
}
