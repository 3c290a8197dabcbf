//! Dependent-requirement policy configuration.
//!
//! Whether a classifier value requires a dependent selection is caller policy:
//! the screens disagree ("general client" needs no organization, a titled
//! policy always needs a holder), so the rule is never hard-coded in the
//! controller. Forms can implement
//! [`DependentPolicy`](crate::selection::DependentPolicy) directly, or load
//! the rules from configuration the way the rest of the console does.
//!
//! # File Locations
//!
//! - **Global**: `<platform config dir>/formlink/config.toml`, overridable
//!   with the `FORMLINK_CONFIG_PATH` environment variable
//! - **Project**: `formlink.toml` in the console's working tree
//!
//! Project values override global values key by key.
//!
//! # File Format
//!
//! ```toml
//! # Applies when no more specific rule matches (defaults to false).
//! default_requires_dependent = true
//!
//! # Per-namespace overrides.
//! [require]
//! individual = true
//! organization = false
//!
//! # Per-screen overrides, consulted before the top-level rules.
//! [forms.policy_editor]
//! default_requires_dependent = false
//!
//! [forms.policy_editor.require]
//! individual = true
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_PATH_ENV, GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE};
use crate::core::FormlinkError;
use crate::selection::{Classifier, DependentPolicy};

/// Per-screen rule set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FormPolicy {
    /// Screen-level default, consulted before the global default
    pub default_requires_dependent: Option<bool>,
    /// Per-namespace overrides for this screen
    #[serde(default)]
    pub require: HashMap<String, bool>,
}

/// Dependent-requirement rules, loadable from TOML.
///
/// Lookup order for a namespace: the screen's `[forms.<name>.require]` entry,
/// the screen's own default, the top-level `[require]` entry, the top-level
/// default (`false` when unset).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Fallback when no other rule matches
    pub default_requires_dependent: Option<bool>,
    /// Per-namespace rules
    #[serde(default)]
    pub require: HashMap<String, bool>,
    /// Per-screen rule sets
    #[serde(default)]
    pub forms: HashMap<String, FormPolicy>,
}

impl PolicyConfig {
    /// Parse a TOML string; `origin` names the file in parse errors.
    fn parse(raw: &str, origin: &Path) -> Result<Self, FormlinkError> {
        toml::from_str(raw).map_err(|e| FormlinkError::ConfigParseError {
            file: origin.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load rules from one TOML file.
    pub fn load(path: &Path) -> Result<Self, FormlinkError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw, path)
    }

    /// Load the global configuration.
    ///
    /// Resolves `FORMLINK_CONFIG_PATH` first, then the platform config
    /// directory. A missing file yields the defaults - only a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load_global() -> Result<Self, FormlinkError> {
        match global_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load global rules overlaid with the project's `formlink.toml`.
    pub fn load_with_project(project_dir: &Path) -> Result<Self, FormlinkError> {
        let global = Self::load_global()?;
        let project_path = project_dir.join(PROJECT_CONFIG_FILE);
        if !project_path.exists() {
            return Ok(global);
        }
        Ok(global.merged_with(Self::load(&project_path)?))
    }

    /// Overlay `other` on top of `self`, key by key.
    pub fn merged_with(mut self, other: Self) -> Self {
        if other.default_requires_dependent.is_some() {
            self.default_requires_dependent = other.default_requires_dependent;
        }
        self.require.extend(other.require);
        for (name, form) in other.forms {
            let entry = self.forms.entry(name).or_default();
            if form.default_requires_dependent.is_some() {
                entry.default_requires_dependent = form.default_requires_dependent;
            }
            entry.require.extend(form.require);
        }
        self
    }

    /// Whether `namespace` requires a dependent under the top-level rules.
    pub fn requires(&self, namespace: &str) -> bool {
        self.require
            .get(namespace)
            .copied()
            .or(self.default_requires_dependent)
            .unwrap_or(false)
    }

    /// Whether `namespace` requires a dependent on the named screen.
    pub fn requires_for_form(&self, form: &str, namespace: &str) -> bool {
        if let Some(rules) = self.forms.get(form) {
            if let Some(&required) = rules.require.get(namespace) {
                return required;
            }
            if let Some(required) = rules.default_requires_dependent {
                return required;
            }
        }
        self.requires(namespace)
    }

    /// View of these rules scoped to one screen, usable as a policy.
    pub fn for_form<'a>(&'a self, form: &str) -> ScopedPolicy<'a> {
        ScopedPolicy { config: self, form: form.to_string() }
    }
}

impl<C: Classifier> DependentPolicy<C> for PolicyConfig {
    fn requires_dependent(&self, classifier: &C) -> bool {
        self.requires(classifier.namespace())
    }
}

/// A [`PolicyConfig`] scoped to one screen.
#[derive(Debug, Clone)]
pub struct ScopedPolicy<'a> {
    config: &'a PolicyConfig,
    form: String,
}

impl<C: Classifier> DependentPolicy<C> for ScopedPolicy<'_> {
    fn requires_dependent(&self, classifier: &C) -> bool {
        self.config.requires_for_form(&self.form, classifier.namespace())
    }
}

/// `FORMLINK_CONFIG_PATH`, or the platform default location.
fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(GLOBAL_CONFIG_FILE))
}
