//! Runtime configuration via `dblang.toml`
//!
//! Hosts either embed the configuration as a string or point the runtime at a
//! `dblang.toml` file. Every field has a default, so an empty file is valid.
//! [`RuntimeOptions`] set in code take precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use dblang_core::{Error, Result};
use dblang_security::{CapabilitySet, RuntimeOptions};

/// Config file name looked up by [`RuntimeConfig::from_dir`].
pub const CONFIG_FILE_NAME: &str = "dblang.toml";

/// Runtime configuration loaded from `dblang.toml`.
///
/// # Example
///
/// ```toml
/// max_invoke_depth = 64
/// default_capabilities = ["io.read"]
/// exclusive_instances = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Bound on nested `Invoke` recursion.
    #[serde(default = "default_max_invoke_depth")]
    pub max_invoke_depth: usize,
    /// Capabilities granted when the host passes no explicit set.
    #[serde(default)]
    pub default_capabilities: CapabilitySet,
    /// Whether a top-level invocation holds the invoking object's lock.
    #[serde(default = "default_exclusive_instances")]
    pub exclusive_instances: bool,
}

fn default_max_invoke_depth() -> usize {
    64
}

fn default_exclusive_instances() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_invoke_depth: default_max_invoke_depth(),
            default_capabilities: CapabilitySet::new(),
            exclusive_instances: default_exclusive_instances(),
        }
    }
}

impl RuntimeConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Db runtime configuration
#
# Maximum depth of nested script invocations (default: 64)
max_invoke_depth = 64

# Capabilities granted to invocations that do not pass their own set
# default_capabilities = ["io.read", "io.write"]
default_capabilities = []

# Serialize top-level invocations against the same object (default: true)
exclusive_instances = true
"#
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid TOML, names an
    /// unknown field, or sets a zero invoke depth.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RuntimeConfig = toml::from_str(content).map_err(|e| Error::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("failed to parse config file '{}': {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Load `dblang.toml` from `dir`, falling back to defaults if absent.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize this config to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("failed to serialize config: {}", e),
        })
    }

    /// Apply overrides set in code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the overridden values are invalid, under
    /// the same rules as a config file.
    pub fn with_options(mut self, options: &RuntimeOptions) -> Result<Self> {
        if let Some(caps) = &options.capabilities {
            self.default_capabilities = caps.clone();
        }
        if let Some(depth) = options.max_invoke_depth {
            self.max_invoke_depth = depth;
        }
        if let Some(exclusive) = options.exclusive_instances {
            self.exclusive_instances = exclusive;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.max_invoke_depth == 0 {
            return Err(Error::Config {
                reason: "max_invoke_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
