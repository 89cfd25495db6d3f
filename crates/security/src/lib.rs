//! Capability gating and runtime options for the Db runtime.
//!
//! This crate provides the [`Capability`] and [`CapabilitySet`] types every
//! command declares, and the [`RuntimeOptions`] builder hosts use to override
//! `dblang.toml` when creating a runtime or invoking a script.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named permission a command requires before it may execute.
///
/// Names are free-form; hosts conventionally use dotted names such as
/// `io.write` or `net.connect`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    /// Create a capability from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The capability name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An ordered set of capabilities.
///
/// Used both for what a command requires and what a thread holds. Ordering
/// keeps denial messages stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// The empty set (requires nothing, grants nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability.
    pub fn with(mut self, capability: impl Into<Capability>) -> Self {
        self.0.insert(capability.into());
        self
    }

    /// Add a capability in place.
    pub fn insert(&mut self, capability: impl Into<Capability>) -> bool {
        self.0.insert(capability.into())
    }

    /// Check whether the set holds `capability`.
    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    /// Whether this set holds every capability in `required`.
    pub fn is_superset(&self, required: &CapabilitySet) -> bool {
        self.0.is_superset(&required.0)
    }

    /// Capabilities in `required` this set does not hold, in order.
    pub fn missing_from(&self, required: &CapabilitySet) -> Vec<Capability> {
        required.0.difference(&self.0).cloned().collect()
    }

    /// Union of both sets.
    pub fn union(&self, other: &CapabilitySet) -> CapabilitySet {
        CapabilitySet(self.0.union(&other.0).cloned().collect())
    }

    /// Iterate the capabilities in order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: Into<Capability>> FromIterator<C> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        CapabilitySet(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Capability::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Options for creating a runtime or running one invocation.
///
/// Use the builder pattern to configure options. Any field set to `Some`
/// overrides the corresponding value in `dblang.toml`.
///
/// ```ignore
/// use dblang_security::RuntimeOptions;
///
/// let opts = RuntimeOptions::new()
///     .grant("io.write")
///     .max_invoke_depth(16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Capabilities granted to the thread.
    /// `None` means "use the config file default".
    pub capabilities: Option<CapabilitySet>,
    /// Override the bound on nested invocations.
    pub max_invoke_depth: Option<usize>,
    /// Override whether top-level invocations lock the invoking object.
    pub exclusive_instances: Option<bool>,
}

impl RuntimeOptions {
    /// Create options that defer entirely to the configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the granted capability set.
    pub fn capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Grant one more capability on top of any already set here.
    pub fn grant(mut self, capability: impl Into<Capability>) -> Self {
        self.capabilities
            .get_or_insert_with(CapabilitySet::new)
            .insert(capability);
        self
    }

    /// Set the bound on nested invocations.
    pub fn max_invoke_depth(mut self, depth: usize) -> Self {
        self.max_invoke_depth = Some(depth);
        self
    }

    /// Enable or disable per-object exclusive invocation.
    pub fn exclusive_instances(mut self, enabled: bool) -> Self {
        self.exclusive_instances = Some(enabled);
        self
    }
}
