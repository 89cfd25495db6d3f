//! Property keys
//!
//! A [`PropertyKey`] is the identity of a declared, typed, named slot.
//!
//! ## Equality discipline
//!
//! - Two keys are equal when both the name and the declared type name are
//!   equal. Contract fulfillment requires an equal key in the public list.
//! - Uniqueness inside one type's visible property set is by name alone: a
//!   name resolves to exactly one slot, so `Prop:A` next to `Prop:B` is a
//!   duplicate.

use std::fmt;
use std::sync::Arc;

use crate::name::QualifiedName;

/// Declared, typed, named slot identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey {
    name: Arc<str>,
    type_name: QualifiedName,
}

impl PropertyKey {
    /// Create a key for a slot named `name` holding values of `type_name`
    pub fn new(name: impl Into<Arc<str>>, type_name: QualifiedName) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }

    /// Slot name as written in scripts
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of values held in the slot
    #[inline]
    pub fn type_name(&self) -> &QualifiedName {
        &self.type_name
    }

    /// Whether both keys would resolve the same name
    #[inline]
    pub fn same_name(&self, other: &PropertyKey) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.type_name)
    }
}
