//! Definition registry
//!
//! Maps qualified names to type and contract definitions so libraries can
//! resolve cross-references by name.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = TypeRegistry::new();
//! registry.register(TypeRef::Type(list_type))?;
//!
//! let list = registry.resolve_type(&name);
//! ```

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{DefinitionViolation, Error, Result};
use crate::name::QualifiedName;
use crate::types::{DataContract, DataType, TypeRef};

/// Registry of type and contract definitions keyed by qualified name
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    definitions: FxHashMap<QualifiedName, TypeRef>,
    /// Registration order, for deterministic iteration
    order: Vec<QualifiedName>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] with an `AlreadyDefined` violation if a
    /// definition with the same qualified name is already registered.
    pub fn register(&mut self, definition: TypeRef) -> Result<()> {
        let name = definition.name().clone();
        if self.definitions.contains_key(&name) {
            return Err(Error::definition(
                name.as_str(),
                vec![DefinitionViolation::AlreadyDefined {
                    name: name.to_string(),
                }],
            ));
        }
        debug!(target: "dblang::types", definition = %name, "Registered definition");
        self.order.push(name.clone());
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Look up any definition by name
    pub fn resolve(&self, name: &QualifiedName) -> Option<&TypeRef> {
        self.definitions.get(name)
    }

    /// Look up a concrete type by name
    pub fn resolve_type(&self, name: &QualifiedName) -> Option<Arc<DataType>> {
        self.resolve(name).and_then(TypeRef::as_type).cloned()
    }

    /// Look up a contract by name
    pub fn resolve_contract(&self, name: &QualifiedName) -> Option<Arc<DataContract>> {
        self.resolve(name).and_then(TypeRef::as_contract).cloned()
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.definitions.contains_key(name)
    }

    /// Iterate definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.order.iter().filter_map(|n| self.definitions.get(n))
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
