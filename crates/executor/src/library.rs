//! Libraries
//!
//! A [`Library`] is the unit a host loads: a name, the libraries it depends
//! on, its type and contract definitions, its scripts, and its static memory
//! group. Definitions are validated while the library is built; a library
//! that builds successfully is immutable.
//!
//! Name resolution searches the library's own definitions first, then its
//! dependencies depth-first in declaration order. Each library is visited at
//! most once per lookup, so diamond or cyclic dependency graphs terminate.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use dblang_core::{
    DataContract, DataType, DefinitionViolation, Error, PropertyKey, QualifiedName, Result,
    TypeRef, TypeRegistry,
};
use dblang_memory::{GroupHandle, GroupId, GroupScope, MemoryView};

use crate::object::{Memory, ObjectRef};
use crate::script::Script;

/// A loaded unit of types, contracts, scripts and statics
pub struct Library {
    name: String,
    dependencies: Vec<Arc<Library>>,
    registry: TypeRegistry,
    scripts: FxHashMap<QualifiedName, Arc<Script>>,
    statics: GroupHandle<ObjectRef>,
}

impl Library {
    /// Start building a library whose statics live in `memory`
    pub fn builder(memory: &Arc<Memory>, name: impl Into<String>) -> LibraryBuilder {
        LibraryBuilder {
            name: name.into(),
            dependencies: Vec::new(),
            registry: TypeRegistry::new(),
            scripts: FxHashMap::default(),
            statics: memory.allocate(GroupScope::Static),
        }
    }

    /// Library name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Libraries this one depends on
    pub fn dependencies(&self) -> &[Arc<Library>] {
        &self.dependencies
    }

    /// Types and contracts defined directly in this library
    pub fn definitions(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Scripts defined directly in this library
    pub fn scripts(&self) -> impl Iterator<Item = &Arc<Script>> {
        self.scripts.values()
    }

    /// Static memory group
    pub fn statics(&self) -> GroupId {
        self.statics.id()
    }

    /// Resolve a type or contract by name
    pub fn resolve(&self, name: &QualifiedName) -> Option<TypeRef> {
        self.search(&mut FxHashSet::default(), &|lib| {
            lib.registry.resolve(name).cloned()
        })
    }

    /// Resolve a concrete type by name
    pub fn resolve_type(&self, name: &QualifiedName) -> Option<Arc<DataType>> {
        self.search(&mut FxHashSet::default(), &|lib| {
            lib.registry.resolve_type(name)
        })
    }

    /// Resolve a contract by name
    pub fn resolve_contract(&self, name: &QualifiedName) -> Option<Arc<DataContract>> {
        self.search(&mut FxHashSet::default(), &|lib| {
            lib.registry.resolve_contract(name)
        })
    }

    /// Resolve a script by name
    pub fn resolve_script(&self, name: &QualifiedName) -> Option<Arc<Script>> {
        self.search(&mut FxHashSet::default(), &|lib| lib.scripts.get(name).cloned())
    }

    /// Every definition reachable from this library: its own, then those of
    /// its dependencies depth-first, each library visited once
    pub fn reachable_definitions(&self) -> Vec<TypeRef> {
        let mut out = Vec::new();
        self.walk(&mut FxHashSet::default(), &mut |lib| {
            out.extend(lib.registry.iter().cloned())
        });
        out
    }

    /// Every script reachable from this library, in the same order
    pub fn reachable_scripts(&self) -> Vec<Arc<Script>> {
        let mut out = Vec::new();
        self.walk(&mut FxHashSet::default(), &mut |lib| {
            out.extend(lib.scripts.values().cloned())
        });
        out
    }

    fn walk(&self, visited: &mut FxHashSet<String>, f: &mut dyn FnMut(&Library)) {
        if !visited.insert(self.name.clone()) {
            return;
        }
        f(self);
        for dep in &self.dependencies {
            dep.walk(visited, f);
        }
    }

    fn search<T>(
        &self,
        visited: &mut FxHashSet<String>,
        find: &dyn Fn(&Library) -> Option<T>,
    ) -> Option<T> {
        if !visited.insert(self.name.clone()) {
            return None;
        }
        if let Some(found) = find(self) {
            return Some(found);
        }
        self.dependencies
            .iter()
            .find_map(|dep| dep.search(visited, find))
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("name", &self.name)
            .field(
                "dependencies",
                &self.dependencies.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .field("definitions", &self.registry.len())
            .field("scripts", &self.scripts.len())
            .field("statics", &self.statics.id())
            .finish()
    }
}

/// Builder for [`Library`]
///
/// The static group is allocated up front so scripts added to the builder
/// link it.
pub struct LibraryBuilder {
    name: String,
    dependencies: Vec<Arc<Library>>,
    registry: TypeRegistry,
    scripts: FxHashMap<QualifiedName, Arc<Script>>,
    statics: GroupHandle<ObjectRef>,
}

impl LibraryBuilder {
    /// Declare a dependency
    pub fn dependency(&mut self, library: Arc<Library>) -> &mut Self {
        self.dependencies.push(library);
        self
    }

    /// Register a type or contract
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] if the name is already defined here.
    pub fn define(&mut self, definition: impl Into<TypeRef>) -> Result<()> {
        self.registry.register(definition.into())
    }

    /// Add a script, linking the library statics
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] if a script of the same name exists.
    pub fn script(&mut self, script: Script) -> Result<Arc<Script>> {
        if self.scripts.contains_key(script.name()) {
            return Err(Error::definition(
                script.name().as_str(),
                vec![DefinitionViolation::AlreadyDefined {
                    name: script.name().to_string(),
                }],
            ));
        }
        let script = Arc::new(script.with_statics(self.statics.id()));
        self.scripts.insert(script.name().clone(), Arc::clone(&script));
        Ok(script)
    }

    /// Declare a static slot
    ///
    /// Returns `Ok(false)` if a static of that name already exists.
    pub fn static_slot(&mut self, key: PropertyKey, initial: Option<ObjectRef>) -> Result<bool> {
        self.statics.add(key, initial)
    }

    /// Static memory group
    pub fn statics(&self) -> GroupId {
        self.statics.id()
    }

    /// Validate cross-references and finish the library
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScript`] if a type names a constructor that
    /// neither this library nor its dependencies define.
    pub fn build(self) -> Result<Arc<Library>> {
        let library = Library {
            name: self.name,
            dependencies: self.dependencies,
            registry: self.registry,
            scripts: self.scripts,
            statics: self.statics,
        };

        for definition in library.registry.iter() {
            if let Some(constructor) = definition.as_type().and_then(|t| t.constructor()) {
                if library.resolve_script(constructor).is_none() {
                    return Err(Error::UnknownScript {
                        name: constructor.to_string(),
                    });
                }
            }
        }

        debug!(
            target: "dblang::runtime",
            library = %library.name,
            definitions = library.registry.len(),
            scripts = library.scripts.len(),
            "Built library"
        );
        Ok(Arc::new(library))
    }
}

impl fmt::Debug for LibraryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryBuilder")
            .field("name", &self.name)
            .field("definitions", &self.registry.len())
            .field("scripts", &self.scripts.len())
            .finish()
    }
}
