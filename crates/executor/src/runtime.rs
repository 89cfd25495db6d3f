//! Host-facing runtime.
//!
//! The [`Runtime`] owns the memory arena, the configuration and the set of
//! loaded libraries. Hosts load libraries, create and bind objects, and run
//! scripts through it.
//!
//! # Usage
//!
//! ```ignore
//! use dblang_executor::{Invocation, Runtime, RuntimeConfig};
//!
//! let runtime = Runtime::new(RuntimeConfig::default());
//! let mut lib = runtime.library_builder("app");
//! lib.define(point_type)?;
//! let main = lib.script(main_script)?;
//! runtime.load_library(lib.build()?)?;
//!
//! let result = runtime.run(Invocation::new(main).grant("io.write")).await?;
//! ```
//!
//! # Instance synchronization
//!
//! When `exclusive_instances` is on, a top-level invocation holds the lock of
//! its own invoker for its whole duration, so two top-level invocations
//! against the same object never overlap. This is not per-object exclusion:
//! nested invocations take no lock, including method calls on other objects,
//! so a nested call may run against an object whose lock another top-level
//! invocation holds. Hosts needing exclusion on those objects must serialize
//! their top-level invocations themselves.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use dblang_core::{
    DataType, DefinitionViolation, Error, NativeValue, QualifiedName, Result, TypeRef,
};
use dblang_memory::GroupId;
use dblang_security::{Capability, CapabilitySet, RuntimeOptions};

use crate::command::Context;
use crate::config::RuntimeConfig;
use crate::executor::Executor;
use crate::library::{Library, LibraryBuilder};
use crate::object::{Memory, Object, ObjectRef};
use crate::script::Script;
use crate::thread::{CancelToken, ThreadScope};

/// State shared by every invocation of one runtime
pub(crate) struct RuntimeState {
    memory: Arc<Memory>,
    config: RuntimeConfig,
    libraries: RwLock<Vec<Arc<Library>>>,
}

impl RuntimeState {
    pub(crate) fn memory(&self) -> &Arc<Memory> {
        &self.memory
    }

    pub(crate) fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn find<T>(&self, find: impl Fn(&Library) -> Option<T>) -> Option<T> {
        self.libraries.read().iter().find_map(|lib| find(&**lib))
    }

    pub(crate) fn resolve(&self, name: &QualifiedName) -> Result<TypeRef> {
        self.find(|lib| lib.resolve(name))
            .ok_or_else(|| Error::UnknownType {
                name: name.to_string(),
            })
    }

    pub(crate) fn resolve_type(&self, name: &QualifiedName) -> Result<Arc<DataType>> {
        self.find(|lib| lib.resolve_type(name))
            .ok_or_else(|| Error::UnknownType {
                name: name.to_string(),
            })
    }

    pub(crate) fn resolve_script(&self, name: &QualifiedName) -> Result<Arc<Script>> {
        self.find(|lib| lib.resolve_script(name))
            .ok_or_else(|| Error::UnknownScript {
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeState")
            .field("memory", &self.memory)
            .field("config", &self.config)
            .field("libraries", &self.libraries.read().len())
            .finish()
    }
}

/// One script invocation requested by a host
#[derive(Debug, Clone)]
pub struct Invocation {
    script: Arc<Script>,
    invoker: Context,
    args: Vec<Context>,
    capabilities: Option<CapabilitySet>,
    context: Option<GroupId>,
    cancel: CancelToken,
}

impl Invocation {
    /// Invocation of `script` with no invoker and no arguments
    pub fn new(script: Arc<Script>) -> Self {
        Self {
            script,
            invoker: None,
            args: Vec::new(),
            capabilities: None,
            context: None,
            cancel: CancelToken::new(),
        }
    }

    /// Run against `object`
    pub fn invoker(mut self, object: ObjectRef) -> Self {
        self.invoker = Some(object);
        self
    }

    /// Append an argument
    pub fn arg(mut self, value: Context) -> Self {
        self.args.push(value);
        self
    }

    /// Replace the granted capability set
    pub fn capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Grant one more capability on top of any already set here
    pub fn grant(mut self, capability: impl Into<Capability>) -> Self {
        self.capabilities
            .get_or_insert_with(CapabilitySet::new)
            .insert(capability);
        self
    }

    /// Link a caller-supplied context group
    pub fn context(mut self, group: GroupId) -> Self {
        self.context = Some(group);
        self
    }

    /// Observe `token` for cancellation
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }
}

/// The host-facing runtime
#[derive(Debug, Clone)]
pub struct Runtime {
    executor: Executor,
}

impl Runtime {
    /// Create a runtime from configuration
    pub fn new(config: RuntimeConfig) -> Self {
        let state = Arc::new(RuntimeState {
            memory: Memory::new(),
            config,
            libraries: RwLock::new(Vec::new()),
        });
        Self {
            executor: Executor::new(state),
        }
    }

    /// Create a runtime from configuration with code overrides
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the overrides produce an invalid
    /// configuration.
    pub fn with_options(config: RuntimeConfig, options: &RuntimeOptions) -> Result<Self> {
        Ok(Self::new(config.with_options(options)?))
    }

    fn state(&self) -> &Arc<RuntimeState> {
        self.executor.state()
    }

    /// Effective configuration
    pub fn config(&self) -> &RuntimeConfig {
        self.state().config()
    }

    /// Memory arena holding every group of this runtime
    pub fn memory(&self) -> &Arc<Memory> {
        self.state().memory()
    }

    /// Executor for driving threads directly
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Start building a library whose statics live in this runtime
    pub fn library_builder(&self, name: impl Into<String>) -> LibraryBuilder {
        Library::builder(self.memory(), name)
    }

    /// Make a library's definitions and scripts resolvable
    ///
    /// Qualified names are unique across the runtime: every definition and
    /// script reachable from `library` must either be new or be the very
    /// definition already loaded under that name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] if a library with the same name is
    /// already loaded, or with one [`DefinitionViolation::AlreadyDefined`]
    /// per name that resolves to a different definition. Nothing is loaded
    /// on error.
    pub fn load_library(&self, library: Arc<Library>) -> Result<()> {
        let mut libraries = self.state().libraries.write();
        if libraries.iter().any(|l| l.name() == library.name()) {
            return Err(Error::definition(
                library.name(),
                vec![DefinitionViolation::AlreadyDefined {
                    name: library.name().to_string(),
                }],
            ));
        }

        let mut clashes: Vec<String> = Vec::new();
        for definition in library.reachable_definitions() {
            let name = definition.name();
            let loaded = libraries.iter().find_map(|l| l.resolve(name));
            let visible = library.resolve(name);
            let clash = [loaded, visible]
                .iter()
                .flatten()
                .any(|existing| !existing.same_definition(&definition));
            if clash && !clashes.iter().any(|c| c == name.as_str()) {
                clashes.push(name.to_string());
            }
        }
        for script in library.reachable_scripts() {
            let name = script.name();
            let loaded = libraries.iter().find_map(|l| l.resolve_script(name));
            let visible = library.resolve_script(name);
            let clash = [loaded, visible]
                .iter()
                .flatten()
                .any(|existing| !Arc::ptr_eq(existing, &script));
            if clash && !clashes.iter().any(|c| c == name.as_str()) {
                clashes.push(name.to_string());
            }
        }
        if !clashes.is_empty() {
            warn!(
                target: "dblang::runtime",
                library = library.name(),
                clashes = ?clashes,
                "Rejected library with clashing names"
            );
            return Err(Error::definition(
                library.name(),
                clashes
                    .into_iter()
                    .map(|name| DefinitionViolation::AlreadyDefined { name })
                    .collect(),
            ));
        }

        info!(
            target: "dblang::runtime",
            library = library.name(),
            definitions = library.definitions().len(),
            dependencies = library.dependencies().len(),
            "Loaded library"
        );
        libraries.push(library);
        Ok(())
    }

    /// Loaded library by name
    pub fn library(&self, name: &str) -> Option<Arc<Library>> {
        self.state()
            .libraries
            .read()
            .iter()
            .find(|l| l.name() == name)
            .cloned()
    }

    /// Resolve a type or contract across loaded libraries
    pub fn resolve(&self, name: &QualifiedName) -> Result<TypeRef> {
        self.state().resolve(name)
    }

    /// Resolve a concrete type across loaded libraries
    pub fn resolve_type(&self, name: &QualifiedName) -> Result<Arc<DataType>> {
        self.state().resolve_type(name)
    }

    /// Resolve a script across loaded libraries
    pub fn resolve_script(&self, name: &QualifiedName) -> Result<Arc<Script>> {
        self.state().resolve_script(name)
    }

    /// Create an object without running its constructor
    pub fn instantiate(&self, ty: &Arc<DataType>) -> ObjectRef {
        Object::instantiate(self.memory(), Arc::clone(ty))
    }

    /// Create an object carrying a host-native payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] if `ty` does not accept the value's kind.
    pub fn bind(&self, ty: &Arc<DataType>, value: impl Into<NativeValue>) -> Result<ObjectRef> {
        Object::bind(self.memory(), Arc::clone(ty), value.into())
    }

    /// Create an object and run its constructor with default capabilities
    pub async fn construct(&self, ty: &Arc<DataType>) -> Result<ObjectRef> {
        let scope = ThreadScope::top_level(self.config().default_capabilities.clone());
        self.executor.construct(ty, scope).await
    }

    /// Run `script` with default capabilities
    pub async fn invoke(
        &self,
        script: &Arc<Script>,
        invoker: Context,
        args: Vec<Context>,
    ) -> Result<Context> {
        let mut invocation = Invocation::new(Arc::clone(script));
        invocation.invoker = invoker;
        invocation.args = args;
        self.run(invocation).await
    }

    /// Run one invocation as a top-level thread
    pub async fn run(&self, invocation: Invocation) -> Result<Context> {
        let Invocation {
            script,
            invoker,
            args,
            capabilities,
            context,
            cancel,
        } = invocation;

        let scope = ThreadScope {
            capabilities: capabilities
                .unwrap_or_else(|| self.config().default_capabilities.clone()),
            depth: 1,
            cancel,
            context,
        };

        let _guard = match (&invoker, self.config().exclusive_instances) {
            (Some(object), true) => Some(object.invocation_lock().lock_owned().await),
            _ => None,
        };

        self.executor.run_script(script, invoker, args, scope).await
    }
}
