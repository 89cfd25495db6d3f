//! Execution threads
//!
//! An [`ExecutionThread`] is the runtime context of one script invocation. It
//! owns the invocation's input and local groups and links them, in fixed
//! order, after the library statics, the invoker's instance group and the
//! caller-supplied context group:
//!
//! ```text
//! [statics?, instance?, context?, inputs, locals*]      * = write target
//! ```
//!
//! Both owned groups are released when the thread is dropped, whether the
//! invocation finished or failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dblang_core::{Error, Result};
use dblang_memory::{GroupHandle, GroupId, GroupScope, LinkedMemoryGroup, MemoryView};
use dblang_security::CapabilitySet;

use crate::object::{Memory, ObjectRef};
use crate::script::Script;

/// Cooperative cancellation flag, observed between command steps
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every thread sharing this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-invocation settings inherited by nested invocations
#[derive(Debug, Clone)]
pub struct ThreadScope {
    /// Capabilities held by the thread
    pub capabilities: CapabilitySet,
    /// Nesting depth, 1 for a top-level invocation
    pub depth: usize,
    /// Shared cancellation flag
    pub cancel: CancelToken,
    /// Caller-supplied context group
    pub context: Option<GroupId>,
}

impl ThreadScope {
    /// Top-level scope holding `capabilities`
    pub fn top_level(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            depth: 1,
            cancel: CancelToken::new(),
            context: None,
        }
    }

    /// Scope of an invocation nested in this one
    pub fn child(&self) -> Self {
        Self {
            capabilities: self.capabilities.clone(),
            depth: self.depth + 1,
            cancel: self.cancel.clone(),
            context: None,
        }
    }
}

/// Runtime context executing one script invocation
#[derive(Debug)]
pub struct ExecutionThread {
    script: Arc<Script>,
    invoker: Option<ObjectRef>,
    memory: LinkedMemoryGroup<ObjectRef>,
    scope: ThreadScope,
    _inputs: GroupHandle<ObjectRef>,
    locals: GroupHandle<ObjectRef>,
}

impl ExecutionThread {
    /// Set up memory for an invocation of `script`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentCount`] if `args` does not match the
    /// parameter list and [`Error::TypeMismatch`] if an argument does not
    /// satisfy its parameter type.
    pub fn enter(
        arena: &Arc<Memory>,
        script: Arc<Script>,
        invoker: Option<ObjectRef>,
        args: Vec<Option<ObjectRef>>,
        scope: ThreadScope,
    ) -> Result<Self> {
        if args.len() != script.parameters().len() {
            return Err(Error::ArgumentCount {
                script: script.name().to_string(),
                expected: script.parameters().len(),
                actual: args.len(),
            });
        }

        let inputs = arena.allocate_with(GroupScope::Input, script.parameters().iter().cloned());
        for (key, arg) in script.parameters().iter().zip(args) {
            if arg.is_some() {
                inputs.set(key, arg)?;
            }
        }
        let locals = arena.allocate(GroupScope::Local);

        let links = script
            .statics()
            .into_iter()
            .chain(invoker.as_ref().map(|o| o.instance()))
            .chain(scope.context)
            .chain(Some(inputs.id()));
        let memory = LinkedMemoryGroup::writable(Arc::clone(arena), links, locals.id());

        Ok(Self {
            script,
            invoker,
            memory,
            scope,
            _inputs: inputs,
            locals,
        })
    }

    /// Script being executed
    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    /// Object the script runs against
    pub fn invoker(&self) -> Option<&ObjectRef> {
        self.invoker.as_ref()
    }

    /// Linked view over every group visible to the script
    pub fn memory(&self) -> &LinkedMemoryGroup<ObjectRef> {
        &self.memory
    }

    /// Arena holding the thread's groups
    pub fn arena(&self) -> &Arc<Memory> {
        self.memory.arena()
    }

    /// Settings inherited by nested invocations
    pub fn scope(&self) -> &ThreadScope {
        &self.scope
    }

    /// Capabilities held by the thread
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.scope.capabilities
    }

    /// Nesting depth
    pub fn depth(&self) -> usize {
        self.scope.depth
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.scope.cancel.is_cancelled()
    }

    /// Whether `object` is the invoker, granting access to private fields
    pub fn is_invoker(&self, object: &ObjectRef) -> bool {
        self.invoker.as_ref().map(|i| i == object).unwrap_or(false)
    }

    /// Locals group receiving declarations
    pub fn locals(&self) -> GroupId {
        self.locals.id()
    }
}
