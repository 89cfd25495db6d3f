//! The Executor - runs command sequences inside execution threads.
//!
//! Each command is one asynchronous step: `(command, thread, context)` maps to
//! a new context fed to the next command. Steps run strictly in order; the
//! executor checks cancellation before each step and capabilities immediately
//! before dispatching each command to its handler.

use async_recursion::async_recursion;
use std::sync::Arc;
use tracing::{debug, info, warn};

use dblang_core::{DataType, Error, Result, Typed};

use crate::command::{Command, CommandKind, Context, ScriptRef};
use crate::handlers;
use crate::object::{Object, ObjectRef};
use crate::runtime::RuntimeState;
use crate::script::Script;
use crate::thread::{ExecutionThread, ThreadScope};

/// The command executor.
///
/// The Executor is **stateless**: it holds a reference to the runtime state
/// (memory, configuration, loaded libraries) but keeps no state of its own.
/// All invocation state lives in the [`ExecutionThread`].
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and cheap to clone; concurrent invocations each
/// get their own thread.
#[derive(Debug, Clone)]
pub struct Executor {
    state: Arc<RuntimeState>,
}

impl Executor {
    pub(crate) fn new(state: Arc<RuntimeState>) -> Self {
        Self { state }
    }

    pub(crate) fn state(&self) -> &Arc<RuntimeState> {
        &self.state
    }

    /// Execute a single command against `thread` with prior context `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDenied`] without running the command if the
    /// thread lacks any required capability, or the handler's error.
    pub async fn execute(
        &self,
        command: &Command,
        thread: &ExecutionThread,
        ctx: Context,
    ) -> Result<Context> {
        if !thread.capabilities().is_superset(command.requires()) {
            let missing: Vec<String> = thread
                .capabilities()
                .missing_from(command.requires())
                .iter()
                .map(ToString::to_string)
                .collect();
            warn!(
                target: "dblang::exec",
                script = %thread.script().name(),
                command = command.name(),
                missing = ?missing,
                "Capability denied"
            );
            return Err(Error::CapabilityDenied {
                command: command.name().to_string(),
                missing,
            });
        }

        debug!(
            target: "dblang::exec",
            script = %thread.script().name(),
            command = command.name(),
            depth = thread.depth(),
            "Executing command"
        );

        match command.kind() {
            // Memory
            CommandKind::Declare { name, var_type } => {
                handlers::memory::declare(thread, name, var_type, ctx)
            }
            CommandKind::Assign { target } => handlers::memory::assign(thread, target, ctx),
            CommandKind::PathLookup { path } => handlers::memory::path_lookup(thread, path, ctx),

            // Object
            CommandKind::SelfReference => handlers::object::self_reference(thread),
            CommandKind::Native { ty, value } => handlers::object::native(thread, ty, value),
            CommandKind::Instantiate { ty } => {
                handlers::object::instantiate(self, thread, ty).await
            }

            // Control
            CommandKind::Invoke { inputs, script } => {
                handlers::invoke::invoke(self, thread, inputs, script, ctx).await
            }
            CommandKind::Clear => Ok(None),
        }
    }

    /// Run `commands` in order, chaining each result into the next command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if cancellation is observed before a
    /// step; already-applied effects are kept. Any command error aborts the
    /// remaining sequence.
    #[async_recursion]
    pub async fn run_sequence(
        &self,
        commands: &[Command],
        thread: &ExecutionThread,
        start: Context,
    ) -> Result<Context> {
        let mut ctx = start;
        for (completed, command) in commands.iter().enumerate() {
            if thread.is_cancelled() {
                warn!(
                    target: "dblang::exec",
                    script = %thread.script().name(),
                    completed,
                    "Invocation cancelled"
                );
                return Err(Error::Cancelled {
                    script: thread.script().name().to_string(),
                    completed,
                });
            }
            ctx = self.execute(command, thread, ctx).await?;
        }
        Ok(ctx)
    }

    /// Run `script` in a fresh execution thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvokeDepthExceeded`] past the configured depth,
    /// [`Error::ArgumentCount`] or [`Error::TypeMismatch`] for bad arguments,
    /// and [`Error::TypeMismatch`] if the result does not satisfy the
    /// declared return type.
    pub async fn run_script(
        &self,
        script: Arc<Script>,
        invoker: Context,
        args: Vec<Context>,
        scope: ThreadScope,
    ) -> Result<Context> {
        let limit = self.state.config().max_invoke_depth;
        if scope.depth > limit {
            return Err(Error::InvokeDepthExceeded {
                depth: scope.depth,
                limit,
            });
        }

        let depth = scope.depth;
        let thread = ExecutionThread::enter(
            self.state.memory(),
            Arc::clone(&script),
            invoker,
            args,
            scope,
        )?;
        if depth == 1 {
            info!(target: "dblang::exec", script = %script.name(), "Thread started");
        }

        let result = self.run_sequence(script.commands(), &thread, None).await;
        drop(thread);

        if depth == 1 {
            match &result {
                Ok(_) => info!(target: "dblang::exec", script = %script.name(), "Thread finished"),
                Err(e) => info!(target: "dblang::exec", script = %script.name(), error = %e, "Thread failed"),
            }
        }

        let result = result?;
        match script.return_type() {
            None => Ok(None),
            Some(expected) => match result {
                Some(value) if !value.satisfies(expected) => Err(Error::TypeMismatch {
                    key: format!("{} result", script.name()),
                    expected: expected.to_string(),
                    actual: value.type_name().to_string(),
                }),
                other => Ok(other),
            },
        }
    }

    /// Create an object of `ty` and run its constructor with the object as
    /// invoker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScript`] if the constructor cannot be resolved,
    /// or the constructor's error.
    pub async fn construct(&self, ty: &Arc<DataType>, scope: ThreadScope) -> Result<ObjectRef> {
        let object = Object::instantiate(self.state.memory(), Arc::clone(ty));
        if let Some(constructor) = ty.constructor() {
            let script = self.resolve_script(&ScriptRef::Named(constructor.clone()))?;
            self.run_script(script, Some(object.clone()), Vec::new(), scope)
                .await?;
        }
        Ok(object)
    }

    /// Resolve an `Invoke` target.
    pub fn resolve_script(&self, script: &ScriptRef) -> Result<Arc<Script>> {
        match script {
            ScriptRef::Direct(script) => Ok(Arc::clone(script)),
            ScriptRef::Named(name) => self.state.resolve_script(name),
        }
    }
}
