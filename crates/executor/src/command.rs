//! Command set of the execution engine.
//!
//! Commands are the "instruction set" of a compiled script. Each command is
//! one execution step: it consumes the thread state, the invoker and the
//! prior context, and produces a new context for the next step.
//!
//! Commands are:
//! - **Self-contained**: all parameters needed for execution are in the variant
//! - **Capability-tagged**: each carries the [`CapabilitySet`] it requires
//! - **Pure data**: no closures or executable code
//!
//! # Command Categories
//!
//! | Category | Commands | Context effect |
//! |----------|----------|----------------|
//! | Memory | `Declare`, `Assign`, `PathLookup` | Declare/Assign pass through, PathLookup replaces |
//! | Object | `SelfReference`, `Native`, `Instantiate` | Replace with an object |
//! | Control | `Invoke`, `Clear` | Replace with the script result / empty |

use std::fmt;
use std::sync::Arc;

use dblang_core::{DataType, NativeValue, QualifiedName};
use dblang_security::{Capability, CapabilitySet};

use crate::object::ObjectRef;
use crate::script::Script;

/// Result of one command step, fed to the next as its prior context
pub type Context = Option<ObjectRef>;

/// Script targeted by an `Invoke`
#[derive(Debug, Clone)]
pub enum ScriptRef {
    /// Already-resolved script
    Direct(Arc<Script>),
    /// Script resolved through the loaded libraries at execution time
    Named(QualifiedName),
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptRef::Direct(script) => write!(f, "{}", script.name()),
            ScriptRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// What a command does
#[derive(Debug, Clone)]
pub enum CommandKind {
    // ==================== Memory ====================
    /// Add a typed local slot; a no-op if the name already exists.
    /// Context: unchanged
    Declare {
        /// Slot name
        name: String,
        /// Declared type of the slot
        var_type: QualifiedName,
    },

    /// Write the current context into the slot at `target`.
    /// The first segment resolves through thread memory, later segments
    /// are fields. Context: unchanged
    Assign {
        /// Dotted path split into segments
        target: Vec<String>,
    },

    /// Resolve `path` against the current context, or against thread
    /// memory when the context is empty. Context: the referenced value
    PathLookup {
        /// Dotted path split into segments
        path: Vec<String>,
    },

    // ==================== Object ====================
    /// Context: the invoker
    SelfReference,

    /// Bind a literal host value into a fresh object of `ty`.
    /// Context: the new object
    Native {
        /// Type of the new object
        ty: Arc<DataType>,
        /// Payload
        value: NativeValue,
    },

    /// Create an object of `ty` and run its constructor.
    /// Context: the new object
    Instantiate {
        /// Type of the new object
        ty: Arc<DataType>,
    },

    // ==================== Control ====================
    /// Evaluate each input sequence from an empty context, then run `script`
    /// with the results as arguments. The prior context, when set, becomes
    /// the nested invoker. Context: the script result
    Invoke {
        /// One command sequence per argument
        inputs: Vec<Vec<Command>>,
        /// Script to run
        script: ScriptRef,
    },

    /// Context: empty
    Clear,
}

/// One executable step of a script
#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    requires: CapabilitySet,
}

impl Command {
    /// Command requiring no capabilities
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            requires: CapabilitySet::new(),
        }
    }

    /// `Declare name: var_type`
    pub fn declare(name: impl Into<String>, var_type: QualifiedName) -> Self {
        Self::new(CommandKind::Declare {
            name: name.into(),
            var_type,
        })
    }

    /// `Assign` to a dotted target
    pub fn assign(target: &str) -> Self {
        Self::new(CommandKind::Assign {
            target: split_path(target),
        })
    }

    /// `PathLookup` of a dotted path
    pub fn lookup(path: &str) -> Self {
        Self::new(CommandKind::PathLookup {
            path: split_path(path),
        })
    }

    /// `SelfReference`
    pub fn self_reference() -> Self {
        Self::new(CommandKind::SelfReference)
    }

    /// `Native` literal
    pub fn native(ty: Arc<DataType>, value: impl Into<NativeValue>) -> Self {
        Self::new(CommandKind::Native {
            ty,
            value: value.into(),
        })
    }

    /// `Instantiate`
    pub fn instantiate(ty: Arc<DataType>) -> Self {
        Self::new(CommandKind::Instantiate { ty })
    }

    /// `Invoke` an already-resolved script
    pub fn invoke(script: Arc<Script>, inputs: Vec<Vec<Command>>) -> Self {
        Self::new(CommandKind::Invoke {
            inputs,
            script: ScriptRef::Direct(script),
        })
    }

    /// `Invoke` a script by name
    pub fn invoke_named(script: QualifiedName, inputs: Vec<Vec<Command>>) -> Self {
        Self::new(CommandKind::Invoke {
            inputs,
            script: ScriptRef::Named(script),
        })
    }

    /// `Clear`
    pub fn clear() -> Self {
        Self::new(CommandKind::Clear)
    }

    /// Add a required capability
    pub fn requiring(mut self, capability: impl Into<Capability>) -> Self {
        self.requires.insert(capability);
        self
    }

    /// What the command does
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Capabilities the thread must hold to run the command
    pub fn requires(&self) -> &CapabilitySet {
        &self.requires
    }

    /// Command name for logs and errors
    pub fn name(&self) -> &'static str {
        match &self.kind {
            CommandKind::Declare { .. } => "Declare",
            CommandKind::Assign { .. } => "Assign",
            CommandKind::PathLookup { .. } => "PathLookup",
            CommandKind::SelfReference => "SelfReference",
            CommandKind::Native { .. } => "Native",
            CommandKind::Instantiate { .. } => "Instantiate",
            CommandKind::Invoke { .. } => "Invoke",
            CommandKind::Clear => "Clear",
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}
