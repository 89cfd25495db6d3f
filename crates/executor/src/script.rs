//! Compiled scripts
//!
//! A [`Script`] is a named, typed, ordered sequence of commands. Parameters
//! become slots in a fresh input group per invocation; a declared return type
//! is checked against the final context.

use std::sync::Arc;

use dblang_core::{PropertyKey, QualifiedName};
use dblang_memory::GroupId;

use crate::command::Command;

/// A named, typed, ordered sequence of commands
#[derive(Debug, Clone)]
pub struct Script {
    name: QualifiedName,
    parameters: Vec<PropertyKey>,
    return_type: Option<QualifiedName>,
    commands: Vec<Command>,
    statics: Option<GroupId>,
}

impl Script {
    /// Start building a script
    pub fn builder(name: QualifiedName) -> ScriptBuilder {
        ScriptBuilder {
            script: Script {
                name,
                parameters: Vec::new(),
                return_type: None,
                commands: Vec::new(),
                statics: None,
            },
        }
    }

    /// Qualified name
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Parameters in call order
    pub fn parameters(&self) -> &[PropertyKey] {
        &self.parameters
    }

    /// Declared result type; `None` for scripts producing no value
    pub fn return_type(&self) -> Option<&QualifiedName> {
        self.return_type.as_ref()
    }

    /// Command sequence
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Static group of the owning library
    pub fn statics(&self) -> Option<GroupId> {
        self.statics
    }

    pub(crate) fn with_statics(mut self, statics: GroupId) -> Self {
        self.statics = Some(statics);
        self
    }
}

/// Builder for [`Script`]
#[derive(Debug)]
pub struct ScriptBuilder {
    script: Script,
}

impl ScriptBuilder {
    /// Append a parameter
    pub fn parameter(mut self, key: PropertyKey) -> Self {
        self.script.parameters.push(key);
        self
    }

    /// Declare the result type
    pub fn returns(mut self, ty: QualifiedName) -> Self {
        self.script.return_type = Some(ty);
        self
    }

    /// Append a command
    pub fn command(mut self, command: Command) -> Self {
        self.script.commands.push(command);
        self
    }

    /// Append several commands
    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.script.commands.extend(commands);
        self
    }

    /// Link a static group outside of any library
    pub fn statics(mut self, statics: GroupId) -> Self {
        self.script.statics = Some(statics);
        self
    }

    /// Finish the script, unshared
    pub fn build(self) -> Script {
        self.script
    }

    /// Finish the script, ready to invoke
    pub fn build_shared(self) -> Arc<Script> {
        Arc::new(self.script)
    }
}
