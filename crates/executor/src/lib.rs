//! # Db Executor
//!
//! Objects, scripts and the asynchronous command engine of the Db runtime.
//!
//! This is the crate hosts embed. It provides:
//! - [`Runtime`] - loads libraries, creates objects and runs scripts
//! - [`Library`] - a validated unit of types, contracts, scripts and statics
//! - [`Script`]/[`Command`] - compiled command sequences
//! - [`Object`]/[`ObjectRef`] - live instances with typed fields
//!
//! ## Quick Start
//!
//! ```text
//! use dblang_executor::{Command, Runtime, RuntimeConfig, Script};
//!
//! let runtime = Runtime::new(RuntimeConfig::default());
//! let mut lib = runtime.library_builder("app");
//! let main = lib.script(
//!     Script::builder(QualifiedName::new("App.main")?)
//!         .command(Command::declare("x", QualifiedName::new("App.Point")?))
//!         .command(Command::instantiate(point))
//!         .command(Command::assign("x"))
//!         .build(),
//! )?;
//! runtime.load_library(lib.build()?)?;
//! let result = runtime.invoke(&main, None, vec![]).await?;
//! ```
//!
//! ## Commands
//!
//! | Command | Effect on context |
//! |---------|-------------------|
//! | **Declare** | unchanged; adds a typed local |
//! | **Assign** | unchanged; writes context into a slot or field |
//! | **PathLookup** | value at the path |
//! | **SelfReference** | the invoker |
//! | **Native** | new object carrying a host value |
//! | **Instantiate** | new, constructed object |
//! | **Invoke** | the invoked script's result |
//! | **Clear** | none |

#![warn(missing_docs)]

mod command;
mod config;
mod executor;
mod library;
mod object;
mod runtime;
mod script;
mod thread;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything hosts need is re-exported here
// =============================================================================

pub use command::{Command, CommandKind, Context, ScriptRef};
pub use config::{RuntimeConfig, CONFIG_FILE_NAME};
pub use executor::Executor;
pub use library::{Library, LibraryBuilder};
pub use object::{Memory, Object, ObjectId, ObjectRef};
pub use runtime::{Invocation, Runtime};
pub use script::{Script, ScriptBuilder};
pub use thread::{CancelToken, ExecutionThread, ThreadScope};

// Re-export core types so hosts don't need dblang-core directly
pub use dblang_core::{
    DataContract, DataType, Error, NativeKind, NativeValue, PropertyKey, QualifiedName, Result,
    TypeRef, Typed,
};

// Re-export security types so hosts don't need dblang-security directly
pub use dblang_security::{Capability, CapabilitySet, RuntimeOptions};
