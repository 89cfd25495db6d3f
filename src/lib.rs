//! Db - an embeddable runtime for typed objects, contracts and
//! capability-gated scripts
//!
//! Hosts define types and contracts, bundle them with scripts into
//! libraries, and run those scripts against live objects. Every command a
//! script runs is checked against the capabilities granted to its thread.
//!
//! # Quick Start
//!
//! ```ignore
//! use dblang::{Command, DataType, PropertyKey, QualifiedName, Runtime, RuntimeConfig, Script};
//!
//! let runtime = Runtime::new(RuntimeConfig::default());
//! let point = DataType::builder(QualifiedName::new("App.Point")?)
//!     .public(PropertyKey::new("x", QualifiedName::new("App.Int")?))
//!     .build()?;
//!
//! let mut lib = runtime.library_builder("app");
//! lib.define(point.clone())?;
//! runtime.load_library(lib.build()?)?;
//!
//! let object = runtime.construct(&point).await?;
//! ```
//!
//! # Architecture
//!
//! | Crate | Concern |
//! |-------|---------|
//! | `dblang-core` | names, property keys, types, contracts, native binding, errors |
//! | `dblang-memory` | memory arena, groups and linked views |
//! | `dblang-security` | capabilities and runtime options |
//! | `dblang-executor` | objects, scripts, commands and the runtime |
//!
//! Everything a host needs is re-exported here from `dblang-executor`.

pub use dblang_executor::*;

/// Memory layer, for hosts that drive linked views directly
pub mod memory {
    pub use dblang_memory::{
        GroupHandle, GroupId, GroupScope, LinkedMemoryGroup, MemoryArena, MemoryGroup, MemoryView,
    };
}

/// Type model details not needed for everyday embedding
pub mod types {
    pub use dblang_core::{
        DefinitionViolation, FromNative, HostKind, HostValue, NativeConstraint, TypeBuilder,
        TypeRegistry, MAX_QUALIFIED_NAME_LENGTH,
    };
}
