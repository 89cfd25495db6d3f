//! Core types for the Db runtime
//!
//! This crate defines the foundational types used throughout the system:
//! - QualifiedName: globally unique dotted identifier for types and contracts
//! - PropertyKey: declared, typed, named slot identity
//! - DataType / DataContract / TypeRef: the compatibility graph
//! - TypeRegistry: name-keyed definitions for a library
//! - NativeKind / NativeConstraint / NativeValue: host-native interop
//! - Error: the error taxonomy shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod error;
pub mod key;
pub mod name;
pub mod registry;
pub mod types;

pub use binding::{FromNative, HostKind, HostValue, NativeConstraint, NativeKind, NativeValue};
pub use error::{DefinitionViolation, Error, Result};
pub use key::PropertyKey;
pub use name::{NameError, QualifiedName, MAX_QUALIFIED_NAME_LENGTH};
pub use registry::TypeRegistry;
pub use types::{DataContract, DataType, TypeBuilder, TypeRef, Typed};
