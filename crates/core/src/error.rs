//! Error types for the Db runtime
//!
//! Every layer (type model, memory, execution) reports failures through the
//! single [`Error`] enum defined here. We use `thiserror` for the `Display`
//! and `Error` trait implementations.
//!
//! # Taxonomy
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Definition | `Definition` | Fatal to library load, never retried |
//! | Binding | `Binding` | Runtime failure surfaced to the invoking script |
//! | Memory | `MissingKey`, `TypeMismatch`, `ReleasedGroup`, `NotWritable` | Aborts the current invocation |
//! | Capability | `CapabilityDenied` | Aborts the invocation, sandboxable by hosts |
//! | Execution | `InvokeDepthExceeded`, `ArgumentCount`, `Cancelled` | Aborts the current invocation |
//! | Resolution | `UnknownType`, `UnknownScript`, `InvalidName` | Load or invocation failure |
//! | Configuration | `Config` | Host setup failure |

use std::fmt;
use thiserror::Error;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single offending item found while validating a type or contract.
///
/// Definition errors carry every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionViolation {
    /// A property name appears more than once in the visible property set
    DuplicateKey {
        /// The duplicated property name
        name: String,
    },
    /// A fulfilled contract requires properties missing from the public list
    UnmetContract {
        /// Qualified name of the contract
        contract: String,
        /// Required keys that are absent (or only declared private)
        missing: Vec<String>,
    },
    /// The definition appears in its own parent chain or contract closure
    Cycle {
        /// Qualified name found twice along the traversal
        name: String,
    },
    /// A definition with the same qualified name was already registered
    AlreadyDefined {
        /// The clashing qualified name
        name: String,
    },
}

impl fmt::Display for DefinitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionViolation::DuplicateKey { name } => write!(f, "duplicate property '{}'", name),
            DefinitionViolation::UnmetContract { contract, missing } => write!(
                f,
                "contract {} is missing public properties [{}]",
                contract,
                missing.join(", ")
            ),
            DefinitionViolation::Cycle { name } => write!(f, "cyclic inheritance through {}", name),
            DefinitionViolation::AlreadyDefined { name } => write!(f, "{} is already defined", name),
        }
    }
}

fn join_violations(violations: &[DefinitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runtime errors.
///
/// Hosts match on the variant rather than the message. Only
/// `CapabilityDenied` is sandboxable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // ==================== Definition ====================
    /// Type or contract invariant violation at definition time
    #[error("definition of {name} failed: {}", join_violations(.violations))]
    Definition {
        /// Qualified name of the definition being built
        name: String,
        /// Every violation found
        violations: Vec<DefinitionViolation>,
    },

    // ==================== Binding ====================
    /// Native payload incompatible with a type's binding constraint
    #[error("binding failed on {type_name}: expected {expected}, got {actual}")]
    Binding {
        /// Qualified name of the object's type
        type_name: String,
        /// The constraint (or requested kind)
        expected: String,
        /// The offered (or stored) kind
        actual: String,
    },

    // ==================== Memory ====================
    /// Memory access to an absent key
    #[error("key not found: {key}")]
    MissingKey {
        /// The key or dotted path that failed to resolve
        key: String,
    },

    /// Value assigned to a slot whose declared type it does not satisfy
    #[error("type mismatch on {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The slot being written
        key: String,
        /// Declared type of the slot
        expected: String,
        /// Type of the offered value
        actual: String,
    },

    /// A linked view referenced a group its owner already released
    #[error("memory group {group} was released by its owner")]
    ReleasedGroup {
        /// Raw group handle
        group: u64,
    },

    /// Slot creation attempted through a view with no writable child
    #[error("memory view has no writable group")]
    NotWritable,

    // ==================== Capability ====================
    /// Command denied because the thread lacks required capabilities
    #[error("capability denied for {command}: missing [{}]", .missing.join(", "))]
    CapabilityDenied {
        /// Name of the denied command
        command: String,
        /// Capabilities required but not granted
        missing: Vec<String>,
    },

    // ==================== Execution ====================
    /// Nested invocation exceeded the configured depth bound
    #[error("invoke depth {depth} exceeds limit {limit}")]
    InvokeDepthExceeded {
        /// Depth that was attempted
        depth: usize,
        /// Configured limit
        limit: usize,
    },

    /// Script invoked with the wrong number of arguments
    #[error("script {script} takes {expected} arguments, got {actual}")]
    ArgumentCount {
        /// Qualified name of the script
        script: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Cancellation observed at a command boundary
    #[error("script {script} cancelled after {completed} commands")]
    Cancelled {
        /// Qualified name of the script
        script: String,
        /// Number of commands fully executed before cancellation
        completed: usize,
    },

    // ==================== Resolution ====================
    /// Type or contract name that no loaded library defines
    #[error("unknown type: {name}")]
    UnknownType {
        /// The unresolved name
        name: String,
    },

    /// Script name that no loaded library defines
    #[error("unknown script: {name}")]
    UnknownScript {
        /// The unresolved name
        name: String,
    },

    /// Malformed qualified name
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected input
        name: String,
        /// Why it was rejected
        reason: String,
    },

    // ==================== Configuration ====================
    /// Malformed runtime configuration
    #[error("configuration error: {reason}")]
    Config {
        /// Why the configuration was rejected
        reason: String,
    },
}

impl Error {
    /// Build a definition error from a non-empty violation list
    pub fn definition(name: impl Into<String>, violations: Vec<DefinitionViolation>) -> Self {
        Error::Definition {
            name: name.into(),
            violations,
        }
    }

    /// Build a missing-key error
    pub fn missing_key(key: impl fmt::Display) -> Self {
        Error::MissingKey {
            key: key.to_string(),
        }
    }

    /// Whether this error aborts library loading
    pub fn is_fatal_to_load(&self) -> bool {
        matches!(
            self,
            Error::Definition { .. } | Error::UnknownType { .. } | Error::InvalidName { .. }
        )
    }

    /// Whether a host may catch this error and keep unrelated invocations running
    pub fn is_sandboxable(&self) -> bool {
        matches!(self, Error::CapabilityDenied { .. })
    }

    /// Violations carried by a definition error, empty for other variants
    pub fn violations(&self) -> &[DefinitionViolation] {
        match self {
            Error::Definition { violations, .. } => violations,
            _ => &[],
        }
    }
}
