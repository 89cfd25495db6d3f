//! Native binding kinds and payloads
//!
//! Host-native values (numbers, strings, opaque host objects) participate in
//! the type system by being bound as the payload of an object. A type may
//! declare a [`NativeConstraint`]; payloads offered to objects of that type
//! must have a kind the constraint accepts.
//!
//! # Assignability
//!
//! | Constraint | Accepts |
//! |------------|---------|
//! | `Any` | every kind |
//! | `Number` | `Number`, `Int`, `Float` |
//! | anything else | exactly itself |

use once_cell::sync::OnceCell;
use smallvec::{smallvec, SmallVec};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a host type used as an opaque payload
#[derive(Clone, Copy)]
pub struct HostKind {
    name: &'static str,
    id: TypeId,
}

impl HostKind {
    /// Kind describing host values of type `T`
    pub fn of<T: Any>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Rust type name, for diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for HostKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HostKind {}

impl Hash for HostKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Host({})", self.name)
    }
}

/// Kind of a native payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// Accepts any payload; never the kind of a concrete value
    Any,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Either numeric kind; never the kind of a concrete value
    Number,
    /// UTF-8 string
    Str,
    /// Opaque host object
    Host(HostKind),
}

impl NativeKind {
    /// Kind for opaque host values of type `T`
    pub fn host<T: Any>() -> Self {
        NativeKind::Host(HostKind::of::<T>())
    }

    /// Structural assignability: can a value of `candidate` be stored where
    /// `self` is required?
    pub fn accepts(self, candidate: NativeKind) -> bool {
        match self {
            NativeKind::Any => true,
            NativeKind::Number => matches!(
                candidate,
                NativeKind::Number | NativeKind::Int | NativeKind::Float
            ),
            other => other == candidate,
        }
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeKind::Any => write!(f, "any"),
            NativeKind::Bool => write!(f, "bool"),
            NativeKind::Int => write!(f, "int"),
            NativeKind::Float => write!(f, "float"),
            NativeKind::Number => write!(f, "number"),
            NativeKind::Str => write!(f, "string"),
            NativeKind::Host(kind) => write!(f, "host<{}>", kind.name),
        }
    }
}

/// Derived assignability data for a constraint
#[derive(Debug, Clone)]
struct AcceptSet {
    any: bool,
    kinds: SmallVec<[NativeKind; 4]>,
}

/// A type's native binding constraint.
///
/// The set of accepted kinds is derived on first use and memoised, so the
/// per-bind check is a short scan instead of a re-derivation.
#[derive(Debug)]
pub struct NativeConstraint {
    kind: NativeKind,
    accepted: OnceCell<AcceptSet>,
}

impl NativeConstraint {
    /// Constraint requiring payloads assignable to `kind`
    pub fn new(kind: NativeKind) -> Self {
        Self {
            kind,
            accepted: OnceCell::new(),
        }
    }

    /// The declared constraint kind
    pub fn kind(&self) -> NativeKind {
        self.kind
    }

    fn accept_set(&self) -> &AcceptSet {
        self.accepted.get_or_init(|| match self.kind {
            NativeKind::Any => AcceptSet {
                any: true,
                kinds: SmallVec::new(),
            },
            NativeKind::Number => AcceptSet {
                any: false,
                kinds: smallvec![NativeKind::Number, NativeKind::Int, NativeKind::Float],
            },
            other => AcceptSet {
                any: false,
                kinds: smallvec![other],
            },
        })
    }

    /// Whether a payload of `candidate` kind may be bound
    pub fn is_compatible(&self, candidate: NativeKind) -> bool {
        let set = self.accept_set();
        set.any || set.kinds.contains(&candidate)
    }
}

impl Clone for NativeConstraint {
    fn clone(&self) -> Self {
        NativeConstraint::new(self.kind)
    }
}

/// An opaque host payload
#[derive(Clone)]
pub struct HostValue {
    kind: HostKind,
    value: Arc<dyn Any + Send + Sync>,
}

impl HostValue {
    /// Wrap a host value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            kind: HostKind::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// Kind of the wrapped value
    pub fn kind(&self) -> HostKind {
        self.kind
    }

    /// Typed access to the wrapped value
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostValue({})", self.kind.name)
    }
}

/// A host-native value bound to an object
#[derive(Debug, Clone)]
pub enum NativeValue {
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Opaque host object
    Host(HostValue),
}

impl NativeValue {
    /// Wrap an opaque host object
    pub fn host<T: Any + Send + Sync>(value: T) -> Self {
        NativeValue::Host(HostValue::new(value))
    }

    /// Concrete kind of this value
    pub fn kind(&self) -> NativeKind {
        match self {
            NativeValue::Bool(_) => NativeKind::Bool,
            NativeValue::Int(_) => NativeKind::Int,
            NativeValue::Float(_) => NativeKind::Float,
            NativeValue::Str(_) => NativeKind::Str,
            NativeValue::Host(h) => NativeKind::Host(h.kind),
        }
    }

    /// Typed access to a host payload
    pub fn downcast_host<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            NativeValue::Host(h) => h.downcast::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
            (NativeValue::Int(a), NativeValue::Int(b)) => a == b,
            (NativeValue::Float(a), NativeValue::Float(b)) => a == b,
            (NativeValue::Str(a), NativeValue::Str(b)) => a == b,
            (NativeValue::Host(a), NativeValue::Host(b)) => Arc::ptr_eq(&a.value, &b.value),
            _ => false,
        }
    }
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        NativeValue::Bool(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        NativeValue::Int(v)
    }
}

impl From<i32> for NativeValue {
    fn from(v: i32) -> Self {
        NativeValue::Int(v as i64)
    }
}

impl From<f64> for NativeValue {
    fn from(v: f64) -> Self {
        NativeValue::Float(v)
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        NativeValue::Str(v)
    }
}

impl From<&str> for NativeValue {
    fn from(v: &str) -> Self {
        NativeValue::Str(v.to_string())
    }
}

/// Extraction of a typed Rust value from a payload
pub trait FromNative: Sized {
    /// Kind this type is read from
    fn native_kind() -> NativeKind;

    /// Extract the value, `None` on kind mismatch
    fn from_native(value: &NativeValue) -> Option<Self>;
}

impl FromNative for bool {
    fn native_kind() -> NativeKind {
        NativeKind::Bool
    }

    fn from_native(value: &NativeValue) -> Option<Self> {
        match value {
            NativeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromNative for i64 {
    fn native_kind() -> NativeKind {
        NativeKind::Int
    }

    fn from_native(value: &NativeValue) -> Option<Self> {
        match value {
            NativeValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromNative for f64 {
    fn native_kind() -> NativeKind {
        NativeKind::Float
    }

    fn from_native(value: &NativeValue) -> Option<Self> {
        match value {
            NativeValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromNative for String {
    fn native_kind() -> NativeKind {
        NativeKind::Str
    }

    fn from_native(value: &NativeValue) -> Option<Self> {
        match value {
            NativeValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}
