//! Physical memory groups
//!
//! A [`MemoryGroup`] is an ordered set of typed slots with exactly one owner.
//! Slots are indexed by name: within one group a name resolves to a single
//! slot, and a lookup by [`PropertyKey`] only succeeds when the stored key is
//! equal (name and declared type).

use dblang_core::{Error, PropertyKey, Result, Typed};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Stable, non-owning handle to a group stored in a
/// [`MemoryArena`](crate::MemoryArena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) u64);

impl GroupId {
    /// Raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Lifecycle that owns a memory group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupScope {
    /// Library statics, live as long as the library
    Static,
    /// Object fields, live as long as the object
    Instance,
    /// Script arguments, live for one invocation
    Input,
    /// Thread locals, live for one invocation
    Local,
}

impl fmt::Display for GroupScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupScope::Static => "static",
            GroupScope::Instance => "instance",
            GroupScope::Input => "input",
            GroupScope::Local => "local",
        };
        write!(f, "{}", s)
    }
}

/// A property key bound to a possibly unset value
#[derive(Debug, Clone)]
pub struct Slot<V> {
    key: PropertyKey,
    value: Option<V>,
}

impl<V> Slot<V> {
    /// Key of the slot
    pub fn key(&self) -> &PropertyKey {
        &self.key
    }

    /// Held value, `None` while unset
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }
}

/// An owned collection of slots keyed by property key
#[derive(Debug, Clone)]
pub struct MemoryGroup<V> {
    scope: GroupScope,
    slots: Vec<Slot<V>>,
    index: FxHashMap<Arc<str>, usize>,
}

impl<V: Clone + Typed> MemoryGroup<V> {
    /// Create an empty group
    pub fn new(scope: GroupScope) -> Self {
        Self {
            scope,
            slots: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Owning lifecycle
    pub fn scope(&self) -> GroupScope {
        self.scope
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the group has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn position(&self, key: &PropertyKey) -> Option<usize> {
        self.index
            .get(key.name())
            .copied()
            .filter(|&i| self.slots[i].key == *key)
    }

    /// Check if the group holds a slot for `key`
    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.position(key).is_some()
    }

    /// Check if any slot is named `name`
    pub fn contains_name(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Key of the slot named `name`
    pub fn find_key(&self, name: &str) -> Option<&PropertyKey> {
        self.index.get(name).map(|&i| &self.slots[i].key)
    }

    /// Slot for `key`
    pub fn slot(&self, key: &PropertyKey) -> Option<&Slot<V>> {
        self.position(key).map(|i| &self.slots[i])
    }

    /// Value held for `key`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if no slot exists for `key`.
    pub fn get(&self, key: &PropertyKey) -> Result<Option<V>> {
        self.slot(key)
            .map(|s| s.value.clone())
            .ok_or_else(|| Error::missing_key(key))
    }

    /// Replace the value held for `key`, returning the previous value
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if no slot exists for `key` and
    /// [`Error::TypeMismatch`] if `value` does not satisfy the declared type.
    pub fn set(&mut self, key: &PropertyKey, value: Option<V>) -> Result<Option<V>> {
        let mut value = value;
        self.replace(key, &mut value)?;
        Ok(value)
    }

    /// Swap `value` into the slot for `key`
    ///
    /// On success `value` holds the previous value; on failure it is left
    /// untouched, so callers holding a lock can drop it after unlocking.
    pub fn replace(&mut self, key: &PropertyKey, value: &mut Option<V>) -> Result<()> {
        let i = self.position(key).ok_or_else(|| Error::missing_key(key))?;
        if let Some(v) = value.as_ref() {
            check_type(key, v)?;
        }
        std::mem::swap(&mut self.slots[i].value, value);
        Ok(())
    }

    /// Introduce a new slot
    ///
    /// Returns `Ok(false)` without mutating when a slot with the same name
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `initial` does not satisfy the
    /// declared type.
    pub fn add(&mut self, key: PropertyKey, initial: Option<V>) -> Result<bool> {
        let mut initial = initial;
        self.try_add(key, &mut initial)
    }

    /// Introduce a new slot, taking `initial` only when the slot is created
    pub fn try_add(&mut self, key: PropertyKey, initial: &mut Option<V>) -> Result<bool> {
        if self.contains_name(key.name()) {
            return Ok(false);
        }
        if let Some(v) = initial.as_ref() {
            check_type(&key, v)?;
        }
        self.index.insert(Arc::from(key.name()), self.slots.len());
        self.slots.push(Slot {
            key,
            value: initial.take(),
        });
        Ok(true)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.slots.iter().map(|s| &s.key)
    }

    /// Slots in insertion order
    pub fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }
}

fn check_type<V: Typed>(key: &PropertyKey, value: &V) -> Result<()> {
    if value.satisfies(key.type_name()) {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            key: key.name().to_string(),
            expected: key.type_name().to_string(),
            actual: value.type_name().to_string(),
        })
    }
}
