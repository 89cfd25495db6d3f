//! Linked memory groups
//!
//! A [`LinkedMemoryGroup`] composes an ordered list of groups into one
//! logical view without copying. Scope entry and exit re-link a new view in
//! O(1) instead of copying slots.
//!
//! ## Resolution rules
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | `contains_key` / `keys` | Union over every linked group |
//! | `get` / `set` | First group in link order holding the key |
//! | `add` | `Ok(false)` if the name exists anywhere, else the write target |
//!
//! Link order is the only tie-breaker: disjointness of the linked groups is
//! expected, not enforced.

use dblang_core::{Error, PropertyKey, Result, Typed};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

use crate::arena::{GroupHandle, MemoryArena};
use crate::group::GroupId;

/// Read and write access to a logical set of slots
pub trait MemoryView<V> {
    /// Value held for `key`, `None` while the slot is unset
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if no linked group holds `key`.
    fn get(&self, key: &PropertyKey) -> Result<Option<V>>;

    /// Replace the value held for `key` in whichever group owns it
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if no linked group holds `key`, or
    /// [`Error::TypeMismatch`] if `value` does not satisfy the slot type.
    fn set(&self, key: &PropertyKey, value: Option<V>) -> Result<()>;

    /// Check if any linked group holds `key`
    fn contains_key(&self, key: &PropertyKey) -> Result<bool>;

    /// Union of every linked group's keys, first occurrence wins
    fn keys(&self) -> Result<Vec<PropertyKey>>;

    /// First key named `name` in link order
    fn find_key(&self, name: &str) -> Result<Option<PropertyKey>>;

    /// Introduce a new slot in the write target
    ///
    /// Returns `Ok(false)` without mutating when the name already exists
    /// anywhere in the view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotWritable`] if the view has no write target.
    fn add(&self, key: PropertyKey, initial: Option<V>) -> Result<bool>;
}

/// Ordered, non-owning composition of memory groups
#[derive(Debug)]
pub struct LinkedMemoryGroup<V> {
    arena: Arc<MemoryArena<V>>,
    links: SmallVec<[GroupId; 6]>,
    write_target: Option<GroupId>,
}

impl<V> Clone for LinkedMemoryGroup<V> {
    fn clone(&self) -> Self {
        Self {
            arena: Arc::clone(&self.arena),
            links: self.links.clone(),
            write_target: self.write_target,
        }
    }
}

impl<V: Clone + Typed> LinkedMemoryGroup<V> {
    /// Read-only view over `links`
    pub fn new(arena: Arc<MemoryArena<V>>, links: impl IntoIterator<Item = GroupId>) -> Self {
        Self {
            arena,
            links: links.into_iter().collect(),
            write_target: None,
        }
    }

    /// Writable view over `links` with `target` appended last
    pub fn writable(
        arena: Arc<MemoryArena<V>>,
        links: impl IntoIterator<Item = GroupId>,
        target: GroupId,
    ) -> Self {
        let mut links: SmallVec<[GroupId; 6]> = links.into_iter().collect();
        links.push(target);
        Self {
            arena,
            links,
            write_target: Some(target),
        }
    }

    /// New view with `group` linked just before the write target
    pub fn with_link(&self, group: GroupId) -> Self {
        let mut linked = self.clone();
        let at = match self.write_target {
            Some(_) => linked.links.len() - 1,
            None => linked.links.len(),
        };
        linked.links.insert(at, group);
        linked
    }

    /// Linked groups in lookup order
    pub fn links(&self) -> &[GroupId] {
        &self.links
    }

    /// Group receiving new slots
    pub fn write_target(&self) -> Option<GroupId> {
        self.write_target
    }

    /// Arena holding the linked groups
    pub fn arena(&self) -> &Arc<MemoryArena<V>> {
        &self.arena
    }

    fn owner_of(&self, key: &PropertyKey) -> Result<Option<GroupId>> {
        for &id in &self.links {
            if self.arena.read(id, |g| g.contains_key(key))? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn has_name(&self, name: &str) -> Result<bool> {
        for &id in &self.links {
            if self.arena.read(id, |g| g.contains_name(name))? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<V: Clone + Typed> MemoryView<V> for LinkedMemoryGroup<V> {
    fn get(&self, key: &PropertyKey) -> Result<Option<V>> {
        match self.owner_of(key)? {
            Some(id) => self.arena.read(id, |g| g.get(key))?,
            None => Err(Error::missing_key(key)),
        }
    }

    fn set(&self, key: &PropertyKey, value: Option<V>) -> Result<()> {
        let id = self.owner_of(key)?.ok_or_else(|| Error::missing_key(key))?;
        let mut value = value;
        let result = self.arena.write(id, |g| g.replace(key, &mut value));
        drop(value);
        result?
    }

    fn contains_key(&self, key: &PropertyKey) -> Result<bool> {
        Ok(self.owner_of(key)?.is_some())
    }

    fn keys(&self) -> Result<Vec<PropertyKey>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for &id in &self.links {
            let keys: Vec<PropertyKey> = self.arena.read(id, |g| g.keys().cloned().collect())?;
            for key in keys {
                if seen.insert(key.clone()) {
                    out.push(key);
                }
            }
        }
        Ok(out)
    }

    fn find_key(&self, name: &str) -> Result<Option<PropertyKey>> {
        for &id in &self.links {
            if let Some(key) = self.arena.read(id, |g| g.find_key(name).cloned())? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    fn add(&self, key: PropertyKey, initial: Option<V>) -> Result<bool> {
        let target = self.write_target.ok_or(Error::NotWritable)?;
        if self.has_name(key.name())? {
            trace!(target: "dblang::memory", key = %key, "Slot already exists");
            return Ok(false);
        }
        trace!(target: "dblang::memory", key = %key, group = %target, "Adding slot");
        let mut initial = initial;
        let result = self.arena.write(target, |g| g.try_add(key, &mut initial));
        drop(initial);
        result?
    }
}

/// A single owned group viewed on its own, writable
impl<V: Clone + Typed> MemoryView<V> for GroupHandle<V> {
    fn get(&self, key: &PropertyKey) -> Result<Option<V>> {
        self.arena()?.read(self.id(), |g| g.get(key))?
    }

    fn set(&self, key: &PropertyKey, value: Option<V>) -> Result<()> {
        let mut value = value;
        let result = self.arena()?.write(self.id(), |g| g.replace(key, &mut value));
        drop(value);
        result?
    }

    fn contains_key(&self, key: &PropertyKey) -> Result<bool> {
        self.arena()?.read(self.id(), |g| g.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<PropertyKey>> {
        self.arena()?
            .read(self.id(), |g| g.keys().cloned().collect())
    }

    fn find_key(&self, name: &str) -> Result<Option<PropertyKey>> {
        self.arena()?
            .read(self.id(), |g| g.find_key(name).cloned())
    }

    fn add(&self, key: PropertyKey, initial: Option<V>) -> Result<bool> {
        let mut initial = initial;
        let result = self.arena()?.write(self.id(), |g| g.try_add(key, &mut initial));
        drop(initial);
        result?
    }
}
