//! Memory arena
//!
//! Every physical [`MemoryGroup`] lives in a [`MemoryArena`] and is reached
//! through a stable [`GroupId`]. Exactly one [`GroupHandle`] owns each group;
//! dropping the handle releases the group. Linked views hold only ids, so a
//! view that outlives an owner observes [`Error::ReleasedGroup`] instead of
//! dangling.
//!
//! # Design
//!
//! - DashMap: sharded storage, concurrent access to unrelated groups
//! - Closures passed to [`MemoryArena::read`]/[`MemoryArena::write`] run under
//!   the shard lock and must not touch the arena again
//! - Values displaced by a write are returned to the caller and dropped after
//!   the shard lock is released, since dropping a value may release groups

use dashmap::DashMap;
use dblang_core::{Error, PropertyKey, Result, Typed};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use crate::group::{GroupId, GroupScope, MemoryGroup};

/// Slot-map storage for memory groups
pub struct MemoryArena<V> {
    groups: DashMap<GroupId, MemoryGroup<V>>,
    next_id: AtomicU64,
}

impl<V: Clone + Typed> MemoryArena<V> {
    /// Create an empty arena
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            groups: DashMap::new(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Allocate an empty group owned by the returned handle
    pub fn allocate(self: &Arc<Self>, scope: GroupScope) -> GroupHandle<V> {
        let id = GroupId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.groups.insert(id, MemoryGroup::new(scope));
        debug!(target: "dblang::memory", group = %id, %scope, "Allocated group");
        GroupHandle {
            id,
            arena: Arc::downgrade(self),
        }
    }

    /// Allocate a group with one unset slot per key
    ///
    /// Keys whose name is already present are skipped.
    pub fn allocate_with(
        self: &Arc<Self>,
        scope: GroupScope,
        keys: impl IntoIterator<Item = PropertyKey>,
    ) -> GroupHandle<V> {
        let mut group = MemoryGroup::new(scope);
        for key in keys {
            // Unset slots never fail the type check
            let _ = group.add(key, None);
        }
        let id = GroupId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(target: "dblang::memory", group = %id, %scope, slots = group.len(), "Allocated group");
        self.groups.insert(id, group);
        GroupHandle {
            id,
            arena: Arc::downgrade(self),
        }
    }

    /// Run `f` against a live group
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReleasedGroup`] if the group's owner released it.
    pub fn read<R>(&self, id: GroupId, f: impl FnOnce(&MemoryGroup<V>) -> R) -> Result<R> {
        self.groups
            .get(&id)
            .map(|g| f(&*g))
            .ok_or(Error::ReleasedGroup { group: id.0 })
    }

    /// Run `f` against a live group with mutable access
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReleasedGroup`] if the group's owner released it.
    pub fn write<R>(&self, id: GroupId, f: impl FnOnce(&mut MemoryGroup<V>) -> R) -> Result<R> {
        self.groups
            .get_mut(&id)
            .map(|mut g| f(&mut *g))
            .ok_or(Error::ReleasedGroup { group: id.0 })
    }

    /// Check if a group is still owned
    pub fn is_live(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    /// Number of live groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no groups are live
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn release(&self, id: GroupId) {
        let removed = self.groups.remove(&id);
        if removed.is_some() {
            trace!(target: "dblang::memory", group = %id, "Released group");
        }
        drop(removed);
    }
}

impl<V> fmt::Debug for MemoryArena<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryArena")
            .field("groups", &self.groups.len())
            .finish()
    }
}

/// Owning token for one memory group
///
/// Dropping the handle releases the group. The handle holds the arena weakly,
/// so owners stored inside the arena never keep it alive.
pub struct GroupHandle<V: Clone + Typed> {
    id: GroupId,
    arena: Weak<MemoryArena<V>>,
}

impl<V: Clone + Typed> GroupHandle<V> {
    /// Non-owning id for linking
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Arena holding the group
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReleasedGroup`] if the arena itself was dropped.
    pub fn arena(&self) -> Result<Arc<MemoryArena<V>>> {
        self.arena
            .upgrade()
            .ok_or(Error::ReleasedGroup { group: self.id.0 })
    }
}

impl<V: Clone + Typed> Drop for GroupHandle<V> {
    fn drop(&mut self) {
        if let Some(arena) = self.arena.upgrade() {
            arena.release(self.id);
        }
    }
}

impl<V: Clone + Typed> fmt::Debug for GroupHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GroupHandle").field(&self.id).finish()
    }
}
