//! Memory groups for the Db runtime
//!
//! This crate provides scoped, composable storage for typed slots:
//! - MemoryArena: slot-map storage with stable [`GroupId`] handles
//! - GroupHandle: the single owner of a group, releasing it on drop
//! - MemoryGroup: ordered slots keyed by property key
//! - LinkedMemoryGroup: an ordered, non-owning view over several groups
//!
//! Values are generic: anything `Clone + Typed` can be stored, and writes are
//! checked against the slot's declared type.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod group;
pub mod linked;

pub use arena::{GroupHandle, MemoryArena};
pub use group::{GroupId, GroupScope, MemoryGroup, Slot};
pub use linked::{LinkedMemoryGroup, MemoryView};
