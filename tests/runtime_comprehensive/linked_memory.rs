//! Linked memory views over arena groups.

use std::sync::Arc;

use crate::common::*;
use dblang::memory::{GroupScope, LinkedMemoryGroup, MemoryView};
use dblang::{Error, ObjectRef};

#[test]
fn test_union_of_keys_first_link_wins() {
    let rt = runtime();
    let memory = rt.memory();
    let first = memory.allocate(GroupScope::Local);
    let second = memory.allocate(GroupScope::Local);

    let one = rt.bind(&int_type(), 1i64).unwrap();
    let two = rt.bind(&int_type(), 2i64).unwrap();
    first.add(key("a", "Core.Int"), Some(one)).unwrap();
    second.add(key("b", "Core.Int"), Some(two.clone())).unwrap();
    second.add(key("a", "Core.Int"), Some(two)).unwrap();

    let view: LinkedMemoryGroup<ObjectRef> =
        LinkedMemoryGroup::new(Arc::clone(memory), [first.id(), second.id()]);
    assert!(view.contains_key(&key("a", "Core.Int")).unwrap());
    assert!(view.contains_key(&key("b", "Core.Int")).unwrap());
    assert_eq!(int_of(&view.get(&key("a", "Core.Int")).unwrap()), 1);

    let err = view.get(&key("c", "Core.Int")).unwrap_err();
    assert!(matches!(err, Error::MissingKey { .. }));
}

#[test]
fn test_add_is_noop_when_name_visible_anywhere() {
    let rt = runtime();
    let memory = rt.memory();
    let shared = memory.allocate(GroupScope::Static);
    let locals = memory.allocate(GroupScope::Local);
    shared.add(key("x", "Core.Int"), None).unwrap();

    let view = LinkedMemoryGroup::writable(Arc::clone(memory), [shared.id()], locals.id());
    assert!(!view.add(key("x", "Core.Int"), None).unwrap());
    assert!(locals.keys().unwrap().is_empty());

    assert!(view.add(key("y", "Core.Int"), None).unwrap());
    assert!(view.contains_key(&key("y", "Core.Int")).unwrap());
    assert_eq!(locals.keys().unwrap(), vec![key("y", "Core.Int")]);
}

#[test]
fn test_read_only_view_rejects_add() {
    let rt = runtime();
    let group = rt.memory().allocate(GroupScope::Local);
    let view: LinkedMemoryGroup<ObjectRef> =
        LinkedMemoryGroup::new(Arc::clone(rt.memory()), [group.id()]);
    assert_eq!(view.add(key("z", "Core.Int"), None).unwrap_err(), Error::NotWritable);
}

#[test]
fn test_released_group_reported() {
    let rt = runtime();
    let group = rt.memory().allocate(GroupScope::Local);
    let view: LinkedMemoryGroup<ObjectRef> =
        LinkedMemoryGroup::new(Arc::clone(rt.memory()), [group.id()]);
    let id = group.id();
    drop(group);

    assert_eq!(
        view.get(&key("a", "Core.Int")).unwrap_err(),
        Error::ReleasedGroup { group: id.as_u64() }
    );
}
