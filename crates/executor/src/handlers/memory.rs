//! Memory command handlers.
//!
//! This module implements handlers for the commands that touch slots:
//! - Declare: add a typed local slot (no-op when the name exists)
//! - Assign: write the context into a slot or field
//! - PathLookup: read a slot or field chain

use tracing::debug;

use dblang_core::{Error, PropertyKey, QualifiedName, Result};
use dblang_memory::MemoryView;

use crate::command::Context;
use crate::object::ObjectRef;
use crate::thread::ExecutionThread;

/// Handle Declare command.
pub fn declare(
    thread: &ExecutionThread,
    name: &str,
    var_type: &QualifiedName,
    ctx: Context,
) -> Result<Context> {
    let key = PropertyKey::new(name, var_type.clone());
    if !thread.memory().add(key, None)? {
        debug!(target: "dblang::exec", name, "Already declared");
    }
    Ok(ctx)
}

/// Handle Assign command.
pub fn assign(thread: &ExecutionThread, target: &[String], ctx: Context) -> Result<Context> {
    let (field, owner_path) = target
        .split_last()
        .ok_or_else(|| Error::missing_key(""))?;

    if owner_path.is_empty() {
        let key = resolve_name(thread, field)?;
        thread.memory().set(&key, ctx.clone())?;
    } else {
        let owner = path_lookup(thread, owner_path, None)?
            .ok_or_else(|| Error::missing_key(target.join(".")))?;
        owner.write_member(
            thread.arena(),
            field,
            thread.is_invoker(&owner),
            ctx.clone(),
        )?;
    }
    Ok(ctx)
}

/// Handle PathLookup command.
///
/// With an empty context the first segment names a slot in thread memory;
/// otherwise every segment is a field of the previous value. Private fields
/// are reachable only on the invoker.
pub fn path_lookup(thread: &ExecutionThread, path: &[String], ctx: Context) -> Result<Context> {
    let (mut current, fields): (Context, &[String]) = match ctx {
        Some(object) => (Some(object), path),
        None => {
            let (first, rest) = path
                .split_first()
                .ok_or_else(|| Error::missing_key(""))?;
            let key = resolve_name(thread, first)?;
            (thread.memory().get(&key)?, rest)
        }
    };

    for field in fields {
        let object: ObjectRef = current.ok_or_else(|| Error::missing_key(path.join(".")))?;
        current = object.read_member(thread.arena(), field, thread.is_invoker(&object))?;
    }
    Ok(current)
}

fn resolve_name(thread: &ExecutionThread, name: &str) -> Result<PropertyKey> {
    thread
        .memory()
        .find_key(name)?
        .ok_or_else(|| Error::missing_key(name))
}
