//! Object command handlers.

use std::sync::Arc;

use dblang_core::{DataType, NativeValue, Result};

use crate::command::Context;
use crate::executor::Executor;
use crate::object::Object;
use crate::thread::ExecutionThread;

/// Handle SelfReference command.
pub fn self_reference(thread: &ExecutionThread) -> Result<Context> {
    Ok(thread.invoker().cloned())
}

/// Handle Native command.
pub fn native(thread: &ExecutionThread, ty: &Arc<DataType>, value: &NativeValue) -> Result<Context> {
    Object::bind(thread.arena(), Arc::clone(ty), value.clone()).map(Some)
}

/// Handle Instantiate command.
pub async fn instantiate(
    executor: &Executor,
    thread: &ExecutionThread,
    ty: &Arc<DataType>,
) -> Result<Context> {
    executor
        .construct(ty, thread.scope().child())
        .await
        .map(Some)
}
