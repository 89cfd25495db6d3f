//! Invoke command handler.

use dblang_core::Result;

use crate::command::{Command, Context, ScriptRef};
use crate::executor::Executor;
use crate::thread::ExecutionThread;

/// Handle Invoke command.
///
/// Each input sequence runs from an empty context in the calling thread. The
/// prior context, when set, is the nested invoker (method-call form);
/// otherwise the calling thread's invoker is passed on.
pub async fn invoke(
    executor: &Executor,
    thread: &ExecutionThread,
    inputs: &[Vec<Command>],
    script: &ScriptRef,
    ctx: Context,
) -> Result<Context> {
    let script = executor.resolve_script(script)?;

    let mut args = Vec::with_capacity(inputs.len());
    for input in inputs {
        args.push(executor.run_sequence(input, thread, None).await?);
    }

    let invoker = ctx.or_else(|| thread.invoker().cloned());
    executor
        .run_script(script, invoker, args, thread.scope().child())
        .await
}
