//! Script execution through the runtime.

use crate::common::*;
use dblang::memory::{GroupScope, MemoryView};
use dblang::{Command, DataType, Error, Invocation, ObjectRef, Script, ThreadScope};
use dblang::{CapabilitySet, ExecutionThread};

#[tokio::test]
async fn test_declare_twice_leaves_key_set_unchanged() {
    let rt = runtime();
    let script = Script::builder(qn("Test.main")).build_shared();
    let thread = ExecutionThread::enter(
        rt.memory(),
        script,
        None,
        vec![],
        ThreadScope::top_level(CapabilitySet::new()),
    )
    .unwrap();
    let declare = Command::declare("x", qn("Test.T"));

    rt.executor().execute(&declare, &thread, None).await.unwrap();
    assert!(thread.memory().contains_key(&key("x", "Test.T")).unwrap());
    let keys_after_first = thread.memory().keys().unwrap();

    rt.executor().execute(&declare, &thread, None).await.unwrap();
    assert_eq!(thread.memory().keys().unwrap(), keys_after_first);
}

#[tokio::test]
async fn test_caller_context_group_is_visible() {
    let rt = runtime();
    let context = rt.memory().allocate(GroupScope::Local);
    let seed = rt.bind(&int_type(), 21i64).unwrap();
    context.add(key("seed", "Core.Int"), Some(seed)).unwrap();

    let script = Script::builder(qn("Test.read_seed"))
        .returns(qn("Core.Int"))
        .command(Command::lookup("seed"))
        .build_shared();

    let result = rt
        .run(Invocation::new(script).context(context.id()))
        .await
        .unwrap();
    assert_eq!(int_of(&result), 21);
}

#[tokio::test]
async fn test_object_method_updates_fields() {
    let rt = runtime();
    let account = DataType::builder(qn("Bank.Account"))
        .public(key("balance", "Core.Int"))
        .private(key("owner", "Core.String"))
        .build()
        .unwrap();

    let mut lib = rt.library_builder("bank");
    lib.define(int_type()).unwrap();
    lib.define(string_type()).unwrap();
    lib.define(account.clone()).unwrap();
    let open = lib
        .script(
            Script::builder(qn("Bank.Account.open"))
                .parameter(key("who", "Core.String"))
                .command(Command::lookup("who"))
                .command(Command::assign("owner"))
                .command(Command::native(int_type(), 100i64))
                .command(Command::assign("balance").requiring("bank.write"))
                .build(),
        )
        .unwrap();
    rt.load_library(lib.build().unwrap()).unwrap();

    let acct: ObjectRef = rt.instantiate(&account);
    let who = rt.bind(&string_type(), "ada").unwrap();

    let err = rt
        .run(Invocation::new(open.clone()).invoker(acct.clone()).arg(Some(who.clone())))
        .await
        .unwrap_err();
    assert!(err.is_sandboxable());
    // Commands before the denied one keep their effects.
    let owner = acct.read_member(rt.memory(), "owner", true).unwrap();
    assert_eq!(owner.unwrap().payload::<String>().unwrap(), "ada");
    assert_eq!(acct.read_member(rt.memory(), "balance", false).unwrap(), None);

    rt.run(
        Invocation::new(open)
            .invoker(acct.clone())
            .arg(Some(who))
            .grant("bank.write"),
    )
    .await
    .unwrap();
    let balance = acct.read_member(rt.memory(), "balance", false).unwrap();
    assert_eq!(int_of(&balance), 100);
}

#[tokio::test]
async fn test_library_statics_shared_between_scripts() {
    let rt = runtime();
    let mut lib = rt.library_builder("counter");
    lib.static_slot(key("total", "Core.Int"), None).unwrap();
    let store = lib
        .script(
            Script::builder(qn("Counter.store"))
                .command(Command::native(int_type(), 5i64))
                .command(Command::assign("total"))
                .build(),
        )
        .unwrap();
    let load = lib
        .script(
            Script::builder(qn("Counter.load"))
                .returns(qn("Core.Int"))
                .command(Command::lookup("total"))
                .build(),
        )
        .unwrap();
    rt.load_library(lib.build().unwrap()).unwrap();

    rt.invoke(&store, None, vec![]).await.unwrap();
    let result = rt.invoke(&load, None, vec![]).await.unwrap();
    assert_eq!(int_of(&result), 5);
}

#[tokio::test]
async fn test_errors_propagate_from_nested_scripts() {
    let rt = runtime();
    let inner = Script::builder(qn("Test.inner"))
        .command(Command::lookup("ghost"))
        .build_shared();
    let outer = Script::builder(qn("Test.outer"))
        .command(Command::invoke(inner, vec![]))
        .command(Command::native(int_type(), 1i64))
        .build_shared();

    let err = rt.invoke(&outer, None, vec![]).await.unwrap_err();
    assert_eq!(err, Error::missing_key("ghost"));
    assert!(!err.is_sandboxable());
}
