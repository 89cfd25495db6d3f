//! Library loading and name resolution.

use crate::common::*;
use dblang::types::DefinitionViolation;
use dblang::{Command, DataType, Error, Script};

#[test]
fn test_duplicate_library_rejected() {
    let rt = runtime();
    rt.load_library(rt.library_builder("app").build().unwrap()).unwrap();

    let err = rt
        .load_library(rt.library_builder("app").build().unwrap())
        .unwrap_err();
    assert_eq!(
        err.violations(),
        &[DefinitionViolation::AlreadyDefined { name: "app".into() }]
    );
}

#[test]
fn test_duplicate_definition_rejected() {
    let rt = runtime();
    let mut lib = rt.library_builder("app");
    lib.define(int_type()).unwrap();
    let err = lib.define(int_type()).unwrap_err();
    assert!(matches!(err, Error::Definition { .. }));
}

#[test]
fn test_resolution_through_dependencies() {
    let rt = runtime();
    let mut core = rt.library_builder("core");
    core.define(int_type()).unwrap();
    core.define(named_contract()).unwrap();
    let core = core.build().unwrap();

    let mut app = rt.library_builder("app");
    app.dependency(core);
    app.script(Script::builder(qn("App.main")).command(Command::clear()).build())
        .unwrap();
    rt.load_library(app.build().unwrap()).unwrap();

    assert!(rt.resolve_type(&qn("Core.Int")).is_ok());
    assert!(rt.resolve(&qn("Core.Named")).unwrap().as_contract().is_some());
    assert!(rt.resolve_script(&qn("App.main")).is_ok());
    assert_eq!(
        rt.resolve_type(&qn("Core.Missing")).unwrap_err(),
        Error::UnknownType {
            name: "Core.Missing".into()
        }
    );
    assert!(rt.library("app").is_some());
    assert!(rt.library("core").is_none());
}

#[test]
fn test_contract_is_not_a_concrete_type() {
    let rt = runtime();
    let mut lib = rt.library_builder("core");
    lib.define(named_contract()).unwrap();
    rt.load_library(lib.build().unwrap()).unwrap();

    assert!(rt.resolve_type(&qn("Core.Named")).is_err());
    assert!(rt.resolve(&qn("Core.Named")).is_ok());
}

#[tokio::test]
async fn test_constructor_resolved_from_dependency() {
    let rt = runtime();
    let mut base = rt.library_builder("base");
    base.script(
        Script::builder(qn("Base.Box.init"))
            .command(Command::native(int_type(), 1i64))
            .command(Command::assign("value"))
            .build(),
    )
    .unwrap();
    let base = base.build().unwrap();

    let boxed = DataType::builder(qn("Base.Box"))
        .public(key("value", "Core.Int"))
        .constructor(qn("Base.Box.init"))
        .build()
        .unwrap();
    let mut app = rt.library_builder("app");
    app.dependency(base);
    app.define(boxed.clone()).unwrap();
    rt.load_library(app.build().unwrap()).unwrap();

    let object = rt.construct(&boxed).await.unwrap();
    let value = object.read_member(rt.memory(), "value", false).unwrap();
    assert_eq!(int_of(&value), 1);
}

fn app_t(fields: &[&str]) -> std::sync::Arc<DataType> {
    fields
        .iter()
        .fold(DataType::builder(qn("App.T")), |b, f| b.public(key(f, "Core.Int")))
        .build()
        .unwrap()
}

#[test]
fn test_clashing_definition_across_libraries_rejected() {
    let rt = runtime();
    let mut one = rt.library_builder("one");
    one.define(app_t(&["a"])).unwrap();
    rt.load_library(one.build().unwrap()).unwrap();

    let mut two = rt.library_builder("two");
    two.define(app_t(&[])).unwrap();
    let err = rt.load_library(two.build().unwrap()).unwrap_err();

    assert_eq!(
        err.violations(),
        &[DefinitionViolation::AlreadyDefined {
            name: "App.T".into()
        }]
    );
    assert!(rt.library("two").is_none());
    let loaded = rt.resolve_type(&qn("App.T")).unwrap();
    assert_eq!(loaded.public_properties().len(), 1);
}

#[test]
fn test_clashing_definitions_inside_dependencies_rejected() {
    let rt = runtime();
    let mut left = rt.library_builder("left");
    left.define(app_t(&["a"])).unwrap();
    let mut right = rt.library_builder("right");
    right.define(app_t(&[])).unwrap();

    let mut app = rt.library_builder("app");
    app.dependency(left.build().unwrap());
    app.dependency(right.build().unwrap());
    let err = rt.load_library(app.build().unwrap()).unwrap_err();

    assert_eq!(
        err.violations(),
        &[DefinitionViolation::AlreadyDefined {
            name: "App.T".into()
        }]
    );
    assert!(rt.library("app").is_none());
}

#[test]
fn test_clashing_script_across_libraries_rejected() {
    let rt = runtime();
    let mut one = rt.library_builder("one");
    one.script(Script::builder(qn("App.main")).command(Command::clear()).build())
        .unwrap();
    rt.load_library(one.build().unwrap()).unwrap();

    let mut two = rt.library_builder("two");
    two.script(Script::builder(qn("App.main")).build()).unwrap();
    let err = rt.load_library(two.build().unwrap()).unwrap_err();
    assert_eq!(
        err.violations(),
        &[DefinitionViolation::AlreadyDefined {
            name: "App.main".into()
        }]
    );
}

#[test]
fn test_shared_dependency_loads_twice() {
    let rt = runtime();
    let mut core = rt.library_builder("core");
    core.define(int_type()).unwrap();
    let core = core.build().unwrap();
    rt.load_library(core.clone()).unwrap();

    let mut app = rt.library_builder("app");
    app.dependency(core);
    rt.load_library(app.build().unwrap()).unwrap();
    assert!(rt.library("app").is_some());
}
