//! Type and contract compatibility through the public API.

use crate::common::*;
use dblang::types::DefinitionViolation;
use dblang::{DataContract, DataType, Error, TypeRef};

#[test]
fn test_child_sees_parent_public_property() {
    let parent = DataType::define(qn("Test.Parent"), vec![key("Prop", "Test.PropType")], vec![], vec![], None)
        .unwrap();
    let child = DataType::define(qn("Test.Child"), vec![], vec![], vec![], Some(parent.clone())).unwrap();

    assert!(child.public_properties().contains(&key("Prop", "Test.PropType")));
    assert!(child.is(&TypeRef::from(parent.clone())));
    assert!(!parent.is(&TypeRef::from(child.clone())));
    assert!(child.is(&TypeRef::from(child.clone())));
}

#[test]
fn test_contract_inheritance_is_one_way() {
    let base = DataContract::define(qn("Test.C"), vec![key("a", "Test.A")], vec![]).unwrap();
    let derived = DataContract::define(qn("Test.DC"), vec![], vec![base.clone()]).unwrap();

    assert!(derived.is(&TypeRef::from(base.clone())));
    assert!(!base.is(&TypeRef::from(derived.clone())));

    let implementor = DataType::define(
        qn("Test.Impl"),
        vec![key("a", "Test.A")],
        vec![],
        vec![derived.clone()],
        None,
    )
    .unwrap();
    assert!(implementor.is(&TypeRef::from(derived)));
    assert!(implementor.is(&TypeRef::from(base)));
}

#[test]
fn test_contract_satisfied_through_parent_type() {
    let named = named_contract();
    let parent = DataType::define(qn("Test.Base"), vec![key("Name", "Core.String")], vec![], vec![], None)
        .unwrap();
    let child = DataType::define(qn("Test.Derived"), vec![], vec![], vec![named.clone()], Some(parent))
        .unwrap();
    assert!(child.is_named(named.name()));
}

#[test]
fn test_missing_contract_property_rejected() {
    let err = DataType::define(qn("Test.Anon"), vec![], vec![], vec![named_contract()], None).unwrap_err();
    assert_eq!(
        err.violations(),
        &[DefinitionViolation::UnmetContract {
            contract: "Core.Named".into(),
            missing: vec![key("Name", "Core.String").to_string()],
        }]
    );
    assert!(err.is_fatal_to_load());
}

#[test]
fn test_private_contract_property_rejected() {
    let err = DataType::define(
        qn("Test.Hidden"),
        vec![],
        vec![key("Name", "Core.String")],
        vec![named_contract()],
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Definition { .. }));
    assert!(err
        .violations()
        .iter()
        .any(|v| matches!(v, DefinitionViolation::UnmetContract { .. })));
}

#[test]
fn test_every_duplicate_reported() {
    let err = DataType::define(
        qn("Test.Dupes"),
        vec![key("a", "Test.A"), key("a", "Test.A"), key("b", "Test.B")],
        vec![key("b", "Test.B")],
        vec![],
        None,
    )
    .unwrap_err();
    assert_eq!(
        err.violations(),
        &[
            DefinitionViolation::DuplicateKey { name: "a".into() },
            DefinitionViolation::DuplicateKey { name: "b".into() },
        ]
    );
}

#[test]
fn test_duplicate_against_parent_reported() {
    let parent = DataType::define(qn("Test.P"), vec![key("x", "Test.X")], vec![], vec![], None).unwrap();
    let err = DataType::define(qn("Test.Q"), vec![], vec![key("x", "Test.X")], vec![], Some(parent))
        .unwrap_err();
    assert_eq!(
        err.violations(),
        &[DefinitionViolation::DuplicateKey { name: "x".into() }]
    );
}

#[test]
fn test_native_binding_round_trip() {
    let rt = runtime();
    let object = rt.bind(&string_type(), "hello").unwrap();
    assert_eq!(object.payload::<String>().unwrap(), "hello");

    let err = rt.bind(&string_type(), 3i64).unwrap_err();
    assert!(matches!(err, Error::Binding { .. }));
}
