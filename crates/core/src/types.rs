//! Type and contract model
//!
//! This module defines the compatibility graph of the runtime:
//! - [`DataContract`]: a structural obligation (required public properties)
//!   with an ordered list of parent contracts
//! - [`DataType`]: a concrete class with at most one parent type, an ordered
//!   list of fulfilled contracts, public and private properties, an optional
//!   constructor script and an optional native binding constraint
//! - [`TypeRef`]: either of the above, as referenced from property keys,
//!   registries and compatibility checks
//!
//! Definitions are validated once when built and are immutable afterwards.
//! Parents and contracts are shared by `Arc`, never copied per instance.
//!
//! # Compatibility (`is`)
//!
//! `T.is(X)` holds when `T` and `X` are the same definition, when any
//! fulfilled contract `is(X)`, or when the parent `is(X)`. Traversals carry a
//! visited set so a malformed graph terminates, and definitions reject
//! cycles up front.

use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::binding::{NativeConstraint, NativeKind};
use crate::error::{DefinitionViolation, Error, Result};
use crate::key::PropertyKey;
use crate::name::QualifiedName;

// =============================================================================
// Contracts
// =============================================================================

/// A structural obligation a type may declare it fulfills
#[derive(Debug)]
pub struct DataContract {
    name: QualifiedName,
    properties: Vec<PropertyKey>,
    contracts: Vec<Arc<DataContract>>,
}

impl DataContract {
    /// Define a contract requiring `properties`, extending `contracts`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] listing every duplicate property name and
    /// any cycle through the parent contracts.
    pub fn define(
        name: QualifiedName,
        properties: impl IntoIterator<Item = PropertyKey>,
        contracts: impl IntoIterator<Item = Arc<DataContract>>,
    ) -> Result<Arc<Self>> {
        let properties: Vec<PropertyKey> = properties.into_iter().collect();
        let contracts: Vec<Arc<DataContract>> = contracts.into_iter().collect();

        let mut violations: Vec<DefinitionViolation> = duplicate_names(properties.iter())
            .into_iter()
            .map(|name| DefinitionViolation::DuplicateKey { name })
            .collect();

        let mut visited = FxHashSet::default();
        if contracts
            .iter()
            .any(|c| c.reaches(&name, &mut visited))
        {
            violations.push(DefinitionViolation::Cycle {
                name: name.to_string(),
            });
        }

        if !violations.is_empty() {
            return Err(Error::definition(name.as_str(), violations));
        }

        debug!(target: "dblang::types", contract = %name, properties = properties.len(), "Defined contract");
        Ok(Arc::new(Self {
            name,
            properties,
            contracts,
        }))
    }

    /// Qualified name of the contract
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Properties declared directly on this contract
    pub fn properties(&self) -> &[PropertyKey] {
        &self.properties
    }

    /// Parent contracts, in declaration order
    pub fn contracts(&self) -> &[Arc<DataContract>] {
        &self.contracts
    }

    /// Every property this contract obliges a type to expose publicly:
    /// its own plus those of all parent contracts, without repeats.
    pub fn required_properties(&self) -> Vec<PropertyKey> {
        let mut out = Vec::new();
        let mut seen_keys = FxHashSet::default();
        let mut visited = FxHashSet::default();
        self.collect_required(&mut out, &mut seen_keys, &mut visited);
        out
    }

    fn collect_required(
        &self,
        out: &mut Vec<PropertyKey>,
        seen_keys: &mut FxHashSet<PropertyKey>,
        visited: &mut FxHashSet<QualifiedName>,
    ) {
        if !visited.insert(self.name.clone()) {
            return;
        }
        for key in &self.properties {
            if seen_keys.insert(key.clone()) {
                out.push(key.clone());
            }
        }
        for parent in &self.contracts {
            parent.collect_required(out, seen_keys, visited);
        }
    }

    /// Compatibility check against another definition
    pub fn is(&self, other: &TypeRef) -> bool {
        self.is_named(other.name())
    }

    /// Compatibility check against a qualified name
    pub fn is_named(&self, target: &QualifiedName) -> bool {
        self.reaches(target, &mut FxHashSet::default())
    }

    fn reaches(&self, target: &QualifiedName, visited: &mut FxHashSet<QualifiedName>) -> bool {
        if &self.name == target {
            return true;
        }
        if !visited.insert(self.name.clone()) {
            return false;
        }
        self.contracts.iter().any(|c| c.reaches(target, visited))
    }
}

// =============================================================================
// Types
// =============================================================================

/// A concrete class of runtime object
#[derive(Debug)]
pub struct DataType {
    name: QualifiedName,
    parent: Option<Arc<DataType>>,
    contracts: Vec<Arc<DataContract>>,
    public: Vec<PropertyKey>,
    private: Vec<PropertyKey>,
    constructor: Option<QualifiedName>,
    binding: Option<NativeConstraint>,
}

impl DataType {
    /// Define a type from its property lists, contracts and optional parent.
    ///
    /// The visible property lists are the parent's followed by the new ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] listing every duplicate key, every
    /// contract with unmet (or only privately declared) properties, and any
    /// inheritance cycle.
    pub fn define(
        name: QualifiedName,
        public: impl IntoIterator<Item = PropertyKey>,
        private: impl IntoIterator<Item = PropertyKey>,
        contracts: impl IntoIterator<Item = Arc<DataContract>>,
        parent: Option<Arc<DataType>>,
    ) -> Result<Arc<Self>> {
        let mut builder = TypeBuilder::new(name);
        builder.public = public.into_iter().collect();
        builder.private = private.into_iter().collect();
        builder.contracts = contracts.into_iter().collect();
        builder.parent = parent;
        builder.build()
    }

    /// Start building a type with optional constructor and native binding
    pub fn builder(name: QualifiedName) -> TypeBuilder {
        TypeBuilder::new(name)
    }

    /// Qualified name of the type
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Parent type, if any
    pub fn parent(&self) -> Option<&Arc<DataType>> {
        self.parent.as_ref()
    }

    /// Contracts declared directly on this type
    pub fn contracts(&self) -> &[Arc<DataContract>] {
        &self.contracts
    }

    /// Visible public properties (parent's first)
    pub fn public_properties(&self) -> &[PropertyKey] {
        &self.public
    }

    /// Visible private properties (parent's first)
    pub fn private_properties(&self) -> &[PropertyKey] {
        &self.private
    }

    /// Every visible property: public then private
    pub fn properties(&self) -> impl Iterator<Item = &PropertyKey> {
        self.public.iter().chain(self.private.iter())
    }

    /// Look up a visible property by name
    pub fn property(&self, name: &str, include_private: bool) -> Option<&PropertyKey> {
        let public = self.public.iter().find(|k| k.name() == name);
        if public.is_some() || !include_private {
            return public;
        }
        self.private.iter().find(|k| k.name() == name)
    }

    /// Name of the constructor script run on new instances
    pub fn constructor(&self) -> Option<&QualifiedName> {
        self.constructor.as_ref()
    }

    /// Native binding constraint
    pub fn binding(&self) -> Option<&NativeConstraint> {
        self.binding.as_ref()
    }

    /// Whether payloads of `candidate` kind may be bound to instances.
    ///
    /// Types without a binding constraint accept no payloads.
    pub fn is_compatible_native(&self, candidate: NativeKind) -> bool {
        self.binding
            .as_ref()
            .map(|c| c.is_compatible(candidate))
            .unwrap_or(false)
    }

    /// Compatibility check against another definition
    pub fn is(&self, other: &TypeRef) -> bool {
        self.is_named(other.name())
    }

    /// Compatibility check against a qualified name
    pub fn is_named(&self, target: &QualifiedName) -> bool {
        self.reaches(target, &mut FxHashSet::default())
    }

    fn reaches(&self, target: &QualifiedName, visited: &mut FxHashSet<QualifiedName>) -> bool {
        if &self.name == target {
            return true;
        }
        if !visited.insert(self.name.clone()) {
            return false;
        }
        if self.contracts.iter().any(|c| c.reaches(target, visited)) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.reaches(target, visited),
            None => false,
        }
    }
}

/// Builder for [`DataType`]
#[derive(Debug)]
pub struct TypeBuilder {
    name: QualifiedName,
    parent: Option<Arc<DataType>>,
    contracts: Vec<Arc<DataContract>>,
    public: Vec<PropertyKey>,
    private: Vec<PropertyKey>,
    constructor: Option<QualifiedName>,
    binding: Option<NativeKind>,
}

impl TypeBuilder {
    fn new(name: QualifiedName) -> Self {
        Self {
            name,
            parent: None,
            contracts: Vec::new(),
            public: Vec::new(),
            private: Vec::new(),
            constructor: None,
            binding: None,
        }
    }

    /// Set the parent type
    pub fn parent(mut self, parent: Arc<DataType>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a fulfilled contract
    pub fn contract(mut self, contract: Arc<DataContract>) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Declare a public property
    pub fn public(mut self, key: PropertyKey) -> Self {
        self.public.push(key);
        self
    }

    /// Declare a private property
    pub fn private(mut self, key: PropertyKey) -> Self {
        self.private.push(key);
        self
    }

    /// Name the constructor script
    pub fn constructor(mut self, script: QualifiedName) -> Self {
        self.constructor = Some(script);
        self
    }

    /// Require payloads bound to instances to be assignable to `kind`
    pub fn bind_native(mut self, kind: NativeKind) -> Self {
        self.binding = Some(kind);
        self
    }

    /// Validate and build the type
    pub fn build(self) -> Result<Arc<DataType>> {
        let TypeBuilder {
            name,
            parent,
            contracts,
            public: own_public,
            private: own_private,
            constructor,
            binding,
        } = self;

        let mut public = parent
            .as_ref()
            .map(|p| p.public.clone())
            .unwrap_or_default();
        let mut private = parent
            .as_ref()
            .map(|p| p.private.clone())
            .unwrap_or_default();
        public.extend(own_public);
        private.extend(own_private);

        let mut violations: Vec<DefinitionViolation> =
            duplicate_names(public.iter().chain(private.iter()))
                .into_iter()
                .map(|name| DefinitionViolation::DuplicateKey { name })
                .collect();

        for contract in &contracts {
            let missing: Vec<String> = contract
                .required_properties()
                .iter()
                .filter(|required| !public.contains(required))
                .map(ToString::to_string)
                .collect();
            if !missing.is_empty() {
                violations.push(DefinitionViolation::UnmetContract {
                    contract: contract.name().to_string(),
                    missing,
                });
            }
        }

        let mut visited = FxHashSet::default();
        let cyclic = contracts.iter().any(|c| c.reaches(&name, &mut visited))
            || parent
                .as_ref()
                .map(|p| p.reaches(&name, &mut visited))
                .unwrap_or(false);
        if cyclic {
            violations.push(DefinitionViolation::Cycle {
                name: name.to_string(),
            });
        }

        if !violations.is_empty() {
            return Err(Error::definition(name.as_str(), violations));
        }

        debug!(
            target: "dblang::types",
            r#type = %name,
            parent = ?parent.as_ref().map(|p| p.name().to_string()),
            public = public.len(),
            private = private.len(),
            "Defined type"
        );

        Ok(Arc::new(DataType {
            name,
            parent,
            contracts,
            public,
            private,
            constructor,
            binding: binding.map(NativeConstraint::new),
        }))
    }
}

/// Names appearing more than once, in order of first appearance
fn duplicate_names<'a>(keys: impl Iterator<Item = &'a PropertyKey>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut reported = FxHashSet::default();
    let mut duplicates = Vec::new();
    for key in keys {
        if !seen.insert(key.name()) && reported.insert(key.name()) {
            duplicates.push(key.name().to_string());
        }
    }
    duplicates
}

// =============================================================================
// References
// =============================================================================

/// A reference to a type or contract definition
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Concrete type
    Type(Arc<DataType>),
    /// Contract
    Contract(Arc<DataContract>),
}

impl TypeRef {
    /// Qualified name of the referenced definition
    pub fn name(&self) -> &QualifiedName {
        match self {
            TypeRef::Type(t) => t.name(),
            TypeRef::Contract(c) => c.name(),
        }
    }

    /// Compatibility check, dispatching to the referenced definition
    pub fn is(&self, other: &TypeRef) -> bool {
        match self {
            TypeRef::Type(t) => t.is(other),
            TypeRef::Contract(c) => c.is(other),
        }
    }

    /// The concrete type, if this references one
    pub fn as_type(&self) -> Option<&Arc<DataType>> {
        match self {
            TypeRef::Type(t) => Some(t),
            TypeRef::Contract(_) => None,
        }
    }

    /// The contract, if this references one
    pub fn as_contract(&self) -> Option<&Arc<DataContract>> {
        match self {
            TypeRef::Contract(c) => Some(c),
            TypeRef::Type(_) => None,
        }
    }

    /// Whether both references point at the same definition
    ///
    /// Unlike `==`, which compares qualified names, this tells apart two
    /// distinct definitions that share a name.
    pub fn same_definition(&self, other: &TypeRef) -> bool {
        match (self, other) {
            (TypeRef::Type(a), TypeRef::Type(b)) => Arc::ptr_eq(a, b),
            (TypeRef::Contract(a), TypeRef::Contract(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Properties visible publicly on the definition
    pub fn public_properties(&self) -> Vec<PropertyKey> {
        match self {
            TypeRef::Type(t) => t.public_properties().to_vec(),
            TypeRef::Contract(c) => c.required_properties(),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for TypeRef {}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<Arc<DataType>> for TypeRef {
    fn from(t: Arc<DataType>) -> Self {
        TypeRef::Type(t)
    }
}

impl From<Arc<DataContract>> for TypeRef {
    fn from(c: Arc<DataContract>) -> Self {
        TypeRef::Contract(c)
    }
}

/// Anything carrying a runtime type that memory can check slot writes against
pub trait Typed {
    /// Qualified name of the value's runtime type
    fn type_name(&self) -> &QualifiedName;

    /// Whether the value may be stored in a slot declared as `declared`
    fn satisfies(&self, declared: &QualifiedName) -> bool;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(name: &str) -> QualifiedName {
        QualifiedName::new(name).unwrap()
    }

    fn empty_type(name: &str) -> Arc<DataType> {
        DataType::define(qn(name), vec![], vec![], vec![], None).unwrap()
    }

    fn empty_contract(name: &str, parents: Vec<Arc<DataContract>>) -> Arc<DataContract> {
        DataContract::define(qn(name), vec![], parents).unwrap()
    }

    fn prop(name: &str, ty: &str) -> PropertyKey {
        PropertyKey::new(name, qn(ty))
    }

    // ==================== Inheritance ====================

    #[test]
    fn test_inherit_type() {
        let parent = empty_type("Test.Parent");
        let child = DataType::define(qn("Test.Child"), vec![], vec![], vec![], Some(parent.clone()))
            .unwrap();
        assert_eq!(child.parent().unwrap().name(), parent.name());
    }

    #[test]
    fn test_inherit_type_with_property() {
        let p = prop("Prop", "Test.PropType");
        let parent = DataType::define(qn("Test.Parent"), vec![p.clone()], vec![], vec![], None)
            .unwrap();
        let child = DataType::define(qn("Test.Child"), vec![], vec![], vec![], Some(parent.clone()))
            .unwrap();
        assert!(parent.public_properties().contains(&p));
        assert!(child.public_properties().contains(&p));
        assert!(child.is(&TypeRef::Type(parent)));
    }

    #[test]
    fn test_parent_order_precedes_own_properties() {
        let parent = DataType::define(
            qn("Test.Parent"),
            vec![prop("a", "Core.Int")],
            vec![prop("secret", "Core.Int")],
            vec![],
            None,
        )
        .unwrap();
        let child = DataType::define(
            qn("Test.Child"),
            vec![prop("b", "Core.Int")],
            vec![prop("hidden", "Core.Int")],
            vec![],
            Some(parent),
        )
        .unwrap();
        let names: Vec<&str> = child.properties().map(|k| k.name()).collect();
        assert_eq!(names, vec!["a", "b", "secret", "hidden"]);
    }

    #[test]
    fn test_is_type() {
        let t = empty_type("Test.Type");
        assert!(t.is(&TypeRef::Type(t.clone())));
        let derived =
            DataType::define(qn("Test.Derived"), vec![], vec![], vec![], Some(t.clone())).unwrap();
        assert!(derived.is(&TypeRef::Type(t.clone())));
        assert!(!t.is(&TypeRef::Type(derived)));
    }

    #[test]
    fn test_is_transitive_through_parent_chain() {
        let a = empty_type("Test.A");
        let b = DataType::define(qn("Test.B"), vec![], vec![], vec![], Some(a.clone())).unwrap();
        let c = DataType::define(qn("Test.C"), vec![], vec![], vec![], Some(b.clone())).unwrap();
        assert!(c.is_named(a.name()));
        assert!(c.is_named(b.name()));
        assert!(!a.is_named(c.name()));
    }

    #[test]
    fn test_implement_contract() {
        let c = empty_contract("Test.Contract", vec![]);
        let t = DataType::define(qn("Test.Child"), vec![], vec![], vec![c.clone()], None).unwrap();
        assert!(t.contracts().iter().any(|x| x.name() == c.name()));
        assert!(t.is(&TypeRef::Contract(c)));
    }

    #[test]
    fn test_implement_contract_with_property() {
        let p = prop("Prop", "Test.PropType");
        let c = DataContract::define(qn("Test.Contract"), vec![p.clone()], vec![]).unwrap();
        let t = DataType::define(qn("Test.Child"), vec![p], vec![], vec![c.clone()], None);
        assert!(t.is_ok());
    }

    #[test]
    fn test_is_contract() {
        let c = empty_contract("Test.Contract", vec![]);
        assert!(c.is(&TypeRef::Contract(c.clone())));
        let dc = empty_contract("Test.DerivedContract", vec![c.clone()]);
        assert!(dc.is(&TypeRef::Contract(c.clone())));
        assert!(!c.is(&TypeRef::Contract(dc.clone())));

        let t = DataType::builder(qn("Test.Type"))
            .bind_native(NativeKind::Str)
            .contract(dc.clone())
            .build()
            .unwrap();
        assert!(t.is(&TypeRef::Contract(dc.clone())));
        assert!(t.is(&TypeRef::Contract(c)));
        assert!(!dc.is(&TypeRef::Type(t)));
    }

    #[test]
    fn test_is_through_parent_contracts() {
        let c = empty_contract("Test.Printable", vec![]);
        let parent =
            DataType::define(qn("Test.Parent"), vec![], vec![], vec![c.clone()], None).unwrap();
        let child = DataType::define(qn("Test.Child"), vec![], vec![], vec![], Some(parent)).unwrap();
        assert!(child.is_named(c.name()));
    }

    // ==================== Properties ====================

    #[test]
    fn test_missing_property_from_contract() {
        let c = DataContract::define(qn("Test.Contract"), vec![prop("Prop", "Test.PropType")], vec![])
            .unwrap();
        let err = DataType::define(qn("Test.Child"), vec![], vec![], vec![c], None).unwrap_err();
        assert!(matches!(
            err.violations(),
            [DefinitionViolation::UnmetContract { contract, .. }] if contract == "Test.Contract"
        ));
    }

    #[test]
    fn test_private_property_never_satisfies_contract() {
        let p = prop("Prop", "Test.PropType");
        let c = DataContract::define(qn("Test.Contract"), vec![p.clone()], vec![]).unwrap();
        let err = DataType::define(qn("Test.Child"), vec![], vec![p], vec![c], None).unwrap_err();
        assert!(matches!(err, Error::Definition { .. }));
    }

    #[test]
    fn test_contract_property_type_must_match() {
        let c = DataContract::define(qn("Test.Named"), vec![prop("Name", "Core.String")], vec![])
            .unwrap();
        let err = DataType::define(
            qn("Test.Child"),
            vec![prop("Name", "Core.Int")],
            vec![],
            vec![c],
            None,
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn test_inherited_contract_requirements() {
        let base = DataContract::define(qn("Test.Base"), vec![prop("id", "Core.Int")], vec![])
            .unwrap();
        let derived = DataContract::define(
            qn("Test.Derived"),
            vec![prop("name", "Core.String")],
            vec![base],
        )
        .unwrap();
        assert_eq!(derived.required_properties().len(), 2);

        let err = DataType::define(
            qn("Test.Impl"),
            vec![prop("name", "Core.String")],
            vec![],
            vec![derived],
            None,
        )
        .unwrap_err();
        match err.violations() {
            [DefinitionViolation::UnmetContract { missing, .. }] => {
                assert_eq!(missing, &vec!["id:Core.Int".to_string()]);
            }
            other => panic!("unexpected violations {:?}", other),
        }
    }

    #[test]
    fn test_all_unmet_contracts_reported() {
        let a = DataContract::define(qn("Test.A"), vec![prop("x", "Core.Int")], vec![]).unwrap();
        let b = DataContract::define(qn("Test.B"), vec![prop("y", "Core.Int")], vec![]).unwrap();
        let err = DataType::define(qn("Test.T"), vec![], vec![], vec![a, b], None).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("Test.A"));
        assert!(msg.contains("Test.B"));
    }

    #[test]
    fn test_duplicate_property() {
        let p = prop("Prop", "Test.PropType");
        let err = DataType::define(qn("Test.Child"), vec![p.clone(), p], vec![], vec![], None)
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[DefinitionViolation::DuplicateKey { name: "Prop".into() }]
        );
    }

    #[test]
    fn test_duplicate_private_public_property() {
        let p = prop("Prop", "Test.PropType");
        let err = DataType::define(qn("Test.Child"), vec![p.clone()], vec![p], vec![], None)
            .unwrap_err();
        assert!(matches!(err, Error::Definition { .. }));
    }

    #[test]
    fn test_duplicate_name_different_type() {
        let err = DataType::define(
            qn("Test.Child"),
            vec![prop("Prop", "Test.PropType"), prop("Prop", "Test.Prop2Type")],
            vec![],
            vec![],
            None,
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn test_duplicate_with_parent_property() {
        let parent = DataType::define(qn("Test.Parent"), vec![prop("a", "Core.Int")], vec![], vec![], None)
            .unwrap();
        let err = DataType::define(
            qn("Test.Child"),
            vec![],
            vec![prop("a", "Core.Int")],
            vec![],
            Some(parent),
        )
        .unwrap_err();
        assert_eq!(
            err.violations(),
            &[DefinitionViolation::DuplicateKey { name: "a".into() }]
        );
    }

    #[test]
    fn test_every_duplicate_reported_once() {
        let err = DataType::define(
            qn("Test.T"),
            vec![prop("a", "Core.Int"), prop("b", "Core.Int"), prop("a", "Core.Int")],
            vec![prop("b", "Core.Int"), prop("a", "Core.Int")],
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
    fn test_duplicates_and_unmet_contracts_reported_together() {
        let c = DataContract::define(qn("Test.C"), vec![prop("z", "Core.Int")], vec![]).unwrap();
        let err = DataType::define(
            qn("Test.T"),
            vec![prop("a", "Core.Int"), prop("a", "Core.Int")],
            vec![],
            vec![c],
            None,
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_contract_duplicate_property() {
        let err = DataContract::define(
            qn("Test.C"),
            vec![prop("a", "Core.Int"), prop("a", "Core.String")],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.violations().len(), 1);
    }

    // ==================== Cycles ====================

    #[test]
    fn test_type_named_like_its_ancestor_is_a_cycle() {
        let a = empty_type("Test.A");
        let b = DataType::define(qn("Test.B"), vec![], vec![], vec![], Some(a)).unwrap();
        let err = DataType::define(qn("Test.A"), vec![], vec![], vec![], Some(b)).unwrap_err();
        assert!(matches!(
            err.violations(),
            [DefinitionViolation::Cycle { name }] if name == "Test.A"
        ));
    }

    #[test]
    fn test_contract_named_like_its_ancestor_is_a_cycle() {
        let a = empty_contract("Test.A", vec![]);
        let b = empty_contract("Test.B", vec![a]);
        let err = DataContract::define(qn("Test.A"), vec![], vec![b]).unwrap_err();
        assert!(matches!(err.violations(), [DefinitionViolation::Cycle { .. }]));
    }

    // ==================== Binding ====================

    #[test]
    fn test_native_compatibility() {
        let t = DataType::builder(qn("Core.String"))
            .bind_native(NativeKind::Str)
            .build()
            .unwrap();
        assert!(t.is_compatible_native(NativeKind::Str));
        assert!(!t.is_compatible_native(NativeKind::Int));

        let unbound = empty_type("Test.Plain");
        assert!(!unbound.is_compatible_native(NativeKind::Str));
    }

    #[test]
    fn test_property_lookup_respects_visibility() {
        let t = DataType::define(
            qn("Test.T"),
            vec![prop("open", "Core.Int")],
            vec![prop("closed", "Core.Int")],
            vec![],
            None,
        )
        .unwrap();
        assert!(t.property("open", false).is_some());
        assert!(t.property("closed", false).is_none());
        assert!(t.property("closed", true).is_some());
    }

    #[test]
    fn test_type_ref_equality_by_name() {
        let a = TypeRef::from(empty_type("Test.A"));
        let a2 = TypeRef::from(empty_type("Test.A"));
        assert_eq!(a, a2);
        assert_eq!(a.to_string(), "Test.A");
        assert!(a.as_type().is_some());
        assert!(a.as_contract().is_none());
    }

    #[test]
    fn test_same_definition_is_identity() {
        let a = TypeRef::from(empty_type("Test.A"));
        let a2 = TypeRef::from(empty_type("Test.A"));
        assert!(a.same_definition(&a.clone()));
        assert!(!a.same_definition(&a2));
        let c = TypeRef::from(DataContract::define(qn("Test.A"), vec![], vec![]).unwrap());
        assert!(!a.same_definition(&c));
    }
}
