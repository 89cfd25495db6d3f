//! Test modules for the executor crate.


use std::sync::Arc;

use crate::{Context, DataType, NativeKind, PropertyKey, QualifiedName, Runtime, RuntimeConfig};

pub(crate) fn qn(name: &str) -> QualifiedName {
    QualifiedName::new(name).unwrap()
}

/// Runtime with default configuration.
pub(crate) fn runtime() -> Runtime {
    Runtime::new(RuntimeConfig::default())
}

/// `Test.Value`: carries an integer payload, no fields.
pub(crate) fn value_type() -> Arc<DataType> {
    DataType::builder(qn("Test.Value"))
        .bind_native(NativeKind::Int)
        .build()
        .unwrap()
}

/// `Test.Point`: public `x`, private `secret`, both `Test.Value`.
pub(crate) fn point_type() -> Arc<DataType> {
    DataType::builder(qn("Test.Point"))
        .public(PropertyKey::new("x", qn("Test.Value")))
        .private(PropertyKey::new("secret", qn("Test.Value")))
        .build()
        .unwrap()
}

/// Integer payload of a context that must hold a value.
pub(crate) fn int(ctx: &Context) -> i64 {
    ctx.as_ref().expect("expected a value").payload::<i64>().unwrap()
}
