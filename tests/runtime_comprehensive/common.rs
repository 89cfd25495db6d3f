//! Shared helpers for the runtime test suite.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use dblang::{
    Context, DataContract, DataType, NativeKind, PropertyKey, QualifiedName, Runtime,
    RuntimeConfig,
};
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Route runtime logs to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn qn(name: &str) -> QualifiedName {
    QualifiedName::new(name).unwrap()
}

pub fn key(name: &str, ty: &str) -> PropertyKey {
    PropertyKey::new(name, qn(ty))
}

/// Runtime with default configuration and logging enabled.
pub fn runtime() -> Runtime {
    init_tracing();
    Runtime::new(RuntimeConfig::default())
}

/// `Core.Int`: integer payload, no fields.
pub fn int_type() -> Arc<DataType> {
    DataType::builder(qn("Core.Int"))
        .bind_native(NativeKind::Int)
        .build()
        .unwrap()
}

/// `Core.String`: string payload, no fields.
pub fn string_type() -> Arc<DataType> {
    DataType::builder(qn("Core.String"))
        .bind_native(NativeKind::Str)
        .build()
        .unwrap()
}

/// `Core.Named`: requires a public `Name:Core.String`.
pub fn named_contract() -> Arc<DataContract> {
    DataContract::define(qn("Core.Named"), vec![key("Name", "Core.String")], vec![]).unwrap()
}

pub fn int_of(ctx: &Context) -> i64 {
    ctx.as_ref().expect("expected a value").payload::<i64>().unwrap()
}
