//! Runtime configuration from `dblang.toml`.

use crate::common::*;
use dblang::{Command, Error, Runtime, RuntimeConfig, RuntimeOptions, Script, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = RuntimeConfig::from_dir(dir.path()).unwrap();
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn test_file_values_loaded() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "max_invoke_depth = 3\ndefault_capabilities = [\"io.read\"]\nexclusive_instances = false\n",
    )
    .unwrap();

    let config = RuntimeConfig::from_dir(dir.path()).unwrap();
    assert_eq!(config.max_invoke_depth, 3);
    assert!(config.default_capabilities.contains(&"io.read".into()));
    assert!(!config.exclusive_instances);
}

#[test]
fn test_malformed_file_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "max_invoke_depth = \"deep\"\n").unwrap();
    assert!(matches!(
        RuntimeConfig::from_dir(dir.path()),
        Err(Error::Config { .. })
    ));
}

#[tokio::test]
async fn test_options_override_file_depth() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "max_invoke_depth = 50\n").unwrap();
    let config = RuntimeConfig::from_dir(dir.path()).unwrap();
    let rt = Runtime::with_options(config, &RuntimeOptions::new().max_invoke_depth(1)).unwrap();

    let leaf = Script::builder(qn("Test.leaf")).build_shared();
    let top = Script::builder(qn("Test.top"))
        .command(Command::invoke(leaf, vec![]))
        .build_shared();
    let err = rt.invoke(&top, None, vec![]).await.unwrap_err();
    assert_eq!(err, Error::InvokeDepthExceeded { depth: 2, limit: 1 });
}

#[test]
fn test_invalid_override_rejected() {
    let err = Runtime::with_options(
        RuntimeConfig::default(),
        &RuntimeOptions::new().max_invoke_depth(0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
