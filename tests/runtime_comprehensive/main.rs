//! Runtime Comprehensive Test Suite
//!
//! End-to-end coverage of the public `dblang` API: type and contract
//! definitions, linked memory views, library loading, script execution and
//! configuration.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test runtime_comprehensive
//!
//! # Run one module
//! cargo test --test runtime_comprehensive type_model::
//!
//! # Show runtime logs
//! RUST_LOG=dblang=debug cargo test --test runtime_comprehensive -- --nocapture
//! ```

mod common;

mod config;
mod libraries;
mod linked_memory;
mod scripts;
mod type_model;
