//! Command handlers organized by category.
//!
//! | Module | Commands |
//! |--------|----------|
//! | `memory` | Declare, Assign, PathLookup |
//! | `object` | SelfReference, Native, Instantiate |
//! | `invoke` | Invoke |
//!
//! `Clear` has no handler; the executor resets the context directly.

pub mod invoke;
pub mod memory;
pub mod object;
