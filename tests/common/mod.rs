//! Shared test utilities for lexpand integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Fixtures are plain values built in memory; only the
//! loader and compiler harnesses touch the filesystem, through `tempfile`.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
