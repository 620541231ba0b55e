//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! trip settlement test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built trips and the canonical settlement scenarios
//! - `builders`: Builder patterns for trips, expenses and scenarios
//! - `assertions`: Settlement invariant checks with readable failures
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
