//! Core Kernel - Foundational types shared by the settlement workspace
//!
//! This crate provides the building blocks used by the domain and interface crates:
//! - Money and currency types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Port primitives for storage collaborators

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{TripId, MemberId, ExpenseId, ActivityId};
pub use ports::{PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable};
