//! Settlement Domain
//!
//! Weighted cost splitting and debt minimization for group trips.
//!
//! # Pipeline
//!
//! ```text
//! TripSnapshot ──► BalanceCalculator ──► SettlementMatcher ──► TripSummary
//!      │                                                          ▲
//!      └────────────────► SummaryAggregator ─────────────────────┘
//! ```
//!
//! - Shared expenses are converted to the trip currency, summed, and split in
//!   proportion to each member's factor
//! - Owed amounts and balances are rounded to the trip's [`RoundingRule`]
//! - Debtors and creditors are matched greedily, largest first, so the
//!   number of transfers stays below the number of members
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_settlement::{SettlementEngine, TripSnapshot};
//!
//! let snapshot = TripSnapshot::new(trip, members, expenses)?;
//! let summary = SettlementEngine::new().summarize_snapshot(&snapshot)?;
//! for transfer in &summary.settlements {
//!     println!("{} -> {}: {}", transfer.from_member_name, transfer.to_member_name, transfer.amount);
//! }
//! ```

pub mod adapters;
pub mod balance;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod ports;
pub mod rounding;
pub mod service;
pub mod summary;

pub use adapters::InMemoryTripStore;
pub use balance::{BalanceCalculator, MemberBalance};
pub use engine::{MemberDebtSummary, SettlementEngine, TripSummary};
pub use error::SettlementError;
pub use matcher::{Settlement, SettlementMatcher};
pub use model::{Expense, ExpenseCategory, Member, Trip, TripSnapshot};
pub use ports::{ExpenseQuery, ExpenseUpdate, MemberUpdate, TripSnapshotPort};
pub use rounding::{is_settled, RoundingRule, SETTLED_THRESHOLD};
pub use service::SettlementService;
pub use summary::{MemberSpending, SummaryAggregator};
