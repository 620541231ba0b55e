//! Storage adapters for the settlement domain
//!
//! - **InMemoryTripStore**: process-local store behind a `tokio::sync::RwLock`,
//!   used by the HTTP server and by tests
//!
//! ```rust,ignore
//! use domain_settlement::adapters::InMemoryTripStore;
//! use domain_settlement::TripSnapshotPort;
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryTripStore::new());
//! let port: Arc<dyn TripSnapshotPort> = store.clone();
//! ```

pub mod in_memory;

pub use in_memory::InMemoryTripStore;
