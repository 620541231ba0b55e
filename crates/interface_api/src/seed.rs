//! Startup data loading
//!
//! Reads a JSON document of trips and writes it into the in-memory store
//! through the store's validating inserts.
//!
//! ```json
//! { "trips": [ { "trip": { ... }, "members": [ ... ], "expenses": [ ... ] } ] }
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use core_kernel::PortError;
use domain_settlement::{Expense, InMemoryTripStore, Member, Trip};

/// Errors raised while loading a seed file
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed data rejected by the store: {0}")]
    Store(#[from] PortError),
}

#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    pub trips: Vec<SeedTrip>,
}

#[derive(Debug, Deserialize)]
pub struct SeedTrip {
    pub trip: Trip,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

/// Counts of records loaded
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub trips: usize,
    pub members: usize,
    pub expenses: usize,
}

/// Writes every trip of `document` into `store`
///
/// Members are added in document order, so the first member listed for a
/// trip becomes its admin.
pub async fn apply_seed(store: &InMemoryTripStore, document: SeedDocument) -> Result<SeedStats, SeedError> {
    let mut stats = SeedStats::default();

    for SeedTrip { trip, members, expenses } in document.trips {
        store.insert_trip(trip).await?;
        stats.trips += 1;

        for member in members {
            store.add_member(member).await?;
            stats.members += 1;
        }
        for expense in expenses {
            store.add_expense(expense).await?;
            stats.expenses += 1;
        }
    }

    Ok(stats)
}

/// Reads and applies the seed file at `path`
pub async fn load_seed_file(store: &InMemoryTripStore, path: impl AsRef<Path>) -> Result<SeedStats, SeedError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let document: SeedDocument = serde_json::from_str(&raw)?;
    let stats = apply_seed(store, document).await?;

    info!(
        path = %path.display(),
        trips = stats.trips,
        members = stats.members,
        expenses = stats.expenses,
        "Loaded seed data"
    );
    Ok(stats)
}
