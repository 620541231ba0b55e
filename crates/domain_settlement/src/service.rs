//! Settlement application service
//!
//! Loads a consistent snapshot through the storage port and hands it to the
//! engine. Holds no state of its own beyond the port handle.

use std::sync::Arc;
use tracing::instrument;

use core_kernel::{HealthCheckResult, MemberId, TripId};
use crate::engine::{MemberDebtSummary, SettlementEngine, TripSummary};
use crate::error::SettlementError;
use crate::model::Expense;
use crate::ports::{ExpenseQuery, TripSnapshotPort};
use crate::summary::{MemberSpending, SummaryAggregator};

/// Computes settlement reports for stored trips
#[derive(Clone)]
pub struct SettlementService {
    port: Arc<dyn TripSnapshotPort>,
    engine: SettlementEngine,
}

impl SettlementService {
    /// Creates a service reading from `port`
    pub fn new(port: Arc<dyn TripSnapshotPort>) -> Self {
        Self {
            port,
            engine: SettlementEngine::new(),
        }
    }

    /// Full settlement summary of a trip
    ///
    /// # Errors
    ///
    /// - `Port` if the trip cannot be loaded (`NotFound` for an unknown id)
    /// - `InvalidTripState` if the trip has no members or every factor is zero
    #[instrument(skip(self))]
    pub async fn trip_summary(&self, trip_id: TripId) -> Result<TripSummary, SettlementError> {
        let snapshot = self.port.load_snapshot(trip_id).await?;
        self.engine.summarize_snapshot(&snapshot)
    }

    /// What one member pays and receives
    ///
    /// # Errors
    ///
    /// As [`trip_summary`](Self::trip_summary), plus `UnknownMemberReference`
    /// when the member is not part of the trip.
    #[instrument(skip(self))]
    pub async fn member_debts(
        &self,
        trip_id: TripId,
        member_id: MemberId,
    ) -> Result<MemberDebtSummary, SettlementError> {
        self.trip_summary(trip_id).await?.member_debts(member_id)
    }

    /// Total out-of-pocket spend per member, personal expenses included
    #[instrument(skip(self))]
    pub async fn member_spending(&self, trip_id: TripId) -> Result<Vec<MemberSpending>, SettlementError> {
        let snapshot = self.port.load_snapshot(trip_id).await?;
        Ok(SummaryAggregator.by_member(snapshot.members(), snapshot.expenses()))
    }

    /// Expenses of a trip matching `query`, newest first
    pub async fn expenses(&self, trip_id: TripId, query: ExpenseQuery) -> Result<Vec<Expense>, SettlementError> {
        Ok(self.port.list_expenses(trip_id, query).await?)
    }

    /// Health of the storage collaborator
    pub async fn storage_health(&self) -> HealthCheckResult {
        self.port.health_check().await
    }
}
