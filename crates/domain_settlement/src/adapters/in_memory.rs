//! In-memory trip store
//!
//! Keeps every trip with its members and expenses in one map behind a single
//! `RwLock`. Writes validate the same record rules a database would enforce
//! with constraints, so snapshots read back from the store always pass
//! [`TripSnapshot::new`].

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{
    AdapterHealth, DomainPort, ExpenseId, HealthCheckResult, HealthCheckable, MemberId, MoneyError, PortError,
    TripId,
};

use crate::model::{checked_total, Expense, Member, Trip, TripSnapshot};
use crate::ports::{ExpenseQuery, ExpenseUpdate, MemberUpdate, TripSnapshotPort};

#[derive(Debug, Clone)]
struct TripRecord {
    trip: Trip,
    members: Vec<Member>,
    expenses: Vec<Expense>,
}

impl TripRecord {
    fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Name and email must be unique among the trip's other members
    fn check_member(&self, member: &Member) -> Result<(), PortError> {
        if member.name.trim().is_empty() {
            return Err(PortError::validation_field("member name is empty", "name"));
        }
        if member.factor < Decimal::ZERO {
            return Err(PortError::validation_field(
                format!("factor {} is negative", member.factor),
                "factor",
            ));
        }

        let others = self.members.iter().filter(|m| m.id != member.id);
        for other in others {
            if other.name == member.name {
                return Err(PortError::conflict(format!(
                    "member named '{}' already exists in trip {}",
                    member.name, self.trip.id
                )));
            }
            if member.email.is_some() && other.email == member.email {
                return Err(PortError::conflict(format!(
                    "member with email '{}' already exists in trip {}",
                    member.email.as_deref().unwrap_or_default(),
                    self.trip.id
                )));
            }
        }
        Ok(())
    }

    fn check_expense(&self, expense: &Expense) -> Result<(), PortError> {
        if self.member(expense.paid_by).is_none() {
            return Err(PortError::validation_field(
                format!("payer {} is not a member of trip {}", expense.paid_by, self.trip.id),
                "paid_by",
            ));
        }
        if expense.amount <= Decimal::ZERO {
            return Err(PortError::validation_field("amount must be positive", "amount"));
        }
        match expense.money().convert(expense.exchange_rate) {
            Ok(_) => {}
            Err(MoneyError::InvalidExchangeRate(_)) => {
                return Err(PortError::validation_field("exchange rate must be positive", "exchange_rate"));
            }
            Err(e) => return Err(PortError::validation_field(e.to_string(), "amount")),
        }
        let others = self.expenses.iter().filter(|e| e.id != expense.id);
        let trip_total = checked_total(others)
            .ok()
            .zip(expense.checked_effective_amount().ok())
            .and_then(|(total, value)| total.checked_add(value));
        if trip_total.is_none() {
            return Err(PortError::validation_field(
                format!("expense pushes the total of trip {} past the decimal range", self.trip.id),
                "amount",
            ));
        }
        if !self.trip.covers(expense.day()) {
            return Err(PortError::validation_field(
                format!(
                    "expense date {} is outside the trip ({} to {})",
                    expense.day(),
                    self.trip.start_date,
                    self.trip.end_date
                ),
                "date",
            ));
        }
        Ok(())
    }
}

/// Process-local [`TripSnapshotPort`] implementation
///
/// Cloning is cheap and clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTripStore {
    trips: Arc<RwLock<HashMap<TripId, TripRecord>>>,
}

impl InMemoryTripStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trips held
    pub async fn trip_count(&self) -> usize {
        self.trips.read().await.len()
    }

    /// Adds a trip with no members or expenses
    ///
    /// # Errors
    ///
    /// - `PortError::Validation` if the trip ends before it starts
    /// - `PortError::Conflict` if a trip with the same id exists
    pub async fn insert_trip(&self, trip: Trip) -> Result<Trip, PortError> {
        if trip.end_date < trip.start_date {
            return Err(PortError::validation_field("trip ends before it starts", "end_date"));
        }

        let mut trips = self.trips.write().await;
        if trips.contains_key(&trip.id) {
            return Err(PortError::conflict(format!("trip {} already exists", trip.id)));
        }

        debug!(trip_id = %trip.id, name = %trip.name, "Inserted trip");
        trips.insert(
            trip.id,
            TripRecord {
                trip: trip.clone(),
                members: Vec::new(),
                expenses: Vec::new(),
            },
        );
        Ok(trip)
    }

    /// Adds a member to the trip named by `member.trip_id`
    ///
    /// The first member of a trip becomes its admin.
    ///
    /// # Errors
    ///
    /// - `PortError::NotFound` if the trip does not exist
    /// - `PortError::Validation` for an empty name or negative factor
    /// - `PortError::Conflict` if the name or email is taken in the trip
    pub async fn add_member(&self, mut member: Member) -> Result<Member, PortError> {
        let mut trips = self.trips.write().await;
        let record = trips
            .get_mut(&member.trip_id)
            .ok_or_else(|| PortError::not_found("Trip", member.trip_id))?;

        if record.member(member.id).is_some() {
            return Err(PortError::conflict(format!("member {} already exists", member.id)));
        }
        record.check_member(&member)?;

        if record.members.is_empty() {
            member.is_admin = true;
        }
        debug!(trip_id = %member.trip_id, member_id = %member.id, "Added member");
        record.members.push(member.clone());
        Ok(member)
    }

    /// Adds an expense to the trip named by `expense.trip_id`
    ///
    /// # Errors
    ///
    /// - `PortError::NotFound` if the trip does not exist
    /// - `PortError::Validation` if the payer is not a member, the amount or
    ///   rate is not positive, or the date falls outside the trip
    pub async fn add_expense(&self, expense: Expense) -> Result<Expense, PortError> {
        let mut trips = self.trips.write().await;
        let record = trips
            .get_mut(&expense.trip_id)
            .ok_or_else(|| PortError::not_found("Trip", expense.trip_id))?;

        if record.expenses.iter().any(|e| e.id == expense.id) {
            return Err(PortError::conflict(format!("expense {} already exists", expense.id)));
        }
        record.check_expense(&expense)?;

        debug!(
            trip_id = %expense.trip_id,
            expense_id = %expense.id,
            amount = %expense.amount,
            currency = %expense.currency,
            "Added expense"
        );
        record.expenses.push(expense.clone());
        Ok(expense)
    }

    /// Applies a partial update to a member
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trip or member; otherwise the same rules as
    /// [`add_member`](Self::add_member).
    pub async fn update_member(
        &self,
        trip_id: TripId,
        member_id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, PortError> {
        let mut trips = self.trips.write().await;
        let record = trips
            .get_mut(&trip_id)
            .ok_or_else(|| PortError::not_found("Trip", trip_id))?;

        let mut updated = record
            .member(member_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Member", member_id))?;
        update.apply_to(&mut updated);
        record.check_member(&updated)?;

        if let Some(slot) = record.members.iter_mut().find(|m| m.id == member_id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Applies a partial update to an expense
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trip or expense; otherwise the same rules as
    /// [`add_expense`](Self::add_expense).
    pub async fn update_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        update: ExpenseUpdate,
    ) -> Result<Expense, PortError> {
        let mut trips = self.trips.write().await;
        let record = trips
            .get_mut(&trip_id)
            .ok_or_else(|| PortError::not_found("Trip", trip_id))?;

        let position = record
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| PortError::not_found("Expense", expense_id))?;

        let mut updated = record.expenses[position].clone();
        update.apply_to(&mut updated);
        record.check_expense(&updated)?;

        record.expenses[position] = updated.clone();
        Ok(updated)
    }

    /// Removes an expense and returns it
    pub async fn remove_expense(&self, trip_id: TripId, expense_id: ExpenseId) -> Result<Expense, PortError> {
        let mut trips = self.trips.write().await;
        let record = trips
            .get_mut(&trip_id)
            .ok_or_else(|| PortError::not_found("Trip", trip_id))?;

        let position = record
            .expenses
            .iter()
            .position(|e| e.id == expense_id)
            .ok_or_else(|| PortError::not_found("Expense", expense_id))?;

        debug!(%trip_id, %expense_id, "Removed expense");
        Ok(record.expenses.remove(position))
    }
}

impl DomainPort for InMemoryTripStore {}

#[async_trait]
impl HealthCheckable for InMemoryTripStore {
    async fn health_check(&self) -> HealthCheckResult {
        let trips = self.trip_count().await;
        HealthCheckResult {
            adapter_id: "in-memory-trip-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some(format!("{} trips loaded", trips)),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl TripSnapshotPort for InMemoryTripStore {
    async fn get_trip(&self, trip_id: TripId) -> Result<Trip, PortError> {
        self.trips
            .read()
            .await
            .get(&trip_id)
            .map(|record| record.trip.clone())
            .ok_or_else(|| PortError::not_found("Trip", trip_id))
    }

    async fn list_members(&self, trip_id: TripId) -> Result<Vec<Member>, PortError> {
        self.trips
            .read()
            .await
            .get(&trip_id)
            .map(|record| record.members.clone())
            .ok_or_else(|| PortError::not_found("Trip", trip_id))
    }

    async fn list_expenses(&self, trip_id: TripId, query: ExpenseQuery) -> Result<Vec<Expense>, PortError> {
        let trips = self.trips.read().await;
        let record = trips
            .get(&trip_id)
            .ok_or_else(|| PortError::not_found("Trip", trip_id))?;

        let mut results: Vec<Expense> = record
            .expenses
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.date.cmp(&a.date));

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(results.into_iter().skip(offset).take(limit).collect())
    }

    async fn load_snapshot(&self, trip_id: TripId) -> Result<TripSnapshot, PortError> {
        let trips = self.trips.read().await;
        let record = trips
            .get(&trip_id)
            .ok_or_else(|| PortError::not_found("Trip", trip_id))?;

        TripSnapshot::new(record.trip.clone(), record.members.clone(), record.expenses.clone()).map_err(|e| {
            let source: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
            PortError::Internal {
                message: format!("stored records for trip {} are inconsistent", trip_id),
                source: Some(source),
            }
        })
    }
}
