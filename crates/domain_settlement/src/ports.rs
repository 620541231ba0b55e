//! Settlement Domain Ports
//!
//! The settlement engine reads trips through [`TripSnapshotPort`]. Adapters
//! decide where the records live; the in-memory store in
//! [`crate::adapters`] is the reference implementation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_settlement::ports::TripSnapshotPort;
//! use std::sync::Arc;
//!
//! pub struct Reports {
//!     trips: Arc<dyn TripSnapshotPort>,
//! }
//!
//! impl Reports {
//!     pub async fn snapshot(&self, id: TripId) -> Result<TripSnapshot, PortError> {
//!         self.trips.load_snapshot(id).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ActivityId, Currency, DomainPort, HealthCheckable, MemberId, PortError, TripId};

use crate::model::{Expense, ExpenseCategory, Member, Trip, TripSnapshot};

/// Query parameters for listing a trip's expenses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseQuery {
    /// Filter by category
    pub category: Option<ExpenseCategory>,
    /// Filter by paying member
    pub paid_by: Option<MemberId>,
    /// Earliest calendar day, inclusive
    pub from_date: Option<NaiveDate>,
    /// Latest calendar day, inclusive
    pub to_date: Option<NaiveDate>,
    /// Filter by shared flag
    pub is_shared: Option<bool>,
    /// Offset for pagination
    pub offset: Option<u32>,
    /// Limit results
    pub limit: Option<u32>,
}

impl ExpenseQuery {
    /// Every expense of the trip
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a query to find expenses paid by one member
    pub fn by_payer(member_id: MemberId) -> Self {
        Self {
            paid_by: Some(member_id),
            ..Default::default()
        }
    }

    /// Creates a query to find expenses in one category
    pub fn by_category(category: ExpenseCategory) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    /// Restricts to a calendar day range, both ends inclusive
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from_date = Some(from);
        self.to_date = Some(to);
        self
    }

    /// Restricts to shared (`true`) or personal (`false`) expenses
    pub fn shared(mut self, is_shared: bool) -> Self {
        self.is_shared = Some(is_shared);
        self
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// True when `expense` passes every filter; pagination is not considered
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.category.is_some_and(|c| c != expense.category) {
            return false;
        }
        if self.paid_by.is_some_and(|m| m != expense.paid_by) {
            return false;
        }
        if self.is_shared.is_some_and(|s| s != expense.is_shared) {
            return false;
        }
        let day = expense.day();
        if self.from_date.is_some_and(|from| day < from) {
            return false;
        }
        if self.to_date.is_some_and(|to| day > to) {
            return false;
        }
        true
    }
}

/// Partial update of a member; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub factor: Option<Decimal>,
    pub is_admin: Option<bool>,
}

impl MemberUpdate {
    /// Writes the set fields onto `member`
    pub fn apply_to(self, member: &mut Member) {
        let MemberUpdate {
            name,
            email,
            factor,
            is_admin,
        } = self;

        if let Some(name) = name {
            member.name = name;
        }
        if let Some(email) = email {
            member.email = Some(email);
        }
        if let Some(factor) = factor {
            member.factor = factor;
        }
        if let Some(is_admin) = is_admin {
            member.is_admin = is_admin;
        }
    }
}

/// Partial update of an expense; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub activity_id: Option<ActivityId>,
    pub paid_by: Option<MemberId>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub exchange_rate: Option<Decimal>,
    pub category: Option<ExpenseCategory>,
    pub is_shared: Option<bool>,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

impl ExpenseUpdate {
    /// Writes the set fields onto `expense`
    pub fn apply_to(self, expense: &mut Expense) {
        let ExpenseUpdate {
            activity_id,
            paid_by,
            description,
            amount,
            currency,
            exchange_rate,
            category,
            is_shared,
            date,
        } = self;

        if let Some(activity_id) = activity_id {
            expense.activity_id = Some(activity_id);
        }
        if let Some(paid_by) = paid_by {
            expense.paid_by = paid_by;
        }
        if let Some(description) = description {
            expense.description = description;
        }
        if let Some(amount) = amount {
            expense.amount = amount;
        }
        if let Some(currency) = currency {
            expense.currency = currency;
        }
        if let Some(exchange_rate) = exchange_rate {
            expense.exchange_rate = exchange_rate;
        }
        if let Some(category) = category {
            expense.category = category;
        }
        if let Some(is_shared) = is_shared {
            expense.is_shared = is_shared;
        }
        if let Some(date) = date {
            expense.date = date;
        }
    }
}

/// Read access to trips and their records
///
/// All methods return `PortError::NotFound` for an unknown trip.
#[async_trait]
pub trait TripSnapshotPort: DomainPort + HealthCheckable {
    /// Retrieves a trip by ID
    async fn get_trip(&self, trip_id: TripId) -> Result<Trip, PortError>;

    /// Members of a trip in the order they were added
    async fn list_members(&self, trip_id: TripId) -> Result<Vec<Member>, PortError>;

    /// Expenses of a trip matching `query`, newest first
    async fn list_expenses(&self, trip_id: TripId, query: ExpenseQuery) -> Result<Vec<Expense>, PortError>;

    /// Trip, members and expenses read together
    ///
    /// Implementations must return records from a single consistent state;
    /// a snapshot never mixes members from before a write with expenses from
    /// after it.
    async fn load_snapshot(&self, trip_id: TripId) -> Result<TripSnapshot, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn expense_on(day: u32) -> Expense {
        Expense::new(
            TripId::new(),
            MemberId::new(),
            "Snacks",
            Money::new(dec!(20000), Currency::VND),
            Utc.with_ymd_and_hms(2024, 4, day, 23, 59, 0).unwrap(),
        )
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let query = ExpenseQuery::all().between(
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
        );

        assert!(!query.matches(&expense_on(1)));
        assert!(query.matches(&expense_on(2)));
        assert!(query.matches(&expense_on(3)));
        assert!(!query.matches(&expense_on(4)));
    }

    #[test]
    fn test_filters_combine() {
        let expense = expense_on(2).with_category(ExpenseCategory::Food);

        assert!(ExpenseQuery::by_category(ExpenseCategory::Food).matches(&expense));
        assert!(!ExpenseQuery::by_category(ExpenseCategory::Food).shared(false).matches(&expense));
        assert!(!ExpenseQuery::by_payer(MemberId::new()).matches(&expense));
        assert!(ExpenseQuery::by_payer(expense.paid_by).shared(true).matches(&expense));
    }

    #[test]
    fn test_member_update_leaves_unset_fields() {
        let mut member = Member::new(TripId::new(), "Chi").with_email("chi@example.com");
        MemberUpdate {
            factor: Some(dec!(0.5)),
            ..Default::default()
        }
        .apply_to(&mut member);

        assert_eq!(member.factor, dec!(0.5));
        assert_eq!(member.name, "Chi");
        assert_eq!(member.email.as_deref(), Some("chi@example.com"));
    }

    #[test]
    fn test_expense_update() {
        let mut expense = expense_on(2);
        ExpenseUpdate {
            amount: Some(dec!(35000)),
            is_shared: Some(false),
            ..Default::default()
        }
        .apply_to(&mut expense);

        assert_eq!(expense.amount, dec!(35000));
        assert!(!expense.is_shared);
        assert_eq!(expense.description, "Snacks");
    }
}
