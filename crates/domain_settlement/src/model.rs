//! Trip, member, and expense records
//!
//! These are plain value snapshots handed to the engine by the storage
//! collaborator. [`TripSnapshot`] bundles one trip with its members and
//! expenses after checking the record invariants the engine relies on.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use core_kernel::{ActivityId, Currency, ExpenseId, MemberId, Money, TripId};
use crate::error::SettlementError;
use crate::rounding::RoundingRule;

fn default_child_factor() -> Decimal {
    dec!(0.5)
}

fn default_factor() -> Decimal {
    Decimal::ONE
}

fn default_exchange_rate() -> Decimal {
    Decimal::ONE
}

fn default_shared() -> bool {
    true
}

/// Expense category used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Accommodation => "accommodation",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Other => "other",
        }
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        ExpenseCategory::Other
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub description: Option<String>,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Base currency every expense is converted into
    #[serde(default)]
    pub currency: Currency,
    /// Weight suggested for minors when members are added.
    /// Not consulted by the settlement computation.
    #[serde(default = "default_child_factor")]
    pub child_factor: Decimal,
    #[serde(default)]
    pub rounding_rule: RoundingRule,
}

impl Trip {
    /// Creates a trip with the default rounding rule and child factor
    pub fn new(
        name: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        Self {
            id: TripId::new_v7(),
            name: name.into(),
            description: None,
            destination: destination.into(),
            start_date,
            end_date,
            currency,
            child_factor: default_child_factor(),
            rounding_rule: RoundingRule::default(),
        }
    }

    pub fn with_rounding_rule(mut self, rule: impl Into<RoundingRule>) -> Self {
        self.rounding_rule = rule.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_child_factor(mut self, child_factor: Decimal) -> Self {
        self.child_factor = child_factor;
        self
    }

    /// True when `date` falls inside the trip, both ends inclusive
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// A trip participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub trip_id: TripId,
    pub name: String,
    pub email: Option<String>,
    /// Proportional weight of this member's share of shared costs
    #[serde(default = "default_factor")]
    pub factor: Decimal,
    #[serde(default)]
    pub is_admin: bool,
}

impl Member {
    /// Creates a member with factor 1
    pub fn new(trip_id: TripId, name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new_v7(),
            trip_id,
            name: name.into(),
            email: None,
            factor: default_factor(),
            is_admin: false,
        }
    }

    pub fn with_factor(mut self, factor: Decimal) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Money spent during a trip, paid by one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub trip_id: TripId,
    pub activity_id: Option<ActivityId>,
    pub paid_by: MemberId,
    pub description: String,
    /// Amount in `currency`
    pub amount: Decimal,
    pub currency: Currency,
    /// Rate converting `currency` into the trip's base currency
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: Decimal,
    #[serde(default)]
    pub category: ExpenseCategory,
    /// Only shared expenses are split between members
    #[serde(default = "default_shared")]
    pub is_shared: bool,
    pub date: DateTime<Utc>,
}

impl Expense {
    /// Creates a shared expense at exchange rate 1
    pub fn new(
        trip_id: TripId,
        paid_by: MemberId,
        description: impl Into<String>,
        amount: Money,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExpenseId::new_v7(),
            trip_id,
            activity_id: None,
            paid_by,
            description: description.into(),
            amount: amount.amount(),
            currency: amount.currency(),
            exchange_rate: default_exchange_rate(),
            category: ExpenseCategory::default(),
            is_shared: true,
            date,
        }
    }

    pub fn with_exchange_rate(mut self, rate: Decimal) -> Self {
        self.exchange_rate = rate;
        self
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_activity(mut self, activity_id: ActivityId) -> Self {
        self.activity_id = Some(activity_id);
        self
    }

    /// Marks the expense as personal, excluding it from the split
    pub fn personal(mut self) -> Self {
        self.is_shared = false;
        self
    }

    /// The amount as recorded, in its own currency
    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }

    /// Value in the trip's base currency (`amount * exchange_rate`), unrounded
    ///
    /// Records accepted by the store or by [`TripSnapshot::new`] always fit;
    /// use [`checked_effective_amount`](Self::checked_effective_amount) for
    /// anything else.
    pub fn effective_amount(&self) -> Decimal {
        self.amount * self.exchange_rate
    }

    /// Like [`effective_amount`](Self::effective_amount), but fails when the
    /// product leaves the decimal range
    pub fn checked_effective_amount(&self) -> Result<Decimal, SettlementError> {
        self.amount.checked_mul(self.exchange_rate).ok_or_else(|| {
            SettlementError::invalid_record(format!(
                "expense {}: {} at rate {} exceeds the decimal range",
                self.id, self.amount, self.exchange_rate
            ))
        })
    }

    /// Calendar day the expense is reported under
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Sum of the expenses' values in the trip currency
///
/// # Errors
///
/// `InvalidRecord` if a conversion or the running total leaves the decimal range.
pub fn checked_total<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Result<Decimal, SettlementError> {
    expenses.into_iter().try_fold(Decimal::ZERO, |total, expense| {
        let value = expense.checked_effective_amount()?;
        total.checked_add(value).ok_or_else(|| {
            SettlementError::invalid_record(format!(
                "adding expense {} pushes the trip total past the decimal range",
                expense.id
            ))
        })
    })
}

/// Checks that every expense payer appears in `members`
pub fn ensure_payers_known(members: &[Member], expenses: &[Expense]) -> Result<(), SettlementError> {
    let known: HashSet<MemberId> = members.iter().map(|m| m.id).collect();
    match expenses.iter().find(|e| !known.contains(&e.paid_by)) {
        Some(expense) => Err(SettlementError::UnknownMemberReference {
            member_id: expense.paid_by,
        }),
        None => Ok(()),
    }
}

/// A consistent, validated view of one trip
///
/// Invariants:
/// - every member and expense belongs to `trip`
/// - member factors are non-negative
/// - expense amounts and exchange rates are positive
/// - every expense payer is one of `members`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSnapshot {
    trip: Trip,
    members: Vec<Member>,
    expenses: Vec<Expense>,
}

impl TripSnapshot {
    /// Validates the records and bundles them
    ///
    /// # Errors
    ///
    /// - `InvalidRecord` if a record breaks a field invariant or belongs to another trip
    /// - `UnknownMemberReference` if an expense payer is not a member
    pub fn new(trip: Trip, members: Vec<Member>, expenses: Vec<Expense>) -> Result<Self, SettlementError> {
        for member in &members {
            if member.trip_id != trip.id {
                return Err(SettlementError::invalid_record(format!(
                    "member {} belongs to trip {}, not {}",
                    member.id, member.trip_id, trip.id
                )));
            }
            if member.factor < Decimal::ZERO {
                return Err(SettlementError::invalid_record(format!(
                    "member {} has negative factor {}",
                    member.id, member.factor
                )));
            }
        }

        for expense in &expenses {
            if expense.trip_id != trip.id {
                return Err(SettlementError::invalid_record(format!(
                    "expense {} belongs to trip {}, not {}",
                    expense.id, expense.trip_id, trip.id
                )));
            }
            if !expense.money().is_positive() {
                return Err(SettlementError::invalid_record(format!(
                    "expense {} has non-positive amount {}",
                    expense.id, expense.amount
                )));
            }
            expense
                .money()
                .convert(expense.exchange_rate)
                .map_err(|e| SettlementError::invalid_record(format!("expense {}: {}", expense.id, e)))?;
        }

        ensure_payers_known(&members, &expenses)?;
        checked_total(&expenses)?;

        Ok(Self { trip, members, expenses })
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    /// Members in insertion order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn into_parts(self) -> (Trip, Vec<Member>, Vec<Expense>) {
        (self.trip, self.members, self.expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trip() -> Trip {
        Trip::new(
            "Da Lat",
            "Da Lat, Vietnam",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            Currency::VND,
        )
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_effective_amount_applies_rate() {
        let trip = trip();
        let payer = Member::new(trip.id, "An");
        let expense = Expense::new(trip.id, payer.id, "Dinner", Money::new(dec!(40), Currency::USD), when())
            .with_exchange_rate(dec!(25000));

        assert_eq!(expense.effective_amount(), dec!(1000000));
    }

    #[test]
    fn test_out_of_range_expense_is_an_error() {
        let trip = trip();
        let payer = Member::new(trip.id, "An");
        let expense = Expense::new(
            trip.id,
            payer.id,
            "Yacht",
            Money::new(dec!(100000000000000000000), Currency::USD),
            when(),
        )
        .with_exchange_rate(dec!(25000000000));

        assert!(matches!(
            expense.checked_effective_amount(),
            Err(SettlementError::InvalidRecord(_))
        ));
        let result = TripSnapshot::new(trip, vec![payer], vec![expense]);
        assert!(matches!(result, Err(SettlementError::InvalidRecord(_))));
    }

    #[test]
    fn test_total_that_leaves_range_is_an_error() {
        let trip = trip();
        let payer = Member::new(trip.id, "An");
        let huge = || {
            Expense::new(
                trip.id,
                payer.id,
                "Villa",
                Money::new(dec!(50000000000000000000000000000), Currency::VND),
                when(),
            )
        };
        let expenses = vec![huge(), huge()];

        assert!(expenses[0].checked_effective_amount().is_ok());
        assert!(matches!(checked_total(&expenses), Err(SettlementError::InvalidRecord(_))));
    }

    #[test]
    fn test_snapshot_rejects_unknown_payer() {
        let trip = trip();
        let member = Member::new(trip.id, "An");
        let stranger = MemberId::new();
        let expense = Expense::new(trip.id, stranger, "Taxi", Money::new(dec!(90000), Currency::VND), when());

        let result = TripSnapshot::new(trip, vec![member], vec![expense]);
        assert!(matches!(
            result,
            Err(SettlementError::UnknownMemberReference { member_id }) if member_id == stranger
        ));
    }

    #[test]
    fn test_snapshot_rejects_foreign_member() {
        let trip = trip();
        let member = Member::new(TripId::new(), "Binh");

        let result = TripSnapshot::new(trip, vec![member], vec![]);
        assert!(matches!(result, Err(SettlementError::InvalidRecord(_))));
    }

    #[test]
    fn test_snapshot_rejects_zero_exchange_rate() {
        let trip = trip();
        let member = Member::new(trip.id, "An");
        let expense = Expense::new(trip.id, member.id, "Coffee", Money::new(dec!(3), Currency::USD), when())
            .with_exchange_rate(Decimal::ZERO);

        let result = TripSnapshot::new(trip, vec![member], vec![expense]);
        assert!(matches!(result, Err(SettlementError::InvalidRecord(_))));
    }

    #[test]
    fn test_snapshot_rejects_negative_factor() {
        let trip = trip();
        let member = Member::new(trip.id, "An").with_factor(dec!(-1));

        assert!(TripSnapshot::new(trip, vec![member], vec![]).is_err());
    }

    #[test]
    fn test_trip_covers_both_ends() {
        let trip = trip();
        assert!(trip.covers(trip.start_date));
        assert!(trip.covers(trip.end_date));
        assert!(!trip.covers(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()));
    }

    #[test]
    fn test_expense_defaults_from_json() {
        let trip = trip();
        let payer = MemberId::new();
        let json = serde_json::json!({
            "id": ExpenseId::new(),
            "trip_id": trip.id,
            "activity_id": null,
            "paid_by": payer,
            "description": "Bus tickets",
            "amount": "120000",
            "currency": "VND",
            "date": "2024-03-02T08:00:00Z"
        });

        let expense: Expense = serde_json::from_value(json).unwrap();
        assert_eq!(expense.exchange_rate, Decimal::ONE);
        assert_eq!(expense.category, ExpenseCategory::Other);
        assert!(expense.is_shared);
    }
}
