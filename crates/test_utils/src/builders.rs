//! Test Data Builders
//!
//! Builders for trips, expenses and whole trip scenarios. Tests set only the
//! fields they care about; everything else comes from the fixtures.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{Currency, Money};
use domain_settlement::{Expense, ExpenseCategory, Member, RoundingRule, Trip};
use rust_decimal::Decimal;

use crate::fixtures::{TemporalFixtures, TripScenario};

/// Builder for constructing test trips
pub struct TestTripBuilder {
    name: String,
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    currency: Currency,
    rounding_rule: RoundingRule,
}

impl Default for TestTripBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTripBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            name: "Da Nang".to_string(),
            destination: "Da Nang, Vietnam".to_string(),
            start_date: TemporalFixtures::trip_start(),
            end_date: TemporalFixtures::trip_end(),
            currency: Currency::VND,
            rounding_rule: RoundingRule::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_rounding_rule(mut self, rule: u32) -> Self {
        self.rounding_rule = RoundingRule::new(rule);
        self
    }

    /// Builds the trip
    pub fn build(self) -> Trip {
        Trip::new(self.name, self.destination, self.start_date, self.end_date, self.currency)
            .with_rounding_rule(self.rounding_rule)
    }
}

/// Builder for constructing test expenses
pub struct TestExpenseBuilder {
    trip: Trip,
    paid_by: Member,
    description: String,
    amount: Decimal,
    currency: Currency,
    exchange_rate: Decimal,
    category: ExpenseCategory,
    is_shared: bool,
    date: DateTime<Utc>,
}

impl TestExpenseBuilder {
    /// Starts a shared expense in the trip currency on the first trip day
    pub fn new(trip: &Trip, paid_by: &Member, amount: Decimal) -> Self {
        Self {
            trip: trip.clone(),
            paid_by: paid_by.clone(),
            description: "Test expense".to_string(),
            amount,
            currency: trip.currency,
            exchange_rate: Decimal::ONE,
            category: ExpenseCategory::Other,
            is_shared: true,
            date: TemporalFixtures::trip_day(1),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Records the amount in a foreign currency at `rate`
    pub fn in_currency(mut self, currency: Currency, rate: Decimal) -> Self {
        self.currency = currency;
        self.exchange_rate = rate;
        self
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn personal(mut self) -> Self {
        self.is_shared = false;
        self
    }

    /// Builds the expense
    pub fn build(self) -> Expense {
        let mut expense = Expense::new(
            self.trip.id,
            self.paid_by.id,
            self.description,
            Money::new(self.amount, self.currency),
            self.date,
        )
        .with_exchange_rate(self.exchange_rate)
        .with_category(self.category);
        expense.is_shared = self.is_shared;
        expense
    }
}

/// Builder for a trip with named members and their expenses
pub struct TripScenarioBuilder {
    trip: Trip,
    members: Vec<Member>,
    expenses: Vec<Expense>,
}

impl TripScenarioBuilder {
    pub fn new(trip: Trip) -> Self {
        Self {
            trip,
            members: Vec::new(),
            expenses: Vec::new(),
        }
    }

    /// Adds a member; the first one added is the admin
    pub fn member(mut self, name: &str, factor: Decimal) -> Self {
        let mut member = Member::new(self.trip.id, name).with_factor(factor);
        member.is_admin = self.members.is_empty();
        self.members.push(member);
        self
    }

    /// Adds a shared expense paid by the named member
    ///
    /// # Panics
    ///
    /// Panics if the payer has not been added.
    pub fn shared_expense(self, payer: &str, amount: Decimal) -> Self {
        self.expense_with(payer, amount, |b| b)
    }

    /// Adds a personal expense paid by the named member
    pub fn personal_expense(self, payer: &str, amount: Decimal) -> Self {
        self.expense_with(payer, amount, TestExpenseBuilder::personal)
    }

    /// Adds an expense, letting the caller adjust the builder first
    pub fn expense_with(
        mut self,
        payer: &str,
        amount: Decimal,
        adjust: impl FnOnce(TestExpenseBuilder) -> TestExpenseBuilder,
    ) -> Self {
        let member = self
            .members
            .iter()
            .find(|m| m.name == payer)
            .unwrap_or_else(|| panic!("no member named {payer}"));
        let expense = adjust(TestExpenseBuilder::new(&self.trip, member, amount)).build();
        self.expenses.push(expense);
        self
    }

    pub fn build(self) -> TripScenario {
        TripScenario {
            trip: self.trip,
            members: self.members,
            expenses: self.expenses,
        }
    }
}
