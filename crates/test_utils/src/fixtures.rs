//! Pre-built Test Fixtures
//!
//! Ready-to-use trips and the canonical settlement scenarios. Every fixture
//! is deterministic apart from freshly generated identifiers.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, Money};
use domain_settlement::{Expense, Member, Trip, TripSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::builders::{TestTripBuilder, TripScenarioBuilder};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Amount in đồng
    pub fn vnd(amount: Decimal) -> Money {
        Money::new(amount, Currency::VND)
    }

    /// A typical group dinner
    pub fn vnd_dinner() -> Money {
        Money::new(dec!(1200000), Currency::VND)
    }

    /// A USD amount for exchange-rate tests
    pub fn usd_40() -> Money {
        Money::new(dec!(40.00), Currency::USD)
    }

    /// VND per USD used across the fixtures
    pub fn usd_vnd_rate() -> Decimal {
        dec!(25000)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// First day of the standard trip (Aug 1, 2024)
    pub fn trip_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    /// Last day of the standard trip (Aug 5, 2024)
    pub fn trip_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 5).unwrap()
    }

    /// Noon on the given day of the standard trip, counting from 1
    pub fn trip_day(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, day, 12, 0, 0).unwrap()
    }

    /// The day after the standard trip ends
    pub fn after_trip() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 6, 9, 0, 0).unwrap()
    }
}

/// Fixture for trips
pub struct TripFixtures;

impl TripFixtures {
    /// Five-day VND trip rounding to 1000
    pub fn vnd_trip() -> Trip {
        TestTripBuilder::new().build()
    }

    /// Same dates, USD, rounding to the cent
    pub fn usd_trip() -> Trip {
        TestTripBuilder::new()
            .with_name("Bangkok")
            .with_currency(Currency::USD)
            .with_rounding_rule(1)
            .build()
    }
}

/// A trip with its members and expenses, ready to hand to the engine
#[derive(Debug, Clone)]
pub struct TripScenario {
    pub trip: Trip,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
}

impl TripScenario {
    /// Looks a member up by name
    ///
    /// # Panics
    ///
    /// Panics if no member has that name.
    pub fn member(&self, name: &str) -> &Member {
        self.members
            .iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("scenario has no member named {name}"))
    }

    /// Validated snapshot of the scenario
    ///
    /// # Panics
    ///
    /// Panics if the scenario records are inconsistent.
    pub fn snapshot(&self) -> TripSnapshot {
        TripSnapshot::new(self.trip.clone(), self.members.clone(), self.expenses.clone())
            .expect("scenario records should form a valid snapshot")
    }
}

/// The canonical settlement scenarios
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    /// Two equal members, A pays 100 000 for both
    pub fn even_pair() -> TripScenario {
        TripScenarioBuilder::new(TripFixtures::vnd_trip())
            .member("A", Decimal::ONE)
            .member("B", Decimal::ONE)
            .shared_expense("A", dec!(100000))
            .build()
    }

    /// Factors 1, 1, 2; the factor-2 member pays 400 000
    pub fn weighted_family() -> TripScenario {
        TripScenarioBuilder::new(TripFixtures::vnd_trip())
            .member("A", Decimal::ONE)
            .member("B", Decimal::ONE)
            .member("C", dec!(2))
            .shared_expense("C", dec!(400000))
            .build()
    }

    /// Every member has factor 0
    pub fn zero_factors() -> TripScenario {
        TripScenarioBuilder::new(TripFixtures::vnd_trip())
            .member("A", Decimal::ZERO)
            .member("B", Decimal::ZERO)
            .shared_expense("A", dec!(50000))
            .build()
    }

    /// Only personal expenses
    pub fn personal_only() -> TripScenario {
        TripScenarioBuilder::new(TripFixtures::vnd_trip())
            .member("A", Decimal::ONE)
            .member("B", Decimal::ONE)
            .personal_expense("A", dec!(250000))
            .build()
    }

    /// Members but no expenses at all
    pub fn quiet_trip() -> TripScenario {
        TripScenarioBuilder::new(TripFixtures::vnd_trip())
            .member("A", Decimal::ONE)
            .member("B", Decimal::ONE)
            .member("C", Decimal::ONE)
            .build()
    }
}
