//! Property-Based Test Generators
//!
//! Proptest strategies producing trips whose records satisfy the snapshot
//! invariants: members belong to the trip, factors are non-negative with a
//! positive total, and every expense is paid by a member inside the trip dates.

use chrono::Duration;
use core_kernel::Currency;
use domain_settlement::{ExpenseCategory, RoundingRule};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::{TestExpenseBuilder, TestTripBuilder, TripScenarioBuilder};
use crate::fixtures::{TemporalFixtures, TripScenario};

/// Strategy for generating trip currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::VND),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::JPY),
        Just(Currency::KRW),
        Just(Currency::THB),
    ]
}

/// Strategy for generating expense categories
pub fn category_strategy() -> impl Strategy<Value = ExpenseCategory> {
    prop_oneof![
        Just(ExpenseCategory::Food),
        Just(ExpenseCategory::Transport),
        Just(ExpenseCategory::Accommodation),
        Just(ExpenseCategory::Entertainment),
        Just(ExpenseCategory::Shopping),
        Just(ExpenseCategory::Other),
    ]
}

/// Strategy for rounding rules seen in practice
pub fn rounding_rule_strategy() -> impl Strategy<Value = RoundingRule> {
    prop_oneof![
        Just(RoundingRule::new(0)),
        Just(RoundingRule::SUBUNIT),
        Just(RoundingRule::new(100)),
        Just(RoundingRule::new(500)),
        Just(RoundingRule::new(1000)),
    ]
}

/// Strategy for member factors: 0, 0.5, 1, 1.5 or 2
pub fn factor_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=4u32).prop_map(|halves| Decimal::new(halves as i64 * 5, 1))
}

/// Strategy for positive expense amounts with up to two decimal places
pub fn expense_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..500_000_000i64, 0u32..=2u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for exchange rates: mostly 1, sometimes a foreign rate
pub fn exchange_rate_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        3 => Just(Decimal::ONE),
        1 => (1i64..30_000i64).prop_map(Decimal::from),
        1 => (1i64..10_000i64).prop_map(|m| Decimal::new(m, 4)),
    ]
}

#[derive(Debug, Clone)]
struct ExpenseSeed {
    payer: usize,
    amount: Decimal,
    rate: Decimal,
    category: ExpenseCategory,
    shared: bool,
    day_offset: i64,
}

fn expense_seed_strategy(members: usize) -> impl Strategy<Value = ExpenseSeed> {
    (
        0..members,
        expense_amount_strategy(),
        exchange_rate_strategy(),
        category_strategy(),
        prop::bool::weighted(0.8),
        0i64..5i64,
    )
        .prop_map(|(payer, amount, rate, category, shared, day_offset)| ExpenseSeed {
            payer,
            amount,
            rate,
            category,
            shared,
            day_offset,
        })
}

/// Strategy for whole trips with 1 to `max_members` members and up to `max_expenses` expenses
///
/// The first member always has factor 1 so the total factor is positive.
pub fn trip_scenario_strategy(max_members: usize, max_expenses: usize) -> impl Strategy<Value = TripScenario> {
    let max_members = max_members.max(1);
    (1..=max_members, currency_strategy(), rounding_rule_strategy())
        .prop_flat_map(move |(members, currency, rule)| {
            (
                Just(currency),
                Just(rule),
                prop::collection::vec(factor_strategy(), members - 1),
                prop::collection::vec(expense_seed_strategy(members), 0..=max_expenses),
            )
        })
        .prop_map(|(currency, rule, extra_factors, seeds)| {
            let trip = TestTripBuilder::new()
                .with_currency(currency)
                .with_rounding_rule(rule.value())
                .build();

            let mut builder = TripScenarioBuilder::new(trip).member("M0", Decimal::ONE);
            for (i, factor) in extra_factors.into_iter().enumerate() {
                builder = builder.member(&format!("M{}", i + 1), factor);
            }

            let first_day = TemporalFixtures::trip_day(1);
            for seed in seeds {
                // Foreign amounts are recorded in USD at the generated rate
                let expense_currency = if seed.rate == Decimal::ONE { currency } else { Currency::USD };
                builder = builder.expense_with(&format!("M{}", seed.payer), seed.amount, |b: TestExpenseBuilder| {
                    let b = b
                        .in_currency(expense_currency, seed.rate)
                        .with_category(seed.category)
                        .on(first_day + Duration::days(seed.day_offset));
                    if seed.shared {
                        b
                    } else {
                        b.personal()
                    }
                });
            }
            builder.build()
        })
}
