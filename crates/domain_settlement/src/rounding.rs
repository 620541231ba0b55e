//! Trip-level rounding of monetary amounts
//!
//! Every reported per-member figure and every transfer is snapped to the
//! trip's rounding rule. A rule of 1000 in a VND trip means "nearest 1000 đồng";
//! a rule of 0 or 1 means "nearest hundredth of the currency unit".

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balances with a magnitude below this are treated as settled
pub const SETTLED_THRESHOLD: Decimal = dec!(0.01);

/// Decimal places used when the rule does not ask for coarser rounding
pub const SUBUNIT_PLACES: u32 = 2;

/// Rounding granularity of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundingRule(u32);

impl RoundingRule {
    /// Round to the nearest hundredth
    pub const SUBUNIT: RoundingRule = RoundingRule(1);

    pub fn new(rule: u32) -> Self {
        Self(rule)
    }

    /// Returns the raw rule value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// True when the rule rounds to multiples larger than one unit
    pub fn is_coarse(&self) -> bool {
        self.0 > 1
    }

    /// The smallest step a rounded amount can take
    pub fn granularity(&self) -> Decimal {
        if self.is_coarse() {
            Decimal::from(self.0)
        } else {
            SETTLED_THRESHOLD
        }
    }

    /// Rounds an amount half-up (midpoint away from zero) to this rule
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_settlement::RoundingRule;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(RoundingRule::new(1000).round(dec!(33333.33)), dec!(33000));
    /// assert_eq!(RoundingRule::new(1000).round(dec!(-2500)), dec!(-3000));
    /// assert_eq!(RoundingRule::SUBUNIT.round(dec!(10.005)), dec!(10.01));
    /// ```
    pub fn round(&self, amount: Decimal) -> Decimal {
        if !self.is_coarse() {
            return amount.round_dp_with_strategy(SUBUNIT_PLACES, RoundingStrategy::MidpointAwayFromZero);
        }

        let step = Decimal::from(self.0);
        (amount / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * step
    }

    /// True when `amount` is already representable under this rule
    pub fn is_multiple(&self, amount: Decimal) -> bool {
        (amount % self.granularity()).is_zero()
    }
}

impl Default for RoundingRule {
    fn default() -> Self {
        Self(1000)
    }
}

impl From<u32> for RoundingRule {
    fn from(rule: u32) -> Self {
        Self(rule)
    }
}

impl fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_coarse() {
            write!(f, "nearest {}", self.0)
        } else {
            write!(f, "nearest {}", SETTLED_THRESHOLD)
        }
    }
}

/// True when a running balance is close enough to zero to stop matching it
pub fn is_settled(balance: Decimal) -> bool {
    balance.abs() < SETTLED_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subunit_rounds_half_up() {
        let rule = RoundingRule::SUBUNIT;
        assert_eq!(rule.round(dec!(2.345)), dec!(2.35));
        assert_eq!(rule.round(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_subunit_rounds_negative_midpoint_away_from_zero() {
        assert_eq!(RoundingRule::SUBUNIT.round(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_zero_rule_behaves_like_subunit() {
        assert_eq!(RoundingRule::new(0).round(dec!(7.125)), dec!(7.13));
    }

    #[test]
    fn test_coarse_rule_snaps_to_multiple() {
        let rule = RoundingRule::new(1000);
        assert_eq!(rule.round(dec!(133333.3333)), dec!(133000));
        assert_eq!(rule.round(dec!(66666.6666)), dec!(67000));
        assert_eq!(rule.round(dec!(1500)), dec!(2000));
        assert_eq!(rule.round(dec!(499.99)), dec!(0));
    }

    #[test]
    fn test_coarse_rule_negative_midpoint() {
        assert_eq!(RoundingRule::new(500).round(dec!(-750)), dec!(-1000));
        assert_eq!(RoundingRule::new(500).round(dec!(-749)), dec!(-500));
    }

    #[test]
    fn test_is_multiple() {
        let rule = RoundingRule::new(1000);
        assert!(rule.is_multiple(dec!(-42000)));
        assert!(!rule.is_multiple(dec!(42500)));
        assert!(RoundingRule::SUBUNIT.is_multiple(dec!(12.34)));
        assert!(!RoundingRule::SUBUNIT.is_multiple(dec!(12.345)));
    }

    #[test]
    fn test_is_settled_threshold() {
        assert!(is_settled(dec!(0.009)));
        assert!(is_settled(dec!(-0.009)));
        assert!(!is_settled(dec!(0.01)));
    }

    #[test]
    fn test_default_rule_is_one_thousand() {
        assert_eq!(RoundingRule::default().value(), 1000);
    }
}
