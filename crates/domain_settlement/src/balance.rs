//! Per-member balances
//!
//! Shared spend is split by member factor: the total is divided by the sum
//! of all factors and each member owes that unit cost times their own factor,
//! regardless of what they personally paid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::MemberId;
use crate::error::SettlementError;
use crate::model::{checked_total, Expense, Member};
use crate::rounding::RoundingRule;

/// Net position of one member
///
/// Positive `balance` means the member should receive money, negative means
/// they should pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub member_name: String,
    /// Unrounded sum of the shared expenses this member paid
    pub total_paid: Decimal,
    /// This member's rounded share of all shared expenses
    pub total_owed: Decimal,
    /// `round(total_paid - total_owed)`
    pub balance: Decimal,
}

impl MemberBalance {
    pub fn is_creditor(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    pub fn is_debtor(&self) -> bool {
        self.balance < Decimal::ZERO
    }
}

/// Computes paid/owed/balance triples for a trip
#[derive(Debug, Clone, Copy)]
pub struct BalanceCalculator {
    rule: RoundingRule,
}

impl BalanceCalculator {
    pub fn new(rule: RoundingRule) -> Self {
        Self { rule }
    }

    /// Computes one balance per member, in member order
    ///
    /// Personal expenses in `expenses` are skipped.
    ///
    /// # Errors
    ///
    /// - `InvalidTripState` when `members` is empty or all factors sum to zero
    /// - `InvalidRecord` when an amount, total, or share leaves the decimal range
    pub fn compute_balances(
        &self,
        members: &[Member],
        expenses: &[Expense],
    ) -> Result<Vec<MemberBalance>, SettlementError> {
        if members.is_empty() {
            return Err(SettlementError::invalid_state("trip has no members"));
        }

        let total_factor = members
            .iter()
            .try_fold(Decimal::ZERO, |total, m| total.checked_add(m.factor))
            .ok_or_else(|| out_of_range("total member factor"))?;
        if total_factor.is_zero() {
            return Err(SettlementError::invalid_state("total member factor is zero"));
        }

        let shared: Vec<&Expense> = expenses.iter().filter(|e| e.is_shared).collect();
        let total_shared = checked_total(shared.iter().copied())?;

        let mut paid: HashMap<MemberId, Decimal> = HashMap::with_capacity(members.len());
        for expense in shared {
            let entry = paid.entry(expense.paid_by).or_insert(Decimal::ZERO);
            *entry = entry
                .checked_add(expense.effective_amount())
                .ok_or_else(|| out_of_range("amount paid"))?;
        }

        let cost_per_factor_unit = total_shared
            .checked_div(total_factor)
            .ok_or_else(|| out_of_range("cost per factor unit"))?;

        members
            .iter()
            .map(|member| {
                let total_paid = paid.get(&member.id).copied().unwrap_or(Decimal::ZERO);
                let share = cost_per_factor_unit
                    .checked_mul(member.factor)
                    .ok_or_else(|| out_of_range("member share"))?;
                let total_owed = self.rule.round(share);
                let balance = total_paid
                    .checked_sub(total_owed)
                    .ok_or_else(|| out_of_range("member balance"))?;
                Ok(MemberBalance {
                    member_id: member.id,
                    member_name: member.name.clone(),
                    total_paid,
                    total_owed,
                    balance: self.rule.round(balance),
                })
            })
            .collect()
    }
}

fn out_of_range(what: &str) -> SettlementError {
    SettlementError::invalid_record(format!("{} exceeds the decimal range", what))
}
