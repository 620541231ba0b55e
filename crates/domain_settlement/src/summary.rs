//! Spending breakdowns for reporting

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::MemberId;
use crate::model::{Expense, ExpenseCategory, Member};

/// How much one member has paid out of pocket, shared or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSpending {
    pub member_id: MemberId,
    pub member_name: String,
    pub total_paid: Decimal,
    pub expense_count: usize,
}

/// Read-only reductions over a trip's expenses
///
/// Category and date totals cover shared expenses only. Values are exact
/// sums of effective amounts and are never rounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Shared spend per category
    pub fn by_category(&self, expenses: &[Expense]) -> BTreeMap<ExpenseCategory, Decimal> {
        let mut totals = BTreeMap::new();
        for expense in expenses.iter().filter(|e| e.is_shared) {
            *totals.entry(expense.category).or_insert(Decimal::ZERO) += expense.effective_amount();
        }
        totals
    }

    /// Shared spend per calendar day
    pub fn by_date(&self, expenses: &[Expense]) -> BTreeMap<NaiveDate, Decimal> {
        let mut totals = BTreeMap::new();
        for expense in expenses.iter().filter(|e| e.is_shared) {
            *totals.entry(expense.day()).or_insert(Decimal::ZERO) += expense.effective_amount();
        }
        totals
    }

    /// Everything each member paid, including personal expenses, in member order
    pub fn by_member(&self, members: &[Member], expenses: &[Expense]) -> Vec<MemberSpending> {
        let mut paid: HashMap<MemberId, (Decimal, usize)> = HashMap::new();
        for expense in expenses {
            let entry = paid.entry(expense.paid_by).or_insert((Decimal::ZERO, 0));
            entry.0 += expense.effective_amount();
            entry.1 += 1;
        }

        members
            .iter()
            .map(|member| {
                let (total_paid, expense_count) = paid.get(&member.id).copied().unwrap_or_default();
                MemberSpending {
                    member_id: member.id,
                    member_name: member.name.clone(),
                    total_paid,
                    expense_count,
                }
            })
            .collect()
    }
}
