//! Trip settlement orchestration
//!
//! [`SettlementEngine::summarize`] runs the whole pipeline for one trip:
//! balances, transfers, and reporting breakdowns, merged into a
//! [`TripSummary`]. It is a pure function of its inputs; calling it twice on
//! the same records yields the same summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use core_kernel::{Currency, MemberId, TripId};
use crate::balance::{BalanceCalculator, MemberBalance};
use crate::error::SettlementError;
use crate::matcher::{Settlement, SettlementMatcher};
use crate::model::{checked_total, ensure_payers_known, Expense, ExpenseCategory, Member, Trip, TripSnapshot};
use crate::rounding::RoundingRule;
use crate::summary::SummaryAggregator;

/// Complete settlement report for a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub trip_id: TripId,
    pub currency: Currency,
    pub rounding_rule: RoundingRule,
    /// All expenses, shared or personal, unrounded
    pub total_expenses: Decimal,
    /// Shared expenses only, unrounded
    pub total_shared_expenses: Decimal,
    pub member_balances: Vec<MemberBalance>,
    pub settlements: Vec<Settlement>,
    pub expense_by_category: BTreeMap<ExpenseCategory, Decimal>,
    pub expense_by_date: BTreeMap<NaiveDate, Decimal>,
}

impl TripSummary {
    /// Balance of one member
    pub fn balance_of(&self, member_id: MemberId) -> Option<&MemberBalance> {
        self.member_balances.iter().find(|b| b.member_id == member_id)
    }

    /// What one member has to pay and receive
    ///
    /// # Errors
    ///
    /// `UnknownMemberReference` if the member is not part of this summary.
    pub fn member_debts(&self, member_id: MemberId) -> Result<MemberDebtSummary, SettlementError> {
        let member_balance = self
            .balance_of(member_id)
            .cloned()
            .ok_or(SettlementError::UnknownMemberReference { member_id })?;

        let related_settlements: Vec<Settlement> = self
            .settlements
            .iter()
            .filter(|s| s.involves(member_id))
            .cloned()
            .collect();

        let should_pay = related_settlements
            .iter()
            .filter(|s| s.from_member_id == member_id)
            .map(|s| s.amount)
            .sum();
        let should_receive = related_settlements
            .iter()
            .filter(|s| s.to_member_id == member_id)
            .map(|s| s.amount)
            .sum();

        Ok(MemberDebtSummary {
            member_balance,
            related_settlements,
            should_pay,
            should_receive,
        })
    }
}

/// One member's slice of a [`TripSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDebtSummary {
    pub member_balance: MemberBalance,
    pub related_settlements: Vec<Settlement>,
    pub should_pay: Decimal,
    pub should_receive: Decimal,
}

/// Composes balance calculation, matching and aggregation
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    aggregator: SummaryAggregator,
}

impl SettlementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the full summary for a trip
    ///
    /// # Errors
    ///
    /// - `InvalidTripState` if the trip has no members or the factors sum to zero
    /// - `UnknownMemberReference` if an expense was paid by someone outside `members`
    /// - `InvalidRecord` if a converted amount or a total leaves the decimal range
    #[instrument(skip_all, fields(trip_id = %trip.id, members = members.len(), expenses = expenses.len()))]
    pub fn summarize(
        &self,
        trip: &Trip,
        members: &[Member],
        expenses: &[Expense],
    ) -> Result<TripSummary, SettlementError> {
        if members.is_empty() {
            return Err(SettlementError::invalid_state("trip has no members"));
        }
        ensure_payers_known(members, expenses)?;

        let rule = trip.rounding_rule;
        let total_expenses = checked_total(expenses)?;
        let total_shared_expenses = checked_total(expenses.iter().filter(|e| e.is_shared))?;

        let member_balances = BalanceCalculator::new(rule).compute_balances(members, expenses)?;
        let settlements = SettlementMatcher::new(rule).minimize_transfers(&member_balances);

        debug!(
            %total_expenses,
            %total_shared_expenses,
            %rule,
            transfers = settlements.len(),
            "Computed trip settlement"
        );
        log_residue(&member_balances, &settlements, rule);

        Ok(TripSummary {
            trip_id: trip.id,
            currency: trip.currency,
            rounding_rule: rule,
            total_expenses,
            total_shared_expenses,
            member_balances,
            settlements,
            expense_by_category: self.aggregator.by_category(expenses),
            expense_by_date: self.aggregator.by_date(expenses),
        })
    }

    /// Same as [`summarize`](Self::summarize) over a validated snapshot
    pub fn summarize_snapshot(&self, snapshot: &TripSnapshot) -> Result<TripSummary, SettlementError> {
        self.summarize(snapshot.trip(), snapshot.members(), snapshot.expenses())
    }
}

/// Rounding can leave creditors and debtors slightly out of step; report how much stayed unmatched
fn log_residue(balances: &[MemberBalance], settlements: &[Settlement], rule: RoundingRule) {
    let credits: Decimal = balances.iter().filter(|b| b.is_creditor()).map(|b| b.balance).sum();
    let debts: Decimal = balances.iter().filter(|b| b.is_debtor()).map(|b| -b.balance).sum();
    let transferred: Decimal = settlements.iter().map(|s| s.amount).sum();

    let residue = credits.max(debts) - transferred;
    if residue.is_zero() {
        return;
    }

    if residue >= rule.granularity() {
        warn!(%residue, %credits, %debts, "Settlement leaves rounding residue unmatched");
    } else {
        debug!(%residue, "Settlement rounding residue");
    }
}
