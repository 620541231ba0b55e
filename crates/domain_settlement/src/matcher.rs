//! Debt minimization
//!
//! Greedy two-cursor netting: the largest debtor pays the largest creditor
//! as much as both can absorb, then whichever side reached zero moves on.
//! Each step settles at least one member, so `d` debtors and `c` creditors
//! produce at most `d + c - 1` transfers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::MemberId;
use crate::balance::MemberBalance;
use crate::rounding::{is_settled, RoundingRule};

/// One directed transfer from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from_member_id: MemberId,
    pub from_member_name: String,
    pub to_member_id: MemberId,
    pub to_member_name: String,
    pub amount: Decimal,
}

impl Settlement {
    fn between(debtor: &MemberBalance, creditor: &MemberBalance, amount: Decimal) -> Self {
        Self {
            from_member_id: debtor.member_id,
            from_member_name: debtor.member_name.clone(),
            to_member_id: creditor.member_id,
            to_member_name: creditor.member_name.clone(),
            amount,
        }
    }

    /// True when `member_id` pays or receives in this transfer
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.from_member_id == member_id || self.to_member_id == member_id
    }
}

/// Reduces signed balances to a short list of transfers
#[derive(Debug, Clone, Copy)]
pub struct SettlementMatcher {
    rule: RoundingRule,
}

impl SettlementMatcher {
    pub fn new(rule: RoundingRule) -> Self {
        Self { rule }
    }

    /// Produces transfers that net `balances` to (near) zero
    ///
    /// `balances` is not modified; matching runs on a private copy of the
    /// running amounts. Transfers are emitted debtor by debtor, most
    /// indebted first. Whatever is left once either side runs out is
    /// rounding residue and is not chased.
    pub fn minimize_transfers(&self, balances: &[MemberBalance]) -> Vec<Settlement> {
        let mut running: Vec<Decimal> = balances.iter().map(|b| b.balance).collect();

        let mut debtors: Vec<usize> = (0..running.len())
            .filter(|&i| running[i].is_sign_negative() && !is_settled(running[i]))
            .collect();
        let mut creditors: Vec<usize> = (0..running.len())
            .filter(|&i| running[i].is_sign_positive() && !is_settled(running[i]))
            .collect();

        // Stable sorts: equal balances keep member order
        debtors.sort_by(|&a, &b| running[a].cmp(&running[b]));
        creditors.sort_by(|&a, &b| running[b].cmp(&running[a]));

        let mut settlements = Vec::with_capacity(debtors.len() + creditors.len());
        let (mut di, mut ci) = (0, 0);

        while di < debtors.len() && ci < creditors.len() {
            let (d, c) = (debtors[di], creditors[ci]);
            let transfer = self.rule.round(running[d].abs().min(running[c]));

            if transfer > Decimal::ZERO {
                settlements.push(Settlement::between(&balances[d], &balances[c], transfer));
                running[d] += transfer;
                running[c] -= transfer;
            }

            // Overshooting past zero only happens when rounding went up; that side is done too
            let debtor_done = is_settled(running[d]) || running[d] > Decimal::ZERO;
            let creditor_done = is_settled(running[c]) || running[c] < Decimal::ZERO;

            if !debtor_done && !creditor_done {
                // Nothing movable at this granularity: drop the smaller side
                if running[d].abs() <= running[c] {
                    di += 1;
                } else {
                    ci += 1;
                }
                continue;
            }

            if debtor_done {
                di += 1;
            }
            if creditor_done {
                ci += 1;
            }
        }

        settlements
    }
}
