//! Custom Test Assertions
//!
//! Settlement invariants expressed as assertions with messages that show the
//! offending figures.

use domain_settlement::{MemberBalance, RoundingRule, Settlement, TripSummary};
use rust_decimal::Decimal;

/// Asserts that balances sum to zero within rounding drift
///
/// Each member's balance goes through two roundings, so the allowed drift is
/// one rounding step per member.
///
/// # Panics
///
/// Panics if the absolute sum exceeds `balances.len() * rule.granularity()`.
pub fn assert_zero_sum(balances: &[MemberBalance], rule: RoundingRule) {
    let sum: Decimal = balances.iter().map(|b| b.balance).sum();
    let tolerance = rule.granularity() * Decimal::from(balances.len());
    assert!(
        sum.abs() <= tolerance,
        "Balances sum to {} which exceeds tolerance {} for {} members",
        sum,
        tolerance,
        balances.len()
    );
}

/// Asserts that every owed amount, balance and transfer is a multiple of a coarse rule
///
/// Does nothing for rules that round to the cent.
pub fn assert_rounded_to_rule(summary: &TripSummary) {
    let rule = summary.rounding_rule;
    if !rule.is_coarse() {
        return;
    }

    for balance in &summary.member_balances {
        assert!(
            rule.is_multiple(balance.total_owed),
            "{} owes {}, not a multiple of {}",
            balance.member_name,
            balance.total_owed,
            rule
        );
        assert!(
            rule.is_multiple(balance.balance),
            "{} has balance {}, not a multiple of {}",
            balance.member_name,
            balance.balance,
            rule
        );
    }
    for settlement in &summary.settlements {
        assert!(
            rule.is_multiple(settlement.amount),
            "Transfer {} -> {} of {} is not a multiple of {}",
            settlement.from_member_name,
            settlement.to_member_name,
            settlement.amount,
            rule
        );
    }
}

/// Asserts that transfers move exactly what the smaller side of the ledger holds
///
/// # Panics
///
/// Panics if Σ transfers differs from `min(Σ credits, Σ |debts|)`.
pub fn assert_conserved(balances: &[MemberBalance], settlements: &[Settlement]) {
    let credits: Decimal = balances.iter().filter(|b| b.is_creditor()).map(|b| b.balance).sum();
    let debts: Decimal = balances.iter().filter(|b| b.is_debtor()).map(|b| -b.balance).sum();
    let transferred: Decimal = settlements.iter().map(|s| s.amount).sum();

    assert_eq!(
        transferred,
        credits.min(debts),
        "Transferred {} but credits are {} and debts are {}",
        transferred,
        credits,
        debts
    );
}

/// Asserts that every transfer is positive and flows from a debtor to a creditor
pub fn assert_transfers_well_formed(balances: &[MemberBalance], settlements: &[Settlement]) {
    for settlement in settlements {
        assert!(
            settlement.amount > Decimal::ZERO,
            "Transfer {} -> {} has non-positive amount {}",
            settlement.from_member_name,
            settlement.to_member_name,
            settlement.amount
        );
        assert_ne!(settlement.from_member_id, settlement.to_member_id, "Transfer to self");

        let payer = balances.iter().find(|b| b.member_id == settlement.from_member_id);
        assert!(
            payer.is_some_and(MemberBalance::is_debtor),
            "{} pays but is not a debtor",
            settlement.from_member_name
        );
        let payee = balances.iter().find(|b| b.member_id == settlement.to_member_id);
        assert!(
            payee.is_some_and(MemberBalance::is_creditor),
            "{} receives but is not a creditor",
            settlement.to_member_name
        );
    }
}

/// Asserts the transfer count stays below the number of members with a non-zero balance
pub fn assert_transfer_count_bounded(balances: &[MemberBalance], settlements: &[Settlement]) {
    let active = balances.iter().filter(|b| !b.balance.is_zero()).count();
    assert!(
        settlements.len() < active.max(1),
        "{} transfers for {} unsettled members",
        settlements.len(),
        active
    );
}

/// Runs every structural check on a summary
pub fn assert_settlement_invariants(summary: &TripSummary) {
    assert_zero_sum(&summary.member_balances, summary.rounding_rule);
    assert_rounded_to_rule(summary);
    assert_conserved(&summary.member_balances, &summary.settlements);
    assert_transfers_well_formed(&summary.member_balances, &summary.settlements);
    assert_transfer_count_bounded(&summary.member_balances, &summary.settlements);
}
