//! Trip settlement DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, ExpenseId, MemberId, TripId};
use domain_settlement::{
    Expense, ExpenseCategory, ExpenseQuery, MemberBalance, MemberDebtSummary, MemberSpending, Settlement,
    TripSummary,
};

use crate::error::ApiError;

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize, Deserialize)]
pub struct TripSummaryResponse {
    pub trip_id: TripId,
    pub currency: Currency,
    pub rounding_rule: u32,
    pub total_expenses: Decimal,
    pub total_shared_expenses: Decimal,
    pub member_balances: Vec<MemberBalance>,
    pub settlements: Vec<Settlement>,
    pub expense_by_category: BTreeMap<ExpenseCategory, Decimal>,
    pub expense_by_date: BTreeMap<NaiveDate, Decimal>,
}

impl From<TripSummary> for TripSummaryResponse {
    fn from(summary: TripSummary) -> Self {
        Self {
            trip_id: summary.trip_id,
            currency: summary.currency,
            rounding_rule: summary.rounding_rule.value(),
            total_expenses: summary.total_expenses,
            total_shared_expenses: summary.total_shared_expenses,
            member_balances: summary.member_balances,
            settlements: summary.settlements,
            expense_by_category: summary.expense_by_category,
            expense_by_date: summary.expense_by_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberDebtResponse {
    pub member_id: MemberId,
    pub member_name: String,
    pub balance: Decimal,
    pub should_pay: Decimal,
    pub should_receive: Decimal,
    pub related_settlements: Vec<Settlement>,
}

impl From<MemberDebtSummary> for MemberDebtResponse {
    fn from(debts: MemberDebtSummary) -> Self {
        Self {
            member_id: debts.member_balance.member_id,
            member_name: debts.member_balance.member_name,
            balance: debts.member_balance.balance,
            should_pay: debts.should_pay,
            should_receive: debts.should_receive,
            related_settlements: debts.related_settlements,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpendingResponse {
    pub total: Decimal,
    pub members: Vec<MemberSpending>,
}

impl From<Vec<MemberSpending>> for SpendingResponse {
    fn from(members: Vec<MemberSpending>) -> Self {
        Self {
            total: members.iter().map(|m| m.total_paid).sum(),
            members,
        }
    }
}

/// Query string of the expense listing
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListParams {
    pub category: Option<ExpenseCategory>,
    pub paid_by: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub is_shared: Option<bool>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl TryFrom<ExpenseListParams> for ExpenseQuery {
    type Error = ApiError;

    fn try_from(params: ExpenseListParams) -> Result<Self, Self::Error> {
        let paid_by = params
            .paid_by
            .map(|raw| {
                raw.parse::<MemberId>()
                    .map_err(|e| ApiError::BadRequest(format!("invalid paid_by '{}': {}", raw, e)))
            })
            .transpose()?;

        if let (Some(from), Some(to)) = (params.from, params.to) {
            if from > to {
                return Err(ApiError::BadRequest(format!("from {} is after to {}", from, to)));
            }
        }

        Ok(ExpenseQuery {
            category: params.category,
            paid_by,
            from_date: params.from,
            to_date: params.to,
            is_shared: params.is_shared,
            offset: params.offset,
            limit: Some(params.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    pub paid_by: MemberId,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub exchange_rate: Decimal,
    /// Amount in the trip currency
    pub effective_amount: Decimal,
    pub category: ExpenseCategory,
    pub is_shared: bool,
    pub date: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            effective_amount: expense.effective_amount(),
            id: expense.id,
            paid_by: expense.paid_by,
            description: expense.description,
            amount: expense.amount,
            currency: expense.currency,
            exchange_rate: expense.exchange_rate,
            category: expense.category,
            is_shared: expense.is_shared,
            date: expense.date,
        }
    }
}
