//! Trip settlement handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::str::FromStr;

use core_kernel::{MemberId, TripId};
use domain_settlement::ExpenseQuery;

use crate::dto::trips::*;
use crate::{error::ApiError, AppState};

/// Parses an id given as a bare UUID or in its prefixed display form
fn parse_id<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {} id '{}': {}", what, raw, e)))
}

/// Gets the full settlement summary of a trip
pub async fn get_summary(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripSummaryResponse>, ApiError> {
    let trip_id: TripId = parse_id(&trip_id, "trip")?;
    let summary = state.service.trip_summary(trip_id).await?;
    Ok(Json(summary.into()))
}

/// Gets what one member pays and receives
pub async fn get_member_debts(
    State(state): State<AppState>,
    Path((trip_id, member_id)): Path<(String, String)>,
) -> Result<Json<MemberDebtResponse>, ApiError> {
    let trip_id: TripId = parse_id(&trip_id, "trip")?;
    let member_id: MemberId = parse_id(&member_id, "member")?;
    let debts = state.service.member_debts(trip_id, member_id).await?;
    Ok(Json(debts.into()))
}

/// Gets each member's total spend
pub async fn get_spending(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<SpendingResponse>, ApiError> {
    let trip_id: TripId = parse_id(&trip_id, "trip")?;
    let spending = state.service.member_spending(trip_id).await?;
    Ok(Json(spending.into()))
}

/// Lists a trip's expenses, newest first
pub async fn list_expenses(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let trip_id: TripId = parse_id(&trip_id, "trip")?;
    let query = ExpenseQuery::try_from(params)?;
    let expenses = state.service.expenses(trip_id, query).await?;
    Ok(Json(expenses.into_iter().map(ExpenseResponse::from).collect()))
}
