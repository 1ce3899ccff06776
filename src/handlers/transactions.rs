use std::num::IntErrorKind;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, RawQuery, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::domain::Transaction;
use crate::error::AppError;
use crate::AppState;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;

#[derive(Debug, Serialize)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
    pub count: usize,
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIST_LIMIT)
}

/// First value of `key` in a raw query string; later repeats are ignored.
pub fn first_query_value(raw_query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(raw_query?.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Parses the `limit` query value. Out-of-range integers, including ones
/// too large for 64 bits, are clamped rather than rejected.
pub fn parse_limit(raw: Option<&str>) -> Result<i64, AppError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIST_LIMIT);
    };

    match raw.trim().parse::<i64>() {
        Ok(limit) => Ok(clamp_limit(limit)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(MAX_LIST_LIMIT),
            IntErrorKind::NegOverflow => Ok(1),
            _ => Err(AppError::BadRequest("limit must be an integer".to_string())),
        },
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let missing_body = || AppError::BadRequest("Invalid or missing JSON body".to_string());

    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected transaction body");
        missing_body()
    })?;
    // A literal `null` body carries no record at all.
    if body.is_null() {
        return Err(missing_body());
    }

    let recorded = state.recorder.execute(&body).await?;

    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let limit = parse_limit(first_query_value(query.as_deref(), "limit").as_deref())?;

    let transactions = state.transactions.list_recent(limit).await?;

    Ok(Json(TransactionList {
        count: transactions.len(),
        transactions,
    }))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound("transaction not found".to_string());

    let Path(id) = id.map_err(|_| not_found())?;
    let tx = state.transactions.get_by_id(id).await?.ok_or_else(not_found)?;

    Ok(Json(tx))
}
