//! Transactions API endpoints

use api_types::transaction::{
    SplitRequest, SplitResponse, TransactionListQuery, TransactionsResponse,
};
use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::{DateTime, Utc};
use engine::{MoneyCents, Rounding, SplitCmd, TransactionListFilter, User};
use upstream::MirrorExpense;

use crate::{
    ServerError,
    server::ServerState,
    views::{split_view, transaction_view},
};

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_issplit(value: &str) -> Result<bool, ServerError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ServerError::InvalidInput(format!(
            "issplit must be true or false, got {other}"
        ))),
    }
}

fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>, ServerError> {
    engine::parse_datetime(value)
        .map_err(|_| ServerError::InvalidInput(format!("{field} is not a valid date: {value}")))
}

/// Bounds are rounded inward so a filter never widens past what was asked.
fn parse_bound(value: &str, rounding: Rounding) -> Result<MoneyCents, ServerError> {
    Ok(MoneyCents::parse_bound(value, rounding)?)
}

fn list_filter(query: TransactionListQuery) -> Result<TransactionListFilter, ServerError> {
    Ok(TransactionListFilter {
        issplit: present(query.issplit)
            .map(|v| parse_issplit(&v))
            .transpose()?,
        start: present(query.start_date)
            .map(|v| parse_date("startDate", &v))
            .transpose()?,
        end: present(query.end_date)
            .map(|v| parse_date("endDate", &v))
            .transpose()?,
        min_amount: present(query.min_amount)
            .map(|v| parse_bound(&v, Rounding::Up))
            .transpose()?,
        max_amount: present(query.max_amount)
            .map(|v| parse_bound(&v, Rounding::Down))
            .transpose()?,
    })
}

/// Transactions the caller owns or takes part in, newest first.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    query: Result<Query<TransactionListQuery>, QueryRejection>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let Query(query) = query.map_err(|err| ServerError::InvalidInput(err.body_text()))?;
    let filter = list_filter(query)?;

    let transactions = state
        .engine
        .list_transactions(&user.id, &filter)
        .await?
        .iter()
        .map(transaction_view)
        .collect();

    Ok(Json(TransactionsResponse { transactions }))
}

/// Splits one of the caller's transactions evenly with friends, then
/// mirrors it when a mirror is configured.
///
/// The split is committed before mirroring; a mirror failure is reported as
/// 502 and leaves the split rows in place.
pub async fn split(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<SplitRequest>, JsonRejection>,
) -> Result<Json<SplitResponse>, ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::InvalidInput(err.body_text()))?;

    let outcome = state
        .engine
        .split_transaction(SplitCmd {
            transaction_id: payload.transaction_id,
            user_id: user.id.clone(),
            friend_ids: payload.friend_ids,
        })
        .await?;
    let splits = outcome.splits.iter().map(split_view).collect();

    let Some(mirror) = &state.mirror else {
        return Ok(Json(SplitResponse::Recorded { splits }));
    };

    let tx = &outcome.transaction;
    let expense = MirrorExpense {
        cost: MoneyCents::new(tx.amount_minor).to_string(),
        description: tx.description.clone(),
        date: tx.date,
    };
    let splitwise_data = mirror.create_expense(&expense).await.map_err(|err| {
        tracing::error!("transaction {} split but not mirrored: {err}", tx.id);
        ServerError::Upstream(err)
    })?;

    Ok(Json(SplitResponse::Mirrored {
        message: "Transaction split and mirrored".to_string(),
        splits,
        splitwise_data,
    }))
}
