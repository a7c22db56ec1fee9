use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Transaction;
use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TransactionSchema {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub tenant_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub due_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub order_id: String,
    pub gateway_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionSchema {
    fn from(tx: Transaction) -> Self {
        TransactionSchema {
            id: tx.id,
            rental_id: tx.rental_id,
            tenant_id: tx.tenant_id,
            amount: tx.amount,
            status: tx.status.as_str().to_string(),
            due_at: tx.due_at,
            paid_at: tx.paid_at,
            order_id: tx.order_id,
            gateway_ref: tx.gateway_ref,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionSchema>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let limit = pagination.limit.unwrap_or(20);
    let offset = pagination.offset.unwrap_or(0);

    let transactions = state.transactions.list_transactions(limit, offset).await?;

    Ok(Json(TransactionListResponse {
        transactions: transactions
            .into_iter()
            .map(TransactionSchema::from)
            .collect(),
        limit,
        offset,
    }))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.transactions.get_transaction(id).await?;
    Ok(Json(TransactionSchema::from(tx)))
}
