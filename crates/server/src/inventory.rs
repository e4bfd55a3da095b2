//! Inventory transaction endpoints

use api_types::{
    inventory::{TransactionNew, TransactionView},
    page::{DateRangeQuery, Page, PageQuery},
};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::PageRequest;

use crate::{
    ServerError,
    convert::{self, transaction_cmd, transaction_view},
    server::ServerState,
    validation::{Valid, ValidQuery},
};

/// Handle requests for recording a new transaction
pub async fn create(
    State(state): State<ServerState>,
    Valid(payload): Valid<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .record_transaction(&transaction_cmd(&payload))
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn list(
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Page<TransactionView>>, ServerError> {
    let request = PageRequest::new(query.page, query.limit, query.sort.as_deref());
    let page = state
        .engine
        .transactions(query.param.as_deref(), &request)
        .await?;
    Ok(Json(convert::page(page, transaction_view)))
}

/// Handle requests for transactions dated within `[start, end]`
pub async fn date_range(
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<DateRangeQuery>,
) -> Result<Json<Page<TransactionView>>, ServerError> {
    let request = PageRequest::range(query.page, query.sort.as_deref());
    let page = state
        .engine
        .transactions_between(query.start, query.end, &request)
        .await?;
    Ok(Json(convert::page(page, transaction_view)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(&id).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Valid(payload): Valid<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(&id, &transaction_cmd(&payload))
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.delete_transaction(&id).await?;
    Ok(Json(transaction_view(tx)))
}
