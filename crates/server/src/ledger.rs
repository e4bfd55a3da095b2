//! Ledger endpoints.
//!
//! Request bodies may carry derived amounts and party objects; they are
//! ignored and the stored entry always reflects the engine's computation.

use api_types::{
    ledger::{LedgerNew, LedgerView},
    page::{DateRangeQuery, Page, PageQuery},
};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::PageRequest;

use crate::{
    ServerError,
    convert::{self, ledger_cmd, ledger_view},
    server::ServerState,
    validation::{Valid, ValidQuery},
};

pub async fn create(
    State(state): State<ServerState>,
    Valid(payload): Valid<LedgerNew>,
) -> Result<Json<LedgerView>, ServerError> {
    let entry = state.engine.new_ledger_entry(&ledger_cmd(&payload)).await?;
    Ok(Json(ledger_view(entry)))
}

pub async fn list(
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Page<LedgerView>>, ServerError> {
    let request = PageRequest::new(query.page, query.limit, query.sort.as_deref());
    let page = state
        .engine
        .ledger_entries(query.param.as_deref(), &request)
        .await?;
    Ok(Json(convert::page(page, ledger_view)))
}

/// Handle requests for entries created within `[start, end]`
pub async fn date_range(
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<DateRangeQuery>,
) -> Result<Json<Page<LedgerView>>, ServerError> {
    let request = PageRequest::range(query.page, query.sort.as_deref());
    let page = state
        .engine
        .ledger_entries_between(query.start, query.end, &request)
        .await?;
    Ok(Json(convert::page(page, ledger_view)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<LedgerView>, ServerError> {
    let entry = state.engine.ledger_entry(&id).await?;
    Ok(Json(ledger_view(entry)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Valid(payload): Valid<LedgerNew>,
) -> Result<Json<LedgerView>, ServerError> {
    let entry = state
        .engine
        .update_ledger_entry(&id, &ledger_cmd(&payload))
        .await?;
    Ok(Json(ledger_view(entry)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<LedgerView>, ServerError> {
    let entry = state.engine.delete_ledger_entry(&id).await?;
    Ok(Json(ledger_view(entry)))
}
