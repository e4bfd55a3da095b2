//! Storage chamber endpoints

use api_types::{
    chamber::{ChamberNew, ChamberView},
    page::{Page, PageQuery},
};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::PageRequest;

use crate::{
    ServerError,
    convert::{self, chamber_input, chamber_view},
    server::ServerState,
    validation::{Valid, ValidQuery},
};

pub async fn create(
    State(state): State<ServerState>,
    Valid(payload): Valid<ChamberNew>,
) -> Result<Json<ChamberView>, ServerError> {
    let chamber = state.engine.new_chamber(&chamber_input(&payload)).await?;
    Ok(Json(chamber_view(chamber)))
}

pub async fn list(
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Page<ChamberView>>, ServerError> {
    let request = PageRequest::new(query.page, query.limit, query.sort.as_deref());
    let page = state.engine.chambers(&request).await?;
    Ok(Json(convert::page(page, chamber_view)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ChamberView>, ServerError> {
    let chamber = state.engine.chamber(&id).await?;
    Ok(Json(chamber_view(chamber)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Valid(payload): Valid<ChamberNew>,
) -> Result<Json<ChamberView>, ServerError> {
    let chamber = state
        .engine
        .update_chamber(&id, &chamber_input(&payload))
        .await?;
    Ok(Json(chamber_view(chamber)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ChamberView>, ServerError> {
    let chamber = state.engine.delete_chamber(&id).await?;
    Ok(Json(chamber_view(chamber)))
}
