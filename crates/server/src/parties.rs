//! Customer and agent registry endpoints.
//!
//! The same handlers serve both registries; the router supplies the
//! [`PartyKind`] as an extension.

use api_types::{
    page::{Page, PageQuery},
    party::{PartyPayload, PartyView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{PageRequest, PartyKind};

use crate::{
    ServerError,
    convert::{self, party_input, party_view},
    server::ServerState,
    validation::{self, Valid, ValidQuery},
};

fn checked(kind: PartyKind, payload: &PartyPayload) -> Result<(), ServerError> {
    if kind == PartyKind::Agent {
        validation::agent(payload)?;
    }
    Ok(())
}

/// Handle requests for registering a party
pub async fn create(
    Extension(kind): Extension<PartyKind>,
    State(state): State<ServerState>,
    Valid(payload): Valid<PartyPayload>,
) -> Result<Json<PartyView>, ServerError> {
    checked(kind, &payload)?;
    let party = state
        .engine
        .new_party(kind, &party_input(&payload))
        .await?;
    Ok(Json(party_view(party)))
}

pub async fn list(
    Extension(kind): Extension<PartyKind>,
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Page<PartyView>>, ServerError> {
    let request = PageRequest::new(query.page, query.limit, query.sort.as_deref());
    let page = state
        .engine
        .parties(kind, query.param.as_deref(), &request)
        .await?;
    Ok(Json(convert::page(page, party_view)))
}

pub async fn get(
    Extension(kind): Extension<PartyKind>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<PartyView>, ServerError> {
    let party = state.engine.party(kind, &id).await?;
    Ok(Json(party_view(party)))
}

pub async fn update(
    Extension(kind): Extension<PartyKind>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Valid(payload): Valid<PartyPayload>,
) -> Result<Json<PartyView>, ServerError> {
    checked(kind, &payload)?;
    let party = state
        .engine
        .update_party(kind, &id, &party_input(&payload))
        .await?;
    Ok(Json(party_view(party)))
}

pub async fn delete(
    Extension(kind): Extension<PartyKind>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<PartyView>, ServerError> {
    let party = state.engine.delete_party(kind, &id).await?;
    Ok(Json(party_view(party)))
}
