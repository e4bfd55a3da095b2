use axum::{
    Extension, Router,
    extract::{Request, State},
    handler::Handler,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use engine::{Engine, PartyKind};
use sea_orm::{DatabaseConnection, EntityTrait};

use std::sync::Arc;

use crate::{chambers, inventory, ledger, parties, user};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the caller from HTTP Basic credentials.
///
/// A missing header, unknown user or wrong password answers `401`.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(credentials) = request.headers().typed_get::<Authorization<Basic>>() else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = user::Entity::find_by_id(credentials.username())
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to load user: {err}");
            StatusCode::UNAUTHORIZED
        })?
        .filter(|user| user.password == credentials.password())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Lets only `ADMIN` callers through.
async fn require_admin(
    Extension(user): Extension<user::Model>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !user.is_admin() {
        tracing::debug!(username = %user.username, "admin route refused");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(request).await)
}

fn party_routes(kind: PartyKind) -> Router<ServerState> {
    Router::new()
        .route("/", get(parties::list).post(parties::create))
        .route(
            "/{id}",
            get(parties::get)
                .put(parties::update.layer(middleware::from_fn(require_admin)))
                .delete(parties::delete.layer(middleware::from_fn(require_admin))),
        )
        .layer(Extension(kind))
}

pub fn router(state: ServerState) -> Router {
    let inventory = Router::new()
        .route("/", get(inventory::list).post(inventory::create))
        .route("/daterange", get(inventory::date_range))
        .route(
            "/{id}",
            get(inventory::get)
                .put(inventory::update.layer(middleware::from_fn(require_admin)))
                .delete(inventory::delete.layer(middleware::from_fn(require_admin))),
        );

    let ledger = Router::new()
        .route("/", get(ledger::list).post(ledger::create))
        .route("/daterange", get(ledger::date_range))
        .route(
            "/{id}",
            get(ledger::get)
                .put(ledger::update.layer(middleware::from_fn(require_admin)))
                .delete(ledger::delete.layer(middleware::from_fn(require_admin))),
        );

    let chamber = Router::new()
        .route("/", get(chambers::list).post(chambers::create))
        .route(
            "/{id}",
            get(chambers::get)
                .put(chambers::update.layer(middleware::from_fn(require_admin)))
                .delete(chambers::delete.layer(middleware::from_fn(require_admin))),
        );

    Router::new()
        .nest("/api/customers", party_routes(PartyKind::Customer))
        .nest("/api/agents", party_routes(PartyKind::Agent))
        .nest("/api/inventory", inventory)
        .nest("/api/ledger", ledger)
        .nest("/api/chamber", chamber)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}
