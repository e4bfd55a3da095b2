use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod chambers;
mod convert;
mod inventory;
mod ledger;
mod parties;
mod server;
mod user;
mod validation;

pub mod types {
    pub mod party {
        pub use api_types::party::{PartyPayload, PartyView, SnapshotView};
    }

    pub mod inventory {
        pub use api_types::inventory::{InventoryType, TransactionNew, TransactionView};
    }

    pub mod ledger {
        pub use api_types::ledger::{LedgerNew, LedgerView};
    }

    pub mod chamber {
        pub use api_types::chamber::{ChamberNew, ChamberView};
    }

    pub mod page {
        pub use api_types::page::{DateRangeQuery, Page, PageQuery};
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// A request body that fails shape validation.
    Validation(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Validation(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
