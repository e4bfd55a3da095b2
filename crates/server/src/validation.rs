//! Request-shape validation.
//!
//! Bodies are deserialized and checked against their `validator` rules
//! before any engine call; the engine only enforces business rules. A failure,
//! including a malformed query string, answers `400` with the JSON error body.

use api_types::party::PartyPayload;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// A JSON body that passed [`Validate`].
pub(crate) struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ServerError::Validation(errors.to_string()))?;
        Ok(Valid(value))
    }
}

/// A query string that deserialized.
pub(crate) struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServerError::Validation(rejection.body_text()))?;
        Ok(ValidQuery(value))
    }
}

/// Agent registry writes need a phone: agents are only referenced by it.
pub(crate) fn agent(payload: &PartyPayload) -> Result<(), ServerError> {
    if !payload.has_phone() {
        return Err(ServerError::Validation("phone: is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_registry_requires_phone() {
        let mut payload = PartyPayload {
            name: "agent1".to_string(),
            father: "agentFather".to_string(),
            phone: None,
            address: None,
        };
        assert!(agent(&payload).is_err());
        payload.phone = Some("  ".to_string());
        assert!(agent(&payload).is_err());
        payload.phone = Some("01712345678".to_string());
        assert!(agent(&payload).is_ok());
    }
}
