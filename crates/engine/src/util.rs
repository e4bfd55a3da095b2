//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parses a store identity.
///
/// A malformed identity can never match a stored row, so it is reported as a
/// missing key rather than a validation error.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("{label} {value}")))
}

/// Rejects inverted date ranges. Both bounds are inclusive.
pub(crate) fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::InvalidInput(
            "invalid range: start must be <= end".to_string(),
        ));
    }
    Ok(())
}
