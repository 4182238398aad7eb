//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod ai;
pub mod contact;
pub mod products;
pub mod vacancies;

use crate::errors::ApiError;

/// Reject malformed identifiers before any store access.
///
/// Every id-taking endpoint runs this first so a garbage id is a 400,
/// never a 404 or a wasted database round trip.
pub(crate) fn validate_id(id: &str) -> Result<(), ApiError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ApiError::bad_request("Invalid identifier format"))
}

/// Map a garde validation report to a 400 carrying the first failure.
pub(crate) fn validate_payload<T>(payload: &T) -> Result<(), ApiError>
where
    T: garde::Validate,
    T::Context: Default,
{
    payload.validate().map_err(|report| {
        let message = report
            .iter()
            .next()
            .map(|(path, error)| format!("{path}: {error}"))
            .unwrap_or_else(|| "Invalid request".to_string());
        ApiError::bad_request(message)
    })
}

/// Normalize an optional string field per the partial-update rule: a
/// field counts as supplied only when present and non-empty after
/// trimming.
pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
