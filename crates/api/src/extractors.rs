//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use chirp_common::AppError;

/// Header carrying the caller's user ID, set by the upstream auth proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller extractor.
///
/// Rejects the request with `401` when the identity header is missing.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_id(parts).map(Self).ok_or(AppError::Unauthenticated)
    }
}

/// Optional caller extractor for routes that degrade anonymously.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(caller_id(parts)))
    }
}

fn caller_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
