//! `Owner` extractor: resolves the acting owner from the identity header.
//!
//! Authentication happens upstream; by the time a request reaches this
//! service the gateway has replaced any client-supplied value of
//! [`OWNER_HEADER`] with the verified user id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use citrus_core::error::AppError;
use citrus_core::types::OwnerId;
use citrus_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated user id.
pub const OWNER_HEADER: &str = "x-user-id";

/// Request context of the owner making the call.
#[derive(Debug, Clone)]
pub struct Owner(pub RequestContext);

impl Owner {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for Owner {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing X-User-Id header"))?;

        let owner_id = raw
            .trim()
            .parse::<OwnerId>()
            .map_err(|_| AppError::unauthorized("Invalid X-User-Id header"))?;

        Ok(Owner(RequestContext::new(owner_id)))
    }
}
