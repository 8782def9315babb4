//! Axum extractor that rejects unauthenticated requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::Identity;
use crate::app_state::AppState;
use crate::error::BoardError;

/// The verified caller of a handler.
///
/// Extraction consults [`AppState::authenticator`] and fails with
/// [`BoardError::Unauthorized`] when it yields no identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = BoardError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticator
            .authenticate(&parts.headers)
            .await
            .map(Self)
            .ok_or(BoardError::Unauthorized)
    }
}
