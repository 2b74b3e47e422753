use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_cookies::Cookies;

use super::{Session, VerifiedIdentity};
use crate::{api::AppState, error::AppError};

/// Extractor for routes that require a signed-in user.
///
/// Rejects with 401 when the session carries no user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub VerifiedIdentity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        Session::load(&cookies, &state.session)
            .user
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}
