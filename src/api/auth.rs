use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, IdentityProvider, Session},
    error::{AppError, AppResult},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user denied access
    pub error: Option<String>,
}

fn identity(state: &AppState) -> AppResult<&dyn IdentityProvider> {
    state
        .identity
        .as_deref()
        .ok_or_else(|| AppError::Unavailable("Sign-in is not configured".to_string()))
}

/// Starts the sign-in flow by redirecting to the identity provider
pub async fn signin(State(state): State<AppState>, cookies: Cookies) -> AppResult<Redirect> {
    let provider = identity(&state)?;

    let oauth_state = Uuid::new_v4().simple().to_string();
    let authorization_url = provider.authorization_url(&oauth_state)?;

    let mut session = Session::load(&cookies, &state.session);
    session.oauth_state = Some(oauth_state);
    session.store(&cookies, &state.session);

    Ok(Redirect::to(&authorization_url))
}

/// Completes sign-in: checks the state, verifies the identity, and creates the profile on first visit
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> AppResult<Redirect> {
    let provider = identity(&state)?;
    let mut session = Session::load(&cookies, &state.session);

    // A state is single-use, whatever the outcome
    let expected_state = session.oauth_state.take();
    session.store(&cookies, &state.session);

    if let Some(error) = params.error {
        return Err(AppError::InvalidInput(format!("Sign-in was denied: {}", error)));
    }

    match (expected_state, params.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            tracing::warn!("OAuth state mismatch on callback");
            return Err(AppError::InvalidInput("Invalid sign-in state".to_string()));
        }
    }

    let code = params
        .code
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let user = provider.authenticate(&code).await.map_err(|e| {
        tracing::error!(provider = provider.name(), error = %e, "Sign-in callback failed");
        AppError::Internal("Sign-in failed".to_string())
    })?;

    state.users.upsert_by_email(&user).await?;

    session.user = Some(user);
    session.store(&cookies, &state.session);

    Ok(Redirect::to(&state.web.home_url))
}

/// Clears the session and returns to the frontend
pub async fn signout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    Session::clear(&cookies, &state.session);
    Redirect::to(&state.web.home_url)
}

/// Succeeds only for signed-in users
pub async fn status(CurrentUser(_user): CurrentUser) -> Json<Value> {
    Json(json!({}))
}
