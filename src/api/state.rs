use std::sync::Arc;

use axum::http::HeaderValue;

use crate::{
    auth::{IdentityProvider, SessionSettings},
    db::UserStore,
    services::RecipeService,
};

/// Browser-facing settings
#[derive(Debug, Clone)]
pub struct WebSettings {
    /// Frontend page users land on after signing in or out
    pub home_url: String,
    /// Origin allowed to make credentialed cross-origin requests
    pub cors_origin: HeaderValue,
}

/// Shared application state
///
/// Everything in here is read-only after startup, so clones are cheap and need no locking.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<RecipeService>,
    pub users: Arc<dyn UserStore>,
    /// `None` when sign-in is not configured
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub session: SessionSettings,
    pub web: Arc<WebSettings>,
}

impl AppState {
    pub fn new(
        recipes: RecipeService,
        users: Arc<dyn UserStore>,
        identity: Option<Arc<dyn IdentityProvider>>,
        session: SessionSettings,
        web: WebSettings,
    ) -> Self {
        Self {
            recipes: Arc::new(recipes),
            users,
            identity,
            session,
            web: Arc::new(web),
        }
    }
}
