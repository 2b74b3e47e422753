use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{auth, handlers, AppState};
use crate::middleware::request_id::{
    make_span_with_request_id, request_id_middleware, REQUEST_ID_HEADER,
};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.web.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Sign-in
        .route("/signin", get(auth::signin))
        .route("/callback", get(auth::callback))
        .route("/signout", get(auth::signout))
        .route("/status", get(auth::status))
        .nest("/api/v1", api_routes())
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Profile
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // Recipes
        .route("/recipes/suggest", post(handlers::suggest_recipes))
        .route("/recipes/similar", post(handlers::similar_recipes))
        .route("/recipes/:slug", get(handlers::recipe_detail))
}
