use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    matching::Ranking,
    middleware::request_id::RequestId,
    models::{ProfileData, RecipeDetail, RecipeSummary, SimilarRequest, SuggestRequest, UserProfile},
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Live recipe suggestions for a set of ingredients
pub async fn suggest_recipes(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SuggestRequest>,
) -> AppResult<Json<Vec<RecipeSummary>>> {
    tracing::info!(
        request_id = %request_id,
        ingredients = request.ingredients.len(),
        diet = request.diet.len(),
        "Processing recipe suggestion request"
    );

    let recipes = state
        .recipes
        .suggest(&request.ingredients, &request.diet)
        .await?;

    Ok(Json(recipes))
}

/// Ranks the ingredient corpus against the user's ingredients
pub async fn similar_recipes(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SimilarRequest>,
) -> AppResult<Json<Ranking>> {
    let ranking = state.recipes.similar(&request.ingredients, request.count)?;

    tracing::info!(
        request_id = %request_id,
        requested = request.count,
        returned = ranking.matches.len(),
        unknown = ranking.unknown_tokens.len(),
        "Similarity ranking completed"
    );

    Ok(Json(ranking))
}

/// Full recipe with an attached video reference
pub async fn recipe_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<RecipeDetail>> {
    let detail = state.recipes.detail(&slug).await?;
    Ok(Json(detail))
}

/// Profile of the signed-in user
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .users
        .get(&user.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for {}", user.email)))?;

    Ok(Json(profile))
}

/// Replaces the signed-in user's ingredients, allergies and dietary style
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<ProfileData>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .users
        .update_data(&user.email, &data.normalized())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for {}", user.email)))?;

    tracing::info!(
        email = %user.email,
        ingredients = profile.data.ingredients.len(),
        "Profile updated"
    );

    Ok(Json(profile))
}
