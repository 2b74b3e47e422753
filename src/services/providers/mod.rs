/// Recipe and video data provider abstraction
///
/// Recipe providers serve both live ingredient search and recipe detail lookup
/// from the same source, so that a summary's slug can always be resolved by the
/// provider that produced it. Video providers find an embeddable cooking video for
/// a recipe name.
use crate::{
    error::AppResult,
    models::{RecipeDetail, RecipeSummary, VideoRef},
};

pub mod realfood;
pub mod youtube;

pub use realfood::RealFoodProvider;
pub use youtube::YouTubeProvider;

/// Most suggestions a live recipe search returns
pub const MAX_SUGGESTIONS: usize = 3;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Search recipes that use the given ingredients and satisfy the dietary requirements
    ///
    /// Returns at most [`MAX_SUGGESTIONS`] summaries.
    async fn search_recipes(
        &self,
        ingredients: &[String],
        dietary_requirements: &[String],
    ) -> AppResult<Vec<RecipeSummary>>;

    /// Fetch the full recipe for a slug taken from a summary
    ///
    /// The returned detail carries no video; see [`VideoProvider`].
    async fn fetch_recipe_detail(&self, slug: &str) -> AppResult<RecipeDetail>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoProvider: Send + Sync {
    /// Find a playable video for a recipe
    ///
    /// A missing API key or an empty result is `Ok(VideoRef::Unavailable)`;
    /// transport and response failures are errors.
    async fn find_video(&self, recipe_name: &str) -> AppResult<VideoRef>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
