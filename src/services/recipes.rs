use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    matching::{Ranking, SimilarityIndex},
    models::{clean_list, RecipeDetail, RecipeSummary, VideoRef},
    services::providers::{realfood::validate_slug, RecipeProvider, VideoProvider},
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAIL_CACHE_TTL: u64 = 86400; // 1 day
const VIDEO_CACHE_TTL: u64 = 604800; // 1 week

/// Largest ranking a caller may ask for
pub const MAX_SIMILAR: usize = 50;

/// Recipe suggestions and details, composed from the corpus ranker and the providers
pub struct RecipeService {
    recipes: Arc<dyn RecipeProvider>,
    videos: Arc<dyn VideoProvider>,
    index: Arc<SimilarityIndex>,
    cache: Cache,
}

/// Keyed on the exact lists sent upstream, so only identical requests share an entry
fn search_cache_key(ingredients: &[String], diet: &[String]) -> CacheKey {
    CacheKey::RecipeSearch(serde_json::json!([ingredients, diet]).to_string())
}

impl RecipeService {
    pub fn new(
        recipes: Arc<dyn RecipeProvider>,
        videos: Arc<dyn VideoProvider>,
        index: Arc<SimilarityIndex>,
        cache: Cache,
    ) -> Self {
        Self {
            recipes,
            videos,
            index,
            cache,
        }
    }

    /// Live recipe suggestions for the ingredients and dietary requirements
    pub async fn suggest(
        &self,
        ingredients: &[String],
        diet: &[String],
    ) -> AppResult<Vec<RecipeSummary>> {
        let ingredients = clean_list(ingredients);
        if ingredients.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one ingredient is required".to_string(),
            ));
        }
        let diet = clean_list(diet);

        let recipes: Vec<RecipeSummary> = cached!(
            self.cache,
            search_cache_key(&ingredients, &diet),
            SEARCH_CACHE_TTL,
            async { self.recipes.search_recipes(&ingredients, &diet).await }
        );

        Ok(recipes)
    }

    /// Corpus entries most similar to the ingredients, lowest similarity first
    pub fn similar(&self, ingredients: &[String], count: usize) -> AppResult<Ranking> {
        let ingredients = clean_list(ingredients);
        if ingredients.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one ingredient is required".to_string(),
            ));
        }
        if count > MAX_SIMILAR {
            return Err(AppError::InvalidInput(format!(
                "count must be at most {}",
                MAX_SIMILAR
            )));
        }

        Ok(self.index.rank(&ingredients, count))
    }

    /// Full recipe for a slug, with a video attached when one can be found
    pub async fn detail(&self, slug: &str) -> AppResult<RecipeDetail> {
        validate_slug(slug)?;

        let mut detail: RecipeDetail = cached!(
            self.cache,
            CacheKey::RecipeDetail(slug.to_string()),
            DETAIL_CACHE_TTL,
            async { self.recipes.fetch_recipe_detail(slug).await }
        );

        detail.video = Some(self.video_for(&detail.name).await);
        Ok(detail)
    }

    /// Looks up a video for the recipe; failures become an explicit unavailable state
    async fn video_for(&self, recipe_name: &str) -> VideoRef {
        let key = CacheKey::RecipeVideo(recipe_name.to_string());

        match self.cache.get_from_cache::<VideoRef>(&key).await {
            Ok(Some(video)) => return video,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Video cache read failed, treating as miss"),
        }

        match self.videos.find_video(recipe_name).await {
            Ok(video) => {
                // Only real hits are cached, so a key added later takes effect immediately
                if video.is_available() {
                    self.cache.set_in_background(&key, &video, VIDEO_CACHE_TTL);
                }
                video
            }
            Err(e) => {
                tracing::warn!(
                    recipe = %recipe_name,
                    provider = self.videos.name(),
                    error = %e,
                    "Video lookup failed"
                );
                VideoRef::unavailable(format!("Video lookup failed: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{CorpusEntry, IngredientCorpus};
    use crate::models::Nutrition;
    use crate::services::providers::{MockRecipeProvider, MockVideoProvider};

    fn index() -> Arc<SimilarityIndex> {
        let corpus = IngredientCorpus::new(vec![
            CorpusEntry {
                name: Some("Omelette".to_string()),
                ingredients: "eggs, butter, cheese".to_string(),
            },
            CorpusEntry {
                name: Some("Fried rice".to_string()),
                ingredients: "rice, eggs, peas, soy sauce".to_string(),
            },
        ])
        .unwrap();
        Arc::new(SimilarityIndex::build(corpus))
    }

    fn service(recipes: MockRecipeProvider, videos: MockVideoProvider) -> RecipeService {
        RecipeService::new(Arc::new(recipes), Arc::new(videos), index(), Cache::disabled())
    }

    fn summary(name: &str) -> RecipeSummary {
        RecipeSummary {
            name: name.to_string(),
            ingredients: vec!["eggs".to_string()],
            time: "10 mins".to_string(),
            serves: "1".to_string(),
            instructions: vec![],
            url: name.to_lowercase(),
            image: "https://img.example/x.jpg".to_string(),
            diet: "General".to_string(),
        }
    }

    fn detail(name: &str) -> RecipeDetail {
        RecipeDetail {
            name: name.to_string(),
            ingredients: vec!["eggs".to_string()],
            time: 10,
            cuisine: None,
            instructions: "Cook.".to_string(),
            url: "https://example.com/recipes/omelette.html".to_string(),
            image: "https://img.example/omelette.jpg".to_string(),
            id: "omelette".to_string(),
            nutrition: Nutrition::default(),
            feeds: Some("1".to_string()),
            video: None,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_suggest_cleans_input_before_search() {
        let mut recipes = MockRecipeProvider::new();
        recipes
            .expect_search_recipes()
            .withf(|ingredients, diet| {
                ingredients == ["eggs".to_string(), "milk".to_string()] && diet == ["Vegan".to_string()]
            })
            .times(1)
            .returning(|_, _| Ok(vec![summary("Pancakes")]));

        let service = service(recipes, MockVideoProvider::new());
        let result = service
            .suggest(&strings(&[" eggs ", "", "milk"]), &strings(&["Vegan", " "]))
            .await
            .unwrap();

        assert_eq!(result, vec![summary("Pancakes")]);
    }

    #[tokio::test]
    async fn test_suggest_requires_ingredients() {
        let mut recipes = MockRecipeProvider::new();
        recipes.expect_search_recipes().times(0);

        let service = service(recipes, MockVideoProvider::new());
        let result = service.suggest(&strings(&["  "]), &[]).await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_suggest_propagates_provider_failure() {
        let mut recipes = MockRecipeProvider::new();
        recipes
            .expect_search_recipes()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));

        let service = service(recipes, MockVideoProvider::new());
        let result = service.suggest(&strings(&["eggs"]), &[]).await;

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[test]
    fn test_similar_ranks_corpus() {
        let service = service(MockRecipeProvider::new(), MockVideoProvider::new());
        let ranking = service.similar(&strings(&["rice", "peas"]), 1).unwrap();

        assert_eq!(ranking.indices(), vec![1]);
        assert_eq!(ranking.matches[0].entry.name.as_deref(), Some("Fried rice"));
    }

    #[test]
    fn test_similar_rejects_huge_count() {
        let service = service(MockRecipeProvider::new(), MockVideoProvider::new());
        let result = service.similar(&strings(&["rice"]), MAX_SIMILAR + 1);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_detail_attaches_video() {
        let mut recipes = MockRecipeProvider::new();
        recipes
            .expect_fetch_recipe_detail()
            .withf(|slug| slug == "omelette")
            .returning(|_| Ok(detail("Omelette")));

        let mut videos = MockVideoProvider::new();
        videos
            .expect_find_video()
            .withf(|name| name == "Omelette")
            .returning(|_| {
                Ok(VideoRef::Available {
                    url: "https://www.youtube.com/embed/xyz".to_string(),
                })
            });

        let result = service(recipes, videos).detail("omelette").await.unwrap();

        assert_eq!(
            result.video,
            Some(VideoRef::Available {
                url: "https://www.youtube.com/embed/xyz".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_detail_video_failure_is_unavailable() {
        let mut recipes = MockRecipeProvider::new();
        recipes
            .expect_fetch_recipe_detail()
            .returning(|_| Ok(detail("Omelette")));

        let mut videos = MockVideoProvider::new();
        videos
            .expect_find_video()
            .returning(|_| Err(AppError::ExternalApi("quota exceeded".to_string())));
        videos.expect_name().return_const("youtube");

        let result = service(recipes, videos).detail("omelette").await.unwrap();

        match result.video {
            Some(VideoRef::Unavailable { reason }) => assert!(reason.contains("quota exceeded")),
            other => panic!("expected unavailable video, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_detail_rejects_bad_slug_before_fetch() {
        let mut recipes = MockRecipeProvider::new();
        recipes.expect_fetch_recipe_detail().times(0);

        let result = service(recipes, MockVideoProvider::new())
            .detail("../../etc/passwd")
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_detail_propagates_parse_failure() {
        let mut recipes = MockRecipeProvider::new();
        recipes
            .expect_fetch_recipe_detail()
            .returning(|_| Err(AppError::Parse("no structured data".to_string())));

        let mut videos = MockVideoProvider::new();
        videos.expect_find_video().times(0);

        let result = service(recipes, videos).detail("omelette").await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_cache_outage_falls_through_to_providers() {
        // Nothing listens on port 1, so every cache read fails
        let client = crate::db::create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _writer) = Cache::new(client).await;

        let mut recipes = MockRecipeProvider::new();
        recipes
            .expect_search_recipes()
            .times(1)
            .returning(|_, _| Ok(vec![summary("Pancakes")]));
        recipes
            .expect_fetch_recipe_detail()
            .times(1)
            .returning(|_| Ok(detail("Omelette")));

        let mut videos = MockVideoProvider::new();
        videos.expect_find_video().times(1).returning(|_| {
            Ok(VideoRef::Available {
                url: "https://www.youtube.com/embed/xyz".to_string(),
            })
        });
        videos.expect_name().return_const("youtube");

        let service = RecipeService::new(Arc::new(recipes), Arc::new(videos), index(), cache);

        let suggestions = service.suggest(&strings(&["eggs"]), &[]).await.unwrap();
        assert_eq!(suggestions, vec![summary("Pancakes")]);

        let result = service.detail("omelette").await.unwrap();
        assert_eq!(result.name, "Omelette");
        assert_eq!(
            result.video,
            Some(VideoRef::Available {
                url: "https://www.youtube.com/embed/xyz".to_string()
            })
        );
    }

    #[test]
    fn test_search_cache_key_matches_identical_lists() {
        let a = search_cache_key(&strings(&["eggs", "milk"]), &strings(&["Vegan"]));
        let b = search_cache_key(&strings(&["eggs", "milk"]), &strings(&["Vegan"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_cache_key_is_case_sensitive() {
        let a = search_cache_key(&strings(&["eggs"]), &strings(&["Vegan"]));
        let b = search_cache_key(&strings(&["eggs"]), &strings(&["vegan"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_search_cache_key_keeps_list_boundaries() {
        let joined = search_cache_key(&strings(&["a|b"]), &[]);
        let split = search_cache_key(&strings(&["a", "b"]), &[]);
        assert_ne!(joined, split);

        let moved = search_cache_key(&strings(&["eggs"]), &strings(&["vegan"]));
        let merged = search_cache_key(&strings(&["eggs", "vegan"]), &[]);
        assert_ne!(moved, merged);
    }
}
