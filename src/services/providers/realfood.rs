/// Recipe provider backed by a recipe site's ingredient-search API and recipe pages
///
/// Search goes through the site's JSON endpoint. Details are scraped from the
/// schema.org `Recipe` block (JSON-LD) embedded in each recipe page.
use reqwest::Client as HttpClient;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{
        recipe_api::{ApiSearchRequest, ApiSearchResponse, LdRecipe},
        RecipeDetail, RecipeSummary,
    },
    services::providers::{RecipeProvider, MAX_SUGGESTIONS},
};

#[derive(Clone)]
pub struct RealFoodProvider {
    http_client: HttpClient,
    search_url: String,
    site_url: String,
}

impl RealFoodProvider {
    pub fn new(http_client: HttpClient, search_url: String, site_url: String) -> Self {
        Self {
            http_client,
            search_url,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, slug: &str) -> String {
        format!("{}/recipes/{}.html", self.site_url, slug)
    }
}

/// Slugs are a single URL path segment made of ASCII letters, digits, `-` and `_`
pub fn validate_slug(slug: &str) -> AppResult<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid recipe slug '{}'", slug)))
    }
}

fn is_recipe_node(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .any(|t| t.as_str().is_some_and(|t| t.eq_ignore_ascii_case("recipe"))),
        _ => false,
    }
}

/// Finds the `Recipe` node in a JSON-LD document: the top-level object, an array item, or a `@graph` item
fn find_recipe_node(document: Value) -> Option<Value> {
    if is_recipe_node(&document) {
        return Some(document);
    }

    match document {
        Value::Array(items) => items.into_iter().find_map(find_recipe_node),
        Value::Object(mut object) => object.remove("@graph").and_then(find_recipe_node),
        _ => None,
    }
}

/// Extracts the schema.org `Recipe` object embedded in a recipe page
pub fn extract_recipe_json_ld(html: &str) -> AppResult<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#)
        .map_err(|e| AppError::Internal(format!("Invalid selector: {}", e)))?;

    let mut blocks = 0;
    for script in document.select(&selector) {
        blocks += 1;
        let text: String = script.text().collect();

        match serde_json::from_str::<Value>(text.trim()) {
            Ok(json) => {
                if let Some(recipe) = find_recipe_node(json) {
                    return Ok(recipe);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparseable JSON-LD block");
            }
        }
    }

    if blocks == 0 {
        Err(AppError::Parse(
            "Recipe page has no structured data block".to_string(),
        ))
    } else {
        Err(AppError::Parse(
            "Recipe page structured data describes no recipe".to_string(),
        ))
    }
}

#[async_trait::async_trait]
impl RecipeProvider for RealFoodProvider {
    async fn search_recipes(
        &self,
        ingredients: &[String],
        dietary_requirements: &[String],
    ) -> AppResult<Vec<RecipeSummary>> {
        let request = ApiSearchRequest {
            ingredients,
            dietary_requirements,
            mandatory_ingredients: Vec::new(),
        };

        let response = self
            .http_client
            .post(&self.search_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recipe search returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parsed: ApiSearchResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Unexpected recipe search response: {}", e)))?;

        let available = parsed.results.len();
        let recipes: Vec<RecipeSummary> = parsed
            .results
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(RecipeSummary::from)
            .collect();

        tracing::info!(
            ingredients = ingredients.len(),
            available,
            returned = recipes.len(),
            provider = self.name(),
            "Recipe search completed"
        );

        Ok(recipes)
    }

    async fn fetch_recipe_detail(&self, slug: &str) -> AppResult<RecipeDetail> {
        validate_slug(slug)?;

        let url = self.page_url(slug);
        let response = self.http_client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Recipe '{}'", slug)));
        }

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Recipe page returned status {}",
                status
            )));
        }

        let html = response.text().await?;
        let node = extract_recipe_json_ld(&html)?;
        let recipe: LdRecipe = serde_json::from_value(node)
            .map_err(|e| AppError::Parse(format!("Incomplete recipe data for '{}': {}", slug, e)))?;
        let detail = recipe.into_detail(slug, &url)?;

        tracing::info!(
            slug = %slug,
            minutes = detail.time,
            provider = self.name(),
            "Recipe detail fetched"
        );

        Ok(detail)
    }

    fn name(&self) -> &'static str {
        "realfood"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const SEARCH_PATH: &str = "/api/ingredientsearch/getrecipes";

    fn provider(server: &mockito::ServerGuard) -> RealFoodProvider {
        RealFoodProvider::new(
            HttpClient::new(),
            format!("{}{}", server.url(), SEARCH_PATH),
            server.url(),
        )
    }

    fn api_results(count: usize) -> String {
        let results: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "recipeName": format!("Recipe {}", i),
                    "ingredientsList": ["eggs", "milk"],
                    "duration": "20 mins",
                    "serves": 2,
                    "recipeUrl": format!("https://realfood.tesco.com/recipes/recipe-{}.html", i),
                    "recipeImage": format!("https://img.example/{}.jpg", i),
                    "dietary": ["Vegetarian", "Vegan"]
                })
            })
            .collect();
        json!({ "results": results }).to_string()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn page(json_ld: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
            <html>
            <head>
                <title>Recipe</title>
                <script type="application/ld+json">{json_ld}</script>
            </head>
            <body><h1>Recipe</h1></body>
            </html>"#
        )
    }

    #[tokio::test]
    async fn test_search_truncates_to_three() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", SEARCH_PATH)
            .match_body(Matcher::Json(json!({
                "ingredients": ["eggs", "milk"],
                "dietaryRequirements": ["Vegan"],
                "mandatoryIngredients": []
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(api_results(5))
            .create_async()
            .await;

        let recipes = provider(&server)
            .search_recipes(&strings(&["eggs", "milk"]), &strings(&["Vegan"]))
            .await
            .unwrap();

        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].name, "Recipe 0");
        assert_eq!(recipes[0].url, "recipe-0");
        assert_eq!(recipes[0].serves, "2");
        assert_eq!(recipes[0].diet, "Vegan");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_keeps_short_lists() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", SEARCH_PATH)
            .with_status(200)
            .with_body(api_results(2))
            .create_async()
            .await;

        let recipes = provider(&server)
            .search_recipes(&strings(&["eggs"]), &[])
            .await
            .unwrap();

        assert_eq!(recipes.len(), 2);
    }

    #[tokio::test]
    async fn test_search_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", SEARCH_PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = provider(&server).search_recipes(&strings(&["eggs"]), &[]).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_search_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", SEARCH_PATH)
            .with_status(200)
            .with_body(r#"{"recipes": []}"#)
            .create_async()
            .await;

        let result = provider(&server).search_recipes(&strings(&["eggs"]), &[]).await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_detail() {
        let mut server = mockito::Server::new_async().await;
        let json_ld = json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "Veggie chilli page"},
                {
                    "@type": "Recipe",
                    "name": "Veggie chilli",
                    "recipeIngredient": ["1 onion", "400g kidney beans"],
                    "totalTime": "PT45M",
                    "recipeCuisine": "Mexican",
                    "recipeInstructions": [
                        {"@type": "HowToStep", "text": "Fry the onion."},
                        {"@type": "HowToStep", "text": "Add the beans."}
                    ],
                    "image": [{"url": "https://img.example/chilli.jpg"}],
                    "nutrition": {"calories": "350", "fatContent": "8g", "proteinContent": "15g"},
                    "recipeYield": "4"
                }
            ]
        });
        server
            .mock("GET", "/recipes/veggie-chilli.html")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page(&json_ld.to_string()))
            .create_async()
            .await;

        let detail = provider(&server)
            .fetch_recipe_detail("veggie-chilli")
            .await
            .unwrap();

        assert_eq!(detail.name, "Veggie chilli");
        assert_eq!(detail.time, 45);
        assert_eq!(detail.instructions, "Fry the onion.\nAdd the beans.");
        assert_eq!(detail.url, format!("{}/recipes/veggie-chilli.html", server.url()));
        assert_eq!(detail.nutrition.protein.as_deref(), Some("15g"));
        assert_eq!(detail.id, "veggie-chilli");
    }

    #[tokio::test]
    async fn test_fetch_detail_without_structured_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/recipes/plain.html")
            .with_status(200)
            .with_body("<html><body>No data here</body></html>")
            .create_async()
            .await;

        let result = provider(&server).fetch_recipe_detail("plain").await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_detail_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/recipes/missing.html")
            .with_status(404)
            .create_async()
            .await;

        let result = provider(&server).fetch_recipe_detail("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_detail_rejects_bad_slug() {
        let server = mockito::Server::new_async().await;
        let result = provider(&server).fetch_recipe_detail("../admin").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_extract_skips_non_recipe_blocks() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Organization", "name": "Shop"}</script>
            <script type="application/ld+json">not json</script>
            <script type="application/ld+json">[{"@type": ["Recipe"], "name": "Soup"}]</script>
            </head></html>"#;

        let node = extract_recipe_json_ld(html).unwrap();
        assert_eq!(node["name"], "Soup");
    }

    #[test]
    fn test_extract_reports_missing_recipe() {
        let html = r#"<script type="application/ld+json">{"@type": "Organization"}</script>"#;
        assert!(matches!(
            extract_recipe_json_ld(html),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("quick-veggie_chilli2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("a.html").is_err());
    }
}
