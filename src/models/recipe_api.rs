//! Wire types for the external recipe and video APIs.

use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

use super::{diet_display, Nutrition, RecipeDetail, RecipeSummary};
use crate::error::{AppError, AppResult};
use crate::services::duration::parse_iso_minutes;

// ============================================================================
// Recipe search API
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSearchRequest<'a> {
    pub ingredients: &'a [String],
    pub dietary_requirements: &'a [String],
    pub mandatory_ingredients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse {
    pub results: Vec<ApiRecipe>,
}

/// A value the API sends either as text or as a number
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TextValue {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for TextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextValue::Text(text) => write!(f, "{}", text),
            TextValue::Number(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecipe {
    pub recipe_name: String,
    pub ingredients_list: Vec<String>,
    pub duration: TextValue,
    pub serves: TextValue,
    pub recipe_url: String,
    pub recipe_image: String,
    #[serde(default)]
    pub dietary: Option<serde_json::Value>,
}

/// Extracts the slug from a recipe page URL: the last path segment without `.html`
pub fn slug_from_url(url: &str) -> String {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    segment.strip_suffix(".html").unwrap_or(segment).to_string()
}

impl From<ApiRecipe> for RecipeSummary {
    fn from(recipe: ApiRecipe) -> Self {
        RecipeSummary {
            name: decode_html_entities(&recipe.recipe_name).into_owned(),
            ingredients: recipe.ingredients_list,
            time: recipe.duration.to_string(),
            serves: recipe.serves.to_string(),
            instructions: Vec::new(),
            url: slug_from_url(&recipe.recipe_url),
            image: recipe.recipe_image,
            diet: diet_display(recipe.dietary.as_ref()),
        }
    }
}

// ============================================================================
// Recipe page structured data (schema.org Recipe in JSON-LD)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LdImageObject {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LdImage {
    Url(String),
    Object(LdImageObject),
}

impl LdImage {
    fn into_url(self) -> String {
        match self {
            LdImage::Url(url) => url,
            LdImage::Object(object) => object.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LdStep {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LdInstructions {
    Text(String),
    Steps(Vec<LdStep>),
    Lines(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdNutrition {
    #[serde(default)]
    pub calories: Option<TextValue>,
    #[serde(default)]
    pub fat_content: Option<TextValue>,
    #[serde(default)]
    pub protein_content: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdRecipe {
    pub name: String,
    pub recipe_ingredient: Vec<String>,
    pub total_time: String,
    #[serde(default)]
    pub recipe_cuisine: Option<OneOrMany<String>>,
    pub recipe_instructions: LdInstructions,
    #[serde(default)]
    pub url: Option<String>,
    pub image: OneOrMany<LdImage>,
    pub nutrition: LdNutrition,
    #[serde(default)]
    pub recipe_yield: Option<OneOrMany<TextValue>>,
}

fn decode(text: &str) -> String {
    decode_html_entities(text).trim().to_string()
}

impl LdRecipe {
    /// Normalizes the page data into a recipe detail for `slug`
    pub fn into_detail(self, slug: &str, page_url: &str) -> AppResult<RecipeDetail> {
        let time = parse_iso_minutes(&self.total_time)?;

        let image = self
            .image
            .into_vec()
            .into_iter()
            .next()
            .map(LdImage::into_url)
            .ok_or_else(|| AppError::Parse(format!("recipe '{}' has no image", slug)))?;

        let instructions = match self.recipe_instructions {
            LdInstructions::Text(text) => decode(&text),
            LdInstructions::Steps(steps) => steps
                .iter()
                .map(|step| decode(&step.text))
                .collect::<Vec<_>>()
                .join("\n"),
            LdInstructions::Lines(lines) => lines
                .iter()
                .map(|line| decode(line))
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let cuisine = self
            .recipe_cuisine
            .map(|c| c.into_vec().join(", "))
            .filter(|c| !c.is_empty());

        let feeds = self.recipe_yield.and_then(|y| {
            y.into_vec()
                .into_iter()
                .next()
                .map(|value| value.to_string())
        });

        Ok(RecipeDetail {
            name: decode(&self.name),
            ingredients: self.recipe_ingredient.iter().map(|i| decode(i)).collect(),
            time,
            cuisine,
            instructions,
            url: self.url.unwrap_or_else(|| page_url.to_string()),
            image,
            id: slug.to_string(),
            nutrition: Nutrition {
                calories: self.nutrition.calories.map(|v| v.to_string()),
                fats: self.nutrition.fat_content.map(|v| v.to_string()),
                protein: self.nutrition.protein_content.map(|v| v.to_string()),
            },
            feeds,
            video: None,
        })
    }
}

// ============================================================================
// Video search API
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VideoSearchResponse {
    #[serde(default)]
    pub items: Vec<VideoSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoSearchItem {
    pub id: VideoSearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSearchId {
    #[serde(default)]
    pub video_id: Option<String>,
}
