use serde::{Deserialize, Serialize};

pub mod recipe_api;
pub mod user_profile;

pub use user_profile::{ProfileData, UserProfile};

/// Diet label that is implied by every suggestion and left out of the display string
const IMPLIED_DIET: &str = "Vegetarian";

/// Display string used when a recipe carries no usable dietary information
const DEFAULT_DIET: &str = "General";

/// Recipe suggestion returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeSummary {
    pub name: String,
    pub ingredients: Vec<String>,
    /// Preparation time as published by the recipe source
    pub time: String,
    pub serves: String,
    /// Summaries never carry steps; fetch the detail for those
    pub instructions: Vec<String>,
    /// Recipe slug, used to request the detail
    pub url: String,
    pub image: String,
    pub diet: String,
}

/// Full recipe, scraped from the recipe's page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDetail {
    pub name: String,
    pub ingredients: Vec<String>,
    /// Total time in minutes
    pub time: u32,
    pub cuisine: Option<String>,
    pub instructions: String,
    pub url: String,
    pub image: String,
    /// Slug the detail was fetched with
    pub id: String,
    pub nutrition: Nutrition,
    pub feeds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Nutrition {
    pub calories: Option<String>,
    pub fats: Option<String>,
    pub protein: Option<String>,
}

/// Playable video attached to a recipe, or the reason there is none
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VideoRef {
    Available { url: String },
    Unavailable { reason: String },
}

impl VideoRef {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        VideoRef::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, VideoRef::Available { .. })
    }
}

/// Request body for live recipe suggestions
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub diet: Vec<String>,
}

/// Request body for corpus similarity ranking
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarRequest {
    pub ingredients: Vec<String>,
    #[serde(default = "default_similar_count")]
    pub count: usize,
}

fn default_similar_count() -> usize {
    5
}

/// Builds the dietary display string for a recipe.
///
/// A list of labels is joined with `", "` after dropping the implied vegetarian label;
/// anything that is not a list of strings yields `"General"`.
pub fn diet_display(dietary: Option<&serde_json::Value>) -> String {
    let labels = dietary.and_then(|value| value.as_array()).and_then(|items| {
        items
            .iter()
            .map(|item| item.as_str())
            .collect::<Option<Vec<&str>>>()
    });

    match labels {
        Some(labels) => labels
            .into_iter()
            .filter(|label| *label != IMPLIED_DIET)
            .collect::<Vec<_>>()
            .join(", "),
        None => DEFAULT_DIET.to_string(),
    }
}

/// Trims entries and drops blanks
pub fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diet_display_filters_vegetarian() {
        let value = json!(["Vegetarian", "Vegan"]);
        assert_eq!(diet_display(Some(&value)), "Vegan");
    }

    #[test]
    fn test_diet_display_only_vegetarian_is_empty() {
        let value = json!(["Vegetarian"]);
        assert_eq!(diet_display(Some(&value)), "");
    }

    #[test]
    fn test_diet_display_joins_labels() {
        let value = json!(["Vegan", "Gluten free", "Vegetarian", "Dairy free"]);
        assert_eq!(diet_display(Some(&value)), "Vegan, Gluten free, Dairy free");
    }

    #[test]
    fn test_diet_display_falls_back_to_general() {
        assert_eq!(diet_display(None), "General");
        assert_eq!(diet_display(Some(&json!(null))), "General");
        assert_eq!(diet_display(Some(&json!("Vegan"))), "General");
        assert_eq!(diet_display(Some(&json!(["Vegan", 3]))), "General");
    }

    #[test]
    fn test_video_ref_serialization() {
        let available = VideoRef::Available {
            url: "https://www.youtube.com/embed/abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&available).unwrap(),
            json!({"status": "available", "url": "https://www.youtube.com/embed/abc"})
        );

        let unavailable = VideoRef::unavailable("no results");
        assert_eq!(
            serde_json::to_value(&unavailable).unwrap(),
            json!({"status": "unavailable", "reason": "no results"})
        );
        assert!(!unavailable.is_available());
    }

    #[test]
    fn test_clean_list() {
        let items = vec![" eggs ".to_string(), "".to_string(), "  ".to_string(), "milk".to_string()];
        assert_eq!(clean_list(&items), vec!["eggs", "milk"]);
    }

    #[test]
    fn test_similar_request_default_count() {
        let request: SimilarRequest = serde_json::from_value(json!({"ingredients": ["rice"]})).unwrap();
        assert_eq!(request.count, 5);
    }
}
