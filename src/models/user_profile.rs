use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clean_list;

/// Kitchen data a user keeps on their profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileData {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, rename = "dietaryStyle")]
    pub dietary_style: Vec<String>,
}

impl ProfileData {
    /// Trims every entry and drops blanks and duplicates, keeping first occurrences
    pub fn normalized(&self) -> Self {
        fn dedup(items: &[String]) -> Vec<String> {
            let mut seen: Vec<String> = Vec::new();
            for item in clean_list(items) {
                if !seen.iter().any(|s| s.eq_ignore_ascii_case(&item)) {
                    seen.push(item);
                }
            }
            seen
        }

        Self {
            ingredients: dedup(&self.ingredients),
            allergies: dedup(&self.allergies),
            dietary_style: dedup(&self.dietary_style),
        }
    }
}

/// A signed-in user's stored profile, keyed by email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub google_id: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub data: ProfileData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
