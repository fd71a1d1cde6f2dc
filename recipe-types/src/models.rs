use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Custom serde module for optional timestamps to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&date.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Row of `Users_rf`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub author_id: i64,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub following_count: Option<i64>,
    pub follower_count: Option<i64>,
}

/// Row of `Reviews_rf`. The author is not carried over from staging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: i64,
    pub rating: Option<i64>,
    pub content: Option<String>,
    #[serde(with = "datetime_format")]
    pub date_submitted: Option<DateTime<Utc>>,
    #[serde(with = "datetime_format")]
    pub date_modified: Option<DateTime<Utc>>,
}

/// Row of `Recipes_rf`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: i64,
    pub name: Option<String>,
    #[serde(with = "datetime_format")]
    pub date_published: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Durations in whole seconds
    pub prep_time_secs: Option<i64>,
    pub cook_time_secs: Option<i64>,
    pub total_time_secs: Option<i64>,
    pub yield_text: Option<String>,
    /// Ingredient list exactly as it appeared in the CSV
    pub ingredient_parts_raw: Option<String>,
    pub servings: Option<f64>,
    /// Instruction text exactly as it appeared in the CSV
    pub instructions_raw: Option<String>,
}

/// Row of `Nutrient`, one per recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub recipe_id: i64,
    pub calories: Option<f64>,
    pub fat_content: Option<f64>,
    pub saturated_fat_content: Option<f64>,
    pub cholesterol_content: Option<f64>,
    pub sodium_content: Option<f64>,
    pub carbohydrate_content: Option<f64>,
    pub fiber_content: Option<f64>,
    pub sugar_content: Option<f64>,
    pub protein_content: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub recipe_id: i64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWord {
    pub recipe_id: i64,
    pub text: Option<String>,
}

/// One numbered step of a recipe's instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub recipe_id: i64,
    /// 1-based position in the original instruction text
    pub step_number: i64,
    pub text: String,
}

/// A user liking a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Like {
    pub review_id: i64,
    pub author_id: i64,
}

/// A user favoriting a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Favorite {
    pub recipe_id: i64,
    pub author_id: i64,
}

/// Directed edge of the social graph: `follower_id` follows `following_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: i64,
    pub following_id: i64,
}

impl FollowEdge {
    pub fn new(follower_id: i64, following_id: i64) -> Self {
        Self {
            follower_id,
            following_id,
        }
    }
}
