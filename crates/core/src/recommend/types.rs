//! Types for the personalized feed

use serde::{Deserialize, Serialize};

use crate::domain::dish::Dish;

pub const REASON_PREFERENCE_MATCH: &str = "Matches your preferences";
pub const REASON_CATEGORY_AFFINITY: &str = "Same category as your favorites";
pub const REASON_BUDGET_FIT: &str = "Within your usual budget";
pub const REASON_POPULAR: &str = "Very popular";

/// A dish selected for the feed, annotated with its transient ranking score
/// and the human-readable reasons it was picked. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedDish {
    #[serde(flatten)]
    pub dish: Dish,
    #[serde(rename = "recommendationScore")]
    pub score: i32,
    #[serde(rename = "recommendationReasons")]
    pub reasons: Vec<String>,
}

/// Feed payload handed to presentation code.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFeed {
    pub items: Vec<RankedDish>,
    pub has_personalized_suggestions: bool,
}
