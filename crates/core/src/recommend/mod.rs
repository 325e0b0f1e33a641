//! Personalized "for you" feed
//!
//! Ranks the in-stock catalogue for one shopper from their order history,
//! favorites, and dietary preferences, then backfills short results with
//! popularity-ranked dishes. Pure and deterministic over the snapshots it is
//! given; every request recomputes from scratch.

mod engine;
mod scoring;
mod types;

pub use engine::{has_personalized_suggestions, RecommendationEngine};
pub use scoring::{DishScore, DishScorer};
pub use types::*;

use rust_decimal::Decimal;

/// Feed size when the caller does not ask for one.
pub const DEFAULT_FEED_LIMIT: usize = 8;

/// Bonus for a dish whose tags cover every one of the shopper's preferences.
pub const FULL_PREFERENCE_BONUS: i32 = 50;

/// Bonus per matching tag when the dish covers only part of the preferences.
pub const PARTIAL_PREFERENCE_BONUS: i32 = 10;

/// Bonus when the dish's category appears among the shopper's favorites.
pub const CATEGORY_AFFINITY_BONUS: i32 = 20;

/// Bonus when the dish price is within the near budget threshold.
pub const BUDGET_NEAR_BONUS: i32 = 15;

/// Bonus when the dish price is within the wider budget threshold.
pub const BUDGET_CLOSE_BONUS: i32 = 5;

/// Bonus for a curated-popular dish; also the fixed score of backfill rows.
pub const POPULARITY_BONUS: i32 = 10;

/// Penalty per historical unit ordered, pushing the feed towards discovery.
pub const REORDER_PENALTY: i32 = 2;

/// Sentinel for already-favorited dishes; dropped before output.
pub const FAVORITE_SENTINEL: i32 = -1;

/// Price distance under which a dish counts as "within your usual budget".
pub fn budget_near_threshold() -> Decimal {
    Decimal::new(200, 2)
}

/// Price distance under which a dish still earns the smaller budget bonus.
pub fn budget_close_threshold() -> Decimal {
    Decimal::new(500, 2)
}
