//! Per-dish scoring for the personalized feed

use std::collections::{BTreeSet, HashMap, HashSet};

use rust_decimal::Decimal;

use crate::domain::dish::{Dish, DishCategory, DishId};
use crate::domain::order::OrderLineItem;
use crate::domain::profile::ShopperProfile;

use super::types::{
    REASON_BUDGET_FIT, REASON_CATEGORY_AFFINITY, REASON_POPULAR, REASON_PREFERENCE_MATCH,
};
use super::{
    budget_close_threshold, budget_near_threshold, BUDGET_CLOSE_BONUS, BUDGET_NEAR_BONUS,
    CATEGORY_AFFINITY_BONUS, FAVORITE_SENTINEL, FULL_PREFERENCE_BONUS, PARTIAL_PREFERENCE_BONUS,
    POPULARITY_BONUS, REORDER_PENALTY,
};

/// Score and reasons for a single dish. A sentinel score marks dishes the
/// shopper already favorited, which never reach the feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DishScore {
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Scorer for one shopper. Built once per ranking request; precomputes the
/// favorite sets, historical order counts, and the mean paid unit price so
/// each dish scores in constant time.
#[derive(Debug)]
pub struct DishScorer<'a> {
    preferences: &'a BTreeSet<String>,
    favorite_ids: HashSet<&'a DishId>,
    favorite_categories: HashSet<DishCategory>,
    order_counts: HashMap<&'a DishId, u32>,
    avg_order_price: Option<Decimal>,
}

impl<'a> DishScorer<'a> {
    pub fn new(profile: &'a ShopperProfile) -> Self {
        let favorite_ids = profile.favorites.iter().map(|favorite| &favorite.dish_id).collect();
        let favorite_categories =
            profile.favorites.iter().map(|favorite| favorite.category).collect();

        let mut order_counts: HashMap<&DishId, u32> = HashMap::new();
        for line in &profile.order_history {
            *order_counts.entry(&line.dish_id).or_insert(0) += line.quantity;
        }

        Self {
            preferences: &profile.dietary_preferences,
            favorite_ids,
            favorite_categories,
            order_counts,
            avg_order_price: mean_unit_price(&profile.order_history),
        }
    }

    /// Mean paid unit price across the shopper's history, or `None` when the
    /// history is empty and the budget step is skipped.
    pub fn avg_order_price(&self) -> Option<Decimal> {
        self.avg_order_price
    }

    pub fn score(&self, dish: &Dish) -> DishScore {
        // Favorites are assumed already known to the shopper.
        if self.favorite_ids.contains(&dish.id) {
            return DishScore { score: FAVORITE_SENTINEL, reasons: Vec::new() };
        }

        let mut score = 0i32;
        let mut reasons = Vec::new();

        let order_count = self.order_counts.get(&dish.id).copied().unwrap_or(0);
        score -= order_count as i32 * REORDER_PENALTY;

        if !self.preferences.is_empty() {
            let matching_tags =
                self.preferences.iter().filter(|tag| dish.dietary_tags.contains(*tag)).count();
            if matching_tags == self.preferences.len() && !dish.dietary_tags.is_empty() {
                score += FULL_PREFERENCE_BONUS;
                reasons.push(REASON_PREFERENCE_MATCH.to_string());
            } else if matching_tags > 0 {
                // Partial matches earn points but no reason string.
                score += PARTIAL_PREFERENCE_BONUS * matching_tags as i32;
            }
        }

        if self.favorite_categories.contains(&dish.category) {
            score += CATEGORY_AFFINITY_BONUS;
            reasons.push(REASON_CATEGORY_AFFINITY.to_string());
        }

        if let Some(avg_price) = self.avg_order_price {
            let price_diff = (dish.price - avg_price).abs();
            if price_diff < budget_near_threshold() {
                score += BUDGET_NEAR_BONUS;
                reasons.push(REASON_BUDGET_FIT.to_string());
            } else if price_diff < budget_close_threshold() {
                score += BUDGET_CLOSE_BONUS;
            }
        }

        if dish.is_popular {
            score += POPULARITY_BONUS;
            reasons.push(REASON_POPULAR.to_string());
        }

        DishScore { score, reasons }
    }
}

fn mean_unit_price(history: &[OrderLineItem]) -> Option<Decimal> {
    if history.is_empty() {
        return None;
    }

    let total: Decimal = history.iter().map(|line| line.unit_price).sum();
    Some((total / Decimal::from(history.len())).round_dp(2))
}
