//! Feed assembly: score, rank, truncate, backfill

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::domain::dish::{Dish, DishId};
use crate::domain::profile::ShopperProfile;

use super::scoring::DishScorer;
use super::types::{RankedDish, REASON_POPULAR};
use super::{DEFAULT_FEED_LIMIT, POPULARITY_BONUS};

/// The personalized feed engine. Stateless; every call recomputes from the
/// snapshots it is handed and two calls with identical inputs produce
/// identical output.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rank the in-stock catalogue for one shopper, best-first, up to
    /// `limit` entries. Short results are topped up with popularity-ranked
    /// dishes; never errors, may return fewer than `limit` when the
    /// catalogue runs out.
    pub fn personalized_feed(
        &self,
        catalog: &[Dish],
        profile: &ShopperProfile,
        limit: Option<usize>,
    ) -> Vec<RankedDish> {
        let limit = effective_limit(limit);
        let scorer = DishScorer::new(profile);

        let mut ranked: Vec<RankedDish> = catalog
            .iter()
            .filter(|dish| dish.in_stock())
            .filter_map(|dish| {
                let scored = scorer.score(dish);
                // Drops the favorite sentinel along with everything
                // scoring zero or below.
                (scored.score > 0).then(|| RankedDish {
                    dish: dish.clone(),
                    score: scored.score,
                    reasons: scored.reasons,
                })
            })
            .collect();

        // Stable sort: ties keep catalogue order.
        ranked.sort_by_key(|item| Reverse(item.score));
        ranked.truncate(limit);

        self.backfill(catalog, profile, ranked, limit)
    }

    /// Top up a short feed with popular in-stock dishes in catalogue order,
    /// skipping favorites and anything already selected. Backfilled rows
    /// carry the fixed popularity score so they sort below genuinely scored
    /// entries.
    fn backfill(
        &self,
        catalog: &[Dish],
        profile: &ShopperProfile,
        mut ranked: Vec<RankedDish>,
        limit: usize,
    ) -> Vec<RankedDish> {
        if ranked.len() >= limit {
            return ranked;
        }

        let mut excluded: HashSet<DishId> =
            ranked.iter().map(|item| item.dish.id.clone()).collect();
        excluded.extend(profile.favorites.iter().map(|favorite| favorite.dish_id.clone()));

        for dish in catalog.iter().filter(|dish| dish.is_popular && dish.in_stock()) {
            if ranked.len() >= limit {
                break;
            }
            if excluded.contains(&dish.id) {
                continue;
            }
            excluded.insert(dish.id.clone());
            ranked.push(RankedDish {
                dish: dish.clone(),
                score: POPULARITY_BONUS,
                reasons: vec![REASON_POPULAR.to_string()],
            });
        }

        ranked
    }

    /// The anonymous path: no history, no favorites, no preferences means no
    /// scoring at all. First `limit` popular in-stock dishes in catalogue
    /// order, with no ranking metadata.
    pub fn popular_feed(&self, catalog: &[Dish], limit: Option<usize>) -> Vec<Dish> {
        let limit = effective_limit(limit);
        catalog
            .iter()
            .filter(|dish| dish.is_popular && dish.in_stock())
            .take(limit)
            .cloned()
            .collect()
    }
}

/// True when at least one entry was selected for a reason beyond curated
/// popularity alone.
pub fn has_personalized_suggestions(items: &[RankedDish]) -> bool {
    items.iter().any(|item| item.score > POPULARITY_BONUS)
}

fn effective_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_FEED_LIMIT).max(1)
}
