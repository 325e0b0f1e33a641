//! Similar-dish lookup
//!
//! Ranks the rest of the catalogue against a target dish by shared dietary
//! tags and price proximity. Same-category dishes qualify on membership
//! alone when the caller pre-filters by category.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::dish::Dish;
use crate::recommend::{budget_close_threshold, budget_near_threshold};

/// Result size when the caller does not ask for one.
pub const DEFAULT_SIMILAR_LIMIT: usize = 4;

const TAG_OVERLAP_WEIGHT: f64 = 5.0;
const BASE_SCORE: f64 = 1.0;
const PRICE_NEAR_BONUS: f64 = 3.0;
const PRICE_CLOSE_BONUS: f64 = 1.0;

/// A candidate judged similar to the target, with its transient score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimilarDish {
    #[serde(flatten)]
    pub dish: Dish,
    #[serde(rename = "similarityScore")]
    pub similarity_score: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rank up to `limit` in-stock dishes similar to `target`, best-first.
    /// The target itself never appears in the output. With
    /// `same_category_only` the pool is restricted before scoring, which
    /// shrinks the comparison set.
    pub fn similar_dishes(
        &self,
        target: &Dish,
        catalog: &[Dish],
        limit: Option<usize>,
        same_category_only: bool,
    ) -> Vec<SimilarDish> {
        let limit = limit.unwrap_or(DEFAULT_SIMILAR_LIMIT).max(1);

        let mut candidates: Vec<SimilarDish> = catalog
            .iter()
            .filter(|candidate| candidate.id != target.id && candidate.in_stock())
            .filter(|candidate| !same_category_only || candidate.category == target.category)
            .map(|candidate| SimilarDish {
                dish: candidate.clone(),
                similarity_score: pair_score(target, candidate),
            })
            .collect();

        // Stable sort keeps catalogue order among equal scores.
        candidates.sort_by(|a, b| {
            b.similarity_score.partial_cmp(&a.similarity_score).unwrap_or(Ordering::Equal)
        });
        candidates.truncate(limit);
        candidates
    }
}

fn pair_score(target: &Dish, candidate: &Dish) -> f64 {
    let common_tags = target.dietary_tags.intersection(&candidate.dietary_tags).count();
    let denominator = target.dietary_tags.len().max(candidate.dietary_tags.len()).max(1);

    let mut score = BASE_SCORE + (common_tags as f64 / denominator as f64) * TAG_OVERLAP_WEIGHT;

    let price_diff = (candidate.price - target.price).abs();
    if price_diff < budget_near_threshold() {
        score += PRICE_NEAR_BONUS;
    } else if price_diff < budget_close_threshold() {
        score += PRICE_CLOSE_BONUS;
    }

    score
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use crate::domain::dish::{Dish, DishCategory, DishId};

    use super::{SimilarityEngine, DEFAULT_SIMILAR_LIMIT};

    fn dish(id: &str, category: DishCategory, price: Decimal, tags: &[&str]) -> Dish {
        Dish {
            id: DishId(id.to_string()),
            name: id.to_string(),
            price,
            category,
            dietary_tags: tags.iter().map(|tag| tag.to_string()).collect(),
            stock: 3,
            is_popular: false,
        }
    }

    #[test]
    fn target_never_appears_in_its_own_results() {
        let target = dish("dish-a", DishCategory::Main, Decimal::new(1000, 2), &["vegan"]);
        let catalog = vec![
            target.clone(),
            dish("dish-b", DishCategory::Main, Decimal::new(1000, 2), &["vegan"]),
        ];

        let similar = SimilarityEngine::new().similar_dishes(&target, &catalog, None, false);
        assert!(similar.iter().all(|entry| entry.dish.id != target.id));
    }

    #[test]
    fn shared_tags_and_close_price_rank_highest() {
        let target = dish("dish-a", DishCategory::Main, Decimal::new(1000, 2), &["vegan", "spicy"]);
        let catalog = vec![
            dish("dish-far", DishCategory::Main, Decimal::new(3000, 2), &[]),
            dish("dish-twin", DishCategory::Main, Decimal::new(1100, 2), &["vegan", "spicy"]),
            dish("dish-half", DishCategory::Main, Decimal::new(1100, 2), &["vegan"]),
        ];

        let similar = SimilarityEngine::new().similar_dishes(&target, &catalog, None, false);

        assert_eq!(similar[0].dish.id, DishId("dish-twin".to_string()));
        // Full overlap (5.0) + base (1.0) + near-price (3.0).
        assert!((similar[0].similarity_score - 9.0).abs() < f64::EPSILON);
        assert_eq!(similar[1].dish.id, DishId("dish-half".to_string()));
        assert!((similar[1].similarity_score - 6.5).abs() < f64::EPSILON);
        assert_eq!(similar[2].dish.id, DishId("dish-far".to_string()));
        assert!((similar[2].similarity_score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn category_filter_restricts_the_pool_before_scoring() {
        let target = dish("dish-a", DishCategory::Dessert, Decimal::new(600, 2), &[]);
        let catalog = vec![
            dish("dish-main", DishCategory::Main, Decimal::new(600, 2), &[]),
            dish("dish-cake", DishCategory::Dessert, Decimal::new(2600, 2), &[]),
        ];

        let similar = SimilarityEngine::new().similar_dishes(&target, &catalog, None, true);

        // Same-category membership alone is enough, even with zero tag
        // overlap and a large price gap.
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].dish.id, DishId("dish-cake".to_string()));
        assert!((similar[0].similarity_score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_stock_candidates_are_excluded() {
        let target = dish("dish-a", DishCategory::Main, Decimal::new(900, 2), &["vegan"]);
        let mut sold_out = dish("dish-b", DishCategory::Main, Decimal::new(900, 2), &["vegan"]);
        sold_out.stock = 0;

        let similar =
            SimilarityEngine::new().similar_dishes(&target, &[target.clone(), sold_out], None, false);
        assert!(similar.is_empty());
    }

    #[test]
    fn results_are_capped_at_the_limit() {
        let target = dish("dish-a", DishCategory::Main, Decimal::new(900, 2), &[]);
        let catalog: Vec<Dish> = (0..10)
            .map(|n| dish(&format!("dish-{n}"), DishCategory::Main, Decimal::new(900, 2), &[]))
            .collect();

        let similar = SimilarityEngine::new().similar_dishes(&target, &catalog, None, false);
        assert_eq!(similar.len(), DEFAULT_SIMILAR_LIMIT);

        let two = SimilarityEngine::new().similar_dishes(&target, &catalog, Some(2), false);
        assert_eq!(two.len(), 2);
    }
}
